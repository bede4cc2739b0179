pub mod app;
pub mod components;
pub mod state;

pub use app::ChatApp;
pub use state::{ChatStore, SharedStore};
