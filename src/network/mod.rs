pub mod api;
pub mod client;
pub mod synchronizer;

pub use api::{ChatApi, HttpChatApi};
pub use client::ChatClient;
pub use synchronizer::{ChatSynchronizer, FetchOutcome};
