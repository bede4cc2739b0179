//! Chat giữa applicant và recruiter cho một job application: store trong bộ
//! nhớ, synchronizer gửi lạc quan và client HTTP cho backend.

pub mod common;
pub mod config;
pub mod error;
pub mod network;
pub mod ui;

pub use common::{ChatCommand, ChatEvent, ChatMessage, ConversationContext, CurrentUser, Role};
pub use error::{ApiError, ChatError};
pub use network::{ChatApi, ChatClient, ChatSynchronizer, FetchOutcome, HttpChatApi};
pub use ui::{ChatStore, SharedStore};
