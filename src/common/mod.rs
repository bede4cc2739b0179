pub mod commands;
pub mod conversation;
pub mod events;
pub mod types;

pub use commands::ChatCommand;
pub use conversation::{
    ApplicantContact, CompanyContact, ConversationContext, CurrentUser, Recipient, Role,
};
pub use events::ChatEvent;
pub use types::{ChatMessage, MessageId, MessageStatus, SendMessageRequest};
