use super::conversation::ConversationContext;

/// Lệnh UI gửi xuống chat worker.
#[derive(Debug, Clone)]
pub enum ChatCommand {
    /// Mở hội thoại: đặt current chat và tải toàn bộ tin nhắn.
    Open(ConversationContext),
    SendMessage(String),
    /// Tải lại tin nhắn của hội thoại đang mở
    Refresh,
    Close,
}
