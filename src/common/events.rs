/// Sự kiện từ chat worker gửi lên UI: tín hiệu vẽ lại và toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// Bắt đầu tải tin nhắn, store đang `loading`
    FetchStarted,
    MessagesLoaded { application_id: String, count: usize },
    FetchFailed,
    /// Tin nhắn provisional vừa được append, request chưa có phản hồi
    MessageQueued,
    MessageSent,
    SendFailed,
    MissingRecipient(&'static str),
}

impl ChatEvent {
    /// Nội dung toast; `None` với các sự kiện chỉ dùng để vẽ lại.
    pub fn toast(&self) -> Option<String> {
        match self {
            ChatEvent::FetchStarted | ChatEvent::MessagesLoaded { .. } | ChatEvent::MessageQueued => {
                None
            }
            ChatEvent::FetchFailed => Some("Failed to load chat messages".to_string()),
            ChatEvent::MessageSent => Some("Message sent successfully".to_string()),
            ChatEvent::SendFailed => Some("Failed to send message".to_string()),
            ChatEvent::MissingRecipient(party) => Some(format!("{party} information not available")),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            ChatEvent::FetchFailed | ChatEvent::SendFailed | ChatEvent::MissingRecipient(_)
        )
    }
}
