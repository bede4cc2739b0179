use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const LOCAL_ID_PREFIX: &str = "local-";

/// Định danh của một tin nhắn.
///
/// `Server` là `_id` do backend cấp. `Local` chỉ tồn tại phía client cho tới
/// khi tin nhắn provisional được xác nhận hoặc bị gỡ bỏ, và không bao giờ
/// trùng với id của server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageId {
    Server(String),
    Local(Uuid),
}

impl MessageId {
    pub fn new_local() -> Self {
        MessageId::Local(Uuid::new_v4())
    }

    pub fn is_local(&self) -> bool {
        matches!(self, MessageId::Local(_))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageId::Server(id) => f.write_str(id),
            MessageId::Local(id) => write!(f, "{LOCAL_ID_PREFIX}{id}"),
        }
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        MessageId::Server(id.to_string())
    }
}

/// Vòng đời của tin nhắn: `Provisional` -> `Confirmed` hoặc bị xoá.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStatus {
    Provisional,
    Confirmed,
}

/// Domain model đại diện một tin nhắn chat.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "WireMessage")]
pub struct ChatMessage {
    pub id: MessageId,
    pub content: String,
    pub sender: String,
    pub receiver: Option<String>,
    pub sender_display_name: Option<String>,
    pub receiver_display_name: Option<String>,
    pub application: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status: MessageStatus,
}

impl ChatMessage {
    pub fn is_provisional(&self) -> bool {
        self.status == MessageStatus::Provisional
    }
}

/// Người tham gia theo cách backend trả về: id trần hoặc document user đã
/// được populate.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Participant {
    Id(String),
    Profile {
        #[serde(rename = "_id", alias = "id")]
        id: String,
        #[serde(default)]
        fullname: Option<String>,
    },
}

impl Participant {
    fn into_parts(self) -> (String, Option<String>) {
        match self {
            Participant::Id(id) => (id, None),
            Participant::Profile { id, fullname } => (id, fullname),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMessage {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    content: String,
    sender: Participant,
    #[serde(default)]
    receiver: Option<Participant>,
    #[serde(default)]
    sender_name: Option<String>,
    #[serde(default)]
    receiver_name: Option<String>,
    #[serde(default)]
    application: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<WireMessage> for ChatMessage {
    fn from(wire: WireMessage) -> Self {
        let (sender, sender_profile_name) = wire.sender.into_parts();
        let (receiver, receiver_profile_name) = match wire.receiver {
            Some(receiver) => {
                let (id, name) = receiver.into_parts();
                (Some(id), name)
            }
            None => (None, None),
        };

        ChatMessage {
            id: MessageId::Server(wire.id),
            content: wire.content,
            sender,
            receiver,
            sender_display_name: wire.sender_name.or(sender_profile_name),
            receiver_display_name: wire.receiver_name.or(receiver_profile_name),
            application: wire.application,
            created_at: wire.created_at,
            status: MessageStatus::Confirmed,
        }
    }
}

/// Body của `POST /chat/send`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub application_id: String,
    pub content: String,
    pub receiver_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_bare_participant_ids() {
        let message: ChatMessage = serde_json::from_value(json!({
            "id": "m1",
            "content": "hi",
            "sender": "u1",
            "createdAt": "2024-01-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(message.id, MessageId::from("m1"));
        assert_eq!(message.sender, "u1");
        assert_eq!(message.receiver, None);
        assert_eq!(message.sender_display_name, None);
        assert_eq!(message.status, MessageStatus::Confirmed);
    }

    #[test]
    fn decodes_populated_sender_profile() {
        let message: ChatMessage = serde_json::from_value(json!({
            "_id": "m7",
            "content": "Thanks for applying",
            "sender": { "_id": "r1", "fullname": "Rita Recruiter" },
            "receiver": "a1",
            "application": "app1",
            "createdAt": "2024-03-02T08:30:00.000Z"
        }))
        .unwrap();

        assert_eq!(message.sender, "r1");
        assert_eq!(message.sender_display_name.as_deref(), Some("Rita Recruiter"));
        assert_eq!(message.receiver.as_deref(), Some("a1"));
        assert_eq!(message.application.as_deref(), Some("app1"));
    }

    #[test]
    fn explicit_sender_name_wins_over_profile() {
        let message: ChatMessage = serde_json::from_value(json!({
            "_id": "m8",
            "content": "hello",
            "sender": { "_id": "u1", "fullname": "Full Name" },
            "senderName": "Nick",
            "createdAt": "2024-03-02T08:30:00Z"
        }))
        .unwrap();

        assert_eq!(message.sender_display_name.as_deref(), Some("Nick"));
    }

    #[test]
    fn local_ids_never_look_like_server_ids() {
        let id = MessageId::new_local();
        assert!(id.is_local());
        assert!(id.to_string().starts_with(LOCAL_ID_PREFIX));
        assert_ne!(id, MessageId::new_local());
    }

    #[test]
    fn send_request_uses_camel_case() {
        let body = serde_json::to_value(SendMessageRequest {
            application_id: "app1".into(),
            content: "hello".into(),
            receiver_id: "u2".into(),
        })
        .unwrap();

        assert_eq!(
            body,
            json!({ "applicationId": "app1", "content": "hello", "receiverId": "u2" })
        );
    }
}
