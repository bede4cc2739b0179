use std::sync::{Arc, Mutex, PoisonError};

use crate::common::{ChatMessage, ConversationContext, MessageId, MessageStatus};

/// Trạng thái chat của hội thoại đang mở.
///
/// Mọi thao tác đều đồng bộ và không gọi mạng.
#[derive(Debug, Default)]
pub struct ChatStore {
    messages: Vec<ChatMessage>,
    current_chat: Option<ConversationContext>,
    loading: bool,
    error: Option<String>,
    /// Tăng mỗi lần clear hoặc mở hội thoại mới
    generation: u64,
    fetch_seq: u64,
}

/// Vé của một lần fetch; response chỉ được áp dụng nếu vé còn mới nhất.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    generation: u64,
}

impl ChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn current_chat(&self) -> Option<&ConversationContext> {
        self.current_chat.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn replace_all(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Thay tin nhắn đầu tiên khớp `predicate`; trả về có khớp hay không.
    pub fn update<P>(&mut self, predicate: P, new_message: ChatMessage) -> bool
    where
        P: Fn(&ChatMessage) -> bool,
    {
        match self.messages.iter_mut().find(|message| predicate(message)) {
            Some(slot) => {
                *slot = new_message;
                true
            }
            None => false,
        }
    }

    /// Xoá mọi tin nhắn khớp `predicate`, trả về số lượng đã xoá.
    pub fn remove<P>(&mut self, predicate: P) -> usize
    where
        P: Fn(&ChatMessage) -> bool,
    {
        let before = self.messages.len();
        self.messages.retain(|message| !predicate(message));
        before - self.messages.len()
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    /// Mở hội thoại mới: xoá trạng thái cũ rồi ghi nhớ context.
    pub fn set_current_chat(&mut self, ctx: ConversationContext) {
        self.clear();
        self.current_chat = Some(ctx);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.current_chat = None;
        self.loading = false;
        self.error = None;
        self.generation += 1;
    }

    /// Bắt đầu một lần fetch: bật `loading` và cấp vé mới.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.fetch_seq += 1;
        self.loading = true;
        FetchTicket {
            seq: self.fetch_seq,
            generation: self.generation,
        }
    }

    /// Sai khi đã có fetch mới hơn hoặc hội thoại đã bị đóng/mở lại.
    pub fn is_current_fetch(&self, ticket: FetchTicket) -> bool {
        ticket.seq == self.fetch_seq && ticket.generation == self.generation
    }

    pub fn find(&self, id: &MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|message| &message.id == id)
    }

    pub fn provisional_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|message| message.status == MessageStatus::Provisional)
            .count()
    }
}

/// Handle dùng chung cho worker và UI.
///
/// Lock chỉ được giữ trong các bước chuyển trạng thái đồng bộ, không bao giờ
/// qua một điểm `.await`.
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<ChatStore>>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut ChatStore) -> R) -> R {
        let mut store = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut store)
    }

    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.with(|store| store.messages().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn message(id: MessageId, content: &str, status: MessageStatus) -> ChatMessage {
        ChatMessage {
            id,
            content: content.to_string(),
            sender: "u1".into(),
            receiver: Some("u2".into()),
            sender_display_name: None,
            receiver_display_name: None,
            application: Some("app1".into()),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            status,
        }
    }

    fn confirmed(id: &str) -> ChatMessage {
        message(MessageId::from(id), id, MessageStatus::Confirmed)
    }

    #[test]
    fn replace_all_keeps_exact_sequence() {
        let mut store = ChatStore::new();
        store.append(confirmed("old"));

        let incoming = vec![confirmed("m3"), confirmed("m1"), confirmed("m2")];
        store.replace_all(incoming.clone());
        assert_eq!(store.messages(), incoming.as_slice());

        store.replace_all(Vec::new());
        assert!(store.messages().is_empty());
    }

    #[test]
    fn update_and_remove_target_matching_entry() {
        let mut store = ChatStore::new();
        let local = MessageId::new_local();
        store.append(confirmed("m1"));
        store.append(message(local.clone(), "hello", MessageStatus::Provisional));
        assert_eq!(store.provisional_count(), 1);

        assert!(store.update(|m| m.id == local, confirmed("m2")));
        assert_eq!(store.provisional_count(), 0);
        assert!(store.find(&MessageId::from("m2")).is_some());
        assert!(!store.update(|m| m.id == local, confirmed("m9")));

        assert_eq!(store.remove(|m| m.id == MessageId::from("m1")), 1);
        assert_eq!(store.remove(|m| m.id == MessageId::from("m1")), 0);
        assert_eq!(store.messages().len(), 1);
    }

    #[test]
    fn clear_resets_everything_and_bumps_generation() {
        let mut store = ChatStore::new();
        store.set_current_chat(ConversationContext::new("app1"));
        let opened = store.generation();
        store.append(confirmed("m1"));
        store.set_loading(true);
        store.set_error(Some("boom".into()));

        store.clear();

        assert!(store.messages().is_empty());
        assert!(store.current_chat().is_none());
        assert!(!store.is_loading());
        assert!(store.error().is_none());
        assert!(store.generation() > opened);
    }

    #[test]
    fn only_latest_fetch_ticket_is_current() {
        let mut store = ChatStore::new();
        let first = store.begin_fetch();
        assert!(store.is_loading());
        assert!(store.is_current_fetch(first));

        let second = store.begin_fetch();
        assert!(!store.is_current_fetch(first));
        assert!(store.is_current_fetch(second));

        store.clear();
        assert!(!store.is_current_fetch(second));
    }

    #[test]
    fn shared_store_clones_see_same_state() {
        let shared = SharedStore::new();
        let other = shared.clone();
        shared.with(|store| store.append(confirmed("m1")));
        assert_eq!(other.snapshot().len(), 1);
    }
}
