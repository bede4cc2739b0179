use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;

use crate::common::{
    ChatEvent, ChatMessage, ConversationContext, CurrentUser, MessageId, MessageStatus,
    SendMessageRequest,
};
use crate::error::ChatError;
use crate::ui::state::SharedStore;

use super::api::ChatApi;

pub const FETCH_ERROR: &str = "Failed to fetch messages";
pub const SEND_ERROR: &str = "Failed to send message";

/// Kết quả của một lần fetch thành công về mặt mạng.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Danh sách đã được thay bằng `n` tin nhắn
    Applied(usize),
    /// Response đến muộn (đã có fetch mới hơn hoặc hội thoại đã đóng)
    Stale,
}

/// Cầu nối giữa [`SharedStore`] và backend.
///
/// Clone rẻ: mọi bản clone dùng chung api, store và kênh notification, nên
/// có thể chạy nhiều fetch/send song song trên các task khác nhau.
#[derive(Clone)]
pub struct ChatSynchronizer {
    api: Arc<dyn ChatApi>,
    store: SharedStore,
    user: CurrentUser,
    event_sender: mpsc::Sender<ChatEvent>,
}

impl ChatSynchronizer {
    pub fn new(
        api: Arc<dyn ChatApi>,
        store: SharedStore,
        user: CurrentUser,
        event_sender: mpsc::Sender<ChatEvent>,
    ) -> Self {
        Self {
            api,
            store,
            user,
            event_sender,
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    fn notify(&self, event: ChatEvent) {
        if let Err(err) = self.event_sender.try_send(event) {
            log::warn!("Failed to deliver chat notification: {err}");
        }
    }

    /// Mở hội thoại (xoá hội thoại cũ) rồi tải tin nhắn.
    pub async fn open_conversation(
        &self,
        ctx: ConversationContext,
    ) -> Result<FetchOutcome, ChatError> {
        let application_id = self.set_conversation(ctx);
        self.fetch_messages(&application_id).await
    }

    /// Phần đồng bộ của việc mở hội thoại; trả về application id cần fetch.
    pub fn set_conversation(&self, ctx: ConversationContext) -> String {
        let application_id = ctx.application_id.clone();
        log::info!("Opening conversation for application {application_id}");
        self.store.with(|store| store.set_current_chat(ctx));
        application_id
    }

    pub fn close_conversation(&self) {
        self.store.with(|store| store.clear());
        log::info!("Conversation closed");
    }

    /// Tải lại hội thoại đang mở. `None` nếu không có hội thoại nào.
    pub async fn refresh(&self) -> Option<Result<FetchOutcome, ChatError>> {
        let application_id = self
            .store
            .with(|store| store.current_chat().map(|ctx| ctx.application_id.clone()))?;
        Some(self.fetch_messages(&application_id).await)
    }

    pub async fn fetch_messages(&self, application_id: &str) -> Result<FetchOutcome, ChatError> {
        let ticket = self.store.with(|store| store.begin_fetch());
        self.notify(ChatEvent::FetchStarted);
        let result = self.api.fetch_messages(application_id).await;

        let applied = self.store.with(|store| {
            if !store.is_current_fetch(ticket) {
                return None;
            }
            store.set_loading(false);
            Some(match result {
                Ok(messages) => {
                    let count = messages.len();
                    store.replace_all(messages);
                    store.set_error(None);
                    Ok(count)
                }
                Err(err) => {
                    // Giữ nguyên danh sách cũ để không nháy màn hình trống
                    store.set_error(Some(FETCH_ERROR.to_string()));
                    Err(err)
                }
            })
        });

        match applied {
            None => {
                log::debug!("Discarding stale messages response for application {application_id}");
                Ok(FetchOutcome::Stale)
            }
            Some(Ok(count)) => {
                log::debug!("Loaded {count} message(s) for application {application_id}");
                self.notify(ChatEvent::MessagesLoaded {
                    application_id: application_id.to_string(),
                    count,
                });
                Ok(FetchOutcome::Applied(count))
            }
            Some(Err(err)) => {
                log::warn!("Fetching messages for application {application_id} failed: {err}");
                self.notify(ChatEvent::FetchFailed);
                Err(ChatError::FetchFailed(err.to_string()))
            }
        }
    }

    /// Gửi tin nhắn với chèn lạc quan.
    ///
    /// Tin nhắn provisional được append vào store trước khi request được gửi đi,
    /// sau đó được thay bằng bản ghi của server hoặc bị gỡ bỏ nếu thất bại.
    pub async fn send_message(
        &self,
        ctx: &ConversationContext,
        content: &str,
    ) -> Result<ChatMessage, ChatError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ChatError::EmptyContent);
        }

        let recipient = self.user.role.resolve_recipient(ctx).inspect_err(|err| {
            if let ChatError::MissingRecipient(party) = *err {
                log::warn!("Cannot send message: {party} information not available");
                self.notify(ChatEvent::MissingRecipient(party));
            }
        })?;

        let local_id = MessageId::new_local();
        let provisional = ChatMessage {
            id: local_id.clone(),
            content: content.to_string(),
            sender: self.user.id.clone(),
            receiver: Some(recipient.id.clone()),
            sender_display_name: Some(self.user.fullname.clone()),
            receiver_display_name: recipient.display_name.clone(),
            application: Some(ctx.application_id.clone()),
            created_at: Utc::now(),
            status: MessageStatus::Provisional,
        };
        let generation = self.store.with(|store| {
            store.append(provisional.clone());
            store.generation()
        });
        // UI vẽ lại ngay để thấy dòng "(sending...)" trước khi có phản hồi
        self.notify(ChatEvent::MessageQueued);

        let request = SendMessageRequest {
            application_id: ctx.application_id.clone(),
            content: content.to_string(),
            receiver_id: recipient.id,
        };

        match self.api.send_message(&request).await {
            Ok(confirmed) => {
                let confirmed = fill_display_names(confirmed, &provisional);
                let replaced = self
                    .store
                    .with(|store| store.update(|message| message.id == local_id, confirmed.clone()));
                if replaced {
                    log::debug!("Message {local_id} confirmed as {}", confirmed.id);
                } else {
                    log::info!(
                        "Provisional message {local_id} no longer in store; dropping confirmed {}",
                        confirmed.id
                    );
                }
                self.notify(ChatEvent::MessageSent);
                Ok(confirmed)
            }
            Err(err) => {
                log::warn!("Sending message {local_id} failed: {err}");
                self.store.with(|store| {
                    store.remove(|message| message.id == local_id);
                    if store.generation() == generation {
                        store.set_error(Some(SEND_ERROR.to_string()));
                    }
                });
                self.notify(ChatEvent::SendFailed);
                Err(ChatError::SendFailed(err.to_string()))
            }
        }
    }
}

/// Server có thể trả `sender` chỉ là id; giữ lại tên hiển thị đã biết.
fn fill_display_names(mut confirmed: ChatMessage, provisional: &ChatMessage) -> ChatMessage {
    confirmed.status = MessageStatus::Confirmed;
    if confirmed.sender_display_name.is_none() && confirmed.sender == provisional.sender {
        confirmed.sender_display_name = provisional.sender_display_name.clone();
    }
    if confirmed.receiver_display_name.is_none() && confirmed.receiver == provisional.receiver {
        confirmed.receiver_display_name = provisional.receiver_display_name.clone();
    }
    confirmed
}
