use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::common::ChatCommand;
use crate::error::ChatError;

use super::synchronizer::ChatSynchronizer;

/// Chat worker: nhận lệnh từ UI và điều khiển Synchronizer.
///
/// Mỗi lệnh chạy trên một task riêng nên UI không bao giờ bị chặn bởi mạng,
/// và nhiều fetch/send có thể cùng bay.
pub struct ChatClient {
    sync: ChatSynchronizer,
    command_receiver: mpsc::Receiver<ChatCommand>,
}

impl ChatClient {
    pub fn new(sync: ChatSynchronizer, command_receiver: mpsc::Receiver<ChatCommand>) -> Self {
        Self {
            sync,
            command_receiver,
        }
    }

    /// Chạy tới khi kênh lệnh đóng, rồi đợi các request còn dang dở.
    pub async fn run(mut self) {
        let mut tasks = JoinSet::new();
        log::info!("Chat worker started for user {}", self.sync.user().id);

        loop {
            tokio::select! {
                command = self.command_receiver.recv() => {
                    match command {
                        Some(command) => self.handle_command(command, &mut tasks),
                        None => break,
                    }
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(err) = joined {
                        log::error!("Chat task panicked: {err}");
                    }
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                log::error!("Chat task panicked: {err}");
            }
        }
        log::info!("Chat worker stopped");
    }

    fn handle_command(&self, command: ChatCommand, tasks: &mut JoinSet<()>) {
        let sync = self.sync.clone();
        match command {
            ChatCommand::Open(ctx) => {
                // Đặt current chat ngay để lệnh Send tiếp theo thấy hội thoại mới
                let application_id = sync.set_conversation(ctx);
                tasks.spawn(async move {
                    log_outcome("open", sync.fetch_messages(&application_id).await.map(drop));
                });
            }
            ChatCommand::Refresh => {
                tasks.spawn(async move {
                    match sync.refresh().await {
                        Some(result) => log_outcome("refresh", result.map(drop)),
                        None => log::info!("Refresh ignored: no conversation open"),
                    }
                });
            }
            ChatCommand::SendMessage(content) => {
                let ctx = self.sync.store().with(|store| store.current_chat().cloned());
                let Some(ctx) = ctx else {
                    log::warn!("Send ignored: no conversation open");
                    return;
                };
                tasks.spawn(async move {
                    log_outcome("send", sync.send_message(&ctx, &content).await.map(drop));
                });
            }
            ChatCommand::Close => sync.close_conversation(),
        }
    }
}

fn log_outcome(action: &str, result: Result<(), ChatError>) {
    match result {
        Ok(()) => {}
        Err(ChatError::EmptyContent) => log::debug!("{action}: empty message ignored"),
        Err(err) => log::warn!("{action}: {err}"),
    }
}
