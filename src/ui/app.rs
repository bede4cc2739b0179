use std::io;

use chrono::Local;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::common::{ChatCommand, ChatEvent, ConversationContext, CurrentUser};

use super::components::input_bar::{self, InputAction};
use super::components::transcript;
use super::state::SharedStore;

/// Hộp thoại chat trên terminal: đọc stdin, in transcript và toast.
pub struct ChatApp {
    store: SharedStore,
    user: CurrentUser,
    command_sender: mpsc::Sender<ChatCommand>,
    event_receiver: mpsc::Receiver<ChatEvent>,
}

impl ChatApp {
    pub fn new(
        store: SharedStore,
        user: CurrentUser,
        command_sender: mpsc::Sender<ChatCommand>,
        event_receiver: mpsc::Receiver<ChatEvent>,
    ) -> Self {
        Self {
            store,
            user,
            command_sender,
            event_receiver,
        }
    }

    pub async fn run(mut self, ctx: ConversationContext) -> io::Result<()> {
        println!("{}", transcript::title(&ctx, &self.user));
        println!("Type a message and press Enter. /refresh reloads, /quit closes.");
        self.send_command(ChatCommand::Open(ctx)).await;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    match input_bar::parse(&line) {
                        Some(InputAction::Send(content)) => {
                            self.send_command(ChatCommand::SendMessage(content)).await;
                        }
                        Some(InputAction::Refresh) => self.send_command(ChatCommand::Refresh).await,
                        Some(InputAction::Quit) => break,
                        None => {}
                    }
                }
                Some(event) = self.event_receiver.recv() => self.handle_event(event),
            }
        }

        self.send_command(ChatCommand::Close).await;
        Ok(())
    }

    fn handle_event(&self, event: ChatEvent) {
        if let Some(toast) = event.toast() {
            if event.is_error() {
                eprintln!("! {toast}");
            } else {
                println!("* {toast}");
            }
        }

        match event {
            ChatEvent::FetchStarted
            | ChatEvent::MessagesLoaded { .. }
            | ChatEvent::FetchFailed
            | ChatEvent::MessageQueued
            | ChatEvent::MessageSent
            | ChatEvent::SendFailed => self.redraw(),
            ChatEvent::MissingRecipient(_) => {}
        }
    }

    fn redraw(&self) {
        let view = self
            .store
            .with(|store| transcript::render_view(store, &self.user.id, &Local::now()));
        println!("{view}");
    }

    async fn send_command(&self, command: ChatCommand) {
        if let Err(err) = self.command_sender.send(command).await {
            log::warn!("Failed to send command to chat worker: {err}");
        }
    }
}
