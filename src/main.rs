use std::error::Error;
use std::sync::Arc;

use chrono::Local;
use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use tokio::sync::mpsc;

use jobboard_chat::common::{ApplicantContact, CompanyContact, ConversationContext, CurrentUser};
use jobboard_chat::config::{self, AppConfig};
use jobboard_chat::network::{ChatClient, ChatSynchronizer, HttpChatApi};
use jobboard_chat::ui::components::transcript;
use jobboard_chat::ui::{ChatApp, SharedStore};

#[derive(Parser)]
#[command(
    name = "jobboard_chat",
    version,
    about = "Applicant/recruiter chat for job applications"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Print the conversation of an application
    History(Conversation),
    /// Send a single message and exit
    Send {
        #[command(flatten)]
        conversation: Conversation,
        #[arg(long)]
        content: String,
    },
    /// Open an interactive chat session
    Open(Conversation),
}

#[derive(Args, Clone)]
struct Conversation {
    #[arg(long)]
    application: String,
    #[arg(long)]
    job_title: Option<String>,
    /// User id of the company's registered contact
    #[arg(long)]
    company_user_id: Option<String>,
    #[arg(long)]
    company_name: Option<String>,
    #[arg(long)]
    applicant_id: Option<String>,
    #[arg(long)]
    applicant_name: Option<String>,
}

impl Conversation {
    fn into_context(self) -> ConversationContext {
        ConversationContext {
            application_id: self.application,
            job_title: self.job_title,
            company: self.company_user_id.map(|user_id| CompanyContact {
                user_id,
                name: self.company_name,
            }),
            applicant: self.applicant_id.map(|id| ApplicantContact {
                id,
                fullname: self.applicant_name,
            }),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    // Khởi tạo Logger để debug
    env_logger::init();

    let cli = Cli::parse();
    let app_config = config::load_config_with_env(&cli.config);
    let Some(user) = app_config.user.clone() else {
        return Err("no signed-in user: set `user` in the config file or CHAT_USER_ID/CHAT_USER_ROLE".into());
    };

    match cli.mode {
        Mode::History(conversation) => run_history(&app_config, user, conversation).await,
        Mode::Send {
            conversation,
            content,
        } => run_send(&app_config, user, conversation, content).await,
        Mode::Open(conversation) => run_interactive(&app_config, user, conversation).await,
    }
}

fn build_synchronizer(
    app_config: &AppConfig,
    user: CurrentUser,
    event_sender: mpsc::Sender<jobboard_chat::ChatEvent>,
) -> Result<ChatSynchronizer, Box<dyn Error>> {
    let api = HttpChatApi::new(app_config)?;
    log::info!("Using chat backend at {}", app_config.api_base);
    Ok(ChatSynchronizer::new(
        Arc::new(api),
        SharedStore::new(),
        user,
        event_sender,
    ))
}

async fn run_history(
    app_config: &AppConfig,
    user: CurrentUser,
    conversation: Conversation,
) -> Result<(), Box<dyn Error>> {
    let (event_tx, _event_rx) = mpsc::channel(16);
    let sync = build_synchronizer(app_config, user, event_tx)?;
    let ctx = conversation.into_context();

    println!("{}", transcript::title(&ctx, sync.user()));
    sync.open_conversation(ctx).await?;
    let messages = sync.store().snapshot();
    println!("{}", transcript::render(&messages, &sync.user().id, &Local::now()));
    Ok(())
}

async fn run_send(
    app_config: &AppConfig,
    user: CurrentUser,
    conversation: Conversation,
    content: String,
) -> Result<(), Box<dyn Error>> {
    let (event_tx, _event_rx) = mpsc::channel(16);
    let sync = build_synchronizer(app_config, user, event_tx)?;
    let ctx = conversation.into_context();

    let message = sync.send_message(&ctx, &content).await?;
    println!("Message sent ({})", message.id);
    Ok(())
}

async fn run_interactive(
    app_config: &AppConfig,
    user: CurrentUser,
    conversation: Conversation,
) -> Result<(), Box<dyn Error>> {
    // 1. Tạo các kênh giao tiếp (Channels)
    // UI -> Worker
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // Worker -> UI
    let (event_tx, event_rx) = mpsc::channel(100);

    let sync = build_synchronizer(app_config, user.clone(), event_tx)?;
    let store = sync.store().clone();

    // 2. Khởi chạy chat worker (chạy ngầm)
    let worker = tokio::spawn(ChatClient::new(sync, cmd_rx).run());

    // 3. Chạy UI trên task chính
    let app = ChatApp::new(store, user, cmd_tx, event_rx);
    app.run(conversation.into_context()).await?;

    // `app` đã drop cmd_tx, worker sẽ dừng sau khi các request dang dở xong
    if let Err(err) = worker.await {
        log::error!("Chat worker terminated: {err}");
    }
    Ok(())
}
