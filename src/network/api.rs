use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::{Client, Response, Url};
use serde::Deserialize;

use crate::common::{ChatMessage, SendMessageRequest};
use crate::config::AppConfig;
use crate::error::ApiError;

/// Hai endpoint REST mà chat cần từ backend.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn fetch_messages(&self, application_id: &str) -> Result<Vec<ChatMessage>, ApiError>;

    async fn send_message(&self, request: &SendMessageRequest) -> Result<ChatMessage, ApiError>;
}

#[derive(Debug, Deserialize)]
struct MessagesEnvelope {
    success: bool,
    #[serde(default)]
    messages: Option<Vec<ChatMessage>>,
}

#[derive(Debug, Deserialize)]
struct MessageEnvelope {
    success: bool,
    #[serde(default)]
    message: Option<ChatMessage>,
}

/// Client reqwest cho `GET /chat/{applicationId}` và `POST /chat/send`.
pub struct HttpChatApi {
    client: Client,
    base: Url,
}

impl HttpChatApi {
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let base = parse_base(&config.api_base)?;

        // Session cookie giống `withCredentials: true` phía trình duyệt
        let jar = Arc::new(Jar::default());
        if let Some(cookie) = config.session_cookie.as_deref() {
            jar.add_cookie_str(cookie, &base);
        }

        let client = Client::builder()
            .cookie_provider(jar)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { client, base })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn parse_base(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw).map_err(|err| ApiError::InvalidBaseUrl(format!("{raw}: {err}")))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(url)
}

fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status(status))
    }
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn fetch_messages(&self, application_id: &str) -> Result<Vec<ChatMessage>, ApiError> {
        let url = self.endpoint(&["chat", application_id])?;
        log::debug!("GET {url}");

        let response = ensure_success(self.client.get(url).send().await?)?;
        let envelope: MessagesEnvelope = response.json().await?;
        if !envelope.success {
            return Err(ApiError::Rejected);
        }
        // Thiếu `messages` nghĩa là chưa có tin nhắn nào
        Ok(envelope.messages.unwrap_or_default())
    }

    async fn send_message(&self, request: &SendMessageRequest) -> Result<ChatMessage, ApiError> {
        let url = self.endpoint(&["chat", "send"])?;
        log::debug!("POST {url} (application {})", request.application_id);

        let response = ensure_success(self.client.post(url).json(request).send().await?)?;
        let envelope: MessageEnvelope = response.json().await?;
        if !envelope.success {
            return Err(ApiError::Rejected);
        }
        envelope.message.ok_or(ApiError::MissingPayload("message"))
    }
}
