use reqwest::StatusCode;
use thiserror::Error;

/// Lỗi ở tầng HTTP khi gọi backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend responded with status {0}")]
    Status(StatusCode),
    #[error("backend reported success=false")]
    Rejected,
    #[error("backend response is missing the `{0}` field")]
    MissingPayload(&'static str),
    #[error("invalid api base url: {0}")]
    InvalidBaseUrl(String),
}

/// Lỗi mà Synchronizer trả về cho caller.
///
/// Trạng thái Store và notification đã được xử lý trước khi lỗi được trả về,
/// caller chỉ cần log.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("failed to fetch messages: {0}")]
    FetchFailed(String),
    #[error("failed to send message: {0}")]
    SendFailed(String),
    #[error("{0} information not available")]
    MissingRecipient(&'static str),
    #[error("message content is empty")]
    EmptyContent,
}
