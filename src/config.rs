use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::{CurrentUser, Role};

pub const DEFAULT_CONFIG_PATH: &str = "config/chat.json";
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api/v1/application";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Prefix của application API, ví dụ `http://host/api/v1/application`
    pub api_base: String,
    /// Cookie phiên đăng nhập, dạng `token=...`
    pub session_cookie: Option<String>,
    pub request_timeout_secs: u64,
    /// Người dùng đang đăng nhập
    pub user: Option<CurrentUser>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            session_cookie: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            user: None,
        }
    }
}

impl AppConfig {
    /// Ghi đè các giá trị từ biến môi trường (`CHAT_*`).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_base) = lookup("CHAT_API_BASE") {
            self.api_base = api_base;
        }
        if let Some(cookie) = lookup("CHAT_SESSION_COOKIE") {
            self.session_cookie = Some(cookie);
        }
        if let Some(timeout) = lookup("CHAT_REQUEST_TIMEOUT_SECS") {
            match timeout.trim().parse() {
                Ok(secs) => self.request_timeout_secs = secs,
                Err(err) => log::warn!("Ignoring CHAT_REQUEST_TIMEOUT_SECS `{timeout}`: {err}"),
            }
        }

        let id = lookup("CHAT_USER_ID");
        let fullname = lookup("CHAT_USER_NAME");
        let role = lookup("CHAT_USER_ROLE").and_then(|raw| match raw.parse::<Role>() {
            Ok(role) => Some(role),
            Err(err) => {
                log::warn!("Ignoring CHAT_USER_ROLE: {err}");
                None
            }
        });

        match self.user.as_mut() {
            Some(user) => {
                if let Some(id) = id {
                    user.id = id;
                }
                if let Some(fullname) = fullname {
                    user.fullname = fullname;
                }
                if let Some(role) = role {
                    user.role = role;
                }
            }
            None => {
                // Chỉ tạo user mới khi env có đủ id và role
                if let (Some(id), Some(role)) = (id, role) {
                    self.user = Some(CurrentUser {
                        id,
                        fullname: fullname.unwrap_or_default(),
                        role,
                    });
                }
            }
        }
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}

/// File config rồi tới biến môi trường.
pub fn load_config_with_env(path: &str) -> AppConfig {
    let mut config = load_config(path);
    config.apply_env_overrides(|key| std::env::var(key).ok());
    config
}
