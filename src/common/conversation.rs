use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Vai trò của người dùng đang đăng nhập.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Backend gọi vai trò này là `student`.
    #[serde(rename = "student", alias = "applicant")]
    Applicant,
    #[serde(rename = "recruiter")]
    Recruiter,
}

impl Role {
    /// Người nhận của một tin nhắn, theo vai trò người gửi.
    ///
    /// Applicant gửi cho contact đã đăng ký của công ty sở hữu job; recruiter
    /// gửi cho applicant.
    pub fn resolve_recipient(self, ctx: &ConversationContext) -> Result<Recipient, ChatError> {
        match self {
            Role::Applicant => ctx
                .company
                .as_ref()
                .filter(|company| !company.user_id.is_empty())
                .map(|company| Recipient {
                    id: company.user_id.clone(),
                    display_name: company.name.clone(),
                })
                .ok_or(ChatError::MissingRecipient("Company")),
            Role::Recruiter => ctx
                .applicant
                .as_ref()
                .filter(|applicant| !applicant.id.is_empty())
                .map(|applicant| Recipient {
                    id: applicant.id.clone(),
                    display_name: applicant.fullname.clone(),
                })
                .ok_or(ChatError::MissingRecipient("Applicant")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Applicant => f.write_str("student"),
            Role::Recruiter => f.write_str("recruiter"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "student" | "applicant" => Ok(Role::Applicant),
            "recruiter" => Ok(Role::Recruiter),
            other => Err(format!("unknown role `{other}`")),
        }
    }
}

/// Người dùng đang đăng nhập (phía gửi).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub fullname: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyContact {
    pub user_id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantContact {
    pub id: String,
    pub fullname: Option<String>,
}

/// Cuộc hội thoại gắn với một job application, giữa đúng hai bên.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub application_id: String,
    pub job_title: Option<String>,
    pub company: Option<CompanyContact>,
    pub applicant: Option<ApplicantContact>,
}

impl ConversationContext {
    pub fn new(application_id: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            job_title: None,
            company: None,
            applicant: None,
        }
    }

    /// Tên hiển thị của phía bên kia, dùng cho tiêu đề hội thoại.
    pub fn counterpart_name(&self, role: Role) -> Option<&str> {
        match role {
            Role::Applicant => self.company.as_ref()?.name.as_deref(),
            Role::Recruiter => self.applicant.as_ref()?.fullname.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub id: String,
    pub display_name: Option<String>,
}
