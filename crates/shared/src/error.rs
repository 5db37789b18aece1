use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Validation,
    RateLimited,
    Client,
    Server,
    Network,
    InvalidResponse,
}

impl ErrorCode {
    pub fn from_status(status_code: u16) -> Self {
        match status_code {
            404 => ErrorCode::NotFound,
            400 | 422 => ErrorCode::Validation,
            429 => ErrorCode::RateLimited,
            400..=499 => ErrorCode::Client,
            _ => ErrorCode::Server,
        }
    }
}

/// Failure of a single catalog request, as surfaced to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{status_code}: {message}")]
pub struct ApiError {
    pub status_code: u16,
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            code: ErrorCode::from_status(status_code),
            message: message.into(),
        }
    }

    pub fn with_code(status_code: u16, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status_code,
            code,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NotFound
    }
}

/// Error body shapes the catalog API is known to return.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        if let Some(message) = self.message.filter(|m| !m.trim().is_empty()) {
            return Some(message);
        }
        match self.detail {
            Some(serde_json::Value::String(detail)) if !detail.trim().is_empty() => Some(detail),
            _ => None,
        }
    }
}
