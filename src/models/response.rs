//! Response envelope shared by the HTTP API and the CLI.

use serde::{Deserialize, Serialize};

use super::result::AnalysisResult;

/// Caller-facing status vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusType {
    Success,
    Error,
    ErrorUnknown,
}

impl StatusType {
    pub fn code(&self) -> u32 {
        match self {
            Self::Success => 0,
            Self::Error => 1,
            Self::ErrorUnknown => 999,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Error => "Error",
            Self::ErrorUnknown => "Unknown error",
        }
    }

    /// `"ok"` for success, `"error"` otherwise.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "ok",
            Self::Error | Self::ErrorUnknown => "error",
        }
    }
}

/// `{status, code, message, data}` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub status: String,
    pub code: u32,
    pub message: String,
    pub data: Option<AnalysisResult>,
}

impl AnalysisResponse {
    pub fn success(data: AnalysisResult) -> Self {
        Self {
            status: StatusType::Success.as_str().to_string(),
            code: StatusType::Success.code(),
            message: "analyzed successfully".to_string(),
            data: Some(data),
        }
    }

    pub fn from_status(status: StatusType) -> Self {
        Self::with_message(status, status.default_message())
    }

    pub fn with_message(status: StatusType, message: impl Into<String>) -> Self {
        Self {
            status: status.as_str().to_string(),
            code: status.code(),
            message: message.into(),
            data: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == StatusType::Success.code()
    }
}
