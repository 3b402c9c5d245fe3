//! Uniform error value for every backend-facing call.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used by every fetcher and REST call.
pub type ApiResult<T> = Result<T, ApiError>;

/// Normalised failure of a backend call.
///
/// Transport failures, error-tagged bodies and unexpected statuses all end up
/// here. Callers that only need the user-facing text use [`ApiError::message`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response (connection refused, timeout...).
    #[error("{0}")]
    Transport(String),

    /// The backend answered with an error-tagged body or a non-success status.
    #[error("{message}")]
    Backend { status: u16, message: String },

    /// The backend answered but the body could not be decoded.
    #[error("{0}")]
    Decode(String),
}

impl ApiError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn backend(status: u16, msg: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: msg.into(),
        }
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// User-facing message, identical to the `Display` output.
    pub fn message(&self) -> &str {
        match self {
            Self::Transport(msg) | Self::Decode(msg) => msg,
            Self::Backend { message, .. } => message,
        }
    }

    /// HTTP status when the backend produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Tagged `{error: true, message}` shape shared with the backend.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: true,
            message: self.message().to_string(),
            validation: Vec::new(),
        }
    }
}

/// Error-tagged body as emitted by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<ValidationError>,
}

impl ErrorBody {
    /// Message with field validation details appended, if any.
    pub fn describe(&self) -> String {
        if self.validation.is_empty() {
            return self.message.clone();
        }

        let details = self
            .validation
            .iter()
            .map(|v| format!("{} ({})", v.field, v.tag))
            .collect::<Vec<_>>()
            .join(", ");

        format!("{}: {details}", self.message)
    }

    /// Converts the body into an [`ApiError`] for the status it arrived with.
    pub fn into_error(self, status: u16) -> ApiError {
        ApiError::backend(status, self.describe())
    }
}

/// One failed field rule reported by the backend validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    #[serde(rename = "FailedField", alias = "field")]
    pub field: String,
    #[serde(rename = "Tag", alias = "tag")]
    pub tag: String,
    #[serde(rename = "Value", alias = "value", default)]
    pub value: String,
}
