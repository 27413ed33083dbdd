use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity of a [`RemoteError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorSeverity {
    Recoverable,
    Critical,
}

/// Broad classification of a [`RemoteError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Network,
    Media,
    Drm,
    Player,
    Other,
}

/// Structured error value exchanged with remote sessions.
///
/// This is a wire type, not a Rust error: it is what travels inside
/// `asyncComplete.error` and inside relayed `error` events. Engine-side
/// failures are converted into this shape before leaving the receiver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteError {
    pub severity: ErrorSeverity,
    pub category: ErrorCategory,
    pub code: u32,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub auxiliary_data: Value,
}

impl RemoteError {
    pub fn new(severity: ErrorSeverity, category: ErrorCategory, code: u32) -> Self {
        Self {
            severity,
            category,
            code,
            auxiliary_data: Value::Null,
        }
    }

    pub fn with_auxiliary_data(mut self, data: Value) -> Self {
        self.auxiliary_data = data;
        self
    }
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "remote error {:?}/{:?} code {}",
            self.severity, self.category, self.code
        )
    }
}
