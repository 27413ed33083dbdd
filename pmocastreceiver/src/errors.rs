use thiserror::Error;

use pmocastproto::{ErrorCategory, ErrorSeverity, RemoteError};

/// Failure of a local player or media-element operation.
#[derive(Error, Debug, Clone)]
pub enum PlayerError {
    #[error("Load failed for '{uri}': {detail}")]
    LoadFailed { uri: String, detail: String },
    #[error("No content is loaded")]
    NoContent,
    #[error("Operation '{0}' failed: {1}")]
    OperationFailed(String, String),
}

impl PlayerError {
    /// Numeric code carried on the wire for this error.
    pub fn code(&self) -> u32 {
        match self {
            PlayerError::LoadFailed { .. } => 1001,
            PlayerError::NoContent => 1002,
            PlayerError::OperationFailed(..) => 1003,
        }
    }
}

impl From<PlayerError> for RemoteError {
    fn from(err: PlayerError) -> Self {
        let category = match err {
            PlayerError::LoadFailed { .. } => ErrorCategory::Media,
            _ => ErrorCategory::Player,
        };
        RemoteError::new(ErrorSeverity::Recoverable, category, err.code())
            .with_auxiliary_data(serde_json::json!({ "message": err.to_string() }))
    }
}

/// Rejection of an inbound RPC message before it reaches the player.
///
/// Dispatch resolves names against the capability tables; anything
/// outside them is unsupported, never reflected over.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Unknown target '{0}'")]
    UnknownTarget(String),
    #[error("'{0}' is not a dispatchable method on {1}")]
    UnsupportedMethod(String, &'static str),
    #[error("'{0}' is not a settable property on {1}")]
    UnsupportedProperty(String, &'static str),
    #[error("Bad arguments for '{0}': {1}")]
    BadArguments(String, String),
    #[error("Malformed message: {0}")]
    Malformed(String),
}

/// Failure of the transport collaborator while sending.
///
/// Sends are never retried by the bridge; the error is logged and the
/// transport owns any recovery.
#[derive(Error, Debug)]
#[error("Bus send failed: {0}")]
pub struct BusError(pub String);
