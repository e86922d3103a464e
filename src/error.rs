//! Unified error handling for acwarden handlers.
//!
//! Every handler failure is an [`ApiError`]. The response envelope it becomes
//! depends on the endpoint family (see [`crate::handlers`]); this module only
//! supplies the stable error code and HTTP status.

use crate::store::StoreError;
use acwarden_rules::PolicyError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use thiserror::Error;

/// Errors that can occur during request handling.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("{0} is required")]
    MissingArgument(&'static str),

    #[error("invalid {0}")]
    InvalidArgument(&'static str),

    #[error("Unknown command: {0}. Available: ban, kick, unban, allow, disallow, config")]
    UnknownCommand(String),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("failed to persist {0}")]
    PersistFailed(&'static str),
}

impl ApiError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidBody(_) => "invalid_body",
            Self::MissingArgument(_) => "missing_argument",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::UnknownCommand(_) => "unknown_command",
            Self::Policy(PolicyError::UnknownKey(_)) => "unknown_key",
            Self::Policy(PolicyError::InvalidValue { .. }) => "invalid_value",
            Self::Store(_) => "store_error",
            Self::PersistFailed(_) => "persist_failed",
        }
    }

    /// HTTP status for endpoints that report errors through the status line.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidBody(_)
            | Self::MissingArgument(_)
            | Self::InvalidArgument(_)
            | Self::UnknownCommand(_)
            | Self::Policy(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) | Self::PersistFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Policy(e) => Self::Policy(e),
            other => Self::Store(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}
