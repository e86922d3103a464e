//! HTTP handlers.
//!
//! Two response envelopes are in use:
//! - cloud-script endpoints (`/AntiCheat/*`) answer `{ResultCode, Message, ...}`;
//!   detection endpoints report failures as HTTP 200 with `ResultCode: 1`,
//!   config and listing endpoints through the HTTP status
//! - admin endpoints (`/api/*`) answer `{success, message, ...}`
//!
//! No handler error reaches the transport layer.

pub mod accounts;
pub mod config;
pub mod console;
pub mod detect;
pub mod request;

use crate::error::ApiError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use tracing::error;

/// Cloud-script success envelope around an endpoint-specific body.
#[derive(Debug, Serialize)]
pub struct CloudResponse<T: Serialize> {
    #[serde(rename = "ResultCode")]
    pub result_code: u8,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> CloudResponse<T> {
    pub fn ok(message: impl Into<String>, body: T) -> Self {
        Self {
            result_code: 0,
            message: message.into(),
            body,
        }
    }
}

impl<T: Serialize> IntoResponse for CloudResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Cloud-script failure envelope.
pub(crate) fn cloud_error(
    endpoint: &'static str,
    status: StatusCode,
    message: &str,
    err: &ApiError,
) -> Response {
    error!(endpoint = endpoint, code = err.error_code(), error = %err, "Request failed");
    crate::metrics::record_api_error(endpoint, err.error_code());
    (
        status,
        Json(json!({
            "ResultCode": 1,
            "Message": message,
            "error": err.to_string(),
        })),
    )
        .into_response()
}

/// Admin failure envelope.
pub(crate) fn admin_error(endpoint: &'static str, err: &ApiError) -> Response {
    let status = err.status();
    if status.is_server_error() {
        error!(endpoint = endpoint, code = err.error_code(), error = %err, "Request failed");
    } else {
        tracing::warn!(endpoint = endpoint, code = err.error_code(), error = %err, "Request rejected");
    }
    crate::metrics::record_api_error(endpoint, err.error_code());
    (
        status,
        Json(json!({
            "success": false,
            "message": err.to_string(),
        })),
    )
        .into_response()
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::WebhookConfig;
    use crate::http::AppState;
    use crate::notify::Notifier;
    use crate::store::{FileBackend, PolicyStore};
    use axum::response::Response;
    use serde_json::Value;
    use std::sync::Arc;

    /// App state over a file store in a fresh temp dir.
    pub fn state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        let state = AppState {
            store: PolicyStore::new(Arc::new(backend)),
            notifier: Notifier::new(&WebhookConfig::default()),
        };
        (state, dir)
    }

    /// Split a response into status and JSON body.
    pub async fn json(response: Response) -> (u16, Value) {
        let status = response.status().as_u16();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}
