//! Policy read and update endpoints.

use super::request::CloudScriptRequest;
use super::{CloudResponse, admin_error, cloud_error};
use crate::error::ApiError;
use crate::http::AppState;
use crate::telemetry::{RequestTimer, spans};
use acwarden_rules::{Policy, PolicySummary};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::Instrument;

#[derive(Debug, Serialize)]
pub struct FullConfig {
    pub config: Policy,
}

#[derive(Debug, Serialize)]
pub struct SummaryConfig {
    pub config: PolicySummary,
}

/// GET /AntiCheat/Config
pub async fn get_config(State(state): State<AppState>) -> Response {
    let _timer = RequestTimer::new("get_config");
    let policy = state
        .store
        .get()
        .instrument(spans::config("get_config"))
        .await;
    CloudResponse::ok("Config retrieved successfully", FullConfig { config: policy }).into_response()
}

/// POST /AntiCheat/Config
///
/// With `args.updateConfig` present, applies `args.config` and answers the
/// full policy. Otherwise answers the cloud-script summary.
pub async fn post_config(
    State(state): State<AppState>,
    body: Result<Json<CloudScriptRequest>, JsonRejection>,
) -> Response {
    let _timer = RequestTimer::new("post_config");
    async move {
        let req = match body {
            Ok(Json(req)) => req,
            Err(rejection) => {
                let err = ApiError::from(rejection);
                return cloud_error("post_config", err.status(), "Internal error retrieving config.", &err);
            }
        };

        if !req.args.update_config {
            let policy = state.store.get().await;
            return CloudResponse::ok(
                "Config retrieved successfully",
                SummaryConfig {
                    config: policy.summary(),
                },
            )
            .into_response();
        }

        match state.store.update(&req.args.config).await {
            Ok(policy) => {
                CloudResponse::ok("Config updated successfully", FullConfig { config: policy }).into_response()
            }
            Err(e) => {
                let err = ApiError::from(e);
                cloud_error("post_config", err.status(), "Internal error updating config.", &err)
            }
        }
    }
    .instrument(spans::config("post_config"))
    .await
}

/// POST /api/config/update
pub async fn update_config(
    State(state): State<AppState>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Response {
    let _timer = RequestTimer::new("update_config");
    async move {
        let partial = match body {
            Ok(Json(partial)) => partial,
            Err(rejection) => return admin_error("update_config", &ApiError::from(rejection)),
        };

        match state.store.update(&partial).await {
            Ok(policy) => Json(json!({
                "success": true,
                "message": "Configuration updated successfully",
                "config": policy,
            }))
            .into_response(),
            Err(e) => admin_error("update_config", &ApiError::from(e)),
        }
    }
    .instrument(spans::config("update_config"))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{json, state};
    use serde_json::json;

    fn cloud(value: Value) -> Result<Json<CloudScriptRequest>, JsonRejection> {
        Ok(Json(serde_json::from_value(value).unwrap()))
    }

    #[tokio::test]
    async fn test_get_returns_full_policy() {
        let (state, _dir) = state();
        let (status, value) = json(get_config(State(state)).await).await;
        assert_eq!(status, 200);
        assert_eq!(value["ResultCode"], 0);
        assert_eq!(value["Message"], "Config retrieved successfully");
        assert_eq!(value["config"]["BAN_DURATION_HOURS"], 336);
        assert_eq!(value["config"]["ALLOWED_DEVICES"], json!(["quest2", "oculus quest"]));
        assert_eq!(value["config"]["ENABLE_BLACKLIST"], true);
    }

    #[tokio::test]
    async fn test_post_without_update_returns_summary() {
        let (state, _dir) = state();
        let (_, value) = json(post_config(State(state), cloud(json!({"args": {}}))).await).await;
        assert_eq!(
            value["config"],
            json!({
                "DEBUG_MODE": true,
                "BAN_DURATION_HOURS": 336,
                "ALLOWED_DEVICES": ["quest2", "oculus quest"],
                "webhooks": {"ban": false, "allowed": false}
            })
        );
    }

    #[tokio::test]
    async fn test_post_with_update_applies_and_ignores_unknown_keys() {
        let (state, _dir) = state();
        let response = post_config(
            State(state.clone()),
            cloud(json!({
                "args": {
                    "updateConfig": true,
                    "config": {"BAN_DURATION_HOURS": "48", "NOT_A_KEY": 1, "BAN_WEBHOOK_URL": "https://hooks.test/ban"}
                }
            })),
        )
        .await;
        let (status, value) = json(response).await;
        assert_eq!(status, 200);
        assert_eq!(value["Message"], "Config updated successfully");
        assert_eq!(value["config"]["BAN_DURATION_HOURS"], 48);
        assert!(value["config"].get("NOT_A_KEY").is_none());

        let policy = state.store.get().await;
        assert_eq!(policy.ban_duration_hours, 48);
        assert!(policy.summary().webhooks.ban);
    }

    #[tokio::test]
    async fn test_post_with_invalid_value_is_rejected() {
        let (state, _dir) = state();
        let response = post_config(
            State(state.clone()),
            cloud(json!({"args": {"updateConfig": 1, "config": {"BAN_DURATION_HOURS": "soon"}}})),
        )
        .await;
        let (status, value) = json(response).await;
        assert_eq!(status, 400);
        assert_eq!(value["ResultCode"], 1);
        assert_eq!(state.store.get().await.ban_duration_hours, 336);
    }

    #[tokio::test]
    async fn test_admin_update() {
        let (state, _dir) = state();
        let partial = json!({"DEBUG_MODE": "off", "ALLOWED_DEVICES": "quest3, pico"});
        let response = update_config(
            State(state.clone()),
            Ok(Json(partial.as_object().unwrap().clone())),
        )
        .await;
        let (status, value) = json(response).await;
        assert_eq!(status, 200);
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "Configuration updated successfully");
        assert_eq!(value["config"]["DEBUG_MODE"], false);
        assert_eq!(value["config"]["ALLOWED_DEVICES"], json!(["quest3", "pico"]));
    }
}
