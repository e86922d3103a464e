//! Detection endpoints: device, player behavior, VPN.
//!
//! Each endpoint reads the policy, honors the per-check switch and the allow
//! list bypass, runs the pure check, and on a positive verdict records a ban
//! (when auto-ban is on) and fires the ban webhook.

use super::request::CloudScriptRequest;
use super::{CloudResponse, cloud_error};
use crate::error::ApiError;
use crate::http::AppState;
use crate::store::{BanRecord, UNKNOWN};
use crate::telemetry::{RequestTimer, spans};
use acwarden_rules::webhook::{detection_payload, device_payload};
use acwarden_rules::{Detection, Policy, Subject, check_player_behavior, check_vpn, classify};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{Instrument, debug, info};

/// Detection-specific response fields. All absent on a clean verdict.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_ban: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ban_duration_hours: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<String>,
}

impl Verdict {
    fn deny(policy: &Policy, reason: &str, player_id: &str) -> Self {
        Self {
            should_ban: Some(policy.auto_ban_enabled),
            ban_duration_hours: Some(policy.ban_duration_hours),
            reason: Some(reason.to_string()),
            ip_address: None,
            player_id: Some(player_id.to_string()),
        }
    }
}

type DetectionResponse = CloudResponse<Verdict>;

fn clean(message: impl Into<String>) -> DetectionResponse {
    CloudResponse::ok(message, Verdict::default())
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Log a clean verdict at `info` in debug mode, `debug` otherwise.
fn log_clean(policy: &Policy, message: &str) {
    if policy.debug_mode {
        info!("{}", message);
    } else {
        debug!("{}", message);
    }
}

/// Short-circuit shared by every check: disabled switch or allow-listed player.
async fn bypass(
    state: &AppState,
    policy: &Policy,
    enabled: bool,
    check: &str,
    player_id: &str,
) -> Option<DetectionResponse> {
    if !enabled {
        debug!("Check disabled by policy");
        return Some(clean(format!("{} detection disabled", check)));
    }
    if policy.enable_whitelist && state.store.is_allowed(player_id).await {
        log_clean(policy, "[WHITELISTED] Player on allowed list");
        return Some(clean("Player is on the allowed list"));
    }
    None
}

/// Record a ban when auto-ban is on.
async fn enforce(state: &AppState, policy: &Policy, record: BanRecord) {
    if !policy.auto_ban_enabled {
        info!(player_id = %record.player_id, "Auto-ban disabled, not recording ban");
        return;
    }
    state.store.record_ban(&record).await;
}

fn ban_record(req: &CloudScriptRequest, policy: &Policy, hardware_id: &str, reason: &str) -> BanRecord {
    BanRecord {
        player_id: req.player_id().to_string(),
        player_name: req.player_name().to_string(),
        hardware_id: hardware_id.to_string(),
        ip_address: req.ip_address().unwrap_or(UNKNOWN).to_string(),
        reason: reason.to_string(),
        ban_duration_hours: policy.ban_duration_hours,
        banned_at: Utc::now(),
        banned_by: None,
    }
}

/// POST /AntiCheat/DetectHeadset
pub async fn detect_headset(
    State(state): State<AppState>,
    body: Result<Json<CloudScriptRequest>, JsonRejection>,
) -> Response {
    let _timer = RequestTimer::new("detect_headset");
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return cloud_error(
                "detect_headset",
                StatusCode::OK,
                "Internal error during device check.",
                &ApiError::from(rejection),
            );
        }
    };
    let span = spans::detection("device", req.player_id());
    headset(&state, &req).instrument(span).await.into_response()
}

async fn headset(state: &AppState, req: &CloudScriptRequest) -> DetectionResponse {
    let policy = state.store.get().await;
    let player_id = req.player_id();

    if let Some(response) = bypass(state, &policy, policy.device_detection_enabled, "Device", player_id).await {
        return response;
    }

    let verdict = classify(&req.device_info(), player_id, &policy);
    crate::metrics::record_detection("device", !verdict.allowed);

    let payload = device_payload(&verdict, &now_rfc3339());
    let target = if verdict.allowed {
        policy.allowed_webhook()
    } else {
        policy.ban_webhook()
    };
    state.notifier.spawn(target, payload);

    if verdict.allowed {
        log_clean(&policy, &format!("[ALLOWED] {} logged from {}", player_id, verdict.profile.model));
        return clean("Access granted. Logged to allowed webhook.");
    }

    info!(reason = %verdict.reason, device_type = %verdict.device_type, "[BANNED] Device denied");
    let record = ban_record(req, &policy, &verdict.profile.hardware_id, &verdict.reason);
    enforce(state, &policy, record).await;

    CloudResponse::ok(
        format!("Banned for: {}", verdict.reason),
        Verdict::deny(&policy, &verdict.reason, player_id),
    )
}

/// POST /AntiCheat/DetectPlayer
pub async fn detect_player(
    State(state): State<AppState>,
    body: Result<Json<CloudScriptRequest>, JsonRejection>,
) -> Response {
    let _timer = RequestTimer::new("detect_player");
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return cloud_error(
                "detect_player",
                StatusCode::OK,
                "Internal error during player detection.",
                &ApiError::from(rejection),
            );
        }
    };
    let span = spans::detection("player", req.player_id());
    player(&state, &req).instrument(span).await.into_response()
}

async fn player(state: &AppState, req: &CloudScriptRequest) -> DetectionResponse {
    let policy = state.store.get().await;
    let player_id = req.player_id();

    if let Some(response) = bypass(state, &policy, policy.player_detection_enabled, "Player", player_id).await {
        return response;
    }

    let detection = check_player_behavior(&req.args.player_data);
    crate::metrics::record_detection("player", detection.detected);

    if !detection.detected {
        log_clean(&policy, &format!("[CLEAN] {} - No suspicious activity", player_id));
        return clean("Player check passed");
    }

    info!(reason = %detection.reason, "[DETECTED] Suspicious player");
    deny_detection(state, req, &policy, "🚫 Suspicious Player Detected", &detection).await;

    CloudResponse::ok(
        format!("Player detection: {}", detection.reason),
        Verdict::deny(&policy, &detection.reason, player_id),
    )
}

/// POST /AntiCheat/DetectVpn
pub async fn detect_vpn(
    State(state): State<AppState>,
    body: Result<Json<CloudScriptRequest>, JsonRejection>,
) -> Response {
    let _timer = RequestTimer::new("detect_vpn");
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return cloud_error(
                "detect_vpn",
                StatusCode::OK,
                "Internal error during VPN detection.",
                &ApiError::from(rejection),
            );
        }
    };
    let span = spans::detection("vpn", req.player_id());
    vpn(&state, &req).instrument(span).await.into_response()
}

async fn vpn(state: &AppState, req: &CloudScriptRequest) -> DetectionResponse {
    let policy = state.store.get().await;
    let player_id = req.player_id();
    // Echoed as recorded on the ban.
    let ip_address = req.ip_address().unwrap_or(UNKNOWN);

    if let Some(response) = bypass(state, &policy, policy.vpn_detection_enabled, "VPN", player_id).await {
        return response;
    }

    let detection = check_vpn(
        &req.args.network_data,
        &req.context.play_stream_event.location_info,
    );
    crate::metrics::record_detection("vpn", detection.detected);

    if !detection.detected {
        log_clean(&policy, &format!("[CLEAN IP] {} - {}", player_id, ip_address));
        return clean("No VPN/Proxy detected");
    }

    info!(reason = %detection.reason, ip = %ip_address, "[VPN DETECTED]");
    deny_detection(state, req, &policy, "🚫 VPN/Proxy Detected", &detection).await;

    let mut verdict = Verdict::deny(&policy, &detection.reason, player_id);
    verdict.ip_address = Some(ip_address.to_string());
    CloudResponse::ok(format!("VPN/Proxy detected: {}", detection.reason), verdict)
}

/// Ban and notify for a positive VPN or behavior check.
async fn deny_detection(
    state: &AppState,
    req: &CloudScriptRequest,
    policy: &Policy,
    title: &str,
    detection: &Detection,
) {
    let record = ban_record(req, policy, req.hwid(), &detection.reason);
    let subject = Subject {
        player_id: &record.player_id,
        player_name: &record.player_name,
        hardware_id: &record.hardware_id,
        ip_address: &record.ip_address,
    };
    let payload = detection_payload(title, &subject, detection, &now_rfc3339());
    state.notifier.spawn(policy.ban_webhook(), payload);

    enforce(state, policy, record).await;
}
