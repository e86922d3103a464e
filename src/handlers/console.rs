//! Operator console: `POST /api/console/command`.

use super::admin_error;
use crate::error::ApiError;
use crate::http::AppState;
use crate::store::{AllowRecord, BanRecord, UNKNOWN, whole_hours};
use crate::telemetry::{RequestTimer, spans};
use acwarden_rules::lenient;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{Instrument, error, info};

const BANNED_BY: &str = "Console";
const KICKED_BY: &str = "Console (Kick)";
const DEFAULT_BAN_REASON: &str = "Manual ban from console";
const DEFAULT_KICK_REASON: &str = "Kicked from console";

#[derive(Debug, Default, Deserialize)]
pub struct ConsoleRequest {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub command: Option<String>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub args: ConsoleArgs,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleArgs {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub player_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub player_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub reason: Option<String>,
    /// Hours, as a number or numeric string.
    #[serde(default)]
    pub duration: Option<Value>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub hwid: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub ip: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Value,
}

impl ConsoleArgs {
    fn player_id(&self) -> Result<&str, ApiError> {
        self.player_id
            .as_deref()
            .ok_or(ApiError::MissingArgument("playerId"))
    }

    fn player_name(&self) -> &str {
        self.player_name.as_deref().unwrap_or(UNKNOWN)
    }

    /// Requested duration in whole hours, or `default` when absent.
    fn duration(&self, default: i64) -> Result<i64, ApiError> {
        match &self.duration {
            None | Some(Value::Null) => Ok(default),
            Some(raw) => match whole_hours(raw) {
                Some(hours) if hours >= 0 => Ok(hours),
                _ => Err(ApiError::InvalidArgument("duration")),
            },
        }
    }

    fn ban_record(&self, player_id: &str, reason: &str, hours: i64, by: &str) -> BanRecord {
        BanRecord {
            player_id: player_id.to_string(),
            player_name: self.player_name().to_string(),
            hardware_id: self.hwid.as_deref().unwrap_or(UNKNOWN).to_string(),
            ip_address: self.ip.as_deref().unwrap_or(UNKNOWN).to_string(),
            reason: reason.to_string(),
            ban_duration_hours: hours,
            banned_at: Utc::now(),
            banned_by: Some(by.to_string()),
        }
    }
}

/// A console sub-command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ban,
    Kick,
    Unban,
    Allow,
    Disallow,
    Config,
}

impl Command {
    /// Parse a command name. Surrounding whitespace and case are ignored.
    pub fn parse(name: &str) -> Result<Self, ApiError> {
        let name = name.trim().to_lowercase();
        match name.as_str() {
            "ban" => Ok(Command::Ban),
            "kick" => Ok(Command::Kick),
            "unban" => Ok(Command::Unban),
            "allow" => Ok(Command::Allow),
            "disallow" => Ok(Command::Disallow),
            "config" => Ok(Command::Config),
            _ => Err(ApiError::UnknownCommand(name)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::Ban => "ban",
            Command::Kick => "kick",
            Command::Unban => "unban",
            Command::Allow => "allow",
            Command::Disallow => "disallow",
            Command::Config => "config",
        }
    }
}

/// POST /api/console/command
pub async fn console_command(
    State(state): State<AppState>,
    body: Result<Json<ConsoleRequest>, JsonRejection>,
) -> Response {
    let _timer = RequestTimer::new("console");
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return console_error(&ApiError::from(rejection)),
    };
    let command = match Command::parse(req.command.as_deref().unwrap_or_default()) {
        Ok(command) => command,
        Err(e) => return console_error(&e),
    };

    let span = spans::console(command.name());
    async move {
        crate::metrics::record_console_command(command.name());
        match execute(&state, command, &req.args).await {
            Ok(body) => Json(body).into_response(),
            Err(e) => console_error(&e),
        }
    }
    .instrument(span)
    .await
}

/// Server-side failures carry the `Error executing command` prefix.
fn console_error(err: &ApiError) -> Response {
    if err.status() != StatusCode::INTERNAL_SERVER_ERROR {
        return admin_error("console", err);
    }
    error!(code = err.error_code(), error = %err, "Console command failed");
    crate::metrics::record_api_error("console", err.error_code());
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "message": format!("Error executing command: {}", err),
        })),
    )
        .into_response()
}

async fn execute(state: &AppState, command: Command, args: &ConsoleArgs) -> Result<Value, ApiError> {
    match command {
        Command::Ban => {
            let player_id = args.player_id()?;
            let policy = state.store.get().await;
            let hours = args.duration(policy.ban_duration_hours)?;
            let reason = args.reason.as_deref().unwrap_or(DEFAULT_BAN_REASON);
            if !state
                .store
                .record_ban(&args.ban_record(player_id, reason, hours, BANNED_BY))
                .await
            {
                return Err(ApiError::PersistFailed("ban"));
            }
            info!(player_id = %player_id, reason = %reason, hours = hours, "[CONSOLE BAN]");
            Ok(json!({
                "success": true,
                "message": format!("Player {} banned for {} hours", player_id, hours),
                "playerId": player_id,
                "duration": hours,
            }))
        }
        Command::Kick => {
            let player_id = args.player_id()?;
            let policy = state.store.get().await;
            let reason = args.reason.as_deref().unwrap_or(DEFAULT_KICK_REASON);
            let record = args.ban_record(player_id, reason, policy.kick_duration_hours, KICKED_BY);
            if !state.store.record_ban(&record).await {
                return Err(ApiError::PersistFailed("kick"));
            }
            info!(player_id = %player_id, reason = %reason, "[CONSOLE KICK]");
            Ok(json!({
                "success": true,
                "message": format!("Player {} kicked", player_id),
                "playerId": player_id,
            }))
        }
        Command::Unban => {
            let player_id = args.player_id()?;
            let removed = state.store.remove_ban(player_id).await;
            info!(player_id = %player_id, removed = removed, "[CONSOLE UNBAN]");
            Ok(json!({
                "success": true,
                "message": format!("Player {} unbanned", player_id),
                "playerId": player_id,
            }))
        }
        Command::Allow => {
            let player_id = args.player_id()?;
            let record = AllowRecord {
                player_id: player_id.to_string(),
                player_name: args.player_name().to_string(),
                added_at: Utc::now(),
                added_by: BANNED_BY.to_string(),
            };
            if !state.store.add_allowed(&record).await {
                return Err(ApiError::PersistFailed("allow-list entry"));
            }
            info!(player_id = %player_id, "[CONSOLE ALLOW]");
            Ok(json!({
                "success": true,
                "message": format!("Player {} added to allowed list", player_id),
                "playerId": player_id,
            }))
        }
        Command::Disallow => {
            let player_id = args.player_id()?;
            let removed = state.store.remove_allowed(player_id).await;
            info!(player_id = %player_id, removed = removed, "[CONSOLE DISALLOW]");
            Ok(json!({
                "success": true,
                "message": format!("Player {} removed from allowed list", player_id),
                "playerId": player_id,
            }))
        }
        Command::Config => {
            let key = args.key.as_deref().ok_or(ApiError::MissingArgument("key"))?;
            let (_, value) = state.store.set(key, &args.value).await?;
            info!(key = %key, value = %value, "[CONSOLE CONFIG]");
            Ok(json!({
                "success": true,
                "message": format!("Config {} updated to {}", key, value),
                "key": key,
                "value": value,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{json, state};
    use serde_json::json;

    fn command(value: Value) -> Result<Json<ConsoleRequest>, JsonRejection> {
        Ok(Json(serde_json::from_value(value).unwrap()))
    }

    async fn run(state: &AppState, value: Value) -> (u16, Value) {
        json(console_command(State(state.clone()), command(value)).await).await
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse("  BaN ").unwrap(), Command::Ban);
        assert_eq!(Command::parse("disallow").unwrap(), Command::Disallow);
        assert!(matches!(
            Command::parse("Explode"),
            Err(ApiError::UnknownCommand(name)) if name == "explode"
        ));
    }

    #[tokio::test]
    async fn test_ban_uses_policy_duration_and_overwrites() {
        let (state, _dir) = state();
        let (status, value) = run(&state, json!({"command": "ban", "args": {"playerId": "PLAYER0001"}})).await;
        assert_eq!(status, 200);
        assert_eq!(
            value,
            json!({
                "success": true,
                "message": "Player PLAYER0001 banned for 336 hours",
                "playerId": "PLAYER0001",
                "duration": 336
            })
        );

        let (_, value) = run(
            &state,
            json!({"command": "ban", "args": {"playerId": "PLAYER0001", "duration": "12", "reason": "Aimbot", "hwid": "HW1"}}),
        )
        .await;
        assert_eq!(value["duration"], 12);

        let (_, value) = run(
            &state,
            json!({"command": "ban", "args": {"playerId": "PLAYER0001", "duration": 24.0, "reason": "Aimbot", "hwid": "HW1"}}),
        )
        .await;
        assert_eq!(value["duration"], 24);

        let (_, value) = run(
            &state,
            json!({"command": "ban", "args": {"playerId": "PLAYER0001", "duration": "12", "reason": "Aimbot", "hwid": "HW1"}}),
        )
        .await;
        assert_eq!(value["duration"], 12);

        let bans = state.store.list_bans().await;
        assert_eq!(bans.len(), 1);
        assert_eq!(bans[0].reason, "Aimbot");
        assert_eq!(bans[0].hardware_id, "HW1");
        assert_eq!(bans[0].ban_duration_hours, 12);
        assert_eq!(bans[0].banned_by.as_deref(), Some("Console"));
    }

    #[tokio::test]
    async fn test_kick_records_zero_hour_ban() {
        let (state, _dir) = state();
        let (status, value) = run(&state, json!({"command": "kick", "args": {"playerId": "PLAYER0002"}})).await;
        assert_eq!(status, 200);
        assert_eq!(value["message"], "Player PLAYER0002 kicked");

        let bans = state.store.list_bans().await;
        assert_eq!(bans[0].ban_duration_hours, 0);
        assert_eq!(bans[0].reason, "Kicked from console");
        assert_eq!(bans[0].banned_by.as_deref(), Some("Console (Kick)"));
        assert_eq!(bans[0].listing().ban_duration, "0s");
    }

    #[tokio::test]
    async fn test_unban_and_allow_cycle() {
        let (state, _dir) = state();
        run(&state, json!({"command": "ban", "args": {"playerId": "PLAYER0003"}})).await;
        let (_, value) = run(&state, json!({"command": "unban", "args": {"playerId": "PLAYER0003"}})).await;
        assert_eq!(value["message"], "Player PLAYER0003 unbanned");
        assert!(state.store.list_bans().await.is_empty());

        let (_, value) = run(
            &state,
            json!({"command": "allow", "args": {"playerId": "PLAYER0003", "playerName": "Alice"}}),
        )
        .await;
        assert_eq!(value["message"], "Player PLAYER0003 added to allowed list");
        assert!(state.store.is_allowed("PLAYER0003").await);
        assert_eq!(state.store.list_allowed().await[0].player_name, "Alice");

        // Allowing twice keeps one entry.
        run(&state, json!({"command": "allow", "args": {"playerId": "PLAYER0003"}})).await;
        assert_eq!(state.store.list_allowed().await.len(), 1);

        let (_, value) = run(&state, json!({"command": "disallow", "args": {"playerId": "PLAYER0003"}})).await;
        assert_eq!(value["message"], "Player PLAYER0003 removed from allowed list");
        assert!(!state.store.is_allowed("PLAYER0003").await);
    }

    #[tokio::test]
    async fn test_config_command_coerces() {
        let (state, _dir) = state();
        let (status, value) = run(
            &state,
            json!({"command": "config", "args": {"key": "ALLOWED_DEVICES", "value": "quest3, pico4"}}),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(value["message"], "Config ALLOWED_DEVICES updated to quest3, pico4");
        assert_eq!(value["value"], json!(["quest3", "pico4"]));

        let (_, value) = run(
            &state,
            json!({"command": "config", "args": {"key": "AUTO_BAN_ENABLED", "value": "yes"}}),
        )
        .await;
        assert_eq!(value["value"], true);
        assert_eq!(state.store.get().await.allowed_devices, vec!["quest3", "pico4"]);
    }

    #[tokio::test]
    async fn test_client_errors() {
        let (state, _dir) = state();
        let cases = [
            (json!({"command": "ban", "args": {}}), "playerId is required"),
            (json!({"command": "config", "args": {"value": 1}}), "key is required"),
            (
                json!({"command": "config", "args": {"key": "NOPE", "value": 1}}),
                "Unknown config key: NOPE",
            ),
            (
                json!({"command": "config", "args": {"key": "BAN_DURATION_HOURS", "value": "long"}}),
                "Invalid value for BAN_DURATION_HOURS: expected integer",
            ),
            (
                json!({"command": "ban", "args": {"playerId": "PLAYER0004", "duration": "forever"}}),
                "invalid duration",
            ),
            (
                json!({"command": "ban", "args": {"playerId": "PLAYER0004", "duration": 0.5}}),
                "invalid duration",
            ),
            (
                json!({"command": "ban", "args": {"playerId": "PLAYER0004", "duration": -3}}),
                "invalid duration",
            ),
            (
                json!({"command": "teleport"}),
                "Unknown command: teleport. Available: ban, kick, unban, allow, disallow, config",
            ),
        ];

        for (body, message) in cases {
            let (status, value) = run(&state, body).await;
            assert_eq!(status, 400, "{}", message);
            assert_eq!(value, json!({"success": false, "message": message}));
        }
        assert!(state.store.list_bans().await.is_empty());
    }
}
