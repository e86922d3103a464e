//! Typed request bodies.
//!
//! Cloud-script callers send `{args, context}` with loosely typed fields.
//! Every field is optional; shape mismatches on nested objects fall back to
//! their defaults instead of failing the request.

use crate::store::UNKNOWN;
use acwarden_rules::lenient;
use acwarden_rules::{DeviceFingerprint, LocationInfo, NetworkData, PlayerData, UNKNOWN_PLAYER};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Body of every `/AntiCheat/*` POST.
#[derive(Debug, Default, Deserialize)]
pub struct CloudScriptRequest {
    #[serde(default, deserialize_with = "lenient::object")]
    pub args: Args,
    #[serde(default, deserialize_with = "lenient::object")]
    pub context: Context,
}

/// Caller-supplied arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Args {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub player_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub player_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub hwid: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub ip_address: Option<String>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub device_info: Option<DeviceFingerprint>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub network_data: NetworkData,
    #[serde(default, deserialize_with = "lenient::object")]
    pub player_data: PlayerData,
    /// Set whenever `updateConfig` is present, whatever its value.
    #[serde(default, deserialize_with = "lenient::present")]
    pub update_config: bool,
    #[serde(default, deserialize_with = "lenient::object")]
    pub config: Map<String, Value>,
}

/// Platform-supplied execution context.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub current_player_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub play_stream_event: PlayStreamEvent,
}

/// The triggering PlayStream event.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlayStreamEvent {
    #[serde(default, deserialize_with = "lenient::object")]
    pub device_info: Option<DeviceFingerprint>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub location_info: LocationInfo,
}

impl CloudScriptRequest {
    /// `args.playerId`, else `context.currentPlayerId`, else the placeholder.
    pub fn player_id(&self) -> &str {
        self.args
            .player_id
            .as_deref()
            .or(self.context.current_player_id.as_deref())
            .unwrap_or(UNKNOWN_PLAYER)
    }

    pub fn player_name(&self) -> &str {
        self.args.player_name.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn hwid(&self) -> &str {
        self.args.hwid.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn ip_address(&self) -> Option<&str> {
        self.args.ip_address.as_deref()
    }

    /// Event device info, else `args.deviceInfo`, else an empty fingerprint.
    pub fn device_info(&self) -> DeviceFingerprint {
        self.context
            .play_stream_event
            .device_info
            .clone()
            .or_else(|| self.args.device_info.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_player_id_resolution() {
        let req: CloudScriptRequest = serde_json::from_value(json!({
            "args": {"playerId": ""},
            "context": {"currentPlayerId": "CTX123456"}
        }))
        .unwrap();
        assert_eq!(req.player_id(), "CTX123456");

        let req: CloudScriptRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(req.player_id(), UNKNOWN_PLAYER);
        assert_eq!(req.player_name(), "Unknown");
    }

    #[test]
    fn test_device_info_prefers_event() {
        let req: CloudScriptRequest = serde_json::from_value(json!({
            "args": {"deviceInfo": {"DeviceModel": "Pixel"}},
            "context": {"playStreamEvent": {"DeviceInfo": {"DeviceModel": "Quest2"}}}
        }))
        .unwrap();
        assert_eq!(req.device_info().device_model.as_deref(), Some("Quest2"));

        let req: CloudScriptRequest = serde_json::from_value(json!({
            "args": {"deviceInfo": {"DeviceModel": "Pixel"}},
            "context": {"playStreamEvent": {"DeviceInfo": "garbage"}}
        }))
        .unwrap();
        assert_eq!(req.device_info().device_model.as_deref(), Some("Pixel"));
    }

    #[test]
    fn test_null_sections_default() {
        let req: CloudScriptRequest =
            serde_json::from_value(json!({"args": null, "context": null})).unwrap();
        assert!(!req.args.update_config);
        assert!(req.args.config.is_empty());
        assert!(!req.args.network_data.is_vpn);
    }

    #[test]
    fn test_update_config_presence() {
        let req: CloudScriptRequest = serde_json::from_value(json!({
            "args": {"updateConfig": false, "config": {"DEBUG_MODE": false}}
        }))
        .unwrap();
        assert!(req.args.update_config);
        assert_eq!(req.args.config["DEBUG_MODE"], json!(false));
    }

    #[test]
    fn test_location_and_network_flags() {
        let req: CloudScriptRequest = serde_json::from_value(json!({
            "args": {"networkData": {"isProxy": true}, "ipAddress": "10.1.1.1"},
            "context": {"playStreamEvent": {"LocationInfo": {"isVpn": 1}}}
        }))
        .unwrap();
        assert!(req.args.network_data.is_proxy);
        assert!(req.context.play_stream_event.location_info.is_vpn);
        assert_eq!(req.ip_address(), Some("10.1.1.1"));
    }
}
