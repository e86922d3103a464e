//! Player behavior predicate.

use crate::detection::Detection;
use crate::lenient;
use serde::Deserialize;

const FALLBACK_REASON: &str = "Suspicious behavior detected";

/// Behavior flags raised by the game client (`args.playerData`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerData {
    /// Client saw suspicious activity.
    #[serde(default, deserialize_with = "lenient::flag")]
    pub suspicious_activity: bool,
    /// Client saw an unusual behavior pattern.
    #[serde(default, deserialize_with = "lenient::flag")]
    pub unusual_behavior: bool,
}

/// Check behavior flags.
pub fn check_player_behavior(data: &PlayerData) -> Detection {
    let mut reasons = Vec::new();
    if data.suspicious_activity {
        reasons.push("Suspicious activity detected".to_string());
    }
    if data.unusual_behavior {
        reasons.push("Unusual behavior pattern".to_string());
    }
    Detection::from_reasons(reasons, FALLBACK_REASON)
}
