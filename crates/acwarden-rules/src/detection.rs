//! Shared result shape for the boolean detection checks.

/// Outcome of a VPN or player-behavior check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Whether any signal fired.
    pub detected: bool,
    /// One entry per fired signal, in evaluation order.
    pub reasons: Vec<String>,
    /// Reasons joined with `"; "`, or the check's fallback text. Empty when
    /// nothing was detected.
    pub reason: String,
}

impl Detection {
    /// Build a detection from the reasons collected by a check.
    pub(crate) fn from_reasons(reasons: Vec<String>, fallback: &str) -> Self {
        let detected = !reasons.is_empty();
        let reason = if detected {
            join_reasons(&reasons, fallback)
        } else {
            String::new()
        };
        Self {
            detected,
            reasons,
            reason,
        }
    }
}

/// Join reasons with `"; "`, or return `fallback` when there are none.
pub fn join_reasons(reasons: &[String], fallback: &str) -> String {
    if reasons.is_empty() {
        fallback.to_string()
    } else {
        reasons.join("; ")
    }
}

/// Identity of the player a detection is about, as used in ban records and
/// notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject<'a> {
    /// Player identifier.
    pub player_id: &'a str,
    /// Display name.
    pub player_name: &'a str,
    /// Hardware identifier.
    pub hardware_id: &'a str,
    /// Client IP address.
    pub ip_address: &'a str,
}
