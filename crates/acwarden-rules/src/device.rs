//! Device classifier.
//!
//! [`classify`] is a pure function of the fingerprint, the player identifier
//! and the policy. The evaluation order is fixed:
//!
//! 1. custom identifier validation
//! 2. player identifier length
//! 3. Oculus integration cross-check
//! 4. device type classification
//! 5. allowed-device match, then the [`DEVICE_RULES`] table
//!
//! Any violation from steps 1-3 forces a deny even when the device matches the
//! allowed list. Rule table reasons only surface on deny.

use crate::detection::join_reasons;
use crate::fingerprint::{DeviceFingerprint, DeviceProfile};
use crate::policy::Policy;
use serde::Serialize;
use std::fmt;

/// Placeholder identity used when neither args nor context carry a player id.
pub const UNKNOWN_PLAYER: &str = "UNKNOWN_PLAYER";

/// Reason reported for an allowed device.
pub const ALLOWED_REASON: &str = "Allowed device";

/// Reason reported for a denied device with no specific finding.
pub const FALLBACK_REASON: &str = "Disallowed/unknown device";

const CUSTOM_ID_PREFIX: &str = "OCULUS";
const CUSTOM_ID_LENGTH: std::ops::RangeInclusive<usize> = 7..=20;
const CUSTOM_ID_NUMBER: std::ops::RangeInclusive<i64> = 1..=9;
const PLAYER_ID_LENGTH: std::ops::RangeInclusive<usize> = 8..=32;
const FAKE_PLAYER_ID_LENGTHS: [usize; 4] = [4, 5, 6, 7];

/// Coarse device category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeviceType {
    /// Standalone or tethered VR headset.
    #[serde(rename = "VR Headset")]
    VrHeadset,
    /// Desktop computer.
    Desktop,
    /// Phone or tablet.
    Mobile,
    /// Nothing matched.
    Unknown,
}

impl DeviceType {
    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            DeviceType::VrHeadset => "VR Headset",
            DeviceType::Desktop => "Desktop",
            DeviceType::Mobile => "Mobile",
            DeviceType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a device from its raw type string, model and platform.
///
/// Substring matches are checked in priority order: VR markers, then desktop
/// markers, then mobile markers.
pub fn classify_device_type(raw_type: &str, model: &str, platform: &str) -> DeviceType {
    let raw_type = raw_type.to_lowercase();
    let model = model.to_lowercase();
    let platform = platform.to_lowercase();

    if raw_type.contains("vr") || ["quest", "vive", "index"].iter().any(|m| model.contains(m)) {
        return DeviceType::VrHeadset;
    }
    if raw_type.contains("desktop") || platform.contains("windows") {
        return DeviceType::Desktop;
    }
    if raw_type.contains("mobile") || platform.contains("android") || platform.contains("ios") {
        return DeviceType::Mobile;
    }
    DeviceType::Unknown
}

/// Violations of the custom identifier format.
pub fn custom_id_violations(custom_id: &str) -> Vec<String> {
    let mut reasons = Vec::new();
    let upper = custom_id.to_uppercase();

    if upper == "OCULUS0" {
        reasons.push("Invalid Oculus Custom ID (OCULUS0 is impossible)".to_string());
    } else if upper.starts_with(CUSTOM_ID_PREFIX) {
        // Every occurrence of the prefix is dropped, not just the leading one.
        let suffix = upper.replace(CUSTOM_ID_PREFIX, "");
        let suffix = suffix.trim();
        if !suffix.is_empty() {
            match suffix.parse::<i64>() {
                Ok(n) if !CUSTOM_ID_NUMBER.contains(&n) => {
                    reasons.push(format!("Invalid Oculus Custom ID number ({}, must be 1-9)", n));
                }
                Ok(_) => {}
                // Too many digits for i64: still a number, still out of range.
                Err(_) if is_integer_literal(suffix) => {
                    reasons.push(format!(
                        "Invalid Oculus Custom ID number ({}, must be 1-9)",
                        suffix
                    ));
                }
                Err(_) => reasons.push("Invalid Oculus Custom ID format".to_string()),
            }
        }
    }

    let len = custom_id.chars().count();
    if !CUSTOM_ID_LENGTH.contains(&len) {
        reasons.push(format!(
            "Invalid Oculus Custom ID length ({}, expected 7-20)",
            len
        ));
    }

    reasons
}

fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Violations of the player identifier length.
///
/// Lengths 4-7 report both the out-of-range reason and the stricter
/// "likely fake" reason.
pub fn player_id_violations(player_id: &str) -> Vec<String> {
    let mut reasons = Vec::new();
    if player_id.is_empty() || player_id == UNKNOWN_PLAYER {
        return reasons;
    }

    let len = player_id.chars().count();
    if !PLAYER_ID_LENGTH.contains(&len) {
        reasons.push(format!(
            "Suspicious Player ID length ({}, expected 8-32)",
            len
        ));
    }
    if FAKE_PLAYER_ID_LENGTHS.contains(&len) {
        reasons.push(format!("Suspicious Player ID length ({}, likely fake)", len));
    }
    reasons
}

fn integration_mismatch(profile: &DeviceProfile) -> Option<String> {
    let claims_oculus = [&profile.model, &profile.platform]
        .iter()
        .any(|s| s.contains("quest") || s.contains("oculus"));

    (claims_oculus && !profile.has_oculus_integration && profile.custom_id.is_some()).then(|| {
        "Oculus device detected but no valid Oculus integration API found".to_string()
    })
}

/// A deny rule: a predicate over the resolved profile and its classified type.
pub struct DeviceRule {
    /// Reason reported when the rule applies.
    pub label: &'static str,
    /// Predicate.
    pub applies: fn(&DeviceProfile, DeviceType) -> bool,
}

/// Deny rules, evaluated in order.
pub const DEVICE_RULES: [DeviceRule; 4] = [
    DeviceRule {
        label: "VirtualBox Detected",
        applies: |profile, _| profile.reported_model.contains("vbox"),
    },
    DeviceRule {
        label: "Unknown platform",
        applies: |profile, _| profile.reported_platform.contains("unknown"),
    },
    DeviceRule {
        label: "Running on Desktop",
        applies: |_, device_type| device_type == DeviceType::Desktop,
    },
    DeviceRule {
        label: "Running on Mobile",
        applies: |_, device_type| device_type == DeviceType::Mobile,
    },
];

/// Result of [`classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceVerdict {
    /// Whether the device is allowed.
    pub allowed: bool,
    /// Player identifier the verdict was computed for.
    pub player_id: String,
    /// Classified device type.
    pub device_type: DeviceType,
    /// Findings from identifier validation and the integration cross-check.
    pub violations: Vec<String>,
    /// Labels of rule table entries that applied.
    pub rule_reasons: Vec<String>,
    /// Final reason string.
    pub reason: String,
    /// Resolved fingerprint.
    pub profile: DeviceProfile,
}

/// Decide whether a device is allowed.
pub fn classify(fingerprint: &DeviceFingerprint, player_id: &str, policy: &Policy) -> DeviceVerdict {
    let profile = fingerprint.profile();

    let mut violations = Vec::new();
    if let Some(custom_id) = profile.custom_id.as_deref() {
        violations.extend(custom_id_violations(custom_id));
    }
    violations.extend(player_id_violations(player_id));
    violations.extend(integration_mismatch(&profile));

    let device_type = classify_device_type(&profile.raw_device_type, &profile.model, &profile.platform);

    let listed = policy
        .allowed_devices
        .iter()
        .map(|device| device.trim().to_lowercase())
        .filter(|device| !device.is_empty())
        .any(|device| profile.model.contains(&device) || profile.platform.contains(&device));
    let allowed = listed && violations.is_empty();

    let rule_reasons: Vec<String> = DEVICE_RULES
        .iter()
        .filter(|rule| (rule.applies)(&profile, device_type))
        .map(|rule| rule.label.to_string())
        .collect();

    let reason = if allowed {
        ALLOWED_REASON.to_string()
    } else {
        let all: Vec<String> = violations.iter().chain(&rule_reasons).cloned().collect();
        join_reasons(&all, FALLBACK_REASON)
    };

    DeviceVerdict {
        allowed,
        player_id: player_id.to_string(),
        device_type,
        violations,
        rule_reasons,
        reason,
        profile,
    }
}
