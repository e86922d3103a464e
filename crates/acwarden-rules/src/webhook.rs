//! Discord-compatible notification payloads.
//!
//! Builders take the timestamp from the caller so the output is a pure
//! function of its inputs.

use crate::detection::{Detection, Subject};
use crate::device::DeviceVerdict;
use serde::Serialize;

/// Embed color for allowed devices.
pub const COLOR_ALLOW: u32 = 65280;
/// Embed color for denials and detections.
pub const COLOR_DENY: u32 = 16711680;

const NOT_PROVIDED: &str = "Not provided";

/// Top-level webhook body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookPayload {
    /// Message text shown above the embeds.
    pub content: String,
    /// Rich embeds.
    pub embeds: Vec<Embed>,
}

/// A single rich embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    /// Title line.
    pub title: String,
    /// Side bar color.
    pub color: u32,
    /// Markdown body.
    pub description: String,
    /// Extra name/value blocks.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    /// RFC 3339 timestamp.
    pub timestamp: String,
}

/// Name/value block inside an embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    /// Field heading.
    pub name: String,
    /// Field body.
    pub value: String,
    /// Render next to neighboring inline fields.
    pub inline: bool,
}

impl EmbedField {
    fn new(name: &str, value: String, inline: bool) -> Self {
        Self {
            name: name.to_string(),
            value,
            inline,
        }
    }
}

/// Payload for a device classification, allow or deny.
pub fn device_payload(verdict: &DeviceVerdict, timestamp: &str) -> WebhookPayload {
    let profile = &verdict.profile;
    let custom_id = profile.custom_id.as_deref().unwrap_or(NOT_PROVIDED);

    let (content, title, color) = if verdict.allowed {
        (
            "🟢 Allowed device accessed the system",
            "✅ Allowed Device Logged",
            COLOR_ALLOW,
        )
    } else {
        ("🔴 Ban triggered", "🚫 Banned Device Detected", COLOR_DENY)
    };

    let description = format!(
        "**🧍 User:** `{}`\n**📱 Device:** `{}`\n**📡 Platform:** `{}`\n\
         **🧠 Device Type:** `{}`\n**🔒 HWID:** `{}`\n\
         **🆔 Oculus Custom ID:** `{}`\n**📄 Reason:** `{}`",
        verdict.player_id,
        profile.model,
        profile.platform,
        verdict.device_type,
        profile.hardware_id,
        custom_id,
        verdict.reason,
    );

    let fields = vec![
        EmbedField::new(
            "💻 System",
            format!(
                "• OS: `{}`\n• CPU: `{}`\n• RAM: `{}MB`",
                profile.operating_system, profile.cpu, profile.ram
            ),
            true,
        ),
        EmbedField::new(
            "🎮 Graphics",
            format!(
                "• GPU: `{} ({}MB)`\n• Shader Level: `{}`",
                profile.gpu, profile.gpu_memory, profile.shader_level
            ),
            true,
        ),
        EmbedField::new(
            "🔐 IDs",
            format!(
                "• Device ID: `{}`\n• Unique ID: `{}`\n• Oculus Custom ID: `{}`\n\
                 • Player ID Length: `{}`\n• Type (Raw): `{}`",
                profile.device_id,
                profile.unique_id,
                custom_id,
                verdict.player_id.chars().count(),
                profile.raw_device_type,
            ),
            false,
        ),
    ];

    WebhookPayload {
        content: content.to_string(),
        embeds: vec![Embed {
            title: title.to_string(),
            color,
            description,
            fields,
            timestamp: timestamp.to_string(),
        }],
    }
}

/// Payload for a VPN or behavior detection.
pub fn detection_payload(
    title: &str,
    subject: &Subject<'_>,
    detection: &Detection,
    timestamp: &str,
) -> WebhookPayload {
    let description = format!(
        "**🧍 User:** `{}`\n**🏷️ Name:** `{}`\n**🔒 HWID:** `{}`\n\
         **🌐 IP:** `{}`\n**📄 Reason:** `{}`",
        subject.player_id,
        subject.player_name,
        subject.hardware_id,
        subject.ip_address,
        detection.reason,
    );

    WebhookPayload {
        content: "🔴 Ban triggered".to_string(),
        embeds: vec![Embed {
            title: title.to_string(),
            color: COLOR_DENY,
            description,
            fields: Vec::new(),
            timestamp: timestamp.to_string(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::classify;
    use crate::fingerprint::DeviceFingerprint;
    use crate::network::{check_vpn, LocationInfo, NetworkData};
    use crate::policy::Policy;

    const TS: &str = "2024-01-01T00:00:00Z";

    #[test]
    fn test_device_payload_allow() {
        let fingerprint = DeviceFingerprint {
            device_model: Some("Quest2".into()),
            platform: Some("Android".into()),
            data_path: Some("/storage/emulated/HW-1/files".into()),
            ..Default::default()
        };
        let verdict = classify(&fingerprint, "A1B2C3D4E5F6A7B8C", &Policy::default());
        let payload = device_payload(&verdict, TS);

        assert_eq!(payload.content, "🟢 Allowed device accessed the system");
        let embed = &payload.embeds[0];
        assert_eq!(embed.color, COLOR_ALLOW);
        assert_eq!(embed.timestamp, TS);
        assert!(embed.description.contains("`HW-1`"));
        assert!(embed.description.contains("`Not provided`"));
        assert_eq!(embed.fields.len(), 3);
        assert!(embed.fields[2].value.contains("Player ID Length: `17`"));
    }

    #[test]
    fn test_device_payload_deny_is_red() {
        let verdict = classify(&DeviceFingerprint::default(), "A1B2C3D4E5F6A7B8C", &Policy::default());
        let payload = device_payload(&verdict, TS);
        assert_eq!(payload.content, "🔴 Ban triggered");
        assert_eq!(payload.embeds[0].color, COLOR_DENY);
        assert!(payload.embeds[0].description.contains("Disallowed/unknown device"));
    }

    #[test]
    fn test_detection_payload_omits_empty_fields() {
        let network = NetworkData {
            is_vpn: true,
            is_proxy: false,
        };
        let detection = check_vpn(&network, &LocationInfo::default());
        let subject = Subject {
            player_id: "P1",
            player_name: "Alice",
            hardware_id: "Unknown",
            ip_address: "10.0.0.1",
        };
        let payload = detection_payload("🚫 VPN/Proxy Detected", &subject, &detection, TS);
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json["embeds"][0].get("fields").is_none());
        assert_eq!(json["embeds"][0]["color"], 16711680);
        assert!(payload.embeds[0].description.contains("10.0.0.1"));
    }
}
