//! Device fingerprint as reported by the game client.
//!
//! The wire format uses PascalCase keys and loosely typed scalars. A
//! [`DeviceProfile`] is the resolved view the classifier works on: aliases
//! collapsed, descriptors defaulted to `"Unknown"`, model and platform
//! lowercased, and the hardware identifier extracted from the data path.

use crate::lenient;
use serde::Deserialize;

/// Placeholder for descriptors the client did not report.
pub const UNKNOWN: &str = "Unknown";

/// Raw device fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(missing_docs)]
pub struct DeviceFingerprint {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub device_model: Option<String>,
    /// Fallback for `DeviceModel`.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub platform: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub operating_system: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub central_processing_unit: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub system_memory_size: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub graphics_device_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub graphics_memory_size: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub graphics_shader_level: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub device_type: Option<String>,
    #[serde(default, rename = "DeviceID", deserialize_with = "lenient::opt_string")]
    pub device_id: Option<String>,
    /// Fallback for `DeviceID`.
    #[serde(default, rename = "DeviceId", deserialize_with = "lenient::opt_string")]
    pub device_id_alt: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub device_unique_id: Option<String>,
    /// Filesystem path whose fourth segment carries the hardware identifier.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub data_path: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub oculus_custom_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub custom_id: Option<String>,
    #[serde(default, rename = "OculusID", deserialize_with = "lenient::opt_string")]
    pub oculus_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_truthy")]
    pub oculus_platform: Option<String>,
    #[serde(default, rename = "OculusUserID", deserialize_with = "lenient::opt_truthy")]
    pub oculus_user_id: Option<String>,
    #[serde(default, rename = "OculusSessionID", deserialize_with = "lenient::opt_truthy")]
    pub oculus_session_id: Option<String>,
}

impl DeviceFingerprint {
    /// Resolve aliases and defaults into a [`DeviceProfile`].
    pub fn profile(&self) -> DeviceProfile {
        let model = self
            .device_model
            .as_deref()
            .or(self.model.as_deref())
            .unwrap_or(UNKNOWN)
            .to_lowercase();
        let platform = self.platform.as_deref().unwrap_or(UNKNOWN).to_lowercase();
        let unique_id = or_unknown(&self.device_unique_id);

        let has_oculus_integration = self.oculus_platform.is_some()
            || self.oculus_user_id.is_some()
            || self.oculus_session_id.is_some()
            || unique_id.to_lowercase().contains("oculus");

        DeviceProfile {
            model,
            platform,
            reported_model: self.device_model.as_deref().unwrap_or_default().to_lowercase(),
            reported_platform: self.platform.as_deref().unwrap_or_default().to_lowercase(),
            operating_system: or_unknown(&self.operating_system),
            cpu: or_unknown(&self.central_processing_unit),
            ram: or_unknown(&self.system_memory_size),
            gpu: or_unknown(&self.graphics_device_name),
            gpu_memory: or_unknown(&self.graphics_memory_size),
            shader_level: or_unknown(&self.graphics_shader_level),
            raw_device_type: or_unknown(&self.device_type),
            device_id: self
                .device_id
                .clone()
                .or_else(|| self.device_id_alt.clone())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            unique_id,
            hardware_id: hardware_id_from_path(self.data_path.as_deref()),
            custom_id: self
                .oculus_custom_id
                .clone()
                .or_else(|| self.custom_id.clone())
                .or_else(|| self.oculus_id.clone()),
            has_oculus_integration,
        }
    }
}

fn or_unknown(field: &Option<String>) -> String {
    field.clone().unwrap_or_else(|| UNKNOWN.to_string())
}

/// Extract the hardware identifier from the fourth `/`-separated segment of a
/// data path, e.g. `/data/app/<HWID>/files`. Returns `"Unknown"` when the path
/// is absent, too short, or the segment is empty.
pub fn hardware_id_from_path(path: Option<&str>) -> String {
    path.and_then(|p| p.split('/').nth(3))
        .filter(|segment| !segment.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// Resolved fingerprint used by the classifier and notification builders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProfile {
    /// Lowercased `DeviceModel`, else `Model`, else `"unknown"`.
    pub model: String,
    /// Lowercased `Platform`, else `"unknown"`.
    pub platform: String,
    /// Lowercased `DeviceModel` exactly as reported (empty if absent).
    pub reported_model: String,
    /// Lowercased `Platform` exactly as reported (empty if absent).
    pub reported_platform: String,
    /// Operating system descriptor.
    pub operating_system: String,
    /// CPU descriptor.
    pub cpu: String,
    /// System memory (MB).
    pub ram: String,
    /// GPU name.
    pub gpu: String,
    /// GPU memory (MB).
    pub gpu_memory: String,
    /// Shader level.
    pub shader_level: String,
    /// Raw `DeviceType` string.
    pub raw_device_type: String,
    /// `DeviceID`, else `DeviceId`.
    pub device_id: String,
    /// `DeviceUniqueId`.
    pub unique_id: String,
    /// Hardware identifier (HWID).
    pub hardware_id: String,
    /// Custom identifier, when supplied.
    pub custom_id: Option<String>,
    /// Whether any Oculus platform indicator is present.
    pub has_oculus_integration: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hardware_id_from_path() {
        assert_eq!(
            hardware_id_from_path(Some("/storage/emulated/ABC123/files")),
            "ABC123"
        );
        assert_eq!(hardware_id_from_path(Some("a/b/c/d")), "d");
        assert_eq!(hardware_id_from_path(Some("/data/app")), "Unknown");
        assert_eq!(hardware_id_from_path(Some("a/b/c//e")), "Unknown");
        assert_eq!(hardware_id_from_path(None), "Unknown");
    }

    #[test]
    fn test_deserialize_loose_scalars() {
        let fingerprint: DeviceFingerprint = serde_json::from_value(json!({
            "DeviceModel": "Oculus Quest 2",
            "SystemMemorySize": 5731,
            "GraphicsMemorySize": 1024.5,
            "DeviceId": "dev-1",
            "OculusCustomId": "",
            "CustomId": "OCULUS3",
            "Unrelated": {"nested": true},
        }))
        .unwrap();

        let profile = fingerprint.profile();
        assert_eq!(profile.model, "oculus quest 2");
        assert_eq!(profile.platform, "unknown");
        assert_eq!(profile.reported_platform, "");
        assert_eq!(profile.ram, "5731");
        assert_eq!(profile.gpu_memory, "1024.5");
        assert_eq!(profile.device_id, "dev-1");
        assert_eq!(profile.custom_id.as_deref(), Some("OCULUS3"));
        assert_eq!(profile.operating_system, "Unknown");
    }

    #[test]
    fn test_model_alias_fallback() {
        let fingerprint = DeviceFingerprint {
            model: Some("Pixel 7".into()),
            ..Default::default()
        };
        let profile = fingerprint.profile();
        assert_eq!(profile.model, "pixel 7");
        assert_eq!(profile.reported_model, "");
    }

    #[test]
    fn test_oculus_integration_indicators() {
        let bare = DeviceFingerprint::default().profile();
        assert!(!bare.has_oculus_integration);

        let by_user = DeviceFingerprint {
            oculus_user_id: Some("12345".into()),
            ..Default::default()
        };
        assert!(by_user.profile().has_oculus_integration);

        let by_unique = DeviceFingerprint {
            device_unique_id: Some("Oculus-abc".into()),
            ..Default::default()
        };
        assert!(by_unique.profile().has_oculus_integration);
    }

    #[test]
    fn test_falsy_indicators_are_not_integration() {
        let falsy: DeviceFingerprint = serde_json::from_value(json!({
            "OculusPlatform": false,
            "OculusUserID": 0,
            "OculusSessionID": ""
        }))
        .unwrap();
        assert_eq!(falsy.oculus_platform, None);
        assert!(!falsy.profile().has_oculus_integration);

        let truthy: DeviceFingerprint = serde_json::from_value(json!({
            "OculusPlatform": true,
            "OculusSessionID": "false"
        }))
        .unwrap();
        assert_eq!(truthy.oculus_platform.as_deref(), Some("true"));
        assert_eq!(truthy.oculus_session_id.as_deref(), Some("false"));
        assert!(truthy.profile().has_oculus_integration);
    }
}
