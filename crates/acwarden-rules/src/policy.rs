//! Runtime policy: the named settings that drive detection and moderation.
//!
//! Every key has a statically known [`ValueKind`]. External input is coerced to
//! that kind on write; keys outside the schema are ignored.

use crate::error::PolicyError;
use crate::lenient::scalar_text;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Type of a policy value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Boolean toggle.
    Bool,
    /// Signed integer.
    Int,
    /// List of strings.
    List,
    /// Free text (URLs included).
    Text,
}

impl ValueKind {
    /// Human-readable name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Bool => "boolean",
            ValueKind::Int => "integer",
            ValueKind::List => "string list",
            ValueKind::Text => "string",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A recognized policy key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum PolicyKey {
    DebugMode,
    BanDurationHours,
    KickDurationHours,
    BanWebhookUrl,
    AllowedWebhookUrl,
    AllowedDevices,
    AutoBanEnabled,
    VpnDetectionEnabled,
    DeviceDetectionEnabled,
    PlayerDetectionEnabled,
    MaxLoginAttempts,
    LoginCooldownSeconds,
    EnableWhitelist,
    EnableBlacklist,
}

impl PolicyKey {
    /// Every key in schema order.
    pub const ALL: [PolicyKey; 14] = [
        PolicyKey::DebugMode,
        PolicyKey::BanDurationHours,
        PolicyKey::KickDurationHours,
        PolicyKey::BanWebhookUrl,
        PolicyKey::AllowedWebhookUrl,
        PolicyKey::AllowedDevices,
        PolicyKey::AutoBanEnabled,
        PolicyKey::VpnDetectionEnabled,
        PolicyKey::DeviceDetectionEnabled,
        PolicyKey::PlayerDetectionEnabled,
        PolicyKey::MaxLoginAttempts,
        PolicyKey::LoginCooldownSeconds,
        PolicyKey::EnableWhitelist,
        PolicyKey::EnableBlacklist,
    ];

    /// Wire name of the key.
    pub fn name(self) -> &'static str {
        match self {
            PolicyKey::DebugMode => "DEBUG_MODE",
            PolicyKey::BanDurationHours => "BAN_DURATION_HOURS",
            PolicyKey::KickDurationHours => "KICK_DURATION_HOURS",
            PolicyKey::BanWebhookUrl => "BAN_WEBHOOK_URL",
            PolicyKey::AllowedWebhookUrl => "ALLOWED_WEBHOOK_URL",
            PolicyKey::AllowedDevices => "ALLOWED_DEVICES",
            PolicyKey::AutoBanEnabled => "AUTO_BAN_ENABLED",
            PolicyKey::VpnDetectionEnabled => "VPN_DETECTION_ENABLED",
            PolicyKey::DeviceDetectionEnabled => "DEVICE_DETECTION_ENABLED",
            PolicyKey::PlayerDetectionEnabled => "PLAYER_DETECTION_ENABLED",
            PolicyKey::MaxLoginAttempts => "MAX_LOGIN_ATTEMPTS",
            PolicyKey::LoginCooldownSeconds => "LOGIN_COOLDOWN_SECONDS",
            PolicyKey::EnableWhitelist => "ENABLE_WHITELIST",
            PolicyKey::EnableBlacklist => "ENABLE_BLACKLIST",
        }
    }

    /// Look up a key by its wire name (exact match).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }

    /// Value type of this key.
    pub fn kind(self) -> ValueKind {
        match self {
            PolicyKey::DebugMode
            | PolicyKey::AutoBanEnabled
            | PolicyKey::VpnDetectionEnabled
            | PolicyKey::DeviceDetectionEnabled
            | PolicyKey::PlayerDetectionEnabled
            | PolicyKey::EnableWhitelist
            | PolicyKey::EnableBlacklist => ValueKind::Bool,
            PolicyKey::BanDurationHours
            | PolicyKey::KickDurationHours
            | PolicyKey::MaxLoginAttempts
            | PolicyKey::LoginCooldownSeconds => ValueKind::Int,
            PolicyKey::AllowedDevices => ValueKind::List,
            PolicyKey::BanWebhookUrl | PolicyKey::AllowedWebhookUrl => ValueKind::Text,
        }
    }
}

impl fmt::Display for PolicyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed policy value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
#[allow(missing_docs)]
pub enum PolicyValue {
    Bool(bool),
    Int(i64),
    List(Vec<String>),
    Text(String),
}

impl PolicyValue {
    /// Kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            PolicyValue::Bool(_) => ValueKind::Bool,
            PolicyValue::Int(_) => ValueKind::Int,
            PolicyValue::List(_) => ValueKind::List,
            PolicyValue::Text(_) => ValueKind::Text,
        }
    }

    /// Coerce raw JSON to `kind`. Returns `None` for shapes that cannot be
    /// represented (objects, nested arrays, non-numeric strings for integers).
    pub fn coerce(kind: ValueKind, raw: &Value) -> Option<PolicyValue> {
        match kind {
            ValueKind::Bool => coerce_bool(raw).map(PolicyValue::Bool),
            ValueKind::Int => coerce_int(raw).map(PolicyValue::Int),
            ValueKind::List => coerce_list(raw).map(PolicyValue::List),
            ValueKind::Text => coerce_text(raw).map(PolicyValue::Text),
        }
    }

    /// JSON form of the value, as persisted.
    pub fn to_json(&self) -> Value {
        match self {
            PolicyValue::Bool(b) => Value::Bool(*b),
            PolicyValue::Int(n) => Value::from(*n),
            PolicyValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            PolicyValue::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for PolicyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyValue::Bool(b) => write!(f, "{}", b),
            PolicyValue::Int(n) => write!(f, "{}", n),
            PolicyValue::List(items) => f.write_str(&items.join(", ")),
            PolicyValue::Text(s) => f.write_str(s),
        }
    }
}

fn coerce_bool(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => Some(matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        )),
        Value::Null => Some(false),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn coerce_int(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn coerce_list(raw: &Value) -> Option<Vec<String>> {
    match raw {
        Value::String(s) => Some(
            s.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(String::from)
                .collect(),
        ),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(scalar_text)
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
        ),
        _ => None,
    }
}

fn coerce_text(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// The complete runtime policy.
///
/// Serializes to a JSON object keyed by the SCREAMING_SNAKE_CASE wire names,
/// in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
#[allow(missing_docs)]
pub struct Policy {
    pub debug_mode: bool,
    pub ban_duration_hours: i64,
    pub kick_duration_hours: i64,
    pub ban_webhook_url: String,
    pub allowed_webhook_url: String,
    pub allowed_devices: Vec<String>,
    pub auto_ban_enabled: bool,
    pub vpn_detection_enabled: bool,
    pub device_detection_enabled: bool,
    pub player_detection_enabled: bool,
    pub max_login_attempts: i64,
    pub login_cooldown_seconds: i64,
    pub enable_whitelist: bool,
    pub enable_blacklist: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            debug_mode: true,
            ban_duration_hours: 336,
            kick_duration_hours: 0,
            ban_webhook_url: String::new(),
            allowed_webhook_url: String::new(),
            allowed_devices: vec!["quest2".to_string(), "oculus quest".to_string()],
            auto_ban_enabled: true,
            vpn_detection_enabled: true,
            device_detection_enabled: true,
            player_detection_enabled: true,
            max_login_attempts: 5,
            login_cooldown_seconds: 300,
            enable_whitelist: false,
            enable_blacklist: true,
        }
    }
}

impl Policy {
    /// Read a value by key.
    pub fn get(&self, key: PolicyKey) -> PolicyValue {
        match key {
            PolicyKey::DebugMode => PolicyValue::Bool(self.debug_mode),
            PolicyKey::BanDurationHours => PolicyValue::Int(self.ban_duration_hours),
            PolicyKey::KickDurationHours => PolicyValue::Int(self.kick_duration_hours),
            PolicyKey::BanWebhookUrl => PolicyValue::Text(self.ban_webhook_url.clone()),
            PolicyKey::AllowedWebhookUrl => PolicyValue::Text(self.allowed_webhook_url.clone()),
            PolicyKey::AllowedDevices => PolicyValue::List(self.allowed_devices.clone()),
            PolicyKey::AutoBanEnabled => PolicyValue::Bool(self.auto_ban_enabled),
            PolicyKey::VpnDetectionEnabled => PolicyValue::Bool(self.vpn_detection_enabled),
            PolicyKey::DeviceDetectionEnabled => PolicyValue::Bool(self.device_detection_enabled),
            PolicyKey::PlayerDetectionEnabled => PolicyValue::Bool(self.player_detection_enabled),
            PolicyKey::MaxLoginAttempts => PolicyValue::Int(self.max_login_attempts),
            PolicyKey::LoginCooldownSeconds => PolicyValue::Int(self.login_cooldown_seconds),
            PolicyKey::EnableWhitelist => PolicyValue::Bool(self.enable_whitelist),
            PolicyKey::EnableBlacklist => PolicyValue::Bool(self.enable_blacklist),
        }
    }

    /// Write a typed value. Fails if the value's kind does not match the key.
    pub fn set(&mut self, key: PolicyKey, value: PolicyValue) -> Result<(), PolicyError> {
        let invalid = PolicyError::InvalidValue {
            key,
            expected: key.kind(),
        };
        match (key, value) {
            (PolicyKey::DebugMode, PolicyValue::Bool(b)) => self.debug_mode = b,
            (PolicyKey::BanDurationHours, PolicyValue::Int(n)) => self.ban_duration_hours = n,
            (PolicyKey::KickDurationHours, PolicyValue::Int(n)) => self.kick_duration_hours = n,
            (PolicyKey::BanWebhookUrl, PolicyValue::Text(s)) => self.ban_webhook_url = s,
            (PolicyKey::AllowedWebhookUrl, PolicyValue::Text(s)) => self.allowed_webhook_url = s,
            (PolicyKey::AllowedDevices, PolicyValue::List(items)) => self.allowed_devices = items,
            (PolicyKey::AutoBanEnabled, PolicyValue::Bool(b)) => self.auto_ban_enabled = b,
            (PolicyKey::VpnDetectionEnabled, PolicyValue::Bool(b)) => self.vpn_detection_enabled = b,
            (PolicyKey::DeviceDetectionEnabled, PolicyValue::Bool(b)) => {
                self.device_detection_enabled = b
            }
            (PolicyKey::PlayerDetectionEnabled, PolicyValue::Bool(b)) => {
                self.player_detection_enabled = b
            }
            (PolicyKey::MaxLoginAttempts, PolicyValue::Int(n)) => self.max_login_attempts = n,
            (PolicyKey::LoginCooldownSeconds, PolicyValue::Int(n)) => {
                self.login_cooldown_seconds = n
            }
            (PolicyKey::EnableWhitelist, PolicyValue::Bool(b)) => self.enable_whitelist = b,
            (PolicyKey::EnableBlacklist, PolicyValue::Bool(b)) => self.enable_blacklist = b,
            _ => return Err(invalid),
        }
        Ok(())
    }

    /// Coerce `raw` to the key's type and write it. Returns the stored value.
    pub fn set_raw(&mut self, key: PolicyKey, raw: &Value) -> Result<PolicyValue, PolicyError> {
        let value = PolicyValue::coerce(key.kind(), raw).ok_or(PolicyError::InvalidValue {
            key,
            expected: key.kind(),
        })?;
        self.set(key, value.clone())?;
        Ok(value)
    }

    /// Apply a partial update.
    ///
    /// Keys outside the schema are ignored. All recognized values are coerced
    /// before anything is written, so an invalid value leaves `self` untouched.
    /// Returns the keys that were written, in schema order.
    pub fn apply(&mut self, partial: &Map<String, Value>) -> Result<Vec<PolicyKey>, PolicyError> {
        let mut staged = Vec::new();
        for key in PolicyKey::ALL {
            let Some(raw) = partial.get(key.name()) else {
                continue;
            };
            let value = PolicyValue::coerce(key.kind(), raw).ok_or(PolicyError::InvalidValue {
                key,
                expected: key.kind(),
            })?;
            staged.push((key, value));
        }

        let mut applied = Vec::with_capacity(staged.len());
        for (key, value) in staged {
            self.set(key, value)?;
            applied.push(key);
        }
        Ok(applied)
    }

    /// Rebuild a policy from stored `(name, value)` pairs over the defaults.
    ///
    /// Unknown names are skipped. Values that no longer coerce keep the
    /// default and are reported in the second tuple element.
    pub fn from_entries<I>(entries: I) -> (Self, Vec<PolicyKey>)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut policy = Policy::default();
        let mut rejected = Vec::new();
        for (name, raw) in entries {
            let Some(key) = PolicyKey::from_name(&name) else {
                continue;
            };
            if policy.set_raw(key, &raw).is_err() {
                rejected.push(key);
            }
        }
        (policy, rejected)
    }

    /// All `(key, value)` pairs in schema order.
    pub fn entries(&self) -> Vec<(PolicyKey, PolicyValue)> {
        PolicyKey::ALL
            .into_iter()
            .map(|key| (key, self.get(key)))
            .collect()
    }

    /// Ban webhook target, if configured.
    pub fn ban_webhook(&self) -> Option<&str> {
        non_blank(&self.ban_webhook_url)
    }

    /// Allowed-device webhook target, if configured.
    pub fn allowed_webhook(&self) -> Option<&str> {
        non_blank(&self.allowed_webhook_url)
    }

    /// The reduced view handed to cloud scripts on a plain config fetch.
    pub fn summary(&self) -> PolicySummary {
        PolicySummary {
            debug_mode: self.debug_mode,
            ban_duration_hours: self.ban_duration_hours,
            allowed_devices: self.allowed_devices.clone(),
            webhooks: WebhookFlags {
                ban: self.ban_webhook().is_some(),
                allowed: self.allowed_webhook().is_some(),
            },
        }
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

/// Cloud-script view of the policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicySummary {
    /// Mirrors `DEBUG_MODE`.
    #[serde(rename = "DEBUG_MODE")]
    pub debug_mode: bool,
    /// Mirrors `BAN_DURATION_HOURS`.
    #[serde(rename = "BAN_DURATION_HOURS")]
    pub ban_duration_hours: i64,
    /// Mirrors `ALLOWED_DEVICES`.
    #[serde(rename = "ALLOWED_DEVICES")]
    pub allowed_devices: Vec<String>,
    /// Which webhooks are configured.
    pub webhooks: WebhookFlags,
}

/// Whether each webhook target is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WebhookFlags {
    /// Ban webhook configured.
    pub ban: bool,
    /// Allowed-device webhook configured.
    pub allowed: bool,
}
