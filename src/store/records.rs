//! Ban and allow-list records as persisted and listed.

use acwarden_rules::format_duration;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Placeholder for identity fields the caller did not supply.
pub const UNKNOWN: &str = "Unknown";

/// A ban, keyed by player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanRecord {
    pub player_id: String,
    #[serde(default = "unknown")]
    pub player_name: String,
    #[serde(default = "unknown", alias = "hwid")]
    pub hardware_id: String,
    #[serde(default = "unknown", alias = "ip")]
    pub ip_address: String,
    #[serde(default = "unknown")]
    pub reason: String,
    /// Zero records a kick.
    #[serde(default, alias = "banDuration", deserialize_with = "hours")]
    pub ban_duration_hours: i64,
    #[serde(deserialize_with = "timestamp")]
    pub banned_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banned_by: Option<String>,
}

impl BanRecord {
    /// When the ban lapses. `None` for kicks.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        (self.ban_duration_hours > 0)
            .then(|| Duration::try_hours(self.ban_duration_hours))
            .flatten()
            .and_then(|d| self.banned_at.checked_add_signed(d))
    }

    /// Listing view with the formatted duration.
    pub fn listing(&self) -> BanListing {
        BanListing {
            record: self.clone(),
            ban_duration: format_duration(self.ban_duration_hours as f64),
            expires_at: self.expires_at(),
        }
    }
}

/// A ban as returned by the listing endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BanListing {
    #[serde(flatten)]
    pub record: BanRecord,
    /// Human-readable duration, e.g. `"14d"`.
    pub ban_duration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// An allow-list entry, keyed by player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowRecord {
    pub player_id: String,
    #[serde(default = "unknown")]
    pub player_name: String,
    #[serde(deserialize_with = "timestamp")]
    pub added_at: DateTime<Utc>,
    #[serde(default = "unknown")]
    pub added_by: String,
}

fn unknown() -> String {
    UNKNOWN.to_string()
}

/// Whole hours from a number or numeric string. Fractional and non-numeric
/// values yield `None`.
pub fn whole_hours(raw: &Value) -> Option<i64> {
    let hours = match raw {
        Value::Number(n) => match n.as_i64() {
            Some(whole) => return Some(whole),
            None => n.as_f64()?,
        },
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(whole) => return Some(whole),
                Err(_) => s.parse::<f64>().ok()?,
            }
        }
        _ => return None,
    };
    (hours.is_finite() && hours.fract() == 0.0 && hours.abs() < i64::MAX as f64)
        .then_some(hours as i64)
}

fn hours<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0),
        raw => whole_hours(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid ban duration: {}", raw))),
    }
}

/// RFC 3339, or a naive ISO 8601 timestamp read as UTC.
fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(at) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(at.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&raw, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {}", raw)))
}

/// Newest first; later insertions win ties.
pub(crate) fn sort_newest_first<T>(records: &mut [T], at: impl Fn(&T) -> DateTime<Utc>) {
    // Stable sort over the reversed slice keeps insertion order reversed on ties.
    records.reverse();
    records.sort_by(|a, b| at(b).cmp(&at(a)));
}
