//! Human-readable ban durations.

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Format a duration given in hours, e.g. `25.0` → `"1d, 1h"`.
///
/// Days and hours are always shown when non-zero. Minutes are dropped once
/// the duration reaches a day, seconds once it reaches an hour. Zero, negative
/// and NaN inputs yield `"0s"`.
pub fn format_duration(hours: f64) -> String {
    if hours.is_nan() || hours <= 0.0 {
        return "0s".to_string();
    }

    // Saturating float-to-int cast.
    let total = (hours * HOUR as f64) as i64;
    let days = total / DAY;
    let hrs = (total % DAY) / HOUR;
    let mins = (total % HOUR) / MINUTE;
    let secs = total % MINUTE;

    let mut parts = Vec::with_capacity(3);
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hrs > 0 {
        parts.push(format!("{}h", hrs));
    }
    if mins > 0 && days == 0 {
        parts.push(format!("{}m", mins));
    }
    if secs > 0 && days == 0 && hrs == 0 {
        parts.push(format!("{}s", secs));
    }

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(", ")
    }
}
