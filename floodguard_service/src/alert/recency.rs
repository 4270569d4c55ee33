/// Human-readable age labels ("2 minutes ago") for alerts and messages.
///
/// # Clock injection
/// `relative_age_at` takes `now` as a parameter rather than calling
/// `Utc::now()` internally, so labels are deterministic in tests.

use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// Relative age
// ---------------------------------------------------------------------------

/// Formats the age of `timestamp` relative to `now`.
///
/// Buckets, by whole elapsed units (truncated):
///   age < 1 minute   →  "Just now"
///   age < 1 hour     →  "N minutes ago"
///   age < 1 day      →  "N hours ago"
///   otherwise        →  "N days ago"
///
/// Timestamps in the future (clock skew between producer and viewer) are
/// shown as "Just now".
pub fn relative_age_at(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(timestamp);
    let minutes = age.num_minutes();
    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return plural(minutes, "minute");
    }
    let hours = age.num_hours();
    if hours < 24 {
        return plural(hours, "hour");
    }
    plural(age.num_days(), "day")
}

/// Convenience wrapper that uses the real current time.
/// Use `relative_age_at` in tests to keep them deterministic.
pub fn relative_age(timestamp: DateTime<Utc>) -> String {
    relative_age_at(timestamp, Utc::now())
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
