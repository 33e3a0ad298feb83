//! Shared utilities for CLI commands.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

/// Parses an optional `--at` override, defaulting to now.
///
/// Accepts RFC 3339 instants (e.g. `2024-01-15T10:30:00Z`).
pub fn parse_at(at: Option<&str>) -> Result<DateTime<Utc>> {
    match at {
        Some(raw) => {
            let parsed = DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("invalid instant: {raw}. Use RFC 3339 (e.g. 2024-01-15T10:30:00Z)"))?;
            Ok(parsed.with_timezone(&Utc))
        }
        None => Ok(Utc::now()),
    }
}

/// Formats whole minutes as a duration string.
/// Returns "Xh Ym" if >= 1 hour, "Xm" if < 1 hour.
/// Negative durations are treated as 0m.
pub fn format_duration(minutes: i64) -> String {
    if minutes < 0 {
        return "0m".to_string();
    }
    let hours = minutes / 60;
    let remainder = minutes % 60;

    if hours >= 1 {
        format!("{hours}h {remainder}m")
    } else {
        format!("{remainder}m")
    }
}
