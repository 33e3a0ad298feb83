//! Status command for live compliance evaluation.

use std::fmt::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};

use fdt_core::duty::{DutySessionState, DutyStateStore};
use fdt_core::limits::{self, LimitStatus, Severity};
use fdt_db::Database;

use crate::Config;
use super::util::parse_at;

/// Evaluates all enabled limits against the stored trip history and the
/// persisted duty state.
pub fn build_statuses(
    db: &Database,
    config: &Config,
    as_of: DateTime<Utc>,
) -> Result<Vec<LimitStatus>> {
    let trips = db.list_trips()?;

    // A failed duty-state read defaults to off-duty rather than claiming an
    // active, unbounded duty period.
    let persisted = match DutyStateStore::load(db) {
        Ok(persisted) => persisted,
        Err(error) => {
            tracing::warn!(%error, "failed to load duty state, assuming off duty");
            None
        }
    };
    let duty_state = DutySessionState::replayed(persisted, &config.duty, as_of);

    Ok(limits::evaluate(&trips, &config.compliance, &duty_state, as_of))
}

const fn marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Normal => "ok",
        Severity::Warning => "WARN",
        Severity::Critical => "CRIT",
        Severity::OverLimit => "OVER",
    }
}

/// Formats statuses for human-readable output.
pub fn format_statuses(
    statuses: &[LimitStatus],
    as_of: DateTime<Utc>,
    timezone: &str,
) -> String {
    let mut output = String::new();

    writeln!(
        output,
        "Compliance status (as of {}, times in {timezone})",
        as_of.format("%Y-%m-%d %H:%M")
    )
    .unwrap();
    writeln!(output).unwrap();

    if statuses.is_empty() {
        writeln!(output, "Limit tracking is disabled or no categories are enabled.").unwrap();
        return output;
    }

    for status in statuses {
        writeln!(
            output,
            "{:<5} {:<24} {:>6.1} / {:>6.1} h  {:<20} {}",
            marker(status.severity),
            status.label,
            status.current_hours,
            status.limit_hours,
            status.period,
            status.citation,
        )
        .unwrap();
    }

    output
}

/// Runs the status command.
pub fn run(db: &Database, config: &Config, json: bool, at: Option<&str>) -> Result<()> {
    let as_of = parse_at(at)?;
    let statuses = build_statuses(db, config, as_of)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
    } else {
        let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());
        print!("{}", format_statuses(&statuses, as_of, &timezone));
    }

    Ok(())
}
