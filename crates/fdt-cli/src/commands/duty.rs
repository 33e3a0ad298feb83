//! Duty command for driving the duty-session state machine.

use std::fmt::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use fdt_core::duty::{DutyEvent, DutySession};
use fdt_db::Database;

use crate::{Config, DutyAction};
use super::util::{format_duration, parse_at};

/// Formats the events produced by one duty mutation.
pub fn format_events(events: &[DutyEvent]) -> String {
    let mut output = String::new();
    for event in events {
        match event {
            DutyEvent::StateChanged {
                is_on_duty: true,
                started_at: Some(at),
            } => writeln!(output, "Duty period started at {}", at.to_rfc3339()).unwrap(),
            DutyEvent::StateChanged { is_on_duty: false, .. } => {
                writeln!(output, "Duty period ended").unwrap();
            }
            DutyEvent::StateChanged { .. } => {
                writeln!(output, "Duty state changed").unwrap();
            }
            DutyEvent::ThresholdCrossed { threshold_hours } => {
                writeln!(output, "WARNING: {threshold_hours}h duty threshold crossed").unwrap();
            }
            DutyEvent::RestPeriodStarted { at } => {
                writeln!(output, "Rest period started at {}", at.to_rfc3339()).unwrap();
            }
        }
    }
    output
}

/// Runs a duty action against the persisted session.
pub fn execute(
    db: Database,
    config: &Config,
    action: &DutyAction,
    now: DateTime<Utc>,
) -> Result<(Vec<DutyEvent>, String)> {
    let mut session = DutySession::restore(db, config.duty.clone(), now);

    let events = match action {
        DutyAction::Start { .. } => session
            .start_duty(now)
            .context("failed to persist duty state")?,
        DutyAction::End { .. } => session
            .end_duty(now)
            .context("failed to persist duty state")?,
        DutyAction::Tick { .. } => session.tick(now),
    };

    let state_line = if session.state().is_on_duty {
        format!(
            "On duty for {}",
            format_duration(session.elapsed(now).num_minutes())
        )
    } else if session.state().is_in_rest {
        "Off duty (in rest)".to_string()
    } else {
        "Off duty".to_string()
    };

    Ok((events, state_line))
}

/// Runs the duty command.
pub fn run(db: Database, config: &Config, action: &DutyAction) -> Result<()> {
    let at = match action {
        DutyAction::Start { at } | DutyAction::End { at } | DutyAction::Tick { at } => {
            at.as_deref()
        }
    };
    let now = parse_at(at)?;

    let (events, state_line) = execute(db, config, action, now)?;
    print!("{}", format_events(&events));
    println!("{state_line}");
    Ok(())
}
