//! Report command for the daily flight-time breakdown.

use std::fmt::Write;

use anyhow::Result;
use chrono::{Local, NaiveDate};

use fdt_core::trip::Trip;
use fdt_core::window::minutes_on_date;
use fdt_db::Database;

use super::util::format_duration;

/// One row of the daily breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayEntry {
    pub date: NaiveDate,
    pub minutes: i64,
}

/// Computes per-day flown minutes for the `days` days ending at `today`.
pub fn daily_breakdown(trips: &[Trip], today: NaiveDate, days: u32) -> Vec<DayEntry> {
    let mut entries = Vec::new();
    for offset in (0..days).rev() {
        let date = today - chrono::Duration::days(i64::from(offset));
        entries.push(DayEntry {
            date,
            minutes: minutes_on_date(trips, date),
        });
    }
    entries
}

/// Generates a 10-character progress bar.
/// Values <5% of max get a single block for visibility.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn progress_bar(value: i64, max: i64) -> String {
    if max == 0 {
        return "░░░░░░░░░░".to_string();
    }

    let ratio = value as f64 / max as f64;
    let filled = if ratio < 0.05 && value > 0 {
        1
    } else {
        (ratio * 10.0).round().min(10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Formats the breakdown for human-readable output.
pub fn format_breakdown(entries: &[DayEntry]) -> String {
    let mut output = String::new();
    let max = entries.iter().map(|e| e.minutes).max().unwrap_or(0);
    let total: i64 = entries.iter().map(|e| e.minutes).sum();

    writeln!(output, "Flight time by day").unwrap();
    writeln!(output).unwrap();
    for entry in entries {
        writeln!(
            output,
            "{}  {}  {:>7}",
            entry.date.format("%Y-%m-%d"),
            progress_bar(entry.minutes, max),
            format_duration(entry.minutes),
        )
        .unwrap();
    }
    writeln!(output).unwrap();
    writeln!(output, "Total: {}", format_duration(total)).unwrap();

    output
}

/// Runs the report command.
pub fn run(db: &Database, days: u32) -> Result<()> {
    let trips = db.list_trips()?;
    let today = Local::now().date_naive();
    let entries = daily_breakdown(&trips, today, days);
    print!("{}", format_breakdown(&entries));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    use fdt_core::trip::{FlightLeg, TripCategory};

    fn leg(out: &str, in_: &str) -> FlightLeg {
        FlightLeg {
            id: format!("leg-{out}"),
            departure: "KPDX".to_string(),
            arrival: "KSEA".to_string(),
            out_time: out.to_string(),
            off_time: String::new(),
            on_time: String::new(),
            in_time: in_.to_string(),
            flight_date: None,
            is_deadhead: false,
        }
    }

    fn trip(id: &str, date: NaiveDate, legs: Vec<FlightLeg>) -> Trip {
        Trip {
            id: id.to_string(),
            date,
            category: TripCategory::Operating,
            duty_start: None,
            duty_end: None,
            legs,
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn breakdown_covers_requested_days_oldest_first() {
        let trips = vec![
            trip("trip-1", date(13), vec![leg("0800", "1200")]),
            trip("trip-2", date(15), vec![leg("0900", "1030")]),
        ];
        let entries = daily_breakdown(&trips, date(15), 3);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].date, date(13));
        assert_eq!(entries[0].minutes, 240);
        assert_eq!(entries[1].minutes, 0);
        assert_eq!(entries[2].date, date(15));
        assert_eq!(entries[2].minutes, 90);
    }

    #[test]
    fn progress_bar_scales_to_max() {
        assert_eq!(progress_bar(0, 0), "░░░░░░░░░░");
        assert_eq!(progress_bar(10, 10), "██████████");
        assert_eq!(progress_bar(5, 10), "█████░░░░░");
        // Tiny but nonzero values stay visible.
        assert_eq!(progress_bar(1, 1000), "█░░░░░░░░░");
    }

    #[test]
    fn formatted_breakdown_output() {
        let trips = vec![
            trip("trip-1", date(13), vec![leg("0800", "1200")]),
            trip("trip-2", date(15), vec![leg("0900", "1030")]),
        ];
        let entries = daily_breakdown(&trips, date(15), 3);
        let output = format_breakdown(&entries);
        assert_snapshot!(output, @r"
        Flight time by day

        2024-01-13  ██████████    4h 0m
        2024-01-14  ░░░░░░░░░░       0m
        2024-01-15  ████░░░░░░   1h 30m

        Total: 5h 30m
        ");
    }
}
