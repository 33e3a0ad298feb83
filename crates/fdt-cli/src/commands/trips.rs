//! Trips command for listing the logged history.

use std::fmt::Write;

use anyhow::Result;

use fdt_core::trip::Trip;
use fdt_db::Database;

use super::util::format_duration;

/// Formats trips for human-readable output.
pub fn format_trips(trips: &[Trip]) -> String {
    let mut output = String::new();

    if trips.is_empty() {
        writeln!(output, "No trips logged.").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Hint: Use 'fdt log' to record a flight leg.").unwrap();
        return output;
    }

    writeln!(
        output,
        "{:<9}  {:<10}  {:<9}  {:>4}  {:>8}  Duty period",
        "ID", "Date", "Category", "Legs", "Block"
    )
    .unwrap();

    for trip in trips {
        let id_short: String = trip.id.chars().take(8).collect();
        let block_minutes: i64 = trip
            .legs
            .iter()
            .filter(|leg| !leg.is_deadhead)
            .filter_map(|leg| leg.resolve_block(trip.date))
            .map(|(block_out, block_in)| (block_in - block_out).num_minutes())
            .sum();
        let duty = trip.duty_bounds().map_or_else(
            || "-".to_string(),
            |(start, end)| {
                format!(
                    "{} - {}",
                    start.format("%H:%M"),
                    end.format("%H:%M %Y-%m-%d")
                )
            },
        );

        writeln!(
            output,
            "{:<9}  {:<10}  {:<9}  {:>4}  {:>8}  {}",
            id_short,
            trip.date.format("%Y-%m-%d"),
            trip.category.as_str(),
            trip.legs.len(),
            format_duration(block_minutes),
            duty,
        )
        .unwrap();
    }

    output
}

/// Runs the trips command.
pub fn run(db: &Database) -> Result<()> {
    let trips = db.list_trips()?;
    print!("{}", format_trips(&trips));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use fdt_core::trip::{FlightLeg, TripCategory};

    fn sample_trip() -> Trip {
        Trip {
            id: "a1b2c3d4e5".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            category: TripCategory::Operating,
            duty_start: None,
            duty_end: None,
            legs: vec![FlightLeg {
                id: "leg-1".to_string(),
                departure: "KPDX".to_string(),
                arrival: "KSEA".to_string(),
                out_time: "0800".to_string(),
                off_time: String::new(),
                on_time: String::new(),
                in_time: "1000".to_string(),
                flight_date: None,
                is_deadhead: false,
            }],
        }
    }

    #[test]
    fn empty_history_shows_hint() {
        let output = format_trips(&[]);
        assert!(output.contains("No trips logged."));
        assert!(output.contains("fdt log"));
    }

    #[test]
    fn lists_trip_with_block_and_duty_span() {
        let output = format_trips(&[sample_trip()]);
        assert!(output.contains("a1b2c3d4"));
        assert!(output.contains("2024-01-15"));
        assert!(output.contains("operating"));
        assert!(output.contains("2h 0m"));
        assert!(output.contains("08:00 - 10:00 2024-01-15"));
    }

    #[test]
    fn trip_without_resolvable_times_shows_dash_for_duty() {
        let mut trip = sample_trip();
        trip.legs[0].out_time = String::new();
        trip.legs[0].in_time = String::new();
        let output = format_trips(&[trip]);
        assert!(output.contains("  -"));
    }
}
