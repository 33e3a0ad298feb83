//! Trip and flight-leg data model.

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::clock;

/// Category of a trip. Only `Operating` trips count toward compliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TripCategory {
    #[default]
    Operating,
    Deadhead,
    Simulator,
}

impl TripCategory {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Operating => "operating",
            Self::Deadhead => "deadhead",
            Self::Simulator => "simulator",
        }
    }
}

impl std::fmt::Display for TripCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TripCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "operating" => Ok(Self::Operating),
            "deadhead" => Ok(Self::Deadhead),
            "simulator" => Ok(Self::Simulator),
            _ => Err(format!("invalid trip category: {s}")),
        }
    }
}

/// One flight leg with manually- or automatically-recorded clock times.
///
/// The four time fields are raw clock strings ("0800", "8:00", possibly
/// empty), interpreted by [`crate::clock`]. A leg with either `out` or `in`
/// blank is incomplete and is excluded from completed-leg calculations; it is
/// never treated as zero-duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightLeg {
    pub id: String,
    pub departure: String,
    pub arrival: String,

    /// Leaves parking.
    #[serde(rename = "out")]
    pub out_time: String,
    /// Wheels up.
    #[serde(rename = "off")]
    pub off_time: String,
    /// Wheels down.
    #[serde(rename = "on")]
    pub on_time: String,
    /// Returns to parking.
    #[serde(rename = "in")]
    pub in_time: String,

    /// Explicit calendar date overriding the owning trip's nominal date.
    #[serde(default)]
    pub flight_date: Option<NaiveDate>,

    /// Deadhead legs are excluded from flight-time totals.
    #[serde(default)]
    pub is_deadhead: bool,
}

impl FlightLeg {
    /// True when both `out` and `in` carry a value.
    ///
    /// Only completed legs are usable in window aggregation; whether the
    /// values actually parse is decided at resolution time.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        !self.out_time.trim().is_empty() && !self.in_time.trim().is_empty()
    }

    /// The calendar date this leg's times are anchored on.
    #[must_use]
    pub fn effective_date(&self, trip_date: NaiveDate) -> NaiveDate {
        self.flight_date.unwrap_or(trip_date)
    }

    /// Resolves the leg's block as absolute timestamps, or `None` if the leg
    /// is incomplete or either endpoint fails to parse.
    #[must_use]
    pub fn resolve_block(&self, trip_date: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        if !self.is_completed() {
            return None;
        }
        clock::resolve_block(&self.out_time, &self.in_time, self.effective_date(trip_date))
    }
}

/// A trip: a nominal calendar date anchoring an ordered sequence of legs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub category: TripCategory,

    /// Explicit duty-period bounds, overriding derivation from leg times.
    #[serde(default)]
    pub duty_start: Option<String>,
    #[serde(default)]
    pub duty_end: Option<String>,

    pub legs: Vec<FlightLeg>,
}

impl Trip {
    /// Duty bounds for this trip.
    ///
    /// Explicit `duty_start`/`duty_end` strings win; otherwise bounds are
    /// derived from the first leg's `out` and the last completed leg's `in`.
    /// Returns `None` when neither source resolves.
    #[must_use]
    pub fn duty_bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = match &self.duty_start {
            Some(raw) => clock::resolve(raw, self.date),
            None => self.legs.iter().find_map(|leg| {
                clock::resolve(&leg.out_time, leg.effective_date(self.date))
            }),
        }?;

        let end = match &self.duty_end {
            Some(raw) => {
                // Duty end gets the same rollover treatment as a leg in-time.
                let end_clock = clock::parse_clock_time(raw).ok()?;
                let end_date = if start.hour() >= 12 && end_clock.hour < 12 {
                    self.date.succ_opt()?
                } else {
                    self.date
                };
                end_clock.on(end_date)
            }
            None => self
                .legs
                .iter()
                .rev()
                .find(|leg| leg.is_completed())
                .and_then(|leg| leg.resolve_block(self.date))
                .map(|(_, block_in)| block_in),
        }?;

        Some((start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{date, leg};

    #[test]
    fn trip_category_round_trips() {
        for cat in [TripCategory::Operating, TripCategory::Deadhead, TripCategory::Simulator] {
            assert_eq!(cat.as_str().parse::<TripCategory>().unwrap(), cat);
        }
        assert!("positioning".parse::<TripCategory>().is_err());
    }

    #[test]
    fn completed_requires_both_endpoints() {
        assert!(leg("0800", "1000").is_completed());
        assert!(!leg("", "1000").is_completed());
        assert!(!leg("0800", "").is_completed());
        assert!(!leg("0800", "   ").is_completed());
    }

    #[test]
    fn effective_date_prefers_flight_date() {
        let mut l = leg("0800", "1000");
        assert_eq!(l.effective_date(date(2024, 3, 1)), date(2024, 3, 1));
        l.flight_date = Some(date(2024, 3, 2));
        assert_eq!(l.effective_date(date(2024, 3, 1)), date(2024, 3, 2));
    }

    #[test]
    fn duty_bounds_derived_from_legs() {
        let trip = Trip {
            id: "trip-1".to_string(),
            date: date(2024, 1, 15),
            category: TripCategory::Operating,
            duty_start: None,
            duty_end: None,
            legs: vec![leg("0800", "1000"), leg("1100", "1330")],
        };
        let (start, end) = trip.duty_bounds().unwrap();
        assert_eq!(start.to_rfc3339(), "2024-01-15T08:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-01-15T13:30:00+00:00");
    }

    #[test]
    fn duty_bounds_honor_explicit_overrides() {
        let trip = Trip {
            id: "trip-1".to_string(),
            date: date(2024, 1, 15),
            category: TripCategory::Operating,
            duty_start: Some("0700".to_string()),
            duty_end: Some("1500".to_string()),
            legs: vec![leg("0800", "1000")],
        };
        let (start, end) = trip.duty_bounds().unwrap();
        assert_eq!(start.to_rfc3339(), "2024-01-15T07:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-01-15T15:00:00+00:00");
    }

    #[test]
    fn duty_bounds_roll_over_for_overnight_duty() {
        let trip = Trip {
            id: "trip-1".to_string(),
            date: date(2024, 1, 15),
            category: TripCategory::Operating,
            duty_start: Some("2100".to_string()),
            duty_end: Some("0300".to_string()),
            legs: vec![],
        };
        let (start, end) = trip.duty_bounds().unwrap();
        assert_eq!(end - start, chrono::Duration::hours(6));
    }

    #[test]
    fn duty_bounds_none_when_nothing_resolves() {
        let trip = Trip {
            id: "trip-1".to_string(),
            date: date(2024, 1, 15),
            category: TripCategory::Operating,
            duty_start: None,
            duty_end: None,
            legs: vec![leg("", "")],
        };
        assert!(trip.duty_bounds().is_none());
    }
}
