//! Rolling-window aggregation of flown minutes.
//!
//! All rolling totals (24-hour, 7-day, N-day, annual) reduce to summing leg
//! block durations that fall inside a `[start, end]` window. Two inclusion
//! modes exist because the rolling-24-hour limit must not count legs that are
//! partially elapsed or still open, while the multi-day limits bucket by
//! calendar date.

use chrono::{DateTime, NaiveDate, Utc};

use crate::trip::{Trip, TripCategory};

/// How legs are matched against the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    /// Include a leg if its effective calendar date falls within the
    /// window's date span. Date granularity; used for 7-day, N-day and
    /// annual totals.
    DateBucket,

    /// Include a leg only if its resolved `out` is at or after `start` and
    /// its resolved `in` is at or before `end`. A leg whose `in` does not
    /// resolve (still in progress) never matches.
    Instant,
}

/// Sums flown minutes across `trips` inside `[start, end]`.
///
/// Only `Operating` trips contribute; deadhead legs are excluded from
/// flight-time totals. Incomplete legs and legs whose clock strings fail to
/// parse are excluded, never counted as zero. Identical inputs always produce
/// identical totals.
pub fn minutes_in_window(
    trips: &[Trip],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    mode: WindowMode,
) -> i64 {
    let mut minutes = 0;
    let mut excluded = 0usize;

    for trip in trips {
        if trip.category != TripCategory::Operating {
            continue;
        }
        for leg in &trip.legs {
            if leg.is_deadhead {
                continue;
            }
            if !leg.is_completed() {
                continue;
            }
            let Some((block_out, block_in)) = leg.resolve_block(trip.date) else {
                excluded += 1;
                continue;
            };

            let included = match mode {
                WindowMode::DateBucket => {
                    let effective = leg.effective_date(trip.date);
                    effective >= start.date_naive() && effective <= end.date_naive()
                }
                WindowMode::Instant => block_out >= start && block_in <= end,
            };

            if included {
                minutes += (block_in - block_out).num_minutes();
            }
        }
    }

    if excluded > 0 {
        tracing::debug!(excluded, "legs excluded from window total (unparsable times)");
    }

    minutes
}

/// Flown minutes on a single calendar date.
///
/// The single-day case of date-bucket aggregation; building block for the
/// daily-breakdown view and for locating drop-off dates.
pub fn minutes_on_date(trips: &[Trip], date: NaiveDate) -> i64 {
    let mut minutes = 0;
    for trip in trips {
        if trip.category != TripCategory::Operating {
            continue;
        }
        for leg in &trip.legs {
            if leg.is_deadhead || !leg.is_completed() {
                continue;
            }
            if leg.effective_date(trip.date) != date {
                continue;
            }
            if let Some((block_out, block_in)) = leg.resolve_block(trip.date) {
                minutes += (block_in - block_out).num_minutes();
            }
        }
    }
    minutes
}
