//! Rest-gap scanning: locating the start of the current flight duty period.
//!
//! The FDP is approximated as the time since the most recent qualifying rest
//! gap, so the scan runs backward from the newest leg. A forward scan would
//! anchor on the oldest rest period in history instead of the one that
//! actually bounds the current duty period.

use chrono::{DateTime, Duration, Utc};

use crate::trip::{Trip, TripCategory};

/// Fallback window when no qualifying rest gap exists in the history.
const FALLBACK_LOOKBACK_HOURS: i64 = 24;

/// Returns the instant the current flight duty period began.
///
/// Builds the chronological `(out, in)` pairs of all completed, non-deadhead
/// legs of operating trips with `in <= as_of`, then scans backward for the
/// first idle gap of at least `min_rest_hours`. The leg after that gap marks
/// the FDP start. With fewer than two legs, or no gap large enough,
/// `as_of - 24h` is the conservative default.
#[allow(clippy::cast_possible_truncation)]
pub fn current_fdp_start(trips: &[Trip], as_of: DateTime<Utc>, min_rest_hours: f64) -> DateTime<Utc> {
    let mut blocks: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::new();
    for trip in trips {
        if trip.category != TripCategory::Operating {
            continue;
        }
        for leg in &trip.legs {
            if leg.is_deadhead {
                continue;
            }
            if let Some((block_out, block_in)) = leg.resolve_block(trip.date) {
                if block_in <= as_of {
                    blocks.push((block_out, block_in));
                }
            }
        }
    }
    blocks.sort_by_key(|(block_out, _)| *block_out);

    let min_rest = Duration::seconds((min_rest_hours * 3600.0) as i64);
    for i in (1..blocks.len()).rev() {
        let gap = blocks[i].0 - blocks[i - 1].1;
        if gap >= min_rest {
            return blocks[i].0;
        }
    }

    as_of - Duration::hours(FALLBACK_LOOKBACK_HOURS)
}
