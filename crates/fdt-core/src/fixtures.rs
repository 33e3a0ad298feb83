//! Shared test fixtures for building trips and legs.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::trip::{FlightLeg, Trip, TripCategory};

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub(crate) fn leg(out: &str, in_: &str) -> FlightLeg {
    FlightLeg {
        id: format!("leg-{out}-{in_}"),
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

pub(crate) fn deadhead_leg(out: &str, in_: &str) -> FlightLeg {
    FlightLeg {
        is_deadhead: true,
        ..leg(out, in_)
    }
}

pub(crate) fn trip(id: &str, trip_date: NaiveDate, legs: Vec<FlightLeg>) -> Trip {
    Trip {
        id: id.to_string(),
        date: trip_date,
        category: TripCategory::Operating,
        duty_start: None,
        duty_end: None,
        legs,
    }
}

pub(crate) fn trip_with_category(
    id: &str,
    trip_date: NaiveDate,
    category: TripCategory,
    legs: Vec<FlightLeg>,
) -> Trip {
    Trip {
        category,
        ..trip(id, trip_date, legs)
    }
}
