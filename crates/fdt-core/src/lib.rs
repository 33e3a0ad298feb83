//! Core domain logic for flight/duty-time compliance.
//!
//! This crate contains the fundamental types and logic for:
//! - Clock resolution: loose HHMM strings to absolute timestamps
//! - Window aggregation: flown minutes inside rolling windows
//! - Rest-gap scanning: locating the current flight duty period
//! - Compliance evaluation: live status against configurable limits
//! - The duty-session state machine with durable persistence

pub mod clock;
pub mod duty;
pub mod limits;
pub mod rest;
pub mod trip;
pub mod window;

#[cfg(test)]
pub(crate) mod fixtures;

pub use clock::{ClockParseError, ClockTime, parse_clock_time, resolve, resolve_block};
pub use duty::{
    DutyConfig, DutyEvent, DutySession, DutySessionState, DutyStateStore, PersistedDutyState,
};
pub use limits::{
    ComplianceConfiguration, LimitCategory, LimitStatus, LimitWindow, OperationCategory, Severity,
    evaluate,
};
pub use rest::current_fdp_start;
pub use trip::{FlightLeg, Trip, TripCategory};
pub use window::{WindowMode, minutes_in_window, minutes_on_date};
