//! Export command producing the companion-device mirror payload.
//!
//! The payload carries the device identity, the full trip history and the
//! durable duty record `(is_on_duty, started_at)`. A companion device applies
//! it with `fdt import` (typically `ssh <remote> fdt export | fdt import`).

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fdt_core::duty::{DutyStateStore, PersistedDutyState};
use fdt_core::trip::Trip;
use fdt_db::Database;

use crate::device::{self, DeviceIdentity};

/// The companion mirror payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct MirrorPayload {
    pub device: DeviceIdentity,
    pub exported_at: DateTime<Utc>,
    /// The durable duty record, absent when no duty state was ever saved.
    pub duty: Option<PersistedDutyState>,
    pub trips: Vec<Trip>,
}

/// Builds the mirror payload from the database.
pub fn build_payload(
    db: &Database,
    device: DeviceIdentity,
    exported_at: DateTime<Utc>,
) -> Result<MirrorPayload> {
    let trips = db.list_trips()?;
    let duty = DutyStateStore::load(db).context("failed to read duty state")?;
    Ok(MirrorPayload {
        device,
        exported_at,
        duty,
        trips,
    })
}

/// Runs the export command, writing pretty JSON to the writer.
pub fn run<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let device = device::require_device_identity()?;
    let payload = build_payload(db, device, Utc::now())?;
    serde_json::to_writer_pretty(&mut *writer, &payload).context("failed to serialize payload")?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    use fdt_core::trip::{FlightLeg, TripCategory};

    fn identity() -> DeviceIdentity {
        DeviceIdentity {
            device_id: "9f1c0a6e-0000-0000-0000-000000000000".to_string(),
            label: "efb-ipad".to_string(),
        }
    }

    fn sample_trip() -> Trip {
        Trip {
            id: "trip-1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            category: TripCategory::Operating,
            duty_start: None,
            duty_end: None,
            legs: vec![FlightLeg {
                id: "leg-1".to_string(),
                departure: "KPDX".to_string(),
                arrival: "KSEA".to_string(),
                out_time: "2200".to_string(),
                off_time: String::new(),
                on_time: String::new(),
                in_time: "0200".to_string(),
                flight_date: None,
                is_deadhead: false,
            }],
        }
    }

    #[test]
    fn payload_carries_trips_and_duty_record() {
        let mut db = Database::open_in_memory().unwrap();
        db.upsert_trip(&sample_trip()).unwrap();
        let started = Utc.with_ymd_and_hms(2024, 1, 15, 21, 0, 0).unwrap();
        DutyStateStore::save(
            &mut db,
            &PersistedDutyState {
                is_on_duty: true,
                started_at: Some(started),
            },
        )
        .unwrap();

        let exported_at = Utc.with_ymd_and_hms(2024, 1, 16, 8, 0, 0).unwrap();
        let payload = build_payload(&db, identity(), exported_at).unwrap();

        assert_eq!(payload.trips, vec![sample_trip()]);
        assert_eq!(
            payload.duty,
            Some(PersistedDutyState {
                is_on_duty: true,
                started_at: Some(started),
            })
        );
        assert_eq!(payload.device.label, "efb-ipad");
    }

    #[test]
    fn payload_without_duty_state_has_none() {
        let db = Database::open_in_memory().unwrap();
        let exported_at = Utc.with_ymd_and_hms(2024, 1, 16, 8, 0, 0).unwrap();
        let payload = build_payload(&db, identity(), exported_at).unwrap();
        assert!(payload.duty.is_none());
        assert!(payload.trips.is_empty());
    }

    #[test]
    fn payload_json_round_trips() {
        let mut db = Database::open_in_memory().unwrap();
        db.upsert_trip(&sample_trip()).unwrap();

        let exported_at = Utc.with_ymd_and_hms(2024, 1, 16, 8, 0, 0).unwrap();
        let payload = build_payload(&db, identity(), exported_at).unwrap();

        let json = serde_json::to_string(&payload).unwrap();
        let parsed: MirrorPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.trips, payload.trips);
        assert_eq!(parsed.exported_at, exported_at);
        // Raw leg time strings survive the trip through serde renames.
        assert!(json.contains(r#""out":"2200""#));
        assert!(json.contains(r#""in":"0200""#));
    }
}
