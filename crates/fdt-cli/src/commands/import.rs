//! Import command applying a companion mirror payload.

use std::io::Read;

use anyhow::{Context, Result};

use fdt_core::duty::DutyStateStore;
use fdt_db::Database;

use super::export::MirrorPayload;

/// Result of applying a payload, for display.
#[derive(Debug, PartialEq, Eq)]
pub struct ImportReport {
    pub source_label: String,
    pub trips: usize,
    pub duty_applied: bool,
}

/// Parses a mirror payload from a reader.
pub fn parse_payload<R: Read>(mut reader: R) -> Result<MirrorPayload> {
    let mut raw = String::new();
    reader
        .read_to_string(&mut raw)
        .context("failed to read payload")?;
    serde_json::from_str(&raw).context("invalid mirror payload")
}

/// Applies a payload: upserts every trip and mirrors the duty record.
pub fn apply_payload(db: &mut Database, payload: &MirrorPayload) -> Result<ImportReport> {
    for trip in &payload.trips {
        db.upsert_trip(trip)
            .with_context(|| format!("failed to store trip {}", trip.id))?;
    }

    let duty_applied = if let Some(duty) = &payload.duty {
        DutyStateStore::save(db, duty).context("failed to mirror duty state")?;
        true
    } else {
        false
    };

    Ok(ImportReport {
        source_label: payload.device.label.clone(),
        trips: payload.trips.len(),
        duty_applied,
    })
}

/// Runs the import command, reading the payload from stdin.
pub fn run(db: &mut Database) -> Result<()> {
    let stdin = std::io::stdin();
    let payload = parse_payload(stdin.lock())?;
    let report = apply_payload(db, &payload)?;

    println!(
        "Imported {} trip(s) from {}",
        report.trips, report.source_label
    );
    if report.duty_applied {
        println!("Duty state mirrored");
    }
    Ok(())
}
