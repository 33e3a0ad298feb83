//! Log command for recording flight legs.

use anyhow::{Context, Result, anyhow};
use uuid::Uuid;

use fdt_core::trip::{FlightLeg, Trip, TripCategory};
use fdt_db::Database;

use crate::LogArgs;

/// Outcome of a log invocation, for display.
#[derive(Debug)]
pub struct LoggedLeg {
    pub trip_id: String,
    pub leg_id: String,
    pub created_trip: bool,
}

/// Runs the log command.
pub fn run(db: &mut Database, args: &LogArgs) -> Result<()> {
    let logged = log_leg(db, args)?;

    if logged.created_trip {
        println!("Created trip {}", logged.trip_id);
    }
    println!(
        "Logged leg {} ({} -> {})",
        logged.leg_id, args.departure, args.arrival
    );
    Ok(())
}

/// Appends a leg to an existing trip or creates a new one.
pub fn log_leg(db: &mut Database, args: &LogArgs) -> Result<LoggedLeg> {
    let category = args
        .category
        .parse::<TripCategory>()
        .map_err(|e| anyhow!(e))?;

    let leg = FlightLeg {
        id: Uuid::new_v4().to_string(),
        departure: args.departure.clone(),
        arrival: args.arrival.clone(),
        out_time: args.out_time.clone(),
        off_time: args.off_time.clone(),
        on_time: args.on_time.clone(),
        in_time: args.in_time.clone(),
        flight_date: args.flight_date,
        is_deadhead: args.deadhead,
    };
    let leg_id = leg.id.clone();

    let (mut trip, created_trip) = match &args.trip {
        Some(trip_id) => {
            let trip = db
                .list_trips()?
                .into_iter()
                .find(|t| t.id == *trip_id)
                .with_context(|| format!("no trip with ID {trip_id}"))?;
            (trip, false)
        }
        None => (
            Trip {
                id: Uuid::new_v4().to_string(),
                date: args.date,
                category,
                duty_start: None,
                duty_end: None,
                legs: Vec::new(),
            },
            true,
        ),
    };

    trip.legs.push(leg);
    db.upsert_trip(&trip)?;

    Ok(LoggedLeg {
        trip_id: trip.id,
        leg_id,
        created_trip,
    })
}
