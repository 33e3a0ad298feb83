//! Storage layer for the flight/duty-time tracker.
//!
//! Provides persistence for trips, legs and duty-session state using
//! `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but
//! not `Sync`. A `Database` instance can be moved between threads but cannot
//! be shared across threads without external synchronization. For
//! multi-threaded access, use a `Mutex<Database>` or separate instances per
//! thread.
//!
//! # Schema
//!
//! Dates are stored as TEXT in `YYYY-MM-DD` form and timestamps as ISO 8601
//! TEXT (e.g. `2024-01-15T10:30:00Z`), so lexicographic ordering matches
//! chronological ordering and values stay human-readable.
//!
//! The `app_state` table is a generic durable key-value store with
//! namespaced keys. The duty record lives under `duty/session`, where the
//! companion-device sync channel picks it up.

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use thiserror::Error;

use fdt_core::duty::{DutyStateStore, PersistedDutyState};
use fdt_core::trip::{FlightLeg, Trip, TripCategory};

/// Key under which the duty-session record is persisted.
pub const DUTY_STATE_KEY: &str = "duty/session";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to parse a stored date.
    #[error("invalid date for trip {trip_id}: {value}")]
    DateParse {
        trip_id: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A stored trip category was not recognized.
    #[error("invalid category for trip {trip_id}: {value}")]
    InvalidCategory { trip_id: String, value: String },

    /// Stored duty state was not valid JSON.
    #[error("invalid duty state record: {0}")]
    InvalidStateJson(#[from] serde_json::Error),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection
    /// closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// Idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS trips (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                category TEXT NOT NULL DEFAULT 'operating',
                duty_start TEXT,
                duty_end TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_trips_date ON trips(date);

            -- Legs table: raw clock-time strings exactly as recorded.
            -- Resolution to absolute timestamps happens in fdt-core.
            CREATE TABLE IF NOT EXISTS legs (
                id TEXT PRIMARY KEY,
                trip_id TEXT NOT NULL,
                seq INTEGER NOT NULL,
                departure TEXT NOT NULL,
                arrival TEXT NOT NULL,
                out_time TEXT NOT NULL DEFAULT '',
                off_time TEXT NOT NULL DEFAULT '',
                on_time TEXT NOT NULL DEFAULT '',
                in_time TEXT NOT NULL DEFAULT '',
                flight_date TEXT,
                is_deadhead INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (trip_id) REFERENCES trips(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_legs_trip ON legs(trip_id);
            CREATE INDEX IF NOT EXISTS idx_legs_flight_date ON legs(flight_date);

            CREATE TABLE IF NOT EXISTS app_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Inserts or replaces a trip and its legs.
    ///
    /// Replacing rewrites the leg set so removed legs do not linger.
    #[allow(clippy::cast_possible_wrap)]
    pub fn upsert_trip(&mut self, trip: &Trip) -> Result<(), DbError> {
        let now = format_timestamp(Utc::now());
        let tx = self.conn.transaction()?;
        {
            tx.execute(
                "
                INSERT INTO trips (id, date, category, duty_start, duty_end, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    date = excluded.date,
                    category = excluded.category,
                    duty_start = excluded.duty_start,
                    duty_end = excluded.duty_end,
                    updated_at = excluded.updated_at
                ",
                params![
                    trip.id,
                    format_date(trip.date),
                    trip.category.as_str(),
                    trip.duty_start,
                    trip.duty_end,
                    now,
                    now,
                ],
            )?;
            tx.execute("DELETE FROM legs WHERE trip_id = ?", params![trip.id])?;

            let mut stmt = tx.prepare(
                "
                INSERT INTO legs
                (id, trip_id, seq, departure, arrival, out_time, off_time, on_time, in_time, flight_date, is_deadhead)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ",
            )?;
            for (seq, leg) in trip.legs.iter().enumerate() {
                stmt.execute(params![
                    leg.id,
                    trip.id,
                    seq as i64,
                    leg.departure,
                    leg.arrival,
                    leg.out_time,
                    leg.off_time,
                    leg.on_time,
                    leg.in_time,
                    leg.flight_date.map(format_date),
                    i64::from(leg.is_deadhead),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Lists all trips with their legs, ordered by date then ID.
    pub fn list_trips(&self) -> Result<Vec<Trip>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, date, category, duty_start, duty_end
            FROM trips
            ORDER BY date ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })?;

        let mut trips = Vec::new();
        for row in rows {
            let (id, date, category, duty_start, duty_end) = row?;
            let date = parse_date(&id, &date)?;
            let category = category
                .parse::<TripCategory>()
                .map_err(|_| DbError::InvalidCategory {
                    trip_id: id.clone(),
                    value: category,
                })?;
            trips.push(Trip {
                id,
                date,
                category,
                duty_start,
                duty_end,
                legs: Vec::new(),
            });
        }

        let mut stmt = self.conn.prepare(
            "
            SELECT trip_id, id, departure, arrival, out_time, off_time, on_time, in_time, flight_date, is_deadhead
            FROM legs
            ORDER BY trip_id ASC, seq ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                FlightLeg {
                    id: row.get(1)?,
                    departure: row.get(2)?,
                    arrival: row.get(3)?,
                    out_time: row.get(4)?,
                    off_time: row.get(5)?,
                    on_time: row.get(6)?,
                    in_time: row.get(7)?,
                    flight_date: None,
                    is_deadhead: row.get::<_, i64>(9)? != 0,
                },
                row.get::<_, Option<String>>(8)?,
            ))
        })?;

        for row in rows {
            let (trip_id, mut leg, flight_date) = row?;
            if let Some(raw) = flight_date {
                leg.flight_date = Some(parse_date(&trip_id, &raw)?);
            }
            if let Some(trip) = trips.iter_mut().find(|t| t.id == trip_id) {
                trip.legs.push(leg);
            } else {
                tracing::warn!(trip_id, leg_id = leg.id, "orphaned leg row skipped");
            }
        }

        Ok(trips)
    }

    /// Deletes a trip and its legs. Returns true if a row was removed.
    pub fn delete_trip(&mut self, trip_id: &str) -> Result<bool, DbError> {
        let removed = self
            .conn
            .execute("DELETE FROM trips WHERE id = ?", params![trip_id])?;
        Ok(removed > 0)
    }

    /// Reads a value from the durable key-value store.
    pub fn state_get(&self, key: &str) -> Result<Option<String>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM app_state WHERE key = ?")?;
        let mut rows = stmt.query_map(params![key], |row| row.get::<_, String>(0))?;
        match rows.next() {
            Some(value) => Ok(Some(value?)),
            None => Ok(None),
        }
    }

    /// Writes a value to the durable key-value store.
    pub fn state_set(&mut self, key: &str, value: &str) -> Result<(), DbError> {
        let now = format_timestamp(Utc::now());
        self.conn.execute(
            "
            INSERT INTO app_state (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
            params![key, value, now],
        )?;
        Ok(())
    }
}

impl DutyStateStore for Database {
    type Error = DbError;

    fn load(&self) -> Result<Option<PersistedDutyState>, DbError> {
        match self.state_get(DUTY_STATE_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, state: &PersistedDutyState) -> Result<(), DbError> {
        let json = serde_json::to_string(state)?;
        self.state_set(DUTY_STATE_KEY, &json)
    }
}

/// Formats a timestamp for storage.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Formats a date for storage.
fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_date(trip_id: &str, value: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|source| DbError::DateParse {
        trip_id: trip_id.to_string(),
        value: value.to_string(),
        source,
    })
}
