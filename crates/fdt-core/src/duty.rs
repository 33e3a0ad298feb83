//! Duty-session state machine.
//!
//! States: `Off` -> `On` (via [`DutySession::start_duty`]) -> `Rest`/`Off`
//! (via [`DutySession::end_duty`]). While on duty, an externally-driven
//! [`DutySession::tick`] recomputes elapsed time from `now - started_at` and
//! fires each configured warning threshold at most once per duty period.
//!
//! The machine owns the one piece of mutable shared state in the engine, so
//! start/end/tick take `&mut self` and are mutually exclusive by
//! construction. Persistence goes through the [`DutyStateStore`] seam:
//! `start_duty`/`end_duty` do not return `Ok` until the new state is durably
//! saved, since silently losing that write would convert an active duty
//! period into "not on duty" on the next load.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The durable duty record, mirrored to the companion-device sync channel on
/// every state change.
///
/// Elapsed time is always reconstructed as `now - started_at`; a separately
/// stored counter would drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedDutyState {
    pub is_on_duty: bool,
    pub started_at: Option<DateTime<Utc>>,
}

/// Full in-memory session state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DutySessionState {
    pub is_on_duty: bool,
    pub started_at: Option<DateTime<Utc>>,

    /// Warning thresholds (in minutes) that have already fired this duty
    /// period.
    pub fired_thresholds: BTreeSet<i64>,

    /// Set while in the rest period immediately following duty end.
    pub is_in_rest: bool,
    pub rest_started_at: Option<DateTime<Utc>>,
}

impl DutySessionState {
    /// Reconstructs session state from a persisted record.
    ///
    /// If the record says on-duty, the already-fired set is rebuilt by
    /// replaying which thresholds the recomputed elapsed time strictly
    /// exceeds, so a restart past a threshold neither re-fires nor skips it.
    /// A threshold the restart lands on exactly is left unfired and goes out
    /// with the next tick.
    #[must_use]
    pub fn replayed(
        persisted: Option<PersistedDutyState>,
        config: &DutyConfig,
        now: DateTime<Utc>,
    ) -> Self {
        let Some(persisted) = persisted else {
            return Self::default();
        };
        if !persisted.is_on_duty {
            return Self::default();
        }

        let mut state = Self {
            is_on_duty: true,
            started_at: persisted.started_at,
            ..Self::default()
        };
        if let Some(started_at) = persisted.started_at {
            let elapsed = elapsed_since(started_at, now);
            for threshold_minutes in config.threshold_minutes() {
                if elapsed > Duration::minutes(threshold_minutes) {
                    state.fired_thresholds.insert(threshold_minutes);
                }
            }
        }
        state
    }
}

/// Warning-threshold configuration for the duty timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DutyConfig {
    /// Elapsed-time marks (hours) at which a warning fires, e.g. 14, 15,
    /// 15.5 and 16 for a 16-hour duty cap.
    pub warning_thresholds_hours: Vec<f64>,
}

impl Default for DutyConfig {
    fn default() -> Self {
        Self {
            warning_thresholds_hours: vec![14.0, 15.0, 15.5, 16.0],
        }
    }
}

impl DutyConfig {
    /// Thresholds as whole minutes, ascending and deduplicated.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn threshold_minutes(&self) -> Vec<i64> {
        let mut minutes: Vec<i64> = self
            .warning_thresholds_hours
            .iter()
            .map(|hours| (hours * 60.0).round() as i64)
            .collect();
        minutes.sort_unstable();
        minutes.dedup();
        minutes
    }
}

/// Discrete events produced by duty-session mutations.
///
/// Callers forward these to whatever notification mechanism they use; the
/// engine does not own delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DutyEvent {
    StateChanged {
        is_on_duty: bool,
        started_at: Option<DateTime<Utc>>,
    },
    ThresholdCrossed {
        threshold_hours: f64,
    },
    RestPeriodStarted {
        at: DateTime<Utc>,
    },
}

/// Durable storage seam for the duty record.
pub trait DutyStateStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn load(&self) -> Result<Option<PersistedDutyState>, Self::Error>;
    fn save(&mut self, state: &PersistedDutyState) -> Result<(), Self::Error>;
}

/// The duty-session service object.
///
/// Constructed once and passed by handle to consumers; never ambient global
/// state, so it stays independently testable with fabricated stores and
/// clocks.
#[derive(Debug)]
pub struct DutySession<S> {
    state: DutySessionState,
    config: DutyConfig,
    store: S,
}

impl<S: DutyStateStore> DutySession<S> {
    /// Restores a session from the store.
    ///
    /// A read failure defaults to off-duty: failing safe beats falsely
    /// claiming an active, unbounded duty period.
    pub fn restore(store: S, config: DutyConfig, now: DateTime<Utc>) -> Self {
        let persisted = match store.load() {
            Ok(persisted) => persisted,
            Err(error) => {
                tracing::warn!(%error, "failed to load duty state, defaulting to off-duty");
                None
            }
        };
        let state = DutySessionState::replayed(persisted, &config, now);
        Self { state, config, store }
    }

    /// Current session state.
    #[must_use]
    pub const fn state(&self) -> &DutySessionState {
        &self.state
    }

    /// Elapsed time in the current duty period, clamped to zero when the
    /// clock has gone backward.
    #[must_use]
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        match (self.state.is_on_duty, self.state.started_at) {
            (true, Some(started_at)) => elapsed_since(started_at, now),
            _ => Duration::zero(),
        }
    }

    /// Starts a duty period.
    ///
    /// No-op (no events) when already on duty. The new record is persisted
    /// before the in-memory state changes; a failed save leaves the session
    /// untouched and is surfaced to the caller.
    pub fn start_duty(&mut self, now: DateTime<Utc>) -> Result<Vec<DutyEvent>, S::Error> {
        if self.state.is_on_duty {
            tracing::warn!("start_duty called while already on duty");
            return Ok(Vec::new());
        }

        let next = PersistedDutyState {
            is_on_duty: true,
            started_at: Some(now),
        };
        self.store.save(&next)?;

        self.state = DutySessionState {
            is_on_duty: true,
            started_at: Some(now),
            ..DutySessionState::default()
        };
        tracing::info!(started_at = %now, "duty period started");
        Ok(vec![DutyEvent::StateChanged {
            is_on_duty: true,
            started_at: Some(now),
        }])
    }

    /// Ends the duty period and enters rest.
    ///
    /// Persists the off-duty record before mutating; a failed save leaves the
    /// session on duty and is surfaced to the caller. Once the save has
    /// landed, any in-flight tick observes off-duty and becomes a no-op.
    pub fn end_duty(&mut self, now: DateTime<Utc>) -> Result<Vec<DutyEvent>, S::Error> {
        if !self.state.is_on_duty {
            tracing::warn!("end_duty called while not on duty");
            return Ok(Vec::new());
        }

        let next = PersistedDutyState {
            is_on_duty: false,
            started_at: None,
        };
        self.store.save(&next)?;

        let elapsed = self.elapsed(now);
        tracing::info!(minutes = elapsed.num_minutes(), "duty period ended");

        self.state = DutySessionState {
            is_in_rest: true,
            rest_started_at: Some(now),
            ..DutySessionState::default()
        };
        Ok(vec![
            DutyEvent::StateChanged {
                is_on_duty: false,
                started_at: None,
            },
            DutyEvent::RestPeriodStarted { at: now },
        ])
    }

    /// Periodic tick: checks elapsed time against the warning thresholds.
    ///
    /// Each threshold fires exactly once per duty period, in ascending order,
    /// even when a single tick lands past several at once. Off duty, this is
    /// a no-op.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<DutyEvent> {
        if !self.state.is_on_duty {
            return Vec::new();
        }
        let elapsed = self.elapsed(now);

        let mut events = Vec::new();
        for threshold_minutes in self.config.threshold_minutes() {
            if self.state.fired_thresholds.contains(&threshold_minutes) {
                continue;
            }
            if elapsed >= Duration::minutes(threshold_minutes) {
                self.state.fired_thresholds.insert(threshold_minutes);
                #[allow(clippy::cast_precision_loss)]
                let threshold_hours = threshold_minutes as f64 / 60.0;
                tracing::info!(threshold_hours, "duty warning threshold crossed");
                events.push(DutyEvent::ThresholdCrossed { threshold_hours });
            }
        }
        events
    }
}

/// `now - started_at`, clamped to zero for backward/skewed clocks so a
/// negative duration cannot suppress legitimate warnings.
fn elapsed_since(started_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (now - started_at).max(Duration::zero())
}
