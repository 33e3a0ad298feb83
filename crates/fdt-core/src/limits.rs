//! Compliance evaluation against configurable regulatory limits.
//!
//! [`evaluate`] orchestrates window aggregation and rest-gap scanning against
//! a [`ComplianceConfiguration`] to produce one [`LimitStatus`] per enabled
//! limit category. Evaluation is pure: the same trip snapshot, configuration,
//! duty state and `as_of` instant always produce identical results.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::duty::DutySessionState;
use crate::rest;
use crate::trip::Trip;
use crate::window::{self, WindowMode};

/// Operation category the configuration applies to.
///
/// Part 91 operations carry no flight/duty limits; evaluation for them
/// short-circuits to an empty status list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OperationCategory {
    Part91,
    #[default]
    Part121,
    Part135,
}

impl OperationCategory {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Part91 => "part91",
            Self::Part121 => "part121",
            Self::Part135 => "part135",
        }
    }

    /// Whether limit tracking applies at all.
    #[must_use]
    pub const fn tracks_limits(&self) -> bool {
        !matches!(self, Self::Part91)
    }
}

impl std::fmt::Display for OperationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookback window shape for one limit category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LimitWindow {
    /// Rolling 24 hours, instant granularity: partially-elapsed and open
    /// legs never count.
    Rolling24h,
    /// Rolling N days, calendar-date granularity.
    Days { days: u32 },
    /// Rolling 365 days, calendar-date granularity.
    Annual,
    /// The current flight duty period. When `resets_after_rest` is set the
    /// window starts at the most recent qualifying rest gap; otherwise a
    /// fixed 24-hour lookback is used.
    DutyPeriod { resets_after_rest: bool },
}

impl LimitWindow {
    /// Human-readable period description for display.
    #[must_use]
    pub fn period_description(&self) -> String {
        match self {
            Self::Rolling24h => "rolling 24 hours".to_string(),
            Self::Days { days } => format!("last {days} days"),
            Self::Annual => "last 365 days".to_string(),
            Self::DutyPeriod { .. } => "current duty period".to_string(),
        }
    }
}

/// One independently-enabled regulatory limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitCategory {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub limit_hours: f64,
    pub window: LimitWindow,
    pub label: String,
    pub citation: String,
}

const fn default_enabled() -> bool {
    true
}

/// Full compliance configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceConfiguration {
    pub operation: OperationCategory,

    /// Percentage of a limit at which severity becomes `Warning`.
    pub warning_threshold_pct: f64,
    /// Percentage of a limit at which severity becomes `Critical`.
    pub critical_threshold_pct: f64,

    /// Minimum idle interval that qualifies as rest.
    pub min_rest_hours: f64,

    pub categories: Vec<LimitCategory>,
}

impl Default for ComplianceConfiguration {
    fn default() -> Self {
        let category = |limit_hours: f64, window: LimitWindow, label: &str, citation: &str| {
            LimitCategory {
                enabled: true,
                limit_hours,
                window,
                label: label.to_string(),
                citation: citation.to_string(),
            }
        };
        Self {
            operation: OperationCategory::default(),
            warning_threshold_pct: 90.0,
            critical_threshold_pct: 95.0,
            min_rest_hours: 10.0,
            categories: vec![
                category(
                    8.0,
                    LimitWindow::Rolling24h,
                    "Flight time, 24 hours",
                    "14 CFR 135.267(b)",
                ),
                category(
                    32.0,
                    LimitWindow::Days { days: 7 },
                    "Flight time, 7 days",
                    "14 CFR 117.23(b)(1)",
                ),
                category(
                    100.0,
                    LimitWindow::Days { days: 28 },
                    "Flight time, 28 days",
                    "14 CFR 117.23(b)(2)",
                ),
                category(
                    1000.0,
                    LimitWindow::Annual,
                    "Flight time, 365 days",
                    "14 CFR 117.23(b)(3)",
                ),
                category(
                    14.0,
                    LimitWindow::DutyPeriod {
                        resets_after_rest: true,
                    },
                    "Flight duty period",
                    "14 CFR 117.13",
                ),
            ],
        }
    }
}

/// Severity of a limit status, derived purely from `current / limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Warning,
    Critical,
    OverLimit,
}

impl Severity {
    /// Classifies a current value against a limit.
    ///
    /// The critical boundary is inclusive on the at-limit side; `OverLimit`
    /// requires strictly exceeding the limit.
    #[must_use]
    pub fn classify(current_hours: f64, limit_hours: f64, warning_pct: f64, critical_pct: f64) -> Self {
        if current_hours > limit_hours {
            return Self::OverLimit;
        }
        let pct = current_hours / limit_hours * 100.0;
        if pct >= critical_pct {
            Self::Critical
        } else if pct >= warning_pct {
            Self::Warning
        } else {
            Self::Normal
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::OverLimit => "over_limit",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Live status of one limit category. Computed fresh per evaluation, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LimitStatus {
    pub label: String,
    pub citation: String,
    pub current_hours: f64,
    pub limit_hours: f64,
    pub severity: Severity,
    pub period: String,
}

/// Evaluates all enabled limit categories as of a given instant.
///
/// The trip slice is treated as an immutable snapshot for the duration of
/// the call; no wall clock is consulted.
pub fn evaluate(
    trips: &[Trip],
    config: &ComplianceConfiguration,
    duty_state: &DutySessionState,
    as_of: DateTime<Utc>,
) -> Vec<LimitStatus> {
    if !config.operation.tracks_limits() {
        return Vec::new();
    }

    let mut statuses = Vec::new();
    for category in &config.categories {
        if !category.enabled {
            continue;
        }

        let minutes = match category.window {
            LimitWindow::Rolling24h => window::minutes_in_window(
                trips,
                as_of - Duration::hours(24),
                as_of,
                WindowMode::Instant,
            ),
            LimitWindow::Days { days } => window::minutes_in_window(
                trips,
                as_of - Duration::days(i64::from(days)),
                as_of,
                WindowMode::DateBucket,
            ),
            LimitWindow::Annual => window::minutes_in_window(
                trips,
                as_of - Duration::days(365),
                as_of,
                WindowMode::DateBucket,
            ),
            LimitWindow::DutyPeriod { resets_after_rest } => {
                if duty_state.is_in_rest || !duty_state.is_on_duty {
                    // No active FDP while not on duty.
                    0
                } else {
                    let start = if resets_after_rest {
                        rest::current_fdp_start(trips, as_of, config.min_rest_hours)
                    } else {
                        as_of - Duration::hours(24)
                    };
                    window::minutes_in_window(trips, start, as_of, WindowMode::Instant)
                }
            }
        };

        #[allow(clippy::cast_precision_loss)]
        let current_hours = minutes as f64 / 60.0;
        statuses.push(LimitStatus {
            label: category.label.clone(),
            citation: category.citation.clone(),
            current_hours,
            limit_hours: category.limit_hours,
            severity: Severity::classify(
                current_hours,
                category.limit_hours,
                config.warning_threshold_pct,
                config.critical_threshold_pct,
            ),
            period: category.window.period_description(),
        });
    }

    statuses
}
