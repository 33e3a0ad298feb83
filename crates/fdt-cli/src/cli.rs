//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Flight/duty-time compliance tracker.
///
/// Keeps a logbook of flight legs and evaluates it against configurable
/// regulatory limits (rolling 24-hour, 7-day, N-day and annual flight-time
/// caps, plus the current flight duty period).
#[derive(Debug, Parser)]
#[command(name = "fdt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Establish device identity for companion sync.
    Init {
        /// Human-friendly device label (defaults to the hostname).
        #[arg(long)]
        label: Option<String>,
    },

    /// Record a flight leg.
    Log(LogArgs),

    /// Show live compliance status.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,

        /// Evaluate as of this RFC 3339 instant instead of now.
        #[arg(long)]
        at: Option<String>,
    },

    /// Control the duty timer.
    Duty {
        #[command(subcommand)]
        action: DutyAction,
    },

    /// Daily breakdown of flown time.
    Report {
        /// Number of days to cover, ending today.
        #[arg(long, default_value_t = 7)]
        days: u32,
    },

    /// List logged trips.
    Trips,

    /// Write the companion mirror payload to stdout.
    Export,

    /// Read a companion mirror payload from stdin.
    Import,
}

/// Duty timer actions.
#[derive(Debug, Subcommand)]
pub enum DutyAction {
    /// Start a duty period.
    Start {
        /// RFC 3339 instant to use instead of now.
        #[arg(long)]
        at: Option<String>,
    },
    /// End the duty period and enter rest.
    End {
        #[arg(long)]
        at: Option<String>,
    },
    /// Run one timer tick, firing any pending threshold warnings.
    Tick {
        #[arg(long)]
        at: Option<String>,
    },
}

/// Arguments for `fdt log`.
#[derive(Debug, Args)]
pub struct LogArgs {
    /// Nominal trip date (YYYY-MM-DD).
    #[arg(long)]
    pub date: NaiveDate,

    /// Departure station code.
    #[arg(long = "from")]
    pub departure: String,

    /// Arrival station code.
    #[arg(long = "to")]
    pub arrival: String,

    /// Out time (leaves parking), loose HHMM.
    #[arg(long = "out", default_value = "")]
    pub out_time: String,

    /// Off time (wheels up), loose HHMM.
    #[arg(long = "off", default_value = "")]
    pub off_time: String,

    /// On time (wheels down), loose HHMM.
    #[arg(long = "on", default_value = "")]
    pub on_time: String,

    /// In time (returns to parking), loose HHMM.
    #[arg(long = "in", default_value = "")]
    pub in_time: String,

    /// Explicit leg date when it differs from the trip date.
    #[arg(long)]
    pub flight_date: Option<NaiveDate>,

    /// Mark the leg as a deadhead.
    #[arg(long)]
    pub deadhead: bool,

    /// Trip category: operating, deadhead or simulator.
    #[arg(long, default_value = "operating")]
    pub category: String,

    /// Append to an existing trip instead of creating one.
    #[arg(long)]
    pub trip: Option<String>,
}
