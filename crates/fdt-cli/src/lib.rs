//! Flight/duty-time compliance CLI library.
//!
//! This crate provides the CLI interface for the compliance tracker.

mod cli;
pub mod commands;
mod config;
pub mod device;

pub use cli::{Cli, Commands, DutyAction, LogArgs};
pub use config::Config;
