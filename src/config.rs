//! Command-line configuration.

use crate::data::InjuryCategory;
use crate::logging::Verbosity;
use crate::views::{DashboardSettings, MAX_HOUR, MAX_THRESHOLD};
use clap::Parser;
use std::path::PathBuf;

/// NYC Crash Explorer - interactive map and chart dashboard over a vehicle
/// crash CSV.
#[derive(Debug, Parser)]
#[command(name = "crash_explorer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Crash dataset to load
    #[arg(long, value_name = "FILE", default_value = "VehicleCrashes.csv")]
    pub data: PathBuf,

    /// Stylesheet applied to the dashboard
    #[arg(long, value_name = "FILE", default_value = "index.css")]
    pub style: PathBuf,

    /// Maximum number of rows read from the dataset
    #[arg(long, value_name = "N", default_value_t = 100_000)]
    pub rows: usize,

    /// Print the dashboard views as JSON instead of opening a window
    #[arg(long)]
    pub snapshot: bool,

    /// Minimum number of injured people shown on the map
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(0..=MAX_THRESHOLD as i64))]
    pub threshold: u32,

    /// Hour of the day for the density map and histogram
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=MAX_HOUR as i64))]
    pub hour: u32,

    /// Injured people category for the street ranking
    #[arg(long, default_value = "Pedestrians")]
    pub category: String,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Get the verbosity level based on flags.
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }

    /// Initial control values.
    pub fn settings(&self) -> DashboardSettings {
        DashboardSettings {
            threshold: self.threshold,
            hour: self.hour,
            category: InjuryCategory::from_label(&self.category),
            show_raw: false,
        }
    }
}
