//! Data module - CSV loading and filtering

mod loader;
mod processor;

pub use loader::CrashLoader;
pub use processor::{CrashFilter, GeoPoint, InjuryCategory, ProcessorError, StreetCount};

/// Canonical column names after normalization.
pub mod columns {
    pub const DATE_TIME: &str = "date_time";
    pub const CRASH_DATE: &str = "crash_date";
    pub const CRASH_TIME: &str = "crash_time";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
    pub const INJURED_PERSONS: &str = "injured_persons";
    pub const INJURED_PEDESTRIANS: &str = "injured_pedestrians";
    pub const INJURED_CYCLISTS: &str = "injured_cyclists";
    pub const INJURED_MOTORISTS: &str = "injured_motorists";
    pub const ON_STREET_NAME: &str = "on_street_name";
}
