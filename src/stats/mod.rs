//! Stats module - Aggregations over filtered crash tables

mod calculator;
pub mod density;

pub use calculator::{Midpoint, MinuteHistogram, StatsCalculator};
pub use density::{DensityLayer, DensityView, ViewState};
