//! Statistics Calculator Module
//! Map midpoint and per-minute crash histogram.

use crate::data::columns::{DATE_TIME, LATITUDE, LONGITUDE};
use crate::data::{CrashFilter, ProcessorError};
use polars::prelude::*;
use serde::{Serialize, Serializer};

pub const MINUTES_PER_HOUR: usize = 60;

/// Average crash position, used to center the density map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Midpoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Crash counts per minute of one hour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinuteHistogram {
    pub hour: u32,
    #[serde(serialize_with = "serialize_counts")]
    pub counts: [u32; MINUTES_PER_HOUR],
}

// serde only derives arrays up to 32 elements.
fn serialize_counts<S>(counts: &[u32; MINUTES_PER_HOUR], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(counts.iter())
}

impl MinuteHistogram {
    pub fn empty(hour: u32) -> Self {
        Self {
            hour,
            counts: [0; MINUTES_PER_HOUR],
        }
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    /// Busiest minute, earliest one on ties. `None` when nothing was counted.
    pub fn peak(&self) -> Option<(usize, u32)> {
        self.counts
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, c)| c > 0)
            .fold(None, |best, (minute, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((minute, count)),
            })
    }
}

/// Handles aggregate calculations over crash tables.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Mean latitude and longitude. `None` for an empty table.
    pub fn midpoint(df: &DataFrame) -> Option<Midpoint> {
        if df.height() == 0 {
            return None;
        }

        let mean_of = |name: &str| -> Option<f64> {
            df.column(name)
                .ok()?
                .cast(&DataType::Float64)
                .ok()?
                .f64()
                .ok()?
                .mean()
        };

        let latitude = mean_of(LATITUDE)?;
        let longitude = mean_of(LONGITUDE)?;
        if latitude.is_nan() || longitude.is_nan() {
            return None;
        }

        Some(Midpoint {
            latitude,
            longitude,
        })
    }

    /// Count crashes per minute among rows whose hour lies in `[hour, hour + 1)`.
    pub fn minute_histogram(df: &DataFrame, hour: u32) -> Result<MinuteHistogram, ProcessorError> {
        let window = CrashFilter::filter_by_hour_window(df, hour, hour + 1)?;
        let minutes = window
            .lazy()
            .select([col(DATE_TIME)
                .dt()
                .minute()
                .cast(DataType::Int32)
                .alias("minute")])
            .collect()?;

        let mut histogram = MinuteHistogram::empty(hour);
        for minute in minutes.column("minute")?.i32()?.into_iter().flatten() {
            if let Some(bucket) = usize::try_from(minute)
                .ok()
                .and_then(|m| histogram.counts.get_mut(m))
            {
                *bucket += 1;
            }
        }

        Ok(histogram)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{table, Row};

    #[test]
    fn test_midpoint_mean() {
        let df = table(&[
            Row::at("2021-09-11 08:15", 40.0, -74.0),
            Row::at("2021-09-11 08:47", 41.0, -73.0),
        ]);
        let mid = StatsCalculator::midpoint(&df).unwrap();
        assert!((mid.latitude - 40.5).abs() < 1e-9);
        assert!((mid.longitude + 73.5).abs() < 1e-9);
    }

    #[test]
    fn test_midpoint_empty_table() {
        let df = table(&[Row::at("2021-09-11 08:15", 40.0, -74.0)]);
        let empty = CrashFilter::filter_by_hour(&df, 23).unwrap();
        assert_eq!(empty.height(), 0);
        assert_eq!(StatsCalculator::midpoint(&empty), None);
    }

    #[test]
    fn test_minute_histogram_buckets() {
        let df = table(&[
            Row::at("2021-09-11 08:15", 40.7, -74.0).persons(2),
            Row::at("2021-09-11 08:47", 40.71, -73.99),
        ]);
        let histogram = StatsCalculator::minute_histogram(&df, 8).unwrap();

        assert_eq!(histogram.counts.len(), MINUTES_PER_HOUR);
        assert_eq!(histogram.counts[15], 1);
        assert_eq!(histogram.counts[47], 1);
        assert_eq!(histogram.total(), 2);
        assert_eq!(
            histogram.counts.iter().filter(|&&c| c == 0).count(),
            MINUTES_PER_HOUR - 2
        );
    }

    #[test]
    fn test_minute_histogram_sums_to_hour_rows() {
        let df = table(&[
            Row::at("2021-09-11 17:00", 40.7, -74.0),
            Row::at("2021-09-11 17:00", 40.7, -74.0),
            Row::at("2021-09-12 17:59", 40.7, -74.0),
            Row::at("2021-09-12 18:00", 40.7, -74.0),
            Row::at("2021-09-12 16:59", 40.7, -74.0),
        ]);
        let histogram = StatsCalculator::minute_histogram(&df, 17).unwrap();
        let hour_rows = CrashFilter::filter_by_hour(&df, 17).unwrap().height();

        assert_eq!(histogram.total(), hour_rows as u64);
        assert_eq!(histogram.counts[0], 2);
        assert_eq!(histogram.counts[59], 1);
        assert_eq!(histogram.peak(), Some((0, 2)));
    }

    #[test]
    fn test_minute_histogram_empty_hour() {
        let df = table(&[Row::at("2021-09-11 17:00", 40.7, -74.0)]);
        let histogram = StatsCalculator::minute_histogram(&df, 3).unwrap();

        assert_eq!(histogram, MinuteHistogram::empty(3));
        assert_eq!(histogram.peak(), None);
    }

    #[test]
    fn test_minute_histogram_serializes_all_buckets() {
        let mut histogram = MinuteHistogram::empty(8);
        histogram.counts[59] = 4;

        let json = serde_json::to_value(&histogram).unwrap();
        let counts = json["counts"].as_array().unwrap();
        assert_eq!(counts.len(), MINUTES_PER_HOUR);
        assert_eq!(counts[59], 4);
        assert_eq!(json["hour"], 8);
    }
}
