//! Data Processor Module
//! Stateless filters over the crash table: injury threshold, hour of day and
//! per-category street ranking.

use super::columns::*;
use polars::prelude::*;
use serde::Serialize;
use thiserror::Error;

/// Number of streets kept by the ranking.
pub const TOP_STREETS: usize = 5;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Injured-person category offered by the street ranking.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, strum::EnumIter, strum::Display,
)]
pub enum InjuryCategory {
    #[default]
    Pedestrians,
    Cyclists,
    Motorists,
}

impl InjuryCategory {
    /// Map a selector label; anything that is not pedestrians or cyclists
    /// counts as motorists.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Pedestrians" => InjuryCategory::Pedestrians,
            "Cyclists" => InjuryCategory::Cyclists,
            _ => InjuryCategory::Motorists,
        }
    }

    /// Column holding the injured count for this category.
    pub fn column(&self) -> &'static str {
        match self {
            InjuryCategory::Pedestrians => INJURED_PEDESTRIANS,
            InjuryCategory::Cyclists => INJURED_CYCLISTS,
            InjuryCategory::Motorists => INJURED_MOTORISTS,
        }
    }
}

/// Single point handed to the map view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// One line of the street ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreetCount {
    pub street: String,
    pub count: i64,
}

/// Hour component of `date_time` as a plain integer.
fn hour_of_day() -> Expr {
    col(DATE_TIME).dt().hour().cast(DataType::Int32)
}

/// Filters applied to the loaded crash table. None of them mutate their input.
pub struct CrashFilter;

impl CrashFilter {
    /// Keep crashes with at least `threshold` injured people.
    ///
    /// Output columns: ["latitude", "longitude"]
    pub fn filter_by_min_injured(
        df: &DataFrame,
        threshold: u32,
    ) -> Result<DataFrame, ProcessorError> {
        let filtered = df
            .clone()
            .lazy()
            .filter(
                col(INJURED_PERSONS)
                    .cast(DataType::Int64)
                    .gt_eq(lit(threshold as i64)),
            )
            .select([col(LATITUDE), col(LONGITUDE)])
            .filter(col(LATITUDE).is_not_null().and(col(LONGITUDE).is_not_null()))
            .collect()?;
        Ok(filtered)
    }

    /// Keep crashes that happened during `hour` (0-23).
    pub fn filter_by_hour(df: &DataFrame, hour: u32) -> Result<DataFrame, ProcessorError> {
        let filtered = df
            .clone()
            .lazy()
            .filter(hour_of_day().eq(lit(hour as i32)))
            .collect()?;
        Ok(filtered)
    }

    /// Keep crashes whose hour lies in `[start, end)`.
    pub fn filter_by_hour_window(
        df: &DataFrame,
        start: u32,
        end: u32,
    ) -> Result<DataFrame, ProcessorError> {
        let filtered = df
            .clone()
            .lazy()
            .filter(
                hour_of_day()
                    .gt_eq(lit(start as i32))
                    .and(hour_of_day().lt(lit(end as i32))),
            )
            .collect()?;
        Ok(filtered)
    }

    /// Streets with the most injured people of `category`, at most five.
    ///
    /// Ties keep the order of the input table.
    pub fn top_streets(
        df: &DataFrame,
        category: InjuryCategory,
    ) -> Result<Vec<StreetCount>, ProcessorError> {
        let count_col = category.column();

        let ranked = df
            .clone()
            .lazy()
            .filter(col(count_col).cast(DataType::Int64).gt_eq(lit(1i64)))
            .select([
                col(ON_STREET_NAME).cast(DataType::String),
                col(count_col).cast(DataType::Int64),
            ])
            .filter(
                col(ON_STREET_NAME)
                    .is_not_null()
                    .and(col(count_col).is_not_null()),
            )
            .sort_by_exprs(
                vec![col(count_col)],
                SortMultipleOptions::default()
                    .with_order_descending(true)
                    .with_maintain_order(true),
            )
            .limit(TOP_STREETS as IdxSize)
            .collect()?;

        let streets = ranked.column(ON_STREET_NAME)?.str()?;
        let counts = ranked.column(count_col)?.i64()?;

        Ok(streets
            .into_iter()
            .zip(counts.into_iter())
            .filter_map(|(street, count)| {
                Some(StreetCount {
                    street: street?.to_string(),
                    count: count?,
                })
            })
            .collect())
    }

    /// Convert a table with coordinate columns into map points.
    pub fn geo_points(df: &DataFrame) -> Result<Vec<GeoPoint>, ProcessorError> {
        let lat = df.column(LATITUDE)?.cast(&DataType::Float64)?;
        let lon = df.column(LONGITUDE)?.cast(&DataType::Float64)?;

        Ok(lat
            .f64()?
            .into_iter()
            .zip(lon.f64()?.into_iter())
            .filter_map(|(lat, lon)| match (lat, lon) {
                (Some(latitude), Some(longitude)) => Some(GeoPoint {
                    latitude,
                    longitude,
                }),
                _ => None,
            })
            .collect())
    }

    /// Render the first `limit` rows of a table as display strings.
    ///
    /// Returns (header, rows).
    pub fn preview_rows(df: &DataFrame, limit: usize) -> (Vec<String>, Vec<Vec<String>>) {
        let header: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let rows = (0..df.height().min(limit))
            .map(|i| {
                df.get_columns()
                    .iter()
                    .map(|column| match column.get(i) {
                        Ok(AnyValue::Null) | Err(_) => String::new(),
                        Ok(val) => val.to_string().trim_matches('"').to_string(),
                    })
                    .collect()
            })
            .collect();

        (header, rows)
    }
}
