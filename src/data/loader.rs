//! CSV Data Loader Module
//! Reads the crash dataset with Polars, normalizes it and caches it per row cap.

use super::columns::*;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Columns every crash table must carry after normalization.
const REQUIRED_COLUMNS: [&str; 9] = [
    CRASH_DATE,
    CRASH_TIME,
    LATITUDE,
    LONGITUDE,
    INJURED_PERSONS,
    INJURED_PEDESTRIANS,
    INJURED_CYCLISTS,
    INJURED_MOTORISTS,
    ON_STREET_NAME,
];

/// Long-form NYC headers and their canonical names.
const COLUMN_ALIASES: [(&str, &str); 4] = [
    ("number_of_persons_injured", INJURED_PERSONS),
    ("number_of_pedestrians_injured", INJURED_PEDESTRIANS),
    ("number_of_cyclist_injured", INJURED_CYCLISTS),
    ("number_of_motorist_injured", INJURED_MOTORISTS),
];

const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Missing required column '{0}'")]
    MissingColumn(String),
}

/// Loads the crash table once per row cap and hands out shared read-only copies.
pub struct CrashLoader {
    source: PathBuf,
    cache: HashMap<usize, Arc<DataFrame>>,
    reads: usize,
}

impl CrashLoader {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            cache: HashMap::new(),
            reads: 0,
        }
    }

    /// Load at most `row_cap` rows, reusing the cached table for a known cap.
    pub fn load(&mut self, row_cap: usize) -> Result<Arc<DataFrame>, LoadError> {
        if let Some(df) = self.cache.get(&row_cap) {
            debug!(row_cap, "crash table served from cache");
            return Ok(Arc::clone(df));
        }

        let df = Arc::new(Self::read_source(&self.source, row_cap)?);
        self.reads += 1;
        self.cache.insert(row_cap, Arc::clone(&df));
        Ok(df)
    }

    /// Number of times the source file has actually been read.
    pub fn read_count(&self) -> usize {
        self.reads
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    fn read_source(path: &Path, row_cap: usize) -> Result<DataFrame, LoadError> {
        std::fs::metadata(path).map_err(|source| LoadError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let mut df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_n_rows(Some(row_cap))
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .with_truncate_ragged_lines(true)
            .finish()?
            .collect()?;
        let read_rows = df.height();

        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| normalize_column_name(name.as_str()))
            .collect();
        df.set_column_names(names)?;

        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .find(|name| df.column(name).is_err())
        {
            return Err(LoadError::MissingColumn(missing.to_string()));
        }

        let date_time = Self::combine_timestamp(&df)?;
        let mut df = df.drop(CRASH_DATE)?.drop(CRASH_TIME)?;
        df.insert_column(0, date_time)?;

        let df = df
            .lazy()
            .with_columns([
                col(LATITUDE).cast(DataType::Float64),
                col(LONGITUDE).cast(DataType::Float64),
            ])
            .filter(
                col(DATE_TIME)
                    .is_not_null()
                    .and(col(LATITUDE).is_not_null())
                    .and(col(LONGITUDE).is_not_null())
                    .and(col(LATITUDE).is_not_nan())
                    .and(col(LONGITUDE).is_not_nan()),
            )
            .collect()?;

        info!(
            path = %path.display(),
            read_rows,
            kept_rows = df.height(),
            dropped_rows = read_rows - df.height(),
            "loaded crash table"
        );
        Ok(df)
    }

    /// Merge the date and time columns into a millisecond `date_time` column.
    fn combine_timestamp(df: &DataFrame) -> Result<Series, LoadError> {
        let dates = df.column(CRASH_DATE)?.cast(&DataType::String)?;
        let times = df.column(CRASH_TIME)?.cast(&DataType::String)?;

        let millis = dates
            .str()?
            .into_iter()
            .zip(times.str()?.into_iter())
            .map(|(date, time)| {
                let ts = parse_crash_timestamp(date?, time?)?;
                Some(ts.and_utc().timestamp_millis())
            });

        Ok(Int64Chunked::from_iter_options(DATE_TIME.into(), millis)
            .into_datetime(TimeUnit::Milliseconds, None)
            .into_series())
    }
}

/// Lowercase a header, underscore its whitespace and map known long forms.
pub fn normalize_column_name(name: &str) -> String {
    let normalized = name
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");

    COLUMN_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(normalized)
}

/// Parse a crash date and time pair, e.g. `09/11/2021` + `2:39`.
pub fn parse_crash_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = date.trim();
    // ISO timestamps carry a midnight time part; only the date matters.
    let date = date.split('T').next().unwrap_or(date);
    let date = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date, fmt).ok())?;

    let time = time.trim();
    let time = TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(time, fmt).ok())?;

    Some(date.and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use std::io::Write;

    const HEADER: &str = "CRASH_DATE,CRASH_TIME,BOROUGH,LATITUDE,LONGITUDE,ON STREET NAME,NUMBER OF PERSONS INJURED,NUMBER OF PEDESTRIANS INJURED,NUMBER OF CYCLIST INJURED,NUMBER OF MOTORIST INJURED";

    fn write_csv(name: &str, rows: &[&str]) -> PathBuf {
        write_csv_with_header(name, HEADER, rows)
    }

    fn write_csv_with_header(name: &str, header: &str, rows: &[&str]) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "crash_explorer_{}_{}.csv",
            name,
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{header}").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        path
    }

    fn sample_rows() -> Vec<&'static str> {
        vec![
            "09/11/2021,2:39,BROOKLYN,40.667202,-73.8665,WHITESTONE EXPRESSWAY,2,0,0,2",
            "03/26/2022,11:45,,,,QUEENSBORO BRIDGE UPPER,1,0,0,1",
            "06/29/2022,6:55,QUEENS,40.75144,-73.93823,THROGS NECK BRIDGE,0,0,0,0",
            "09/11/2021,9:35,BROOKLYN,40.6629,-73.92356,,0,0,0,0",
            "12/14/2021,8:13,BROOKLYN,40.683304,-73.917274,SARATOGA AVENUE,0,0,1,0",
        ]
    }

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(normalize_column_name("CRASH_DATE"), "crash_date");
        assert_eq!(normalize_column_name("ON STREET NAME"), "on_street_name");
        assert_eq!(normalize_column_name(" LATITUDE "), "latitude");
        assert_eq!(
            normalize_column_name("NUMBER OF PERSONS INJURED"),
            "injured_persons"
        );
        assert_eq!(
            normalize_column_name("NUMBER OF CYCLIST INJURED"),
            "injured_cyclists"
        );
        assert_eq!(normalize_column_name("INJURED_PERSONS"), "injured_persons");
    }

    #[test]
    fn test_parse_crash_timestamp_formats() {
        let ts = parse_crash_timestamp("09/11/2021", "2:39").unwrap();
        assert_eq!((ts.hour(), ts.minute()), (2, 39));

        let ts = parse_crash_timestamp("2021-09-11T00:00:00.000", "14:05").unwrap();
        assert_eq!((ts.hour(), ts.minute()), (14, 5));

        let ts = parse_crash_timestamp("2021-09-11", "08:15:30").unwrap();
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (8, 15, 30));

        assert!(parse_crash_timestamp("yesterday", "2:39").is_none());
        assert!(parse_crash_timestamp("09/11/2021", "noon").is_none());
    }

    #[test]
    fn test_load_drops_missing_coordinates() {
        let path = write_csv("coords", &sample_rows());
        let mut loader = CrashLoader::new(&path);
        let df = loader.load(100).unwrap();

        assert_eq!(df.height(), 4);
        assert_eq!(df.column(LATITUDE).unwrap().null_count(), 0);
        assert_eq!(df.column(LONGITUDE).unwrap().null_count(), 0);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_drops_bad_timestamps_and_nan_coordinates() {
        let header = "CRASH DATE,CRASH TIME,BOROUGH,LATITUDE,LONGITUDE,ON STREET NAME,NUMBER OF PERSONS INJURED,NUMBER OF PEDESTRIANS INJURED,NUMBER OF CYCLIST INJURED,NUMBER OF MOTORIST INJURED";
        let path = write_csv_with_header(
            "drops",
            header,
            &[
                "09/11/2021,2:39,BROOKLYN,40.667202,-73.8665,WHITESTONE EXPRESSWAY,2,0,0,2",
                "09/11/2021,bogus,BROOKLYN,40.6629,-73.92356,,0,0,0,0",
                "06/29/2022,6:55,QUEENS,NaN,-73.93823,THROGS NECK BRIDGE,0,0,0,0",
                "2021-09-11T00:00:00.000,23:59,BROOKLYN,40.683304,-73.917274,SARATOGA AVENUE,0,0,1,0",
            ],
        );
        let mut loader = CrashLoader::new(&path);
        let df = loader.load(100).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(df.column(DATE_TIME).unwrap().null_count(), 0);
        for name in [LATITUDE, LONGITUDE] {
            let values = df.column(name).unwrap().f64().unwrap();
            assert_eq!(values.null_count(), 0);
            assert!(values.into_iter().flatten().all(|v| !v.is_nan()));
        }

        let streets: Vec<Option<&str>> = df
            .column(ON_STREET_NAME)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(
            streets,
            vec![Some("WHITESTONE EXPRESSWAY"), Some("SARATOGA AVENUE")]
        );
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_skips_ragged_rows() {
        let path = write_csv(
            "ragged",
            &[
                "09/11/2021,2:39,BROOKLYN,40.667202,-73.8665,WHITESTONE EXPRESSWAY,2,0,0,2",
                "09/11/2021,9:35,BROOKLYN,40.6629,-73.92356,,0,0,0,0,EXTRA",
                "12/14/2021,8:13,BROOKLYN,40.683304,-73.917274,SARATOGA AVENUE,0,0,1,0",
            ],
        );
        let mut loader = CrashLoader::new(&path);
        let df = loader.load(100).unwrap();

        // The extra field is cut off and the row itself is otherwise valid.
        assert_eq!(df.height(), 3);
        assert_eq!(df.column(LATITUDE).unwrap().null_count(), 0);
        assert_eq!(df.column(DATE_TIME).unwrap().null_count(), 0);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_normalizes_columns() {
        let path = write_csv("columns", &sample_rows());
        let mut loader = CrashLoader::new(&path);
        let df = loader.load(100).unwrap();

        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names[0], DATE_TIME);
        assert!(names.contains(&"borough".to_string()));
        assert!(names.contains(&ON_STREET_NAME.to_string()));
        assert!(names.contains(&INJURED_PERSONS.to_string()));
        assert!(!names.contains(&CRASH_DATE.to_string()));
        assert!(!names.contains(&CRASH_TIME.to_string()));
        assert!(matches!(
            df.column(DATE_TIME).unwrap().dtype(),
            DataType::Datetime(_, _)
        ));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_respects_row_cap() {
        let path = write_csv("cap", &sample_rows());
        let mut loader = CrashLoader::new(&path);

        // The second row lacks coordinates, so two read rows leave one record.
        let df = loader.load(2).unwrap();
        assert_eq!(df.height(), 1);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_is_memoized_per_row_cap() {
        let path = write_csv("memo", &sample_rows());
        let mut loader = CrashLoader::new(&path);

        let first = loader.load(100).unwrap();
        std::fs::remove_file(&path).unwrap();
        let second = loader.load(100).unwrap();

        assert_eq!(loader.read_count(), 1);
        assert!(first.equals_missing(&second));

        // A new cap has to go back to the (now missing) source.
        assert!(matches!(
            loader.load(3),
            Err(LoadError::Unreadable { .. })
        ));
        assert_eq!(loader.read_count(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let mut loader = CrashLoader::new("/definitely/not/here/VehicleCrashes.csv");
        assert!(matches!(
            loader.load(10),
            Err(LoadError::Unreadable { .. })
        ));
    }

    #[test]
    fn test_load_missing_required_column() {
        let path = std::env::temp_dir().join(format!(
            "crash_explorer_nocol_{}.csv",
            std::process::id()
        ));
        std::fs::write(&path, "CRASH_DATE,CRASH_TIME,LATITUDE\n09/11/2021,2:39,40.7\n").unwrap();

        let mut loader = CrashLoader::new(&path);
        match loader.load(10) {
            Err(LoadError::MissingColumn(name)) => assert_eq!(name, LONGITUDE),
            other => panic!("expected missing column, got {:?}", other.map(|df| df.height())),
        }
        std::fs::remove_file(path).ok();
    }
}
