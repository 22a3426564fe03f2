//! Dashboard views
//! Derived tables and aggregates for every section of the dashboard, refreshed
//! per control change.

use crate::data::{CrashFilter, GeoPoint, InjuryCategory, ProcessorError, StreetCount};
use crate::stats::{DensityLayer, DensityView, Midpoint, MinuteHistogram, StatsCalculator};
use polars::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

pub const MAX_THRESHOLD: u32 = 19;
pub const MAX_HOUR: u32 = 23;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Failed to filter crashes: {0}")]
    Filter(#[from] ProcessorError),
    #[error("Failed to serialize snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Current state of the dashboard controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardSettings {
    pub threshold: u32,
    pub hour: u32,
    pub category: InjuryCategory,
    pub show_raw: bool,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            threshold: 10,
            hour: 0,
            category: InjuryCategory::default(),
            show_raw: false,
        }
    }
}

impl DashboardSettings {
    /// Clamp slider values into their ranges.
    pub fn clamped(self) -> Self {
        Self {
            threshold: self.threshold.min(MAX_THRESHOLD),
            hour: self.hour.min(MAX_HOUR),
            ..self
        }
    }
}

/// Which control changed since the last refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlChange {
    Threshold,
    Hour,
    Category,
    RawTable,
}

/// All derived views of the base crash table.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardViews {
    pub settings: DashboardSettings,
    pub total_rows: usize,
    pub injury_points: Vec<GeoPoint>,
    pub hour_rows: usize,
    pub midpoint: Option<Midpoint>,
    pub density: Option<DensityView>,
    pub histogram: MinuteHistogram,
    pub top_streets: Vec<StreetCount>,
    /// Hour-filtered table, shown by the raw data section.
    #[serde(skip)]
    pub hour_table: DataFrame,
}

impl DashboardViews {
    /// Compute every view for `settings`.
    pub fn compute(base: &Arc<DataFrame>, settings: DashboardSettings) -> Result<Self, ViewError> {
        let settings = settings.clamped();
        let mut views = Self {
            settings,
            total_rows: base.height(),
            injury_points: Vec::new(),
            hour_rows: 0,
            midpoint: None,
            density: None,
            histogram: MinuteHistogram::empty(settings.hour),
            top_streets: Vec::new(),
            hour_table: DataFrame::default(),
        };

        views.refresh_threshold(base)?;
        views.refresh_hour(base)?;
        views.refresh_category(base)?;
        Ok(views)
    }

    /// Apply new settings, recomputing only what depends on `change`.
    pub fn refresh(
        &mut self,
        base: &Arc<DataFrame>,
        settings: DashboardSettings,
        change: ControlChange,
    ) -> Result<(), ViewError> {
        // `self.settings` always describes the views computed from it.
        let settings = settings.clamped();
        match change {
            ControlChange::Threshold => self.settings.threshold = settings.threshold,
            ControlChange::Hour => self.settings.hour = settings.hour,
            ControlChange::Category => self.settings.category = settings.category,
            ControlChange::RawTable => self.settings.show_raw = settings.show_raw,
        }
        debug!(?change, settings = ?self.settings, "refreshing dashboard views");

        match change {
            ControlChange::Threshold => self.refresh_threshold(base),
            ControlChange::Hour => self.refresh_hour(base),
            ControlChange::Category => self.refresh_category(base),
            ControlChange::RawTable => Ok(()),
        }
    }

    fn refresh_threshold(&mut self, base: &DataFrame) -> Result<(), ViewError> {
        let filtered = CrashFilter::filter_by_min_injured(base, self.settings.threshold)?;
        self.injury_points = CrashFilter::geo_points(&filtered)?;
        if self.injury_points.is_empty() {
            warn!(
                threshold = self.settings.threshold,
                "no crashes at or above injury threshold"
            );
        }
        Ok(())
    }

    fn refresh_hour(&mut self, base: &DataFrame) -> Result<(), ViewError> {
        let hour = self.settings.hour;
        self.hour_table = CrashFilter::filter_by_hour(base, hour)?;
        self.hour_rows = self.hour_table.height();
        self.midpoint = StatsCalculator::midpoint(&self.hour_table);
        self.density = match self.midpoint {
            Some(midpoint) => {
                let points = CrashFilter::geo_points(&self.hour_table)?;
                Some(DensityView::new(midpoint, &points, DensityLayer::default()))
            }
            None => {
                warn!(hour, "no crashes during selected hour");
                None
            }
        };
        self.histogram = StatsCalculator::minute_histogram(&self.hour_table, hour)?;
        Ok(())
    }

    fn refresh_category(&mut self, base: &DataFrame) -> Result<(), ViewError> {
        // Always ranks the base table, independent of the hour control.
        self.top_streets = CrashFilter::top_streets(base, self.settings.category)?;
        if self.top_streets.is_empty() {
            warn!(category = %self.settings.category, "no injured people in category");
        }
        Ok(())
    }

    /// Pretty JSON of every view except the raw table.
    pub fn to_json(&self) -> Result<String, ViewError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
