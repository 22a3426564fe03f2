//! Dashboard Viewer Widget
//! Central scrollable page with the map, density, histogram, ranking and raw
//! data sections.

use crate::charts::ChartPlotter;
use crate::data::CrashFilter;
use crate::views::DashboardViews;
use egui::{RichText, ScrollArea};

/// Rows of the hour table rendered by the raw data section.
const RAW_TABLE_ROWS: usize = 200;

const SECTION_SPACING: f32 = 20.0;

/// Table preview cached between frames: (header, rows).
type RawPreview = (Vec<String>, Vec<Vec<String>>);

/// Scrollable dashboard page.
pub struct DashboardViewer {
    views: Option<DashboardViews>,
    raw_preview: Option<RawPreview>,
}

impl Default for DashboardViewer {
    fn default() -> Self {
        Self {
            views: None,
            raw_preview: None,
        }
    }
}

impl DashboardViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn views_mut(&mut self) -> Option<&mut DashboardViews> {
        self.views.as_mut()
    }

    pub fn set_views(&mut self, views: DashboardViews) {
        self.views = Some(views);
        self.invalidate_raw_preview();
    }

    /// Drop the cached raw rows; rebuilt on the next frame that shows them.
    pub fn invalidate_raw_preview(&mut self) {
        self.raw_preview = None;
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        let Some(views) = &self.views else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        if views.settings.show_raw && self.raw_preview.is_none() {
            self.raw_preview = Some(CrashFilter::preview_rows(
                &views.hour_table,
                RAW_TABLE_ROWS,
            ));
        }

        let hour = views.settings.hour;

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.label(RichText::new("NYC Crash Analysis").size(28.0).strong());
                ui.label("Data of vehicle crashes in NYC");
                ui.add_space(8.0);
                ui.label(
                    RichText::new(format!(
                        "{} crashes with at least {} injured people",
                        views.injury_points.len(),
                        views.settings.threshold
                    ))
                    .size(12.0),
                );
                ChartPlotter::draw_point_map(ui, &views.injury_points);

                ui.add_space(SECTION_SPACING);
                ui.label(
                    RichText::new("Collisions acc to time of the day")
                        .size(22.0)
                        .strong(),
                );
                ui.label(format!(
                    "Collision density between {}:00 and {}:00.",
                    hour,
                    hour + 1
                ));
                match &views.density {
                    Some(density) => ChartPlotter::draw_density_map(ui, density),
                    None => ChartPlotter::draw_no_data(ui, "No data: no crashes in this hour"),
                }

                ui.add_space(SECTION_SPACING);
                ui.label(
                    RichText::new(format!(
                        "Collisions in every minute between {}:00 and {}:00.",
                        hour,
                        hour + 1
                    ))
                    .size(18.0)
                    .strong(),
                );
                if let Some((minute, count)) = views.histogram.peak() {
                    ui.label(
                        RichText::new(format!(
                            "{} crashes, busiest minute :{minute:02} ({count} crashes)",
                            views.histogram.total()
                        ))
                        .size(12.0),
                    );
                }
                ChartPlotter::draw_minute_histogram(ui, &views.histogram);

                ui.add_space(SECTION_SPACING);
                ui.label(
                    RichText::new("Top 5 street affected by type")
                        .size(22.0)
                        .strong(),
                );
                ChartPlotter::draw_top_streets(
                    ui,
                    views.settings.category.column(),
                    &views.top_streets,
                );

                if views.settings.show_raw {
                    ui.add_space(SECTION_SPACING);
                    ui.label(RichText::new("Raw Data").size(18.0).strong());
                    if let Some((header, rows)) = &self.raw_preview {
                        if views.hour_rows > rows.len() {
                            ui.label(
                                RichText::new(format!(
                                    "Showing {} of {} rows",
                                    rows.len(),
                                    views.hour_rows
                                ))
                                .size(11.0),
                            );
                        }
                        ChartPlotter::draw_raw_table(ui, header, rows);
                    }
                }
            });
    }
}
