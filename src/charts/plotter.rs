//! Chart Plotter Module
//! Draws the dashboard views with egui_plot and egui grids.

use crate::data::{GeoPoint, StreetCount};
use crate::stats::{DensityView, MinuteHistogram, ViewState};
use egui::{Color32, RichText, ScrollArea};
use egui_plot::{Bar, BarChart, Plot, PlotPoints, Points, Polygon};

/// Point color on the injury map
pub const CRASH_COLOR: Color32 = Color32::from_rgb(255, 75, 75);

/// Bar color of the minute histogram
pub const BAR_COLOR: Color32 = Color32::from_rgb(99, 110, 250);

/// Hexagon color ramp, sparse to dense
pub const DENSITY_RAMP: [Color32; 6] = [
    Color32::from_rgb(255, 255, 178),
    Color32::from_rgb(254, 217, 118),
    Color32::from_rgb(254, 178, 76),
    Color32::from_rgb(253, 141, 60),
    Color32::from_rgb(240, 59, 32),
    Color32::from_rgb(189, 0, 38),
];

const MAP_HEIGHT: f32 = 420.0;
const CHART_HEIGHT: f32 = 400.0;

/// Draws the dashboard charts and tables.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Ramp color for a cell holding `count` of at most `max_count` crashes.
    pub fn density_color(count: usize, max_count: usize) -> Color32 {
        if max_count == 0 {
            return DENSITY_RAMP[0];
        }
        let last = DENSITY_RAMP.len() - 1;
        let idx = (count * last).div_ceil(max_count).min(last);
        DENSITY_RAMP[idx]
    }

    /// Horizontal stretch that keeps map distances roughly square at `latitude`.
    fn map_aspect(latitude: f64) -> f32 {
        latitude.to_radians().cos().max(0.1) as f32
    }

    /// Placeholder shown instead of a chart when a selection is empty.
    pub fn draw_no_data(ui: &mut egui::Ui, message: &str) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(16.0)
            .show(ui, |ui| {
                ui.set_min_height(80.0);
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new(message).size(16.0).color(Color32::GRAY));
                });
            });
    }

    /// Scatter map of crash locations.
    pub fn draw_point_map(ui: &mut egui::Ui, points: &[GeoPoint]) {
        if points.is_empty() {
            Self::draw_no_data(ui, "No data: no crash reaches this injury count");
            return;
        }

        let mean_lat = points.iter().map(|p| p.latitude).sum::<f64>() / points.len() as f64;
        let plot_points: PlotPoints = points.iter().map(|p| [p.longitude, p.latitude]).collect();

        Plot::new("injury_map")
            .height(MAP_HEIGHT)
            .data_aspect(Self::map_aspect(mean_lat))
            .allow_scroll(false)
            .x_axis_label("Longitude")
            .y_axis_label("Latitude")
            .show(ui, |plot_ui| {
                plot_ui.points(
                    Points::new(plot_points)
                        .radius(3.0)
                        .color(CRASH_COLOR.gamma_multiply(0.8))
                        .name("Crashes"),
                );
            });
    }

    /// Hexagon density map centered on the view state.
    pub fn draw_density_map(ui: &mut egui::Ui, density: &DensityView) {
        let view: &ViewState = &density.view_state;
        let half_lon = view.longitude_span() / 2.0;
        let half_lat = half_lon * Self::map_aspect(view.latitude) as f64;
        let max_count = density.max_count();

        Plot::new("density_map")
            .height(MAP_HEIGHT)
            .data_aspect(Self::map_aspect(view.latitude))
            .allow_scroll(false)
            .include_x(view.longitude - half_lon)
            .include_x(view.longitude + half_lon)
            .include_y(view.latitude - half_lat)
            .include_y(view.latitude + half_lat)
            .x_axis_label("Longitude")
            .y_axis_label("Latitude")
            .show(ui, |plot_ui| {
                for cell in &density.cells {
                    let color = Self::density_color(cell.count, max_count);
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::new(density.outline(cell)))
                            .fill_color(color.gamma_multiply(0.85))
                            .stroke(egui::Stroke::new(0.5, color))
                            .name(format!("{} crashes", cell.count)),
                    );
                }
            });

        ui.label(
            RichText::new(format!(
                "{} cells, busiest {} crashes, radius {} m, zoom {}, pitch {}",
                density.cells.len(),
                max_count,
                density.layer.radius,
                view.zoom,
                view.pitch
            ))
            .size(11.0)
            .color(Color32::GRAY),
        );
    }

    /// Bar chart of crashes per minute (x: 0-59).
    pub fn draw_minute_histogram(ui: &mut egui::Ui, histogram: &MinuteHistogram) {
        let bars: Vec<Bar> = histogram
            .counts
            .iter()
            .enumerate()
            .map(|(minute, &count)| {
                Bar::new(minute as f64, count as f64)
                    .width(0.8)
                    .name(format!("minute {minute}"))
            })
            .collect();

        Plot::new(format!("minute_histogram_{}", histogram.hour))
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .include_x(-0.5)
            .include_x(59.5)
            .include_y(0.0)
            .x_axis_label("minutes")
            .y_axis_label("crashes")
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR).name("crashes"));
            });
    }

    /// Ranked street table.
    pub fn draw_top_streets(ui: &mut egui::Ui, count_label: &str, streets: &[StreetCount]) {
        if streets.is_empty() {
            Self::draw_no_data(ui, "No data: nobody injured in this category");
            return;
        }

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("top_streets")
                    .striped(true)
                    .min_col_width(55.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new("#").strong());
                        ui.label(RichText::new("on_street_name").strong());
                        ui.label(RichText::new(count_label).strong());
                        ui.end_row();

                        for (rank, street) in streets.iter().enumerate() {
                            ui.label((rank + 1).to_string());
                            ui.label(&street.street);
                            ui.label(street.count.to_string());
                            ui.end_row();
                        }
                    });
            });
    }

    /// Scrollable grid of table rows.
    pub fn draw_raw_table(ui: &mut egui::Ui, header: &[String], rows: &[Vec<String>]) {
        if rows.is_empty() {
            Self::draw_no_data(ui, "No data for this hour");
            return;
        }

        ScrollArea::both()
            .id_salt("raw_table")
            .max_height(400.0)
            .show(ui, |ui| {
                egui::Grid::new("raw_table_grid")
                    .striped(true)
                    .spacing([10.0, 2.0])
                    .show(ui, |ui| {
                        for name in header {
                            ui.label(RichText::new(name).strong().size(11.0));
                        }
                        ui.end_row();

                        for row in rows {
                            for cell in row {
                                ui.label(RichText::new(cell).size(11.0));
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}
