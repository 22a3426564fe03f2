//! Control Panel Widget
//! Left side panel with the dashboard controls.

use crate::data::InjuryCategory;
use crate::views::{ControlChange, DashboardSettings, MAX_HOUR, MAX_THRESHOLD};
use egui::{Color32, ComboBox, RichText};
use std::path::PathBuf;
use strum::IntoEnumIterator;

/// Left side control panel with sliders, category selector and raw-table toggle.
pub struct ControlPanel {
    pub settings: DashboardSettings,
    pub data_path: PathBuf,
    pub row_count: usize,
    pub status: String,
}

impl ControlPanel {
    pub fn new(settings: DashboardSettings, data_path: PathBuf, row_count: usize) -> Self {
        Self {
            settings,
            data_path,
            row_count,
            status: "Ready".to_string(),
        }
    }

    /// Draw the control panel; returns the control the user changed, if any.
    pub fn show(&mut self, ui: &mut egui::Ui) -> Option<ControlChange> {
        let mut change = None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🚗 Crash Explorer")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("NYC vehicle collisions")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                let file_name = self
                    .data_path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| self.data_path.display().to_string());
                ui.label(RichText::new(file_name).size(12.0));
                ui.label(
                    RichText::new(format!("{} crashes with coordinates", self.row_count))
                        .size(11.0)
                        .color(Color32::GRAY),
                );
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filter Section =====
        ui.label(RichText::new("🔧 Filters").size(14.0).strong());
        ui.add_space(8.0);

        ui.label("Choose the number of injured people in single accident");
        if ui
            .add(egui::Slider::new(
                &mut self.settings.threshold,
                0..=MAX_THRESHOLD,
            ))
            .changed()
        {
            change = Some(ControlChange::Threshold);
        }

        ui.add_space(8.0);

        ui.label("Select hour of the day");
        if ui
            .add(egui::Slider::new(&mut self.settings.hour, 0..=MAX_HOUR))
            .changed()
        {
            change = Some(ControlChange::Hour);
        }

        ui.add_space(8.0);

        ui.horizontal(|ui| {
            ui.label("Type of People:");
            ComboBox::from_id_salt("injury_category")
                .width(150.0)
                .selected_text(self.settings.category.to_string())
                .show_ui(ui, |ui| {
                    for category in InjuryCategory::iter() {
                        if ui
                            .selectable_value(
                                &mut self.settings.category,
                                category,
                                category.to_string(),
                            )
                            .changed()
                        {
                            change = Some(ControlChange::Category);
                        }
                    }
                });
        });

        ui.add_space(8.0);

        if ui
            .checkbox(&mut self.settings.show_raw, "Show data table")
            .changed()
        {
            change = Some(ControlChange::RawTable);
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        change
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}
