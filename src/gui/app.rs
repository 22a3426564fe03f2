//! Crash Explorer Main Application
//! Main window with control panel and dashboard viewer.

use crate::gui::{ControlPanel, DashboardViewer, Stylesheet};
use crate::views::{ControlChange, DashboardViews};
use egui::SidePanel;
use polars::prelude::DataFrame;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

/// Main application window.
pub struct CrashExplorerApp {
    base: Arc<DataFrame>,
    control_panel: ControlPanel,
    viewer: DashboardViewer,
}

impl CrashExplorerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        base: Arc<DataFrame>,
        views: DashboardViews,
        stylesheet: &Stylesheet,
        data_path: PathBuf,
    ) -> Self {
        stylesheet.apply(&cc.egui_ctx);

        let control_panel = ControlPanel::new(views.settings, data_path, base.height());
        let mut viewer = DashboardViewer::new();
        viewer.set_views(views);

        Self {
            base,
            control_panel,
            viewer,
        }
    }

    /// Recompute the views downstream of the changed control
    fn handle_change(&mut self, change: ControlChange) {
        let settings = self.control_panel.settings;
        let Some(views) = self.viewer.views_mut() else {
            return;
        };

        match views.refresh(&self.base, settings, change) {
            Ok(()) => {
                let status = format!(
                    "{} crashes in hour {}, {} on the injury map",
                    views.hour_rows,
                    views.settings.hour,
                    views.injury_points.len()
                );
                if change == ControlChange::Hour || change == ControlChange::RawTable {
                    self.viewer.invalidate_raw_preview();
                }
                self.control_panel.set_status(&status);
            }
            Err(e) => {
                error!(error = %e, ?change, "failed to refresh dashboard");
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for CrashExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    if let Some(change) = self.control_panel.show(ui) {
                        self.handle_change(change);
                    }
                });
            });

        // Central panel - Dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            self.viewer.show(ui);
        });
    }
}
