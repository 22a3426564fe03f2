//! Crash Explorer - NYC Vehicle Crash Dashboard
//!
//! Loads a crash CSV once and explores it through an injury map, an hourly
//! density map, a per-minute histogram and a street ranking.

mod charts;
mod config;
mod data;
mod gui;
mod logging;
mod stats;
mod views;

use anyhow::Context;
use clap::Parser;
use config::Cli;
use data::CrashLoader;
use eframe::egui;
use gui::{CrashExplorerApp, Stylesheet};
use tracing::info;
use views::DashboardViews;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbosity());

    let mut loader = CrashLoader::new(&cli.data);
    let base = loader
        .load(cli.rows)
        .with_context(|| format!("loading crash data from {}", loader.source().display()))?;

    let views = DashboardViews::compute(&base, cli.settings())?;

    if cli.snapshot {
        println!("{}", views.to_json()?);
        return Ok(());
    }

    let stylesheet = Stylesheet::load(&cli.style)?;

    info!(
        rows = base.height(),
        source_reads = loader.read_count(),
        "starting dashboard"
    );

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 700.0])
            .with_title("Crash Explorer"),
        ..Default::default()
    };

    let data_path = cli.data.clone();
    eframe::run_native(
        "Crash Explorer",
        options,
        Box::new(move |cc| {
            Ok(Box::new(CrashExplorerApp::new(
                cc,
                base,
                views,
                &stylesheet,
                data_path,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))
}
