//! GUI module - User interface components

mod app;
mod control_panel;
mod dashboard_viewer;
mod style;

pub use app::CrashExplorerApp;
pub use control_panel::ControlPanel;
pub use dashboard_viewer::DashboardViewer;
pub use style::Stylesheet;
