mod app;
mod color;
mod state;
mod ui;

use app::DashboardApp;
use automation_dashboard::config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::from_env();
    log::info!(
        "Looking for {} country files in {}",
        config.countries.len(),
        config.data_dir.display()
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Country-Specific Automation Probability Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(config)))),
    )
}
