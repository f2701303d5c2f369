mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use anyhow::{Context, Result, anyhow};
use app::DashboardApp;
use clap::Parser;
use config::AppConfig;
use data::context::DashboardContext;
use eframe::egui;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let config = AppConfig::parse();

    // Never open the window on partial data.
    let context = DashboardContext::load(&config).context("loading dashboard data")?;
    let state = AppState::new(config, context);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Global Warming Insights",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow!("running the dashboard window: {e}"))
}
