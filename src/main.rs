#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use crewboard::{logging, ui};
use eframe::egui;

fn main() -> eframe::Result<()> {
    logging::init();

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([480.0, 900.0])
        .with_min_inner_size([360.0, 600.0])
        .with_title("Crewboard");

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "Crewboard",
        options,
        Box::new(|cc| Ok(Box::new(ui::ScheduleApp::new(cc)?))),
    )
}
