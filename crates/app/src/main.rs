//! texhtml - side-by-side PDF + HTML viewer
//!
//! eframe entry point; all application state lives in [`app::TexhtmlApp`].

mod app;
mod panes;
mod recent;

use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("texhtml"),
        ..Default::default()
    };

    eframe::run_native("texhtml", options, Box::new(|cc| Ok(Box::new(app::TexhtmlApp::new(cc)))))
}
