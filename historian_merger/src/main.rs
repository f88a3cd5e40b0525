//! # historian_merger
//!
//! Part of the historian_merger crate family.
//!
//! This is the application to merge historian archives with a GUI using [egui](https://github.com/emilk/egui).
//!
//! ## Install
//!
//! Use `cargo install --path ./historian_merger`
//!
//! ## Use
//!
//! To launch the application simply invoke it after it is installed
//!
//! ```bash
//! historian_merger
//! ```
//!
//! ## Configuration
//!
//! The following configuration controls are available in the GUI:
//!
//! - Source directory: folder containing the archive folders (each with one .hst file and its .0xx channel files)
//! - Export directory: folder to which one CSV per archive folder is written
//! - Directory name contains: only folders whose name contains this text are listed. Leave empty to list all folders.
//! - Number of Workers: number of parallel worker threads the selected folders are divided amongst
//!
//! Tick the archive folders to export in the list (the filter box narrows the list without
//! losing the selection) and click the export button.
//!
//! Configurations can be saved using File->Save and loaded using File->Open

mod app;
use app::MergerApp;
use std::fs::File;

const LOG_FILE: &str = "./historian_merger.log";

/// The program entry point
fn main() {
    // Setup logging to a file
    match File::create(LOG_FILE) {
        Ok(file) => {
            if let Err(e) = simplelog::WriteLogger::init(
                simplelog::LevelFilter::Info,
                simplelog::Config::default(),
                file,
            ) {
                eprintln!("Could not initialize logging: {e}");
            }
        }
        Err(e) => eprintln!("Could not create log file {LOG_FILE}: {e}"),
    }
    log::info!("Starting Historian Merger UI");

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("Historian Merger")
            .with_inner_size(eframe::epaint::vec2(600.0, 600.0))
            .with_min_inner_size(eframe::epaint::vec2(600.0, 400.0)),
        ..Default::default()
    };
    match eframe::run_native(
        "historian_merger",
        native_options,
        Box::new(|cc| Ok(Box::new(MergerApp::new(cc)))),
    ) {
        Ok(()) => (),
        Err(e) => log::error!("Eframe error: {}", e),
    }
}
