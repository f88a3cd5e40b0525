use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::JoinHandle;

use eframe::egui::{Color32, DragValue, ProgressBar, RichText, ScrollArea};
use rfd::FileDialog;

use libhistorian_merger::config::Config;
use libhistorian_merger::error::ProcessorError;
use libhistorian_merger::process::{create_subsets, process_subset};
use libhistorian_merger::selection::SelectionList;
use libhistorian_merger::worker_status::{WorkerPhase, WorkerStatus};

fn render_error_dialog(show: &mut bool, ctx: &eframe::egui::Context) {
    eframe::egui::Window::new("Error")
        .open(show)
        .show(ctx, |ui| {
            ui.label(
                "There was an error! Check the log file historian_merger.log for more information.",
            )
        });
}

fn start_directory() -> PathBuf {
    std::env::current_dir().unwrap_or_default()
}

/// The UI app which inherits the eframe::App trait.
///
/// The parent for all processing.
#[derive(Debug)]
pub struct MergerApp {
    config: Config,
    directories: SelectionList,
    workers: Vec<JoinHandle<Result<(), ProcessorError>>>, //processing threads
    worker_statuses: Vec<WorkerStatus>,
    show_error_window: bool,
    worker_rx: mpsc::Receiver<WorkerStatus>,
    worker_tx: mpsc::Sender<WorkerStatus>,
}

impl MergerApp {
    /// Create the application
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut visuals = eframe::egui::Visuals::dark();
        visuals.override_text_color = Some(Color32::LIGHT_GRAY);
        cc.egui_ctx.set_visuals(visuals);
        let (tx, rx) = mpsc::channel::<WorkerStatus>();
        MergerApp {
            config: Config::default(),
            directories: SelectionList::default(),
            workers: vec![],
            worker_statuses: vec![],
            show_error_window: false,
            worker_rx: rx,
            worker_tx: tx,
        }
    }

    /// Re-read the archive directories in the source folder
    fn refresh_directories(&mut self) {
        match self.config.get_available_directories() {
            Ok(dirs) => {
                let names: Vec<String> = dirs.iter().map(|d| d.name()).collect();
                log::info!(
                    "Found {} archive directories in {}",
                    names.len(),
                    self.config.source_path.display()
                );
                self.directories.set_items(names);
            }
            Err(e) => {
                self.directories.set_items(vec![]);
                log::error!("Could not list archive directories: {e}");
            }
        }
    }

    /// Start some workers
    fn start_workers(&mut self) {
        // Safety first
        if !self.workers.is_empty() {
            return;
        }
        self.worker_statuses.clear();
        self.config.selected = self.directories.selected();
        if self.config.selected.is_empty() {
            log::warn!("No archive directories selected, nothing to do.");
            return;
        }
        let directories = match self.config.get_archive_directories() {
            Ok(d) => d,
            Err(e) => {
                self.show_error_window = true;
                log::error!("Could not list archive directories: {e}");
                return;
            }
        };

        let subsets = create_subsets(&self.config, directories);
        for subset in subsets.into_iter() {
            // Dont make empty workers
            if subset.is_empty() {
                continue;
            }
            // Spawn it
            let idx = self.worker_statuses.len();
            let conf = self.config.clone();
            let tx = self.worker_tx.clone();
            self.worker_statuses
                .push(WorkerStatus::new(0.0, "", idx, WorkerPhase::Merging));
            self.workers.push(std::thread::spawn(move || {
                process_subset(conf, tx, idx, subset)
            }))
        }
    }

    /// Stop the workers
    fn stop_workers(&mut self) {
        let n_workers = self.workers.len();
        for _ in 0..n_workers {
            if let Some(worker) = self.workers.pop() {
                match worker.join() {
                    Ok(res) => match res {
                        Ok(_) => log::info!("Worker complete"),
                        Err(e) => {
                            self.show_error_window = true;
                            log::error!("Processor error: {e}")
                        }
                    },
                    Err(_) => {
                        self.show_error_window = true;
                        log::error!("An error occured joining one of the workers!")
                    }
                }
            }
        }
    }

    /// Check if there are any workers still doing stuff
    fn are_any_workers_alive(&self) -> bool {
        self.workers.iter().any(|worker| !worker.is_finished())
    }

    /// Write the current Config to a file
    fn write_config(&mut self, path: &Path) {
        self.config.selected = self.directories.selected();
        if let Err(e) = self.config.write_config_file(path) {
            self.show_error_window = true;
            log::error!("Error writing config to file {}: {}", path.display(), e);
        }
    }

    fn poll_messages(&mut self) {
        // Check messages
        loop {
            match self.worker_rx.try_recv() {
                Ok(status) => {
                    if let Some(slot) = self.worker_statuses.get_mut(status.worker_id) {
                        *slot = status;
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    log::error!("Channels became disconnected!");
                    self.show_error_window = true;
                    break;
                }
            }
        }
    }

    /// Read the Config from a file
    fn read_config(&mut self, path: &Path) {
        match Config::read_config_file(path) {
            Ok(conf) => {
                self.config = conf;
                self.refresh_directories();
                for name in self.config.selected.clone() {
                    self.directories.set_selected(&name, true);
                }
            }
            Err(e) => log::error!("{}", e),
        }
    }

    fn render_directory_list(&mut self, ui: &mut eframe::egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Filter:");
            ui.text_edit_singleline(self.directories.filter_mut());
            if ui.button("Select shown").clicked() {
                self.directories.select_visible();
            }
            if ui.button("Clear").clicked() {
                self.directories.clear_selection();
            }
        });
        let visible: Vec<String> = self
            .directories
            .visible()
            .into_iter()
            .map(String::from)
            .collect();
        ScrollArea::vertical()
            .max_height(200.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for name in visible.iter() {
                    let mut checked = self.directories.is_selected(name);
                    let text = if checked {
                        RichText::new(name).color(Color32::LIGHT_BLUE)
                    } else {
                        RichText::new(name)
                    };
                    if ui.checkbox(&mut checked, text).changed() {
                        self.directories.set_selected(name, checked);
                    }
                }
            });
        ui.label(format!(
            "{} of {} directories selected",
            self.directories.selected().len(),
            self.directories.items().len()
        ));
    }
}

impl eframe::App for MergerApp {
    fn update(&mut self, ctx: &eframe::egui::Context, _frame: &mut eframe::Frame) {
        self.poll_messages();
        render_error_dialog(&mut self.show_error_window, ctx);
        eframe::egui::CentralPanel::default().show(ctx, |ui| {
            //Menus
            ui.menu_button("File", |ui| {
                if ui.button("Open...").clicked() {
                    if let Some(path) = FileDialog::new()
                        .set_directory(start_directory())
                        .add_filter("YAML file", &["yaml", "yml"])
                        .pick_file()
                    {
                        self.read_config(&path);
                    }
                }
                if ui.button("Save...").clicked() {
                    if let Some(path) = FileDialog::new()
                        .set_directory(start_directory())
                        .add_filter("YAML file", &["yaml", "yml"])
                        .save_file()
                    {
                        self.write_config(&path);
                    }
                }
            });

            //Config
            ui.separator();
            ui.label(
                RichText::new("Configuration")
                    .color(Color32::LIGHT_BLUE)
                    .size(18.0),
            );
            eframe::egui::Grid::new("ConfigGrid").show(ui, |ui| {
                //Source directory
                ui.label(format!(
                    "Source directory: {}",
                    self.config.source_path.display()
                ));
                if ui.button("Open...").clicked() {
                    if let Some(path) = FileDialog::new()
                        .set_directory(start_directory())
                        .pick_folder()
                    {
                        self.config.source_path = path;
                        self.refresh_directories();
                    }
                }
                ui.end_row();

                //Export directory
                ui.label(format!(
                    "Export directory: {}",
                    self.config.export_path.display()
                ));
                if ui.button("Open...").clicked() {
                    if let Some(path) = FileDialog::new()
                        .set_directory(start_directory())
                        .pick_folder()
                    {
                        self.config.export_path = path;
                    }
                }
                ui.end_row();

                //Folder name filter
                let mut pattern = self.config.directory_pattern.clone().unwrap_or_default();
                ui.label("Directory name contains:");
                if ui.text_edit_singleline(&mut pattern).lost_focus() {
                    self.config.directory_pattern = if pattern.is_empty() {
                        None
                    } else {
                        Some(pattern)
                    };
                    self.refresh_directories();
                }
                ui.end_row();

                ui.label("Number of Workers");
                ui.add(
                    DragValue::new(&mut self.config.n_threads)
                        .speed(1)
                        .range(std::ops::RangeInclusive::new(1, 10)),
                );
                ui.end_row();
            });

            //Directories
            ui.separator();
            ui.label(
                RichText::new("Archive Directories")
                    .color(Color32::LIGHT_BLUE)
                    .size(18.0),
            );
            self.render_directory_list(ui);

            //Controls
            // You can only click run if there isn't already someone working
            ui.separator();
            if ui
                .add_enabled(
                    self.workers.is_empty(),
                    eframe::egui::Button::new("Export to CSV"),
                )
                .clicked()
            {
                log::info!("Starting processor...");
                self.start_workers();
            } else if !self.are_any_workers_alive() {
                self.stop_workers();
            }

            //Progress Bars
            ui.separator();
            ui.label(
                RichText::new("Progress Per Worker")
                    .color(Color32::LIGHT_BLUE)
                    .size(18.0),
            );
            for status in self.worker_statuses.iter() {
                let (msg, color) = match status.phase {
                    WorkerPhase::Merging => ("Merging", Color32::BLUE),
                    WorkerPhase::Exporting => ("Exporting", Color32::DARK_GREEN),
                    WorkerPhase::Done => ("Done", Color32::DARK_GREEN),
                    WorkerPhase::Failed => ("Failed", Color32::RED),
                };
                ui.add(
                    ProgressBar::new(status.progress)
                        .text(format!(
                            "Worker {} : {} {} - {}%",
                            status.worker_id,
                            msg,
                            status.directory,
                            (status.progress * 100.0) as i32
                        ))
                        .fill(color),
                );
            }

            ctx.request_repaint_after(std::time::Duration::from_secs(1));
        });
    }
}
