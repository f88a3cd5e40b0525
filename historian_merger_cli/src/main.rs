use clap::{Arg, Command};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use indicatif_log_bridge::LogWrapper;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread::JoinHandle;

use libhistorian_merger::config::Config;
use libhistorian_merger::error::ProcessorError;
use libhistorian_merger::process::{create_subsets, process_subset};
use libhistorian_merger::worker_status::{WorkerPhase, WorkerStatus};

fn phase_message(status: &WorkerStatus) -> String {
    match status.phase {
        WorkerPhase::Merging => format!("Merging {}", status.directory),
        WorkerPhase::Exporting => format!("Exporting {}", status.directory),
        WorkerPhase::Failed => format!("Failed {}", status.directory),
        WorkerPhase::Done => String::from("Done"),
    }
}

fn main() {
    // Create a cli
    let matches = Command::new("historian_merger_cli")
        .about("Merge historian archive folders into CSV files")
        .arg_required_else_help(true)
        .subcommand(Command::new("new").about("Make a template configuration yaml file"))
        .arg(
            Arg::new("path")
                .short('p')
                .long("path")
                .required(true)
                .global(true)
                .help("Path to the configuration file"),
        )
        .get_matches();

    // Initialize feedback
    let logger = simplelog::TermLogger::new(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );

    let pb_manager = MultiProgress::new();

    if let Err(e) = LogWrapper::new(pb_manager.clone(), logger).try_init() {
        eprintln!("Could not create logging/progress: {e}");
        return;
    }

    // Parse the cli
    let config_path = match matches.get_one::<String>("path") {
        Some(p) => PathBuf::from(p),
        None => {
            log::error!("A configuration path is required");
            return;
        }
    };

    if let Some(("new", _)) = matches.subcommand() {
        log::info!(
            "Making a template config at {}...",
            config_path.to_string_lossy()
        );
        match Config::default().write_config_file(&config_path) {
            Ok(()) => log::info!("Done."),
            Err(e) => log::error!("Could not write template config: {e}"),
        }
        return;
    }

    // Load our config
    log::info!("Loading config from {}...", config_path.to_string_lossy());
    let config = match Config::read_config_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };
    log::info!("Config successfully loaded.");
    log::info!("Source Path: {}", config.source_path.to_string_lossy());
    log::info!("Export Path: {}", config.export_path.to_string_lossy());
    log::info!(
        "Directory Pattern: {}",
        config.directory_pattern.as_deref().unwrap_or("None")
    );
    log::info!("Number of Workers: {}", config.n_threads);

    if !config.is_n_threads_valid() {
        log::error!("Number of workers must be at least 1");
        return;
    }

    let directories = match config.get_archive_directories() {
        Ok(d) => d,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };
    if directories.is_empty() {
        log::warn!("No archive directories found, nothing to do.");
        return;
    }
    log::info!("Found {} archive directories.", directories.len());

    // Spawn the workers!
    let (tx, rx) = mpsc::channel::<WorkerStatus>();
    let style = ProgressStyle::with_template("{bar:40.cyan/blue} {percent:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    let mut bars: Vec<ProgressBar> = Vec::new();
    let mut workers: Vec<JoinHandle<Result<(), ProcessorError>>> = Vec::new();
    for subset in create_subsets(&config, directories) {
        // Dont make empty workers
        if subset.is_empty() {
            continue;
        }
        let bar = pb_manager.add(ProgressBar::new(100));
        bar.set_style(style.clone());
        bars.push(bar);
        let conf = config.clone();
        let worker_tx = tx.clone();
        let worker_id = bars.len() - 1;
        workers.push(std::thread::spawn(move || {
            process_subset(conf, worker_tx, worker_id, subset)
        }));
    }
    // Only the workers hold senders now, so the loop ends when they are all done
    drop(tx);

    for status in rx.iter() {
        if let Some(bar) = bars.get(status.worker_id) {
            bar.set_position((status.progress * 100.0) as u64);
            bar.set_message(phase_message(&status));
        }
    }

    let mut n_errors = 0;
    for worker in workers {
        match worker.join() {
            Ok(Ok(())) => (),
            Ok(Err(e)) => {
                n_errors += 1;
                log::error!("Worker failed with error: {e}");
            }
            Err(_) => {
                n_errors += 1;
                log::error!("Failed to join merging worker!");
            }
        }
    }

    for bar in bars.iter() {
        bar.finish();
    }

    if n_errors == 0 {
        log::info!("Successfully merged data!");
    }
    log::info!("Done.");
}
