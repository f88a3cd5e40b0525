use std::cell::Cell;
use std::path::PathBuf;
use std::sync::mpsc::Sender;

use super::archive_index::decode_archive_index;
use super::config::Config;
use super::directory::ArchiveDirectory;
use super::error::ProcessorError;
use super::export::CsvExporter;
use super::merge::merge_channel_directory;
use super::worker_status::{WorkerPhase, WorkerStatus};

/// Outcome of exporting one archive directory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportSummary {
    pub directory: String,
    /// None if there was nothing to export
    pub output: Option<PathBuf>,
    pub samples: usize,
    pub channels_merged: usize,
    pub channels_skipped: usize,
    pub dropped_samples: usize,
}

/// Merge a single archive directory and export it to CSV.
///
/// Failing to find or decode the archive index aborts this directory; broken or missing
/// channel files only skip the affected channel.
pub fn process_directory(
    config: &Config,
    directory: &ArchiveDirectory,
    tx: &Sender<WorkerStatus>,
    worker_id: &usize,
    progress: f32,
) -> Result<ExportSummary, ProcessorError> {
    let name = directory.name();
    let (archive_path, archive_bytes) = directory.read_archive_bytes()?;
    let (index, records) =
        decode_archive_index(&archive_bytes).map_err(|source| ProcessorError::ArchiveDecode {
            path: archive_path.clone(),
            source,
        })?;
    log::info!(
        "Archive {} lists {} channel files",
        archive_path.display(),
        records.len()
    );

    let channel_bytes = Cell::new(0u64);
    let series = merge_channel_directory(&index, &records, |file_name| {
        let bytes = directory.resolve_channel(file_name);
        if let Some(b) = &bytes {
            channel_bytes.set(channel_bytes.get() + b.len() as u64);
        }
        bytes
    });
    log::info!(
        "Read {} of channel data from {}",
        human_bytes::human_bytes(channel_bytes.get() as f64),
        name
    );

    tx.send(WorkerStatus::new(
        progress,
        &name,
        *worker_id,
        WorkerPhase::Exporting,
    ))?;
    let export_path = config.get_export_file_name(directory)?;
    let output = CsvExporter::new(&export_path)
        .export(&series)?
        .map(|_| export_path);
    if output.is_none() {
        log::warn!("No samples found in {}, nothing exported", name);
    }

    Ok(ExportSummary {
        directory: name,
        output,
        samples: series.len(),
        channels_merged: series.channels_merged,
        channels_skipped: series.channels_skipped,
        dropped_samples: series.dropped_samples,
    })
}

/// The function to be called by a separate thread (typically the UI).
/// Exports every archive directory selected by the config on a single worker
pub fn process(
    config: Config,
    tx: Sender<WorkerStatus>,
    worker_id: usize,
) -> Result<(), ProcessorError> {
    let directories = config.get_archive_directories()?;
    process_subset(config, tx, worker_id, directories)
}

/// Process a subset of archive directories
///
/// A directory which fails is logged and the worker moves on to the next one. If any
/// directory failed the worker returns `ProcessorError::DirectoriesFailed` at the end.
pub fn process_subset(
    config: Config,
    tx: Sender<WorkerStatus>,
    worker_id: usize,
    subset: Vec<ArchiveDirectory>,
) -> Result<(), ProcessorError> {
    let n_directories = subset.len();
    let mut n_failed = 0;
    for (idx, directory) in subset.iter().enumerate() {
        let name = directory.name();
        let progress = idx as f32 / n_directories as f32;
        tx.send(WorkerStatus::new(
            progress,
            &name,
            worker_id,
            WorkerPhase::Merging,
        ))?;
        log::info!("Processing directory {}...", name);
        match process_directory(&config, directory, &tx, &worker_id, progress) {
            Ok(summary) => log::info!(
                "Finished directory {}: {} samples from {} channels ({} skipped, {} samples dropped).",
                name,
                summary.samples,
                summary.channels_merged,
                summary.channels_skipped,
                summary.dropped_samples
            ),
            Err(ProcessorError::SendError(e)) => return Err(ProcessorError::SendError(e)),
            Err(e) => {
                log::error!("Failed to export directory {}: {e}", name);
                n_failed += 1;
                tx.send(WorkerStatus::new(
                    progress,
                    &name,
                    worker_id,
                    WorkerPhase::Failed,
                ))?;
            }
        }
    }

    tx.send(WorkerStatus::new(1.0, "", worker_id, WorkerPhase::Done))?;
    if n_failed > 0 {
        Err(ProcessorError::DirectoriesFailed(n_failed))
    } else {
        Ok(())
    }
}

/// Divide the directories in to a set of subsets (per thread/worker)
pub fn create_subsets(
    config: &Config,
    directories: Vec<ArchiveDirectory>,
) -> Vec<Vec<ArchiveDirectory>> {
    let n_subsets = config.n_threads.max(1) as usize;
    let mut subsets: Vec<Vec<ArchiveDirectory>> = vec![Vec::new(); n_subsets];

    for (idx, directory) in directories.into_iter().enumerate() {
        subsets[idx % n_subsets].push(directory)
    }

    subsets
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_create_subsets() {
        let root = tempfile::tempdir().unwrap();
        let mut directories = Vec::new();
        for idx in 0..5 {
            let path = root.path().join(format!("TR2_{idx}"));
            fs::create_dir(&path).unwrap();
            directories.push(ArchiveDirectory::new(&path).unwrap());
        }
        let config = Config {
            n_threads: 2,
            ..Default::default()
        };

        let subsets = create_subsets(&config, directories);
        assert_eq!(subsets.len(), 2);
        let names: Vec<Vec<String>> = subsets
            .iter()
            .map(|s| s.iter().map(|d| d.name()).collect())
            .collect();
        assert_eq!(names[0], vec!["TR2_0", "TR2_2", "TR2_4"]);
        assert_eq!(names[1], vec!["TR2_1", "TR2_3"]);
    }

    #[test]
    fn test_create_subsets_more_workers_than_directories() {
        let config = Config {
            n_threads: 3,
            ..Default::default()
        };
        let subsets = create_subsets(&config, vec![]);
        assert_eq!(subsets.len(), 3);
        assert!(subsets.iter().all(|s| s.is_empty()));
    }
}
