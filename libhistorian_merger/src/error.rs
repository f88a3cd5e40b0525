use std::path::PathBuf;
use thiserror::Error;

use super::worker_status::WorkerStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("Epoch tick {0} is outside the representable range (before 1970-01-01 or after 9999-12-31)")]
    OutOfRange(u64),
    #[error("Instant {0} is before 1970-01-01 and has no epoch tick")]
    UnrepresentableInstant(time::OffsetDateTime),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Incorrect buffer size {actual} for {record}; expected {expected}")]
    WrongLength {
        record: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Archive index announced more records than available; record {index} is incomplete")]
    TruncatedRecord { index: usize },
    #[error("Channel header has an invalid start time: {0}")]
    InvalidTimestamp(#[from] ConversionError),
}

#[derive(Debug, Error)]
pub enum ArchiveDirectoryError {
    #[error("Could not open archive directory because {0:?} is not a directory")]
    BadDirectoryPath(PathBuf),
    #[error("No .hst archive index file found in {0:?}")]
    NoArchiveFile(PathBuf),
    #[error("ArchiveDirectory failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Export failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Export failed due to CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Export failed to format a sample timestamp: {0}")]
    FormatError(#[from] time::error::Format),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Processor failed to decode archive index {path:?}: {source}")]
    ArchiveDecode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
    #[error("Processor failed due to ArchiveDirectory error: {0}")]
    DirectoryError(#[from] ArchiveDirectoryError),
    #[error("Processor failed due to Export error: {0}")]
    ExportError(#[from] ExportError),
    #[error("Processor failed due to Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Processor failed due to Send error: {0}")]
    SendError(#[from] std::sync::mpsc::SendError<WorkerStatus>),
    #[error("Processor failed due to IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Processor failed to export {0} archive directories; check the log for details")]
    DirectoriesFailed(usize),
}
