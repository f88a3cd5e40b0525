use std::path::{Path, PathBuf};

use super::error::ArchiveDirectoryError;

const ARCHIVE_EXTENSION: &str = "hst";

/// A folder written by the historian: one .hst archive index plus its .0xx channel files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveDirectory {
    path: PathBuf,
}

impl ArchiveDirectory {
    pub fn new(path: &Path) -> Result<Self, ArchiveDirectoryError> {
        if !path.is_dir() {
            return Err(ArchiveDirectoryError::BadDirectoryPath(path.to_path_buf()));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Name of the folder, used to name the exported file
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Find the archive index file. If there are several the first by name wins.
    pub fn find_archive_file(&self) -> Result<PathBuf, ArchiveDirectoryError> {
        let mut candidates: Vec<PathBuf> = Vec::new();
        for item in self.path.read_dir()? {
            let item_path = item?.path();
            let is_archive = item_path
                .extension()
                .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(ARCHIVE_EXTENSION))
                .unwrap_or(false);
            if is_archive && item_path.is_file() {
                candidates.push(item_path);
            }
        }

        candidates.sort();
        candidates
            .into_iter()
            .next()
            .ok_or_else(|| ArchiveDirectoryError::NoArchiveFile(self.path.clone()))
    }

    /// Read the whole archive index file
    pub fn read_archive_bytes(&self) -> Result<(PathBuf, Vec<u8>), ArchiveDirectoryError> {
        let archive_path = self.find_archive_file()?;
        let bytes = std::fs::read(&archive_path)?;
        Ok((archive_path, bytes))
    }

    /// Read a channel file by name. Only the file name part of `name` is used.
    ///
    /// Returns None if the file does not exist or can not be read.
    pub fn resolve_channel(&self, name: &str) -> Option<Vec<u8>> {
        let file_name = Path::new(name).file_name()?;
        let channel_path = self.path.join(file_name);
        if !channel_path.exists() {
            log::warn!("Channel file not found: {}", channel_path.display());
            return None;
        }
        match std::fs::read(&channel_path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::warn!("Could not read channel file {}: {e}", channel_path.display());
                None
            }
        }
    }
}

/// List the archive directories directly inside `root`.
///
/// Only folders whose name contains `pattern` are returned (all folders if None). The list is
/// sorted by folder name.
pub fn discover_archive_directories(
    root: &Path,
    pattern: Option<&str>,
) -> Result<Vec<ArchiveDirectory>, ArchiveDirectoryError> {
    if !root.is_dir() {
        return Err(ArchiveDirectoryError::BadDirectoryPath(root.to_path_buf()));
    }

    let mut directories: Vec<ArchiveDirectory> = Vec::new();
    for item in root.read_dir()? {
        let item_path = item?.path();
        if !item_path.is_dir() {
            continue;
        }
        let name = item_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if pattern.map(|p| name.contains(p)).unwrap_or(true) {
            directories.push(ArchiveDirectory { path: item_path });
        }
    }

    directories.sort_by_key(|d| d.name());
    Ok(directories)
}
