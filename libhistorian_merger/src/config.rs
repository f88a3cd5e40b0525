use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::directory::{discover_archive_directories, ArchiveDirectory};
use super::error::{ArchiveDirectoryError, ConfigError};

/// The product names its archive folders with this tag
const DEFAULT_DIRECTORY_PATTERN: &str = "TR2";

/// Structure representing the application configuration. Contains pathing and worker information
/// Configs are seralizable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub source_path: PathBuf,
    pub export_path: PathBuf,
    pub directory_pattern: Option<String>,
    pub selected: Vec<String>,
    pub n_threads: i32,
}

impl Default for Config {
    /// Generate a new Config object. All paths will be empty/invalid
    fn default() -> Self {
        Self {
            source_path: PathBuf::from("None"),
            export_path: PathBuf::from("None"),
            directory_pattern: Some(String::from(DEFAULT_DIRECTORY_PATTERN)),
            selected: vec![],
            n_threads: 1,
        }
    }
}

impl Config {
    /// Read the configuration in a YAML file
    /// Returns a Config if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    /// Write the configuration to a YAML file, replacing it if it exists
    pub fn write_config_file(&self, config_path: &Path) -> Result<(), ConfigError> {
        let yaml_str = serde_yaml::to_string(self)?;
        std::fs::write(config_path, yaml_str)?;
        Ok(())
    }

    /// Every archive directory in the source folder matching the directory pattern
    pub fn get_available_directories(&self) -> Result<Vec<ArchiveDirectory>, ArchiveDirectoryError> {
        discover_archive_directories(&self.source_path, self.directory_pattern.as_deref())
    }

    /// The archive directories to export: the selected ones, or all available if nothing
    /// is selected. Selected names which are not available are logged and ignored.
    pub fn get_archive_directories(&self) -> Result<Vec<ArchiveDirectory>, ArchiveDirectoryError> {
        let available = self.get_available_directories()?;
        if self.selected.is_empty() {
            return Ok(available);
        }

        for name in self.selected.iter() {
            if !available.iter().any(|d| d.name() == *name) {
                log::warn!("Selected directory {name} not found in source, skipping...");
            }
        }
        Ok(available
            .into_iter()
            .filter(|d| self.selected.contains(&d.name()))
            .collect())
    }

    /// Get the path to the output csv file
    pub fn get_export_file_name(&self, directory: &ArchiveDirectory) -> Result<PathBuf, ConfigError> {
        let export_file_path: PathBuf = self
            .export_path
            .join(format!("{}.csv", directory.name()));
        if self.export_path.exists() {
            Ok(export_file_path)
        } else {
            Err(ConfigError::BadFilePath(self.export_path.clone()))
        }
    }

    pub fn is_n_threads_valid(&self) -> bool {
        self.n_threads >= 1
    }
}
