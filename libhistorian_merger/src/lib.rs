//! # historian_merger
//!
//! historian_merger converts the binary archives of an industrial data historian into CSV.
//! An archive is a folder holding one `.hst` archive index and a set of `.0xx` channel
//! files. Every channel file holds a fixed header followed by a dense array of samples; the
//! merger decodes every channel listed in the archive index, reconstructs the sample
//! timestamps and writes all samples of the folder to a single time-ordered CSV file.
//!
//! ## Building & Install
//!
//! To build and install the GUI merger use `cargo install --path ./historian_merger` from the
//! top level repository.
//!
//! To build and install the CLI merger use `cargo install --path ./historian_merger_cli` from
//! the top level repository.
//!
//! ## Configuration
//!
//! A configuration file saved using the UI is compatible with the CLI and vice-versa. The
//! YAML format of a configuration file is as follows:
//!
//! ```yml
//! source_path: None
//! export_path: None
//! directory_pattern: TR2
//! selected: []
//! n_threads: 1
//! ```
//!
//! - `source_path`: folder containing the archive folders
//! - `export_path`: folder to which `<archive folder>.csv` files are written
//! - `directory_pattern`: only folders whose name contains this text are listed. Set to
//!   `null` to list every folder.
//! - `selected`: names of the archive folders to export. Empty exports all of them.
//! - `n_threads`: number of parallel workers, at least 1
//!
//! ## Archive Format
//!
//! All values are little-endian. Text fields are fixed width, single-byte (Latin-1) and NUL
//! padded. Times are FILETIME ticks (100 ns since 1601-01-01 UTC).
//!
//! ```text
//! TR2_0001.hst
//! MASTERHEADER (176 bytes) - Title, ID, Type, Version, Mode, History, NFiles, Next, AddOn
//! |---- HSTFILEHEADER x NFiles (448 bytes each) - Name, channel descriptor
//! TR2_0001.001
//! DATAFILEHEADER (304 bytes) - Title, RawZero, RawFull, EngZero, EngFull, channel descriptor
//! |---- f64 x DataLength
//! ```
//!
//! The channel descriptor (ID, Type, Version, StartEvNo, LogName, Mode, Area, Priv,
//! FileType, SamplePeriod, EngUnits, Format, StartTime, EndTime, DataLength, FilePointer,
//! EndEvNo) is identical in both headers. See the `layout` module for exact offsets.
//!
//! ## Output
//!
//! One CSV per archive folder with a `Time,Value` header. Times are UTC rounded to the
//! microsecond (`2024-01-01 00:00:00.250000`). Values use the shortest form that reads back
//! exactly, switching to exponent form outside 1e-4..1e16 (`1e+16`, `2.5e-07`). Samples of all channels are interleaved in
//! time order.
pub mod archive_index;
pub mod channel_file;
pub mod config;
pub mod directory;
pub mod epoch;
pub mod error;
pub mod export;
pub mod layout;
pub mod merge;
pub mod process;
pub mod sample;
pub mod selection;
pub mod worker_status;
