use std::io::Write;
use std::path::{Path, PathBuf};

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Duration, OffsetDateTime};

use super::error::ExportError;
use super::merge::MergedSeries;

const TIME_COLUMN: &str = "Time";
const VALUE_COLUMN: &str = "Value";
const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]");

/// Writes a MergedSeries as a two column (Time, Value) CSV file
#[derive(Debug, Clone)]
pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Write the series to the exporter's path, replacing any existing file.
    ///
    /// Returns the number of rows written, or None if the series was empty, in which case no
    /// file is created.
    pub fn export(&self, series: &MergedSeries) -> Result<Option<usize>, ExportError> {
        if series.is_empty() {
            log::info!("Nothing to export to {}", self.path.display());
            return Ok(None);
        }
        let file = std::fs::File::create(&self.path)?;
        let rows = write_series(file, series)?;
        log::info!("Exported {} samples to {}", rows, self.path.display());
        Ok(Some(rows))
    }
}

/// Write the CSV rows of a series into any writer. Returns the number of data rows.
pub fn write_series<W: Write>(writer: W, series: &MergedSeries) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([TIME_COLUMN, VALUE_COLUMN])?;
    for sample in series {
        let time = round_to_micros(sample.timestamp).format(TIME_FORMAT)?;
        csv_writer.write_record([time, format_value(sample.value)])?;
    }
    csv_writer.flush()?;
    Ok(series.len())
}

/// Round to the nearest microsecond, ties to even
fn round_to_micros(timestamp: OffsetDateTime) -> OffsetDateTime {
    let nanos = timestamp.nanosecond();
    let below = nanos % 1_000;
    let truncated = timestamp
        .replace_nanosecond(nanos - below)
        .unwrap_or(timestamp);
    let odd = (nanos / 1_000) % 2 == 1;
    if below > 500 || (below == 500 && odd) {
        truncated
            .checked_add(Duration::microseconds(1))
            .unwrap_or(truncated)
    } else {
        truncated
    }
}

/// Shortest round-trip digits. Plain decimal (with a trailing ".0" on integral values) for
/// decimal exponents -4 to 15, otherwise exponent form with a signed two digit exponent
/// (`1e+16`, `2.5e-07`).
fn format_value(value: f64) -> String {
    if value.is_nan() {
        return String::from("nan");
    }
    if value.is_infinite() {
        return String::from(if value > 0.0 { "inf" } else { "-inf" });
    }

    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if (-4..16).contains(&exponent) {
        let plain = value.to_string();
        if plain.contains('.') {
            plain
        } else {
            format!("{plain}.0")
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    }
}
