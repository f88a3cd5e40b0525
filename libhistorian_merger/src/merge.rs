use super::archive_index::{ArchiveIndex, ChannelIndexRecord};
use super::channel_file::decode_channel_header;
use super::error::DecodeError;
use super::layout::channel_header;
use super::sample::{decode_sample_stream, Sample};

/// All samples of one archive, ordered by timestamp.
///
/// Samples with equal timestamps keep their decode order: first by record order in the
/// archive index, then by position within the channel file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedSeries {
    pub samples: Vec<Sample>,
    pub channels_merged: usize,
    pub channels_skipped: usize,
    pub dropped_samples: usize,
}

impl MergedSeries {
    /// An empty series means there is nothing to export
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }
}

impl<'a> IntoIterator for &'a MergedSeries {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Merge every channel of an archive into one time-ordered series.
///
/// `resolve` maps a channel file name (the file name part of the record's Name) to the bytes
/// of that file, or None if it cannot be found. Channels which cannot be resolved, or whose
/// header fails to decode, are logged and skipped; the remaining channels are still merged.
pub fn merge_channel_directory(
    index: &ArchiveIndex,
    records: &[ChannelIndexRecord],
    resolve: impl Fn(&str) -> Option<Vec<u8>>,
) -> MergedSeries {
    let mut series = MergedSeries::default();

    for (idx, record) in records.iter().enumerate() {
        let file_name = record.file_name();
        let bytes = match resolve(file_name) {
            Some(b) => b,
            None => {
                log::warn!("Channel file {file_name} (record {idx}) not found, skipping...");
                series.channels_skipped += 1;
                continue;
            }
        };

        let header = match bytes
            .get(..channel_header::SIZE)
            .ok_or(DecodeError::WrongLength {
                record: "channel header",
                expected: channel_header::SIZE,
                actual: bytes.len(),
            })
            .and_then(decode_channel_header)
        {
            Ok(h) => h,
            Err(e) => {
                log::warn!("Could not decode header of channel file {file_name}: {e}\nSkipping channel.");
                series.channels_skipped += 1;
                continue;
            }
        };

        let stream = decode_sample_stream(&bytes, &header);
        series.dropped_samples += stream.dropped;
        series.channels_merged += 1;
        series.samples.extend(stream.samples);
    }

    // Stable, so ties keep their append order
    series.samples.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    log::info!(
        "Merged archive \"{}\": {} samples from {} channels ({} skipped)",
        index.title,
        series.samples.len(),
        series.channels_merged,
        series.channels_skipped
    );
    series
}
