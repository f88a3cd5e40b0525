use byteorder::{ByteOrder, LittleEndian};
use time::{Duration, OffsetDateTime};

use super::channel_file::ChannelHeader;
use super::layout::channel_header;

/// Size of one stored sample (f64)
pub const SAMPLE_SIZE: usize = 8;

/// A single timestamped value from a channel file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: OffsetDateTime,
    pub value: f64,
}

/// The result of decoding a channel's sample array.
///
/// `dropped` counts the samples announced by the header which could not be read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleStream {
    pub samples: Vec<Sample>,
    pub dropped: usize,
}

/// Decode the samples following the channel header in a channel file.
///
/// `bytes` is the whole channel file. Exactly `data_length` samples are read from offset
/// `channel_header::SIZE`; sample `i` is stamped `start_time + i * sample_period` ms. If the
/// file ends early the samples read so far are returned and the rest are counted as dropped.
pub fn decode_sample_stream(bytes: &[u8], header: &ChannelHeader) -> SampleStream {
    let expected = header.sample_count();
    let data = bytes.get(channel_header::SIZE..).unwrap_or(&[]);
    let period_ms = i64::from(header.descriptor.sample_period);

    let mut samples = Vec::with_capacity(expected.min(data.len() / SAMPLE_SIZE));
    for (idx, chunk) in data.chunks_exact(SAMPLE_SIZE).take(expected).enumerate() {
        let timestamp = match period_ms
            .checked_mul(idx as i64)
            .and_then(|ms| header.start_time.checked_add(Duration::milliseconds(ms)))
        {
            Some(ts) => ts,
            None => break,
        };
        samples.push(Sample {
            timestamp,
            value: LittleEndian::read_f64(chunk),
        });
    }

    let dropped = expected - samples.len();
    if dropped > 0 {
        log::warn!(
            "Channel {} announced {} samples but only {} could be read; {} dropped",
            header.descriptor.id,
            expected,
            samples.len(),
            dropped
        );
    }

    SampleStream { samples, dropped }
}

/// Decode the samples of a channel file, discarding the dropped sample count
pub fn decode_samples(bytes: &[u8], header: &ChannelHeader) -> Vec<Sample> {
    decode_sample_stream(bytes, header).samples
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::channel_file::decode_channel_header;
    use crate::channel_file::tests::{make_header_bytes, JAN_2024_TICKS};
    use byteorder::WriteBytesExt;
    use time::macros::datetime;

    /// Build a complete channel file holding `values`
    pub(crate) fn make_channel_file(start_ticks: u64, period_ms: u32, values: &[f64]) -> Vec<u8> {
        let mut bytes = make_header_bytes(start_ticks, period_ms, values.len() as u32);
        for value in values {
            bytes.write_f64::<LittleEndian>(*value).unwrap();
        }
        bytes
    }

    #[test]
    fn test_full_stream() {
        let bytes = make_channel_file(JAN_2024_TICKS, 250, &[1.5, -2.0, 3.25, 4.0]);
        let header = decode_channel_header(&bytes[..304]).unwrap();
        let stream = decode_sample_stream(&bytes, &header);

        assert_eq!(stream.dropped, 0);
        let values: Vec<f64> = stream.samples.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![1.5, -2.0, 3.25, 4.0]);
        let times: Vec<OffsetDateTime> = stream.samples.iter().map(|s| s.timestamp).collect();
        assert_eq!(
            times,
            vec![
                datetime!(2024-01-01 0:00:00 UTC),
                datetime!(2024-01-01 0:00:00.25 UTC),
                datetime!(2024-01-01 0:00:00.5 UTC),
                datetime!(2024-01-01 0:00:00.75 UTC),
            ]
        );
    }

    #[test]
    fn test_short_stream() {
        let mut bytes = make_channel_file(JAN_2024_TICKS, 1000, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        // Two complete samples and a partial third
        bytes.truncate(304 + 2 * 8 + 5);
        let header = decode_channel_header(&bytes[..304]).unwrap();
        let stream = decode_sample_stream(&bytes, &header);

        assert_eq!(stream.samples.len(), 2);
        assert_eq!(stream.dropped, 3);
        assert_eq!(stream.samples[1].value, 2.0);
        assert_eq!(decode_samples(&bytes, &header).len(), 2);
    }

    #[test]
    fn test_extra_bytes_ignored() {
        let mut bytes = make_channel_file(JAN_2024_TICKS, 1000, &[7.0, 8.0]);
        bytes.write_f64::<LittleEndian>(99.0).unwrap();
        let header = decode_channel_header(&bytes[..304]).unwrap();
        let samples = decode_samples(&bytes, &header);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].value, 8.0);
    }

    #[test]
    fn test_header_only() {
        let bytes = make_header_bytes(JAN_2024_TICKS, 1000, 3);
        let header = decode_channel_header(&bytes).unwrap();
        let stream = decode_sample_stream(&bytes, &header);
        assert!(stream.samples.is_empty());
        assert_eq!(stream.dropped, 3);
    }

    #[test]
    fn test_scaling_not_applied() {
        let bytes = make_channel_file(JAN_2024_TICKS, 1000, &[2047.5]);
        let header = decode_channel_header(&bytes[..304]).unwrap();
        assert_eq!(header.scaling.raw_full, 4095.0);
        assert_eq!(decode_samples(&bytes, &header)[0].value, 2047.5);
    }
}
