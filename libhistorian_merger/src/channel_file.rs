use time::OffsetDateTime;

use super::epoch::ticks_to_instant;
use super::error::DecodeError;
use super::layout::{channel_header, descriptor};

/// Metadata describing one logged channel.
///
/// The same 176 byte block appears in the channel file header (DATAFILEHEADER) and in the
/// archive index record (HSTFILEHEADER), so both decoders share this type. Start and end
/// times are kept as raw epoch ticks; each owner decides how strictly they are converted.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelDescriptor {
    pub id: String,
    pub kind: u16,
    pub version: u16,
    pub start_event: i64,
    pub log_name: String,
    pub mode: u32,
    pub area: u16,
    pub privilege: u16,
    pub file_type: u16,
    /// Sampling period in milliseconds
    pub sample_period: u32,
    pub eng_units: String,
    pub format: u32,
    pub start_ticks: u64,
    pub end_ticks: u64,
    /// Number of samples in the channel file
    pub data_length: u32,
    pub file_pointer: u32,
    pub end_event: i64,
}

impl ChannelDescriptor {
    /// Decode the descriptor block. The slice must be exactly `descriptor::SIZE` bytes.
    pub fn decode(block: &[u8]) -> Result<Self, DecodeError> {
        if block.len() != descriptor::SIZE {
            return Err(DecodeError::WrongLength {
                record: "channel descriptor",
                expected: descriptor::SIZE,
                actual: block.len(),
            });
        }

        Ok(Self {
            id: descriptor::ID.text(block),
            kind: descriptor::TYPE.u16(block),
            version: descriptor::VERSION.u16(block),
            start_event: descriptor::START_EV_NO.i64(block),
            log_name: descriptor::LOG_NAME.text(block),
            mode: descriptor::MODE.u32(block),
            area: descriptor::AREA.u16(block),
            privilege: descriptor::PRIV.u16(block),
            file_type: descriptor::FILE_TYPE.u16(block),
            sample_period: descriptor::SAMPLE_PERIOD.u32(block),
            eng_units: descriptor::ENG_UNITS.text(block),
            format: descriptor::FORMAT.u32(block),
            start_ticks: descriptor::START_TIME.u64(block),
            end_ticks: descriptor::END_TIME.u64(block),
            data_length: descriptor::DATA_LENGTH.u32(block),
            file_pointer: descriptor::FILE_POINTER.u32(block),
            end_event: descriptor::END_EV_NO.i64(block),
        })
    }

    /// Write the descriptor into a block of `descriptor::SIZE` bytes. Gaps are left untouched.
    pub fn encode_into(&self, block: &mut [u8]) {
        descriptor::ID.put_text(block, &self.id);
        descriptor::TYPE.put_u16(block, self.kind);
        descriptor::VERSION.put_u16(block, self.version);
        descriptor::START_EV_NO.put_i64(block, self.start_event);
        descriptor::LOG_NAME.put_text(block, &self.log_name);
        descriptor::MODE.put_u32(block, self.mode);
        descriptor::AREA.put_u16(block, self.area);
        descriptor::PRIV.put_u16(block, self.privilege);
        descriptor::FILE_TYPE.put_u16(block, self.file_type);
        descriptor::SAMPLE_PERIOD.put_u32(block, self.sample_period);
        descriptor::ENG_UNITS.put_text(block, &self.eng_units);
        descriptor::FORMAT.put_u32(block, self.format);
        descriptor::START_TIME.put_u64(block, self.start_ticks);
        descriptor::END_TIME.put_u64(block, self.end_ticks);
        descriptor::DATA_LENGTH.put_u32(block, self.data_length);
        descriptor::FILE_POINTER.put_u32(block, self.file_pointer);
        descriptor::END_EV_NO.put_i64(block, self.end_event);
    }
}

/// Raw to engineering unit scaling stored in the channel header.
///
/// Samples are stored in engineering units already, so these values are informational and
/// are never applied to decoded samples.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Scaling {
    pub raw_zero: f32,
    pub raw_full: f32,
    pub eng_zero: f32,
    pub eng_full: f32,
}

/// The DATAFILEHEADER at the start of every .0xx channel file
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelHeader {
    pub title: String,
    pub scaling: Scaling,
    pub descriptor: ChannelDescriptor,
    /// Instant of the first sample
    pub start_time: OffsetDateTime,
    /// None if the stored end time is out of range
    pub end_time: Option<OffsetDateTime>,
}

impl ChannelHeader {
    /// Decode a channel header from exactly `channel_header::SIZE` bytes.
    ///
    /// An out of range start time is fatal as every sample timestamp derives from it. An out
    /// of range end time only drops the end time.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() != channel_header::SIZE {
            return Err(DecodeError::WrongLength {
                record: "channel header",
                expected: channel_header::SIZE,
                actual: bytes.len(),
            });
        }

        let descriptor = ChannelDescriptor::decode(channel_header::DESCRIPTOR.bytes(bytes))?;
        let start_time = ticks_to_instant(descriptor.start_ticks)?;
        let end_time = ticks_to_instant(descriptor.end_ticks).ok();

        Ok(Self {
            title: channel_header::TITLE.text(bytes),
            scaling: Scaling {
                raw_zero: channel_header::RAW_ZERO.f32(bytes),
                raw_full: channel_header::RAW_FULL.f32(bytes),
                eng_zero: channel_header::ENG_ZERO.f32(bytes),
                eng_full: channel_header::ENG_FULL.f32(bytes),
            },
            descriptor,
            start_time,
            end_time,
        })
    }

    /// Write the header back to its on-disk layout. Alignment gaps are zero.
    ///
    /// Times are written from the stored ticks, which are the source of the decoded instants.
    pub fn encode(&self) -> [u8; channel_header::SIZE] {
        let mut bytes = [0u8; channel_header::SIZE];
        channel_header::TITLE.put_text(&mut bytes, &self.title);
        channel_header::RAW_ZERO.put_f32(&mut bytes, self.scaling.raw_zero);
        channel_header::RAW_FULL.put_f32(&mut bytes, self.scaling.raw_full);
        channel_header::ENG_ZERO.put_f32(&mut bytes, self.scaling.eng_zero);
        channel_header::ENG_FULL.put_f32(&mut bytes, self.scaling.eng_full);
        self.descriptor
            .encode_into(channel_header::DESCRIPTOR.bytes_mut(&mut bytes));
        bytes
    }

    /// Number of samples the header announces
    pub fn sample_count(&self) -> usize {
        self.descriptor.data_length as usize
    }
}

/// Decode the DATAFILEHEADER of a channel file
pub fn decode_channel_header(bytes: &[u8]) -> Result<ChannelHeader, DecodeError> {
    ChannelHeader::decode(bytes)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::epoch::{instant_to_ticks, UNIX_EPOCH_TICKS};
    use crate::error::ConversionError;
    use crate::layout::{layout_size, FieldKind};
    use time::macros::datetime;

    // 2024-01-01 00:00:00 UTC
    pub(crate) const JAN_2024_TICKS: u64 = 133_485_408_000_000_000;

    pub(crate) fn make_descriptor(start_ticks: u64, period_ms: u32, length: u32) -> ChannelDescriptor {
        ChannelDescriptor {
            id: String::from("FT101"),
            kind: 3,
            version: 2,
            start_event: -4,
            log_name: String::from("Feed flow"),
            mode: 0x0001_0002,
            area: 7,
            privilege: 1,
            file_type: 5,
            sample_period: period_ms,
            eng_units: String::from("m³/h"),
            format: 8,
            start_ticks,
            end_ticks: start_ticks + (length as u64) * (period_ms as u64) * 10_000,
            data_length: length,
            file_pointer: 304,
            end_event: 9_000_000_001,
        }
    }

    /// Build a channel header buffer with recognisable values in every field
    pub(crate) fn make_header_bytes(start_ticks: u64, period_ms: u32, length: u32) -> Vec<u8> {
        let mut bytes = vec![0u8; channel_header::SIZE];
        channel_header::TITLE.put_text(&mut bytes, "Reactor feed flow");
        channel_header::RAW_ZERO.put_f32(&mut bytes, 0.0);
        channel_header::RAW_FULL.put_f32(&mut bytes, 4095.0);
        channel_header::ENG_ZERO.put_f32(&mut bytes, -1.5);
        channel_header::ENG_FULL.put_f32(&mut bytes, 250.25);
        make_descriptor(start_ticks, period_ms, length)
            .encode_into(channel_header::DESCRIPTOR.bytes_mut(&mut bytes));
        bytes
    }

    #[test]
    fn test_decode_header() {
        let bytes = make_header_bytes(JAN_2024_TICKS, 1000, 3);
        let header = decode_channel_header(&bytes).unwrap();

        assert_eq!(header.title, "Reactor feed flow");
        assert_eq!(header.scaling.raw_full, 4095.0);
        assert_eq!(header.scaling.eng_zero, -1.5);
        assert_eq!(header.scaling.eng_full, 250.25);
        assert_eq!(header.descriptor.id, "FT101");
        assert_eq!(header.descriptor.kind, 3);
        assert_eq!(header.descriptor.start_event, -4);
        assert_eq!(header.descriptor.log_name, "Feed flow");
        assert_eq!(header.descriptor.mode, 0x0001_0002);
        assert_eq!(header.descriptor.file_type, 5);
        assert_eq!(header.descriptor.sample_period, 1000);
        assert_eq!(header.descriptor.eng_units, "m³/h");
        assert_eq!(header.descriptor.data_length, 3);
        assert_eq!(header.descriptor.end_event, 9_000_000_001);
        assert_eq!(header.start_time, datetime!(2024-01-01 0:00 UTC));
        assert_eq!(header.end_time, Some(datetime!(2024-01-01 0:00:03 UTC)));
        assert_eq!(header.sample_count(), 3);
    }

    #[test]
    fn test_raw_offsets() {
        let bytes = make_header_bytes(JAN_2024_TICKS, 250, 42);
        assert_eq!(&bytes[128..133], b"FT101");
        assert_eq!(u32::from_le_bytes(bytes[250..254].try_into().unwrap()), 250);
        assert_eq!(
            u64::from_le_bytes(bytes[266..274].try_into().unwrap()),
            JAN_2024_TICKS
        );
        assert_eq!(u32::from_le_bytes(bytes[282..286].try_into().unwrap()), 42);
    }

    #[test]
    fn test_encode_reproduces_fields() {
        let mut bytes = make_header_bytes(JAN_2024_TICKS, 1000, 3);
        // Garbage in the alignment gaps must not matter
        bytes[148..160].fill(0xAA);
        bytes[298..304].fill(0x55);
        let header = decode_channel_header(&bytes).unwrap();
        let encoded = header.encode();

        let gaps: Vec<std::ops::Range<usize>> = crate::layout::descriptor::FIELDS
            .iter()
            .filter(|f| f.kind == FieldKind::Padding)
            .map(|f| {
                let start = channel_header::DESCRIPTOR.offset + f.offset;
                start..start + f.width
            })
            .collect();
        assert_eq!(gaps, vec![148..160, 298..304]);
        for (idx, (original, reencoded)) in bytes.iter().zip(encoded.iter()).enumerate() {
            if gaps.iter().any(|gap| gap.contains(&idx)) {
                assert_eq!(*reencoded, 0);
            } else {
                assert_eq!(original, reencoded, "byte {idx} differs");
            }
        }
        assert_eq!(layout_size(channel_header::FIELDS), encoded.len());
    }

    #[test]
    fn test_times_survive_encode() {
        let start = datetime!(2024-06-30 12:00:00.25 UTC);
        let end = datetime!(2024-06-30 13:00:00.75 UTC);
        let mut descriptor = make_descriptor(instant_to_ticks(start).unwrap(), 1000, 3600);
        descriptor.end_ticks = instant_to_ticks(end).unwrap();
        let header = ChannelHeader {
            title: String::from("Reactor feed flow"),
            scaling: Scaling::default(),
            descriptor,
            start_time: start,
            end_time: Some(end),
        };

        let decoded = decode_channel_header(&header.encode()).unwrap();
        assert_eq!(decoded.start_time, start);
        assert_eq!(decoded.end_time, Some(end));
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_wrong_length() {
        let bytes = make_header_bytes(JAN_2024_TICKS, 1000, 3);
        assert_eq!(
            decode_channel_header(&bytes[..303]),
            Err(DecodeError::WrongLength {
                record: "channel header",
                expected: 304,
                actual: 303
            })
        );
        let mut longer = bytes.clone();
        longer.push(0);
        assert!(matches!(
            decode_channel_header(&longer),
            Err(DecodeError::WrongLength { actual: 305, .. })
        ));
    }

    #[test]
    fn test_start_time_out_of_range_is_fatal() {
        let bytes = make_header_bytes(UNIX_EPOCH_TICKS - 10, 1000, 3);
        assert_eq!(
            decode_channel_header(&bytes),
            Err(DecodeError::InvalidTimestamp(ConversionError::OutOfRange(
                UNIX_EPOCH_TICKS - 10
            )))
        );
    }

    #[test]
    fn test_end_time_out_of_range_is_dropped() {
        let mut bytes = make_header_bytes(JAN_2024_TICKS, 1000, 3);
        bytes[274..282].fill(0);
        let header = decode_channel_header(&bytes).unwrap();
        assert_eq!(header.end_time, None);
        assert_eq!(header.descriptor.end_ticks, 0);
    }
}
