//! Byte-exact field tables for the fixed-size records of a historian archive.
//!
//! Every record is described as an explicit table of named `Field` constants (offset, width,
//! decode rule), alignment gaps included. The tables are checked at compile time: each field must
//! start where the previous one ended and the total must equal the documented record size.
//! All numeric values are little-endian.
//!
//! ```text
//! MASTERHEADER (176)      Title | ID | Type | Version | 4x | Mode | History | NFiles | Next | AddOn | 20x
//! HSTFILEHEADER (448)     Name(272) | descriptor(176)
//! DATAFILEHEADER (304)    Title(112) | RawZero | RawFull | EngZero | EngFull | descriptor(176)
//! descriptor (176)        ID | Type | Version | StartEvNo | 12x | LogName | Mode | Area | Priv
//!                         | FileType | SamplePeriod | EngUnits | Format | StartTime | EndTime
//!                         | DataLength | FilePointer | EndEvNo | 6x
//! ```
use byteorder::{ByteOrder, LittleEndian};

/// How the bytes of a field are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Fixed-width, NUL padded, single-byte (Latin-1) text
    Text,
    U16,
    U32,
    I64,
    U64,
    F32,
    /// The shared channel descriptor block
    Descriptor,
    /// Alignment gap, never read
    Padding,
}

/// A single entry in a record layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub offset: usize,
    pub width: usize,
    pub kind: FieldKind,
}

impl Field {
    const fn new(offset: usize, width: usize, kind: FieldKind) -> Self {
        Self {
            offset,
            width,
            kind,
        }
    }

    pub const fn end(&self) -> usize {
        self.offset + self.width
    }

    // Callers check the record length before touching any field, so slicing cannot fail
    fn slot<'a>(&self, record: &'a [u8]) -> &'a [u8] {
        &record[self.offset..self.end()]
    }

    fn slot_mut<'a>(&self, record: &'a mut [u8]) -> &'a mut [u8] {
        &mut record[self.offset..self.end()]
    }

    /// The raw bytes of the field, used for nested blocks
    pub fn bytes<'a>(&self, record: &'a [u8]) -> &'a [u8] {
        self.slot(record)
    }

    pub fn bytes_mut<'a>(&self, record: &'a mut [u8]) -> &'a mut [u8] {
        self.slot_mut(record)
    }

    pub fn text(&self, record: &[u8]) -> String {
        decode_text(self.slot(record))
    }

    pub fn u16(&self, record: &[u8]) -> u16 {
        LittleEndian::read_u16(self.slot(record))
    }

    pub fn u32(&self, record: &[u8]) -> u32 {
        LittleEndian::read_u32(self.slot(record))
    }

    pub fn i64(&self, record: &[u8]) -> i64 {
        LittleEndian::read_i64(self.slot(record))
    }

    pub fn u64(&self, record: &[u8]) -> u64 {
        LittleEndian::read_u64(self.slot(record))
    }

    pub fn f32(&self, record: &[u8]) -> f32 {
        LittleEndian::read_f32(self.slot(record))
    }

    pub fn put_text(&self, record: &mut [u8], value: &str) {
        encode_text(self.slot_mut(record), value)
    }

    pub fn put_u16(&self, record: &mut [u8], value: u16) {
        LittleEndian::write_u16(self.slot_mut(record), value)
    }

    pub fn put_u32(&self, record: &mut [u8], value: u32) {
        LittleEndian::write_u32(self.slot_mut(record), value)
    }

    pub fn put_i64(&self, record: &mut [u8], value: i64) {
        LittleEndian::write_i64(self.slot_mut(record), value)
    }

    pub fn put_u64(&self, record: &mut [u8], value: u64) {
        LittleEndian::write_u64(self.slot_mut(record), value)
    }

    pub fn put_f32(&self, record: &mut [u8], value: f32) {
        LittleEndian::write_f32(self.slot_mut(record), value)
    }
}

/// Read a fixed-width text slot: one Latin-1 character per byte, cut at the first NUL.
pub fn decode_text(slot: &[u8]) -> String {
    slot.iter()
        .take_while(|byte| **byte != 0)
        .map(|byte| char::from(*byte))
        .collect()
}

/// Write text into a fixed-width slot. The slot is NUL filled first; text that does not fit
/// is cut and characters outside Latin-1 become '?'.
pub fn encode_text(slot: &mut [u8], value: &str) {
    slot.fill(0);
    for (dst, c) in slot.iter_mut().zip(value.chars()) {
        *dst = u8::try_from(u32::from(c)).unwrap_or(b'?');
    }
}

/// Total size of a layout, or 0 if the fields are not contiguous from offset 0 or a nested
/// descriptor block is not exactly `descriptor::SIZE` wide
pub const fn layout_size(fields: &[Field]) -> usize {
    let mut end = 0;
    let mut idx = 0;
    while idx < fields.len() {
        if fields[idx].offset != end {
            return 0;
        }
        if matches!(fields[idx].kind, FieldKind::Descriptor) && fields[idx].width != descriptor::SIZE
        {
            return 0;
        }
        end = fields[idx].end();
        idx += 1;
    }
    end
}

/// The channel descriptor shared by DATAFILEHEADER and HSTFILEHEADER
pub mod descriptor {
    use super::{Field, FieldKind};

    pub const SIZE: usize = 176;

    pub const ID: Field = Field::new(0, 8, FieldKind::Text);
    pub const TYPE: Field = Field::new(8, 2, FieldKind::U16);
    pub const VERSION: Field = Field::new(10, 2, FieldKind::U16);
    pub const START_EV_NO: Field = Field::new(12, 8, FieldKind::I64);
    pub const GAP_0: Field = Field::new(20, 12, FieldKind::Padding);
    pub const LOG_NAME: Field = Field::new(32, 80, FieldKind::Text);
    pub const MODE: Field = Field::new(112, 4, FieldKind::U32);
    pub const AREA: Field = Field::new(116, 2, FieldKind::U16);
    pub const PRIV: Field = Field::new(118, 2, FieldKind::U16);
    pub const FILE_TYPE: Field = Field::new(120, 2, FieldKind::U16);
    pub const SAMPLE_PERIOD: Field = Field::new(122, 4, FieldKind::U32);
    pub const ENG_UNITS: Field = Field::new(126, 8, FieldKind::Text);
    pub const FORMAT: Field = Field::new(134, 4, FieldKind::U32);
    pub const START_TIME: Field = Field::new(138, 8, FieldKind::U64);
    pub const END_TIME: Field = Field::new(146, 8, FieldKind::U64);
    pub const DATA_LENGTH: Field = Field::new(154, 4, FieldKind::U32);
    pub const FILE_POINTER: Field = Field::new(158, 4, FieldKind::U32);
    pub const END_EV_NO: Field = Field::new(162, 8, FieldKind::I64);
    pub const GAP_1: Field = Field::new(170, 6, FieldKind::Padding);

    pub const FIELDS: &[Field] = &[
        ID,
        TYPE,
        VERSION,
        START_EV_NO,
        GAP_0,
        LOG_NAME,
        MODE,
        AREA,
        PRIV,
        FILE_TYPE,
        SAMPLE_PERIOD,
        ENG_UNITS,
        FORMAT,
        START_TIME,
        END_TIME,
        DATA_LENGTH,
        FILE_POINTER,
        END_EV_NO,
        GAP_1,
    ];
}

/// DATAFILEHEADER, the header of every .0xx channel file
pub mod channel_header {
    use super::{Field, FieldKind};

    pub const SIZE: usize = 304;

    pub const TITLE: Field = Field::new(0, 112, FieldKind::Text);
    pub const RAW_ZERO: Field = Field::new(112, 4, FieldKind::F32);
    pub const RAW_FULL: Field = Field::new(116, 4, FieldKind::F32);
    pub const ENG_ZERO: Field = Field::new(120, 4, FieldKind::F32);
    pub const ENG_FULL: Field = Field::new(124, 4, FieldKind::F32);
    pub const DESCRIPTOR: Field = Field::new(128, super::descriptor::SIZE, FieldKind::Descriptor);

    pub const FIELDS: &[Field] = &[TITLE, RAW_ZERO, RAW_FULL, ENG_ZERO, ENG_FULL, DESCRIPTOR];
}

/// MASTERHEADER, the leading record of an .hst archive index
pub mod master_header {
    use super::{Field, FieldKind};

    pub const SIZE: usize = 176;

    pub const TITLE: Field = Field::new(0, 128, FieldKind::Text);
    pub const ID: Field = Field::new(128, 8, FieldKind::Text);
    pub const TYPE: Field = Field::new(136, 2, FieldKind::U16);
    pub const VERSION: Field = Field::new(138, 2, FieldKind::U16);
    pub const GAP_0: Field = Field::new(140, 4, FieldKind::Padding);
    pub const MODE: Field = Field::new(144, 4, FieldKind::U32);
    pub const HISTORY: Field = Field::new(148, 2, FieldKind::U16);
    pub const N_FILES: Field = Field::new(150, 2, FieldKind::U16);
    pub const NEXT: Field = Field::new(152, 2, FieldKind::U16);
    pub const ADD_ON: Field = Field::new(154, 2, FieldKind::U16);
    pub const GAP_1: Field = Field::new(156, 20, FieldKind::Padding);

    pub const FIELDS: &[Field] = &[
        TITLE, ID, TYPE, VERSION, GAP_0, MODE, HISTORY, N_FILES, NEXT, ADD_ON, GAP_1,
    ];
}

/// HSTFILEHEADER, one per channel, following the MASTERHEADER
pub mod index_record {
    use super::{Field, FieldKind};

    pub const SIZE: usize = 448;

    pub const NAME: Field = Field::new(0, 272, FieldKind::Text);
    pub const DESCRIPTOR: Field = Field::new(272, super::descriptor::SIZE, FieldKind::Descriptor);

    pub const FIELDS: &[Field] = &[NAME, DESCRIPTOR];
}

const _: () = assert!(layout_size(descriptor::FIELDS) == descriptor::SIZE);
const _: () = assert!(layout_size(channel_header::FIELDS) == channel_header::SIZE);
const _: () = assert!(layout_size(master_header::FIELDS) == master_header::SIZE);
const _: () = assert!(layout_size(index_record::FIELDS) == index_record::SIZE);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_sizes() {
        assert_eq!(layout_size(descriptor::FIELDS), 176);
        assert_eq!(layout_size(channel_header::FIELDS), 304);
        assert_eq!(layout_size(master_header::FIELDS), 176);
        assert_eq!(layout_size(index_record::FIELDS), 448);
    }

    #[test]
    fn test_gap_detection() {
        let broken = [
            Field::new(0, 4, FieldKind::U32),
            Field::new(6, 2, FieldKind::U16),
        ];
        assert_eq!(layout_size(&broken), 0);

        let short_descriptor = [
            Field::new(0, 4, FieldKind::Text),
            Field::new(4, descriptor::SIZE - 2, FieldKind::Descriptor),
        ];
        assert_eq!(layout_size(&short_descriptor), 0);
    }

    #[test]
    fn test_absolute_offsets() {
        // Spot checks against the byte positions of the on-disk formats
        assert_eq!(
            channel_header::DESCRIPTOR.offset + descriptor::START_TIME.offset,
            266
        );
        assert_eq!(
            channel_header::DESCRIPTOR.offset + descriptor::END_EV_NO.offset,
            290
        );
        assert_eq!(
            index_record::DESCRIPTOR.offset + descriptor::LOG_NAME.offset,
            304
        );
        assert_eq!(
            index_record::DESCRIPTOR.offset + descriptor::DATA_LENGTH.offset,
            426
        );
        assert_eq!(master_header::N_FILES.offset, 150);
    }

    #[test]
    fn test_text_truncates_at_nul() {
        let slot = [b'T', b'I', b'C', 0, b'x', b'y', 0, 0];
        assert_eq!(decode_text(&slot), "TIC");
        assert_eq!(decode_text(&[0u8; 8]), "");
        assert_eq!(decode_text(b"FULLSLOT"), "FULLSLOT");
    }

    #[test]
    fn test_text_is_latin1() {
        let slot = [b'm', 0xB3, 0xB0, b'C', 0];
        assert_eq!(decode_text(&slot), "m³°C");

        let mut encoded = [0xFFu8; 6];
        encode_text(&mut encoded, "m³°C€");
        assert_eq!(encoded, [b'm', 0xB3, 0xB0, b'C', b'?', 0]);
    }

    #[test]
    fn test_text_encode_cuts_long_values() {
        let mut slot = [0u8; 4];
        encode_text(&mut slot, "FLOW_RATE");
        assert_eq!(&slot, b"FLOW");
    }

    #[test]
    fn test_numeric_fields() {
        let mut record = [0u8; master_header::SIZE];
        master_header::N_FILES.put_u16(&mut record, 0x0102);
        master_header::MODE.put_u32(&mut record, 0xA0B0C0D0);
        assert_eq!(&record[150..152], &[0x02, 0x01]);
        assert_eq!(master_header::N_FILES.u16(&record), 0x0102);
        assert_eq!(master_header::MODE.u32(&record), 0xA0B0C0D0);
    }
}
