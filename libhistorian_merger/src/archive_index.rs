use time::OffsetDateTime;

use super::channel_file::ChannelDescriptor;
use super::epoch::ticks_to_instant;
use super::error::DecodeError;
use super::layout::{index_record, master_header};

/// The MASTERHEADER at the start of an .hst archive index file.
///
/// `n_files` is the number of ChannelIndexRecords which immediately follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveIndex {
    pub title: String,
    pub id: String,
    pub kind: u16,
    pub version: u16,
    pub mode: u32,
    pub history: u16,
    pub n_files: u16,
    pub next: u16,
    pub add_on: u16,
}

impl ArchiveIndex {
    /// Decode the master header from the leading `master_header::SIZE` bytes of the buffer
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let record = bytes
            .get(..master_header::SIZE)
            .ok_or(DecodeError::WrongLength {
                record: "archive index header",
                expected: master_header::SIZE,
                actual: bytes.len(),
            })?;

        Ok(Self {
            title: master_header::TITLE.text(record),
            id: master_header::ID.text(record),
            kind: master_header::TYPE.u16(record),
            version: master_header::VERSION.u16(record),
            mode: master_header::MODE.u32(record),
            history: master_header::HISTORY.u16(record),
            n_files: master_header::N_FILES.u16(record),
            next: master_header::NEXT.u16(record),
            add_on: master_header::ADD_ON.u16(record),
        })
    }

    pub fn encode(&self) -> [u8; master_header::SIZE] {
        let mut bytes = [0u8; master_header::SIZE];
        master_header::TITLE.put_text(&mut bytes, &self.title);
        master_header::ID.put_text(&mut bytes, &self.id);
        master_header::TYPE.put_u16(&mut bytes, self.kind);
        master_header::VERSION.put_u16(&mut bytes, self.version);
        master_header::MODE.put_u32(&mut bytes, self.mode);
        master_header::HISTORY.put_u16(&mut bytes, self.history);
        master_header::N_FILES.put_u16(&mut bytes, self.n_files);
        master_header::NEXT.put_u16(&mut bytes, self.next);
        master_header::ADD_ON.put_u16(&mut bytes, self.add_on);
        bytes
    }
}

/// One HSTFILEHEADER: the archive's entry for a single channel file.
///
/// Both times are optional here; the header of the channel file itself is what sample
/// timestamps are derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelIndexRecord {
    /// Path of the channel file as written by the logger (may be a full Windows path)
    pub name: String,
    pub descriptor: ChannelDescriptor,
    pub start_time: Option<OffsetDateTime>,
    pub end_time: Option<OffsetDateTime>,
}

impl ChannelIndexRecord {
    /// Decode a record from exactly `index_record::SIZE` bytes
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() != index_record::SIZE {
            return Err(DecodeError::WrongLength {
                record: "channel index record",
                expected: index_record::SIZE,
                actual: bytes.len(),
            });
        }

        let descriptor = ChannelDescriptor::decode(index_record::DESCRIPTOR.bytes(bytes))?;
        Ok(Self {
            name: index_record::NAME.text(bytes),
            start_time: ticks_to_instant(descriptor.start_ticks).ok(),
            end_time: ticks_to_instant(descriptor.end_ticks).ok(),
            descriptor,
        })
    }

    pub fn encode(&self) -> [u8; index_record::SIZE] {
        let mut bytes = [0u8; index_record::SIZE];
        index_record::NAME.put_text(&mut bytes, &self.name);
        self.descriptor
            .encode_into(index_record::DESCRIPTOR.bytes_mut(&mut bytes));
        bytes
    }

    /// The file name part of `name`.
    ///
    /// Archives are written on Windows, so both '\\' and '/' separate path components.
    pub fn file_name(&self) -> &str {
        self.name
            .rsplit(['\\', '/'])
            .next()
            .unwrap_or(self.name.as_str())
    }
}

/// Decode an .hst archive index: the master header followed by `n_files` channel records.
///
/// The record list is all or nothing. If the buffer ends before the last announced record is
/// complete the whole decode fails with `DecodeError::TruncatedRecord`, carrying the index of
/// the first incomplete record. Trailing bytes after the last record are ignored.
pub fn decode_archive_index(
    bytes: &[u8],
) -> Result<(ArchiveIndex, Vec<ChannelIndexRecord>), DecodeError> {
    let index = ArchiveIndex::decode(bytes)?;
    let body = &bytes[master_header::SIZE..];

    let mut records = Vec::with_capacity(index.n_files as usize);
    for idx in 0..(index.n_files as usize) {
        let start = idx * index_record::SIZE;
        let record = body
            .get(start..start + index_record::SIZE)
            .ok_or(DecodeError::TruncatedRecord { index: idx })?;
        records.push(ChannelIndexRecord::decode(record)?);
    }

    Ok((index, records))
}
