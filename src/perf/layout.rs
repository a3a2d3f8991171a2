//! PerfData region layout: prologue validation and the record walk.
//!
//! The region starts with a fixed 32-byte prologue followed by
//! `num_entries` variable-length records. Every record begins with a 20-byte
//! header whose offsets are relative to the record's own start:
//!
//! ```text
//! +--------------+-------------+---------------+------+-------+-------+-------------+-------------+
//! | entry_length | name_offset | vector_length | type | flags | units | variability | data_offset |
//! |      4       |      4      |       4       |  1   |   1   |   1   |      1      |      4      |
//! +--------------+-------------+---------------+------+-------+-------+-------------+-------------+
//! ```
//!
//! The monitored process keeps writing into the region while we read it, so
//! every offset is checked against the buffer before it is followed.

use serde::Serialize;

use super::types::{BasicType, Units, Variability};
use crate::core::FormatError;

/// Magic number at offset 0, stored as the bytes `CA FE C0 C0`.
pub const PERFDATA_MAGIC: u32 = 0xcafe_c0c0;
/// The only prologue major version this reader understands.
pub const PERFDATA_MAJOR_VERSION: u8 = 2;
/// Size of the fixed prologue; records start right after it.
pub const PROLOGUE_SIZE: usize = 32;
/// Size of the fixed part of every record.
pub const RECORD_HEADER_SIZE: usize = 20;

/// Byte order of every multi-byte field after the magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    Big,
    Little,
}

impl ByteOrder {
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(ByteOrder::Big),
            1 => Some(ByteOrder::Little),
            _ => None,
        }
    }

    pub fn read_u16(self, buf: &[u8], offset: usize) -> Option<u16> {
        let bytes = read_array::<2>(buf, offset)?;
        Some(match self {
            ByteOrder::Big => u16::from_be_bytes(bytes),
            ByteOrder::Little => u16::from_le_bytes(bytes),
        })
    }

    pub fn read_i32(self, buf: &[u8], offset: usize) -> Option<i32> {
        let bytes = read_array::<4>(buf, offset)?;
        Some(match self {
            ByteOrder::Big => i32::from_be_bytes(bytes),
            ByteOrder::Little => i32::from_le_bytes(bytes),
        })
    }

    pub fn read_i64(self, buf: &[u8], offset: usize) -> Option<i64> {
        let bytes = read_array::<8>(buf, offset)?;
        Some(match self {
            ByteOrder::Big => i64::from_be_bytes(bytes),
            ByteOrder::Little => i64::from_le_bytes(bytes),
        })
    }

    pub fn read_f32(self, buf: &[u8], offset: usize) -> Option<f32> {
        let bytes = read_array::<4>(buf, offset)?;
        Some(match self {
            ByteOrder::Big => f32::from_be_bytes(bytes),
            ByteOrder::Little => f32::from_le_bytes(bytes),
        })
    }

    pub fn read_f64(self, buf: &[u8], offset: usize) -> Option<f64> {
        let bytes = read_array::<8>(buf, offset)?;
        Some(match self {
            ByteOrder::Big => f64::from_be_bytes(bytes),
            ByteOrder::Little => f64::from_le_bytes(bytes),
        })
    }
}

#[inline]
fn read_array<const N: usize>(buf: &[u8], offset: usize) -> Option<[u8; N]> {
    let end = offset.checked_add(N)?;
    buf.get(offset..end)?.try_into().ok()
}

/// The fixed header at the start of a PerfData region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Prologue {
    pub byte_order: ByteOrder,
    pub major_version: u8,
    pub minor_version: u8,
    /// Set by the runtime once the region is initialised.
    pub accessible: bool,
    /// Bytes of the region in use.
    pub used: usize,
    /// Bytes the runtime could not fit into the region.
    pub overflow: i32,
    /// Time of the last structural change (a record was added).
    pub mod_time_stamp: i64,
    pub entry_offset: usize,
    pub num_entries: usize,
}

impl Prologue {
    /// Read and validate the prologue at the start of `buf`.
    pub fn read(buf: &[u8]) -> Result<Self, FormatError> {
        if buf.len() < PROLOGUE_SIZE {
            return Err(FormatError::header(format!(
                "buffer holds {} bytes, the prologue needs {}",
                buf.len(),
                PROLOGUE_SIZE
            )));
        }

        let magic = ByteOrder::Big
            .read_i32(buf, 0)
            .ok_or_else(|| FormatError::header("magic is unreadable"))? as u32;
        if magic != PERFDATA_MAGIC {
            return Err(FormatError::header(format!(
                "bad magic 0x{magic:08x}, expected 0x{PERFDATA_MAGIC:08x}"
            )));
        }

        let byte_order = ByteOrder::from_tag(buf[4])
            .ok_or_else(|| FormatError::header(format!("unknown byte order tag {}", buf[4])))?;

        let major_version = buf[5];
        let minor_version = buf[6];
        if major_version != PERFDATA_MAJOR_VERSION {
            return Err(FormatError::header(format!(
                "unsupported major version {major_version}.{minor_version}, expected {PERFDATA_MAJOR_VERSION}.x"
            )));
        }

        let field = |offset: usize| {
            byte_order
                .read_i32(buf, offset)
                .ok_or_else(|| FormatError::header(format!("field at offset {offset} is unreadable")))
        };
        let used = field(8)?;
        let overflow = field(12)?;
        let mod_time_stamp = byte_order
            .read_i64(buf, 16)
            .ok_or_else(|| FormatError::header("mod_time_stamp is unreadable"))?;
        let entry_offset = field(24)?;
        let num_entries = field(28)?;

        if usize::try_from(entry_offset).ok() != Some(PROLOGUE_SIZE) {
            return Err(FormatError::header(format!(
                "entry_offset is {entry_offset}, expected {PROLOGUE_SIZE}"
            )));
        }

        let used = usize::try_from(used)
            .map_err(|_| FormatError::header(format!("used is negative ({used})")))?;
        if used > buf.len() {
            return Err(FormatError::header(format!(
                "used is {used} bytes but the buffer holds {}",
                buf.len()
            )));
        }

        let num_entries = usize::try_from(num_entries)
            .map_err(|_| FormatError::header(format!("num_entries is negative ({num_entries})")))?;

        Ok(Prologue {
            byte_order,
            major_version,
            minor_version,
            accessible: buf[7] != 0,
            used,
            overflow,
            mod_time_stamp,
            entry_offset: PROLOGUE_SIZE,
            num_entries,
        })
    }

    /// End of the record area, `entry_offset + used`.
    pub fn record_area_end(&self) -> usize {
        self.entry_offset.saturating_add(self.used)
    }
}

/// One counter record as found in the region.
///
/// Holds positions only; the value itself is decoded on demand because the
/// runtime may change it at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// Position of the record in the walk.
    pub index: usize,
    pub name: String,
    /// Raw `data_type` byte as published.
    pub type_tag: u8,
    pub kind: BasicType,
    pub flags: u8,
    pub units: Option<Units>,
    pub variability: Option<Variability>,
    /// 0 for scalars, element count for vectors.
    pub vector_length: usize,
    /// Absolute offset of the record in the buffer.
    pub offset: usize,
    pub entry_length: usize,
    /// Absolute offset of the value payload in the buffer.
    pub data_offset: usize,
    /// Byte order of the payload, from the prologue.
    pub byte_order: ByteOrder,
}

/// Validated view over a PerfData region.
#[derive(Debug, Clone, Copy)]
pub struct LayoutReader<'a> {
    buf: &'a [u8],
    prologue: Prologue,
}

impl<'a> LayoutReader<'a> {
    /// Validate the prologue of `buf`.
    pub fn new(buf: &'a [u8]) -> Result<Self, FormatError> {
        let prologue = Prologue::read(buf)?;
        Ok(Self { buf, prologue })
    }

    pub fn prologue(&self) -> &Prologue {
        &self.prologue
    }

    pub fn buffer(&self) -> &'a [u8] {
        self.buf
    }

    /// Walk the records from `entry_offset`. Each call starts a fresh walk.
    pub fn records(&self) -> Records<'a> {
        Records {
            buf: self.buf,
            byte_order: self.prologue.byte_order,
            area_end: self.prologue.record_area_end(),
            cursor: self.prologue.entry_offset,
            index: 0,
            num_entries: self.prologue.num_entries,
            done: false,
        }
    }
}

/// Iterator over the records of a region.
///
/// Yields at most `num_entries` items and stops after the first error.
#[derive(Debug, Clone)]
pub struct Records<'a> {
    buf: &'a [u8],
    byte_order: ByteOrder,
    area_end: usize,
    cursor: usize,
    index: usize,
    num_entries: usize,
    done: bool,
}

impl Records<'_> {
    fn read_record(&self) -> Result<RawRecord, FormatError> {
        let index = self.index;
        let start = self.cursor;
        let limit = self.area_end.min(self.buf.len());

        if start.saturating_add(RECORD_HEADER_SIZE) > limit {
            return Err(FormatError::record(
                index,
                format!("record header at offset {start} runs past the used area"),
            ));
        }

        // The header is known to be in bounds from here on.
        let order = self.byte_order;
        let int = |at: usize| order.read_i32(self.buf, start + at).unwrap_or_default();
        let entry_length = int(0);
        let name_offset = int(4);
        let vector_length = int(8);
        let type_tag = self.buf[start + 12];
        let flags = self.buf[start + 13];
        let units_tag = self.buf[start + 14];
        let variability_tag = self.buf[start + 15];
        let data_offset = int(16);

        let entry_length = match usize::try_from(entry_length) {
            Ok(len) if len > 0 => len,
            _ => {
                return Err(FormatError::record(
                    index,
                    format!("entry_length is {entry_length}"),
                ))
            },
        };
        if entry_length < RECORD_HEADER_SIZE {
            return Err(FormatError::record(
                index,
                format!("entry_length {entry_length} is smaller than the record header"),
            ));
        }

        let end = start.saturating_add(entry_length);
        if end > self.area_end {
            return Err(FormatError::record(
                index,
                format!("record [{start}, {end}) extends past the used area ending at {}", self.area_end),
            ));
        }
        if end > self.buf.len() {
            return Err(FormatError::record(
                index,
                format!("record [{start}, {end}) extends past the buffer of {} bytes", self.buf.len()),
            ));
        }

        let inside = |offset: i32| usize::try_from(offset).ok().filter(|&o| o < entry_length);
        let name_offset = inside(name_offset).ok_or_else(|| {
            FormatError::record(index, format!("name_offset {name_offset} is outside the record"))
        })?;
        let data_offset = inside(data_offset).ok_or_else(|| {
            FormatError::record(index, format!("data_offset {data_offset} is outside the record"))
        })?;
        let vector_length = usize::try_from(vector_length).map_err(|_| {
            FormatError::record(index, format!("vector_length is negative ({vector_length})"))
        })?;

        let kind = BasicType::from_tag(type_tag);
        if let Some(size) = kind.element_size() {
            let payload = size
                .checked_mul(vector_length.max(1))
                .and_then(|len| len.checked_add(data_offset));
            if !payload.is_some_and(|payload_end| payload_end <= entry_length) {
                return Err(FormatError::record(
                    index,
                    format!(
                        "{} payload of {} element(s) at offset {data_offset} overruns the record",
                        kind.display_name().unwrap_or("?"),
                        vector_length.max(1)
                    ),
                ));
            }
        }

        let name_span = &self.buf[start + name_offset..end];
        let name_len = name_span
            .iter()
            .position(|&b| b == 0)
            .ok_or(FormatError::UnterminatedName { index })?;
        let name = String::from_utf8_lossy(&name_span[..name_len]).into_owned();

        Ok(RawRecord {
            index,
            name,
            type_tag,
            kind,
            flags,
            units: Units::from_tag(units_tag),
            variability: Variability::from_tag(variability_tag),
            vector_length,
            offset: start,
            entry_length,
            data_offset: start + data_offset,
            byte_order: order,
        })
    }
}

impl Iterator for Records<'_> {
    type Item = Result<RawRecord, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.index >= self.num_entries {
            return None;
        }

        match self.read_record() {
            Ok(record) => {
                self.cursor = record.offset + record.entry_length;
                self.index += 1;
                Some(Ok(record))
            },
            Err(e) => {
                self.done = true;
                Some(Err(e))
            },
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            (0, Some(self.num_entries - self.index))
        }
    }
}

/// Validate `buf` and collect all of its records.
pub fn parse_region(buf: &[u8]) -> Result<Vec<RawRecord>, FormatError> {
    LayoutReader::new(buf)?.records().collect()
}
