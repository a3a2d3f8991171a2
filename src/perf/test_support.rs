//! Synthetic PerfData regions for tests and benches.
//!
//! Also compiled into `tests/common`, so it only names the layout through
//! `super::layout`.

use super::layout::{ByteOrder, PERFDATA_MAJOR_VERSION, PROLOGUE_SIZE, RECORD_HEADER_SIZE};

fn align8(n: usize) -> usize {
    (n + 7) & !7
}

struct PendingRecord {
    name: Vec<u8>,
    terminated: bool,
    tag: u8,
    units: u8,
    variability: u8,
    vector_length: i32,
    payload: Vec<u8>,
}

/// Builds a region the way the runtime lays it out: prologue, then records
/// with the name right after the header and the payload 8-byte aligned.
pub(crate) struct RegionWriter {
    order: ByteOrder,
    mod_time_stamp: i64,
    accessible: bool,
    reserve: usize,
    records: Vec<PendingRecord>,
}

impl RegionWriter {
    pub(crate) fn new(order: ByteOrder) -> Self {
        Self {
            order,
            mod_time_stamp: 0,
            accessible: true,
            reserve: 0,
            records: Vec::new(),
        }
    }

    pub(crate) fn mod_time_stamp(mut self, ts: i64) -> Self {
        self.mod_time_stamp = ts;
        self
    }

    pub(crate) fn accessible(mut self, accessible: bool) -> Self {
        self.accessible = accessible;
        self
    }

    /// Unused bytes left at the end of the record area.
    pub(crate) fn reserve(mut self, bytes: usize) -> Self {
        self.reserve = bytes;
        self
    }

    pub(crate) fn long(self, name: &str, value: i64) -> Self {
        let payload = match self.order {
            ByteOrder::Big => value.to_be_bytes(),
            ByteOrder::Little => value.to_le_bytes(),
        };
        self.raw(name, b'J', 0, &payload)
    }

    pub(crate) fn string(self, name: &str, value: &str, capacity: usize) -> Self {
        let mut payload = value.as_bytes().to_vec();
        payload.resize(capacity, 0);
        self.raw(name, b'B', capacity as i32, &payload)
    }

    pub(crate) fn raw(mut self, name: &str, tag: u8, vector_length: i32, payload: &[u8]) -> Self {
        self.records.push(PendingRecord {
            name: name.as_bytes().to_vec(),
            terminated: true,
            tag,
            units: 1,
            variability: 3,
            vector_length,
            payload: payload.to_vec(),
        });
        self
    }

    pub(crate) fn unterminated_name(mut self, name: &str) -> Self {
        self.records.push(PendingRecord {
            name: name.as_bytes().to_vec(),
            terminated: false,
            tag: b'V',
            units: 1,
            variability: 1,
            vector_length: 0,
            payload: Vec::new(),
        });
        self
    }

    fn put_i32(&self, out: &mut Vec<u8>, value: i32) {
        match self.order {
            ByteOrder::Big => out.extend_from_slice(&value.to_be_bytes()),
            ByteOrder::Little => out.extend_from_slice(&value.to_le_bytes()),
        }
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.finish_with_offsets().0
    }

    /// The region plus the absolute payload offset of every record, in order.
    pub(crate) fn finish_with_offsets(self) -> (Vec<u8>, Vec<(String, usize)>) {
        let mut area = Vec::new();
        let mut offsets = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let name_len = record.name.len() + usize::from(record.terminated);
            let data_offset = if record.terminated {
                align8(RECORD_HEADER_SIZE + name_len)
            } else {
                RECORD_HEADER_SIZE
            };
            let entry_length = if record.terminated {
                align8(data_offset + record.payload.len())
            } else {
                RECORD_HEADER_SIZE + record.name.len()
            };

            let start = area.len();
            self.put_i32(&mut area, entry_length as i32);
            self.put_i32(&mut area, RECORD_HEADER_SIZE as i32);
            self.put_i32(&mut area, record.vector_length);
            area.extend_from_slice(&[record.tag, 1, record.units, record.variability]);
            self.put_i32(&mut area, data_offset as i32);
            area.extend_from_slice(&record.name);
            if record.terminated {
                area.push(0);
                area.resize(start + data_offset, 0);
                area.extend_from_slice(&record.payload);
            }
            area.resize(start + entry_length, 0);

            offsets.push((
                String::from_utf8_lossy(&record.name).into_owned(),
                PROLOGUE_SIZE + start + data_offset,
            ));
        }
        area.resize(area.len() + self.reserve, 0);

        let mut buf = Vec::with_capacity(PROLOGUE_SIZE + area.len());
        buf.extend_from_slice(&[0xca, 0xfe, 0xc0, 0xc0]);
        buf.push(match self.order {
            ByteOrder::Big => 0,
            ByteOrder::Little => 1,
        });
        buf.extend_from_slice(&[PERFDATA_MAJOR_VERSION, 0, u8::from(self.accessible)]);
        self.put_i32(&mut buf, area.len() as i32);
        self.put_i32(&mut buf, 0);
        match self.order {
            ByteOrder::Big => buf.extend_from_slice(&self.mod_time_stamp.to_be_bytes()),
            ByteOrder::Little => buf.extend_from_slice(&self.mod_time_stamp.to_le_bytes()),
        }
        self.put_i32(&mut buf, PROLOGUE_SIZE as i32);
        self.put_i32(&mut buf, self.records.len() as i32);
        buf.extend_from_slice(&area);
        (buf, offsets)
    }
}
