//! Name-keyed index over the records of a region.

use ahash::AHashMap;
use serde::Serialize;

use super::layout::{ByteOrder, LayoutReader, Prologue, RawRecord};
use super::types::{BasicType, Units, Variability};
use super::value::{decode, PerfValue};
use crate::core::FormatError;

/// Where a counter's value lives, and how to decode it.
///
/// Copying a `RecordRef` never copies the value: [`RecordRef::read`] decodes
/// whatever the runtime has written at `data_offset` by the time it is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordRef {
    pub kind: BasicType,
    pub vector_length: usize,
    pub units: Option<Units>,
    pub variability: Option<Variability>,
    pub flags: u8,
    pub byte_order: ByteOrder,
    pub data_offset: usize,
}

impl RecordRef {
    fn from_record(record: &RawRecord) -> Self {
        Self {
            kind: record.kind,
            vector_length: record.vector_length,
            units: record.units,
            variability: record.variability,
            flags: record.flags,
            byte_order: record.byte_order,
            data_offset: record.data_offset,
        }
    }

    /// Decode the current value from `buf`.
    #[inline]
    pub fn read(&self, buf: &[u8]) -> Option<PerfValue> {
        decode(buf, self.byte_order, self.kind, self.vector_length, self.data_offset)
    }
}

/// Lookup table from counter name to [`RecordRef`].
///
/// Built once per structural version of the region. When the runtime adds
/// counters it bumps the prologue's `mod_time_stamp`; an index built before
/// that reports [`CounterIndex::is_stale`] and misses the new names until it
/// is rebuilt.
#[derive(Debug, Clone, Default)]
pub struct CounterIndex {
    entries: AHashMap<String, RecordRef>,
    /// Names in record order, for listing.
    order: Vec<String>,
    duplicates: usize,
    mod_time_stamp: i64,
}

impl CounterIndex {
    /// Index a sequence of records. The first record with a given name wins.
    pub fn build<I>(records: I) -> Self
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let records = records.into_iter();
        let mut index = Self {
            entries: AHashMap::with_capacity(records.size_hint().0),
            ..Self::default()
        };

        for record in records {
            if index.entries.contains_key(&record.name) {
                tracing::debug!(
                    name = %record.name,
                    index = record.index,
                    "Ignoring duplicate counter"
                );
                index.duplicates += 1;
                continue;
            }
            let handle = RecordRef::from_record(&record);
            index.order.push(record.name.clone());
            index.entries.insert(record.name, handle);
        }

        index
    }

    /// Parse `buf` and index every record in it.
    pub fn from_buffer(buf: &[u8]) -> Result<Self, FormatError> {
        let reader = LayoutReader::new(buf)?;
        let prologue = *reader.prologue();
        let records = reader.records().collect::<Result<Vec<_>, _>>()?;

        let mut index = Self::build(records);
        index.mod_time_stamp = prologue.mod_time_stamp;

        tracing::debug!(
            counters = index.len(),
            duplicates = index.duplicates,
            mod_time_stamp = index.mod_time_stamp,
            "Built counter index"
        );
        Ok(index)
    }

    /// Exact-name lookup.
    #[inline]
    pub fn lookup(&self, name: &str) -> Option<RecordRef> {
        self.entries.get(name).copied()
    }

    /// True when `prologue` describes a different structural version than
    /// the one this index was built from.
    pub fn is_stale(&self, prologue: &Prologue) -> bool {
        prologue.mod_time_stamp != self.mod_time_stamp
    }

    pub fn mod_time_stamp(&self) -> i64 {
        self.mod_time_stamp
    }

    /// Number of duplicate names that were ignored.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counters in the order they appear in the region.
    pub fn iter(&self) -> impl Iterator<Item = (&str, RecordRef)> + '_ {
        self.order
            .iter()
            .filter_map(move |name| self.entries.get(name).map(|r| (name.as_str(), *r)))
    }
}
