//! HotSpot PerfData region parsing.
//!
//! - `types`: tag tables for data types, units and variability
//! - `layout`: prologue validation and the bounds-checked record walk
//! - `value`: typed decoding of a record's payload
//! - `index`: name → record lookup built from one walk

pub mod index;
pub mod layout;
pub mod types;
pub mod value;

#[cfg(test)]
pub(crate) mod test_support;

pub use index::{CounterIndex, RecordRef};
pub use layout::{parse_region, ByteOrder, LayoutReader, Prologue, RawRecord, Records};
pub use types::{BasicType, Units, Variability};
pub use value::PerfValue;
