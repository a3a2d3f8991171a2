//! Common test utilities and fixtures.

#![allow(dead_code)]

use gcmon_lib::perf::layout;
use gcmon_lib::perf::ByteOrder;

#[path = "../../src/perf/test_support.rs"]
mod writer;

use writer::RegionWriter;

/// Test fixture builder for PerfData regions with sensible defaults:
/// version 2.0, accessible, `mod_time_stamp` 1.
pub struct SyntheticRegion {
    order: ByteOrder,
    writer: RegionWriter,
}

/// A finished region plus where each payload landed.
pub struct Region {
    pub bytes: Vec<u8>,
    pub order: ByteOrder,
    offsets: Vec<(String, usize)>,
}

impl SyntheticRegion {
    pub fn new(order: ByteOrder) -> Self {
        Self {
            order,
            writer: RegionWriter::new(order).mod_time_stamp(1),
        }
    }

    fn map(self, f: impl FnOnce(RegionWriter) -> RegionWriter) -> Self {
        Self {
            order: self.order,
            writer: f(self.writer),
        }
    }

    pub fn mod_time_stamp(self, ts: i64) -> Self {
        self.map(|w| w.mod_time_stamp(ts))
    }

    /// Unused bytes left at the end of the record area.
    pub fn reserve(self, bytes: usize) -> Self {
        self.map(|w| w.reserve(bytes))
    }

    pub fn long(self, name: &str, value: i64) -> Self {
        self.map(|w| w.long(name, value))
    }

    pub fn string(self, name: &str, value: &str, capacity: usize) -> Self {
        self.map(|w| w.string(name, value, capacity))
    }

    /// The counters a HotSpot runtime publishes for jstat `-gc`, all zero
    /// except the clock (1000 Hz).
    pub fn standard_gc(self) -> Self {
        [
            "sun.gc.generation.0.space.0.capacity",
            "sun.gc.generation.0.space.0.used",
            "sun.gc.generation.0.space.1.capacity",
            "sun.gc.generation.0.space.1.used",
            "sun.gc.generation.0.space.2.capacity",
            "sun.gc.generation.0.space.2.used",
            "sun.gc.generation.1.space.0.capacity",
            "sun.gc.generation.1.space.0.used",
            "sun.gc.collector.0.invocations",
            "sun.gc.collector.0.time",
            "sun.gc.collector.1.invocations",
            "sun.gc.collector.1.time",
        ]
        .into_iter()
        .fold(self, |region, name| region.long(name, 0))
        .long("sun.os.hrt.frequency", 1000)
        .long("sun.os.hrt.ticks", 0)
    }

    pub fn build(self) -> Region {
        let (bytes, offsets) = self.writer.finish_with_offsets();
        Region {
            bytes,
            order: self.order,
            offsets,
        }
    }
}

impl Region {
    /// Absolute offset of the first payload published under `name`.
    pub fn value_offset(&self, name: &str) -> usize {
        self.offsets
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, offset)| offset)
            .unwrap_or_else(|| panic!("no counter named {name}"))
    }

    /// Overwrite a long counter in place, the way the runtime updates it.
    pub fn set_long(&mut self, name: &str, value: i64) {
        let offset = self.value_offset(name);
        let raw = match self.order {
            ByteOrder::Big => value.to_be_bytes(),
            ByteOrder::Little => value.to_le_bytes(),
        };
        self.bytes[offset..offset + 8].copy_from_slice(&raw);
    }

    /// Overwrite the `num_entries` prologue field.
    pub fn set_num_entries(&mut self, count: i32) {
        let raw = match self.order {
            ByteOrder::Big => count.to_be_bytes(),
            ByteOrder::Little => count.to_le_bytes(),
        };
        self.bytes[28..32].copy_from_slice(&raw);
    }

    pub fn set_mod_time_stamp(&mut self, ts: i64) {
        let raw = match self.order {
            ByteOrder::Big => ts.to_be_bytes(),
            ByteOrder::Little => ts.to_le_bytes(),
        };
        self.bytes[16..24].copy_from_slice(&raw);
    }
}

/// Macro for approximate float assertions.
#[macro_export]
macro_rules! assert_close {
    ($actual:expr, $expected:expr) => {
        $crate::assert_close!($actual, $expected, 1e-9)
    };
    ($actual:expr, $expected:expr, $tolerance:expr) => {{
        let actual: f64 = $actual;
        let expected: f64 = $expected;
        assert!(
            (actual - expected).abs() <= $tolerance,
            "expected {expected}, got {actual}"
        );
    }};
}
