//! Integration tests for walking PerfData regions.

mod common;

use common::SyntheticRegion;
use gcmon_lib::core::FormatError;
use gcmon_lib::perf::{parse_region, ByteOrder, CounterIndex, LayoutReader, PerfValue};
use pretty_assertions::assert_eq;

#[test]
fn test_records_in_layout_order() {
    let region = SyntheticRegion::new(ByteOrder::Little)
        .long("sun.os.hrt.frequency", 1_000_000_000)
        .string("java.property.java.vm.name", "OpenJDK 64-Bit Server VM", 64)
        .long("sun.gc.collector.0.invocations", 12)
        .build();

    let records = parse_region(&region.bytes).unwrap();
    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "sun.os.hrt.frequency",
            "java.property.java.vm.name",
            "sun.gc.collector.0.invocations",
        ]
    );
    assert_eq!(records.iter().map(|r| r.index).collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(records[1].vector_length, 64);
}

#[test]
fn test_reserve_space_after_last_record_is_ignored() {
    let region = SyntheticRegion::new(ByteOrder::Big)
        .long("a", 1)
        .long("b", 2)
        .reserve(256)
        .build();

    let reader = LayoutReader::new(&region.bytes).unwrap();
    assert_eq!(reader.records().count(), 2);
    assert!(reader.records().all(|r| r.is_ok()));
}

#[test]
fn test_altered_magic_is_invalid_header() {
    let mut region = SyntheticRegion::new(ByteOrder::Little).long("a", 1).build();
    region.bytes[2] = 0x00;

    let err = parse_region(&region.bytes).unwrap_err();
    assert!(matches!(err, FormatError::InvalidHeader { .. }), "{err}");
}

#[test]
fn test_truncated_buffer() {
    let region = SyntheticRegion::new(ByteOrder::Little).long("a", 1).build();

    let err = parse_region(&region.bytes[..16]).unwrap_err();
    assert!(matches!(err, FormatError::InvalidHeader { .. }));

    // The header still fits but the last record no longer does.
    let err = parse_region(&region.bytes[..region.bytes.len() - 1]).unwrap_err();
    assert!(matches!(err, FormatError::CorruptRecord { index: 0, .. }));
}

#[test]
fn test_walking_past_used_is_corrupt_record() {
    let mut region = SyntheticRegion::new(ByteOrder::Little)
        .long("a", 1)
        .long("b", 2)
        .reserve(16)
        .build();
    region.set_num_entries(3);

    let err = parse_region(&region.bytes).unwrap_err();
    assert!(matches!(err, FormatError::CorruptRecord { index: 2, .. }));
}

#[test]
fn test_lazy_walk_yields_good_records_before_the_error() {
    let mut region = SyntheticRegion::new(ByteOrder::Big)
        .long("first", 1)
        .long("second", 2)
        .build();
    region.set_num_entries(5);

    let reader = LayoutReader::new(&region.bytes).unwrap();
    let results: Vec<_> = reader.records().collect();
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_ok());
    assert!(matches!(results[2], Err(FormatError::CorruptRecord { index: 2, .. })));

    // The walk restarts from the first record every time.
    assert_eq!(reader.records().next().unwrap().unwrap().name, "first");
}

#[test]
fn test_duplicate_names_keep_first() {
    let region = SyntheticRegion::new(ByteOrder::Little)
        .long("sun.gc.policy.collectors", 2)
        .long("sun.gc.policy.collectors", 3)
        .build();

    let index = CounterIndex::from_buffer(&region.bytes).unwrap();
    assert_eq!(index.len(), 1);
    assert_eq!(index.duplicates(), 1);

    let handle = index.lookup("sun.gc.policy.collectors").unwrap();
    assert_eq!(handle.data_offset, region.value_offset("sun.gc.policy.collectors"));
    assert_eq!(handle.read(&region.bytes), Some(PerfValue::Long(2)));
}

#[test]
fn test_both_byte_orders_decode_identically() {
    for order in [ByteOrder::Big, ByteOrder::Little] {
        let region = SyntheticRegion::new(order)
            .long("sun.os.hrt.ticks", -42)
            .string("sun.rt.javaCommand", "Main --port 8080", 32)
            .build();
        let index = CounterIndex::from_buffer(&region.bytes).unwrap();

        assert_eq!(
            index.lookup("sun.os.hrt.ticks").unwrap().read(&region.bytes),
            Some(PerfValue::Long(-42)),
            "{order:?}"
        );
        let command = index.lookup("sun.rt.javaCommand").unwrap().read(&region.bytes).unwrap();
        assert_eq!(command.as_text().as_deref(), Some("Main --port 8080"), "{order:?}");
    }
}

#[test]
fn test_handle_reads_see_in_place_updates() {
    let mut region = SyntheticRegion::new(ByteOrder::Little)
        .long("sun.gc.collector.0.invocations", 1)
        .build();
    let index = CounterIndex::from_buffer(&region.bytes).unwrap();
    let handle = index.lookup("sun.gc.collector.0.invocations").unwrap();

    region.set_long("sun.gc.collector.0.invocations", 99);
    assert_eq!(handle.read(&region.bytes), Some(PerfValue::Long(99)));
}
