use std::time::Duration;

use chrono::{TimeZone, Utc};
use sectionfs::converter::{retrieve, store, time};
use sectionfs::{section, InMemorySection, JSONLocalSection, LocalSectionConfig, Section, ValueType};

fn record_device<S: Section>(root: &S) {
    let device = section!(root, "devices", "0011223344556677");
    device.set("endpoint", &1u8).unwrap();
    device.set("label", "hallway").unwrap();
    device.set("rssi", &-71i16).unwrap();
    store(
        &device,
        "last_seen",
        &Utc.timestamp_millis_opt(1_650_000_000_000).unwrap(),
        time::encode_timestamp,
    )
    .unwrap();
    store(&device, "poll", &Duration::from_secs(30), time::encode_duration).unwrap();
}

fn check_device<S: Section>(root: &S) {
    assert_eq!(root.section_keys(), vec!["devices".to_string()]);

    let device = section!(root, "devices", "0011223344556677");
    assert_eq!(device.uint("endpoint", None), (1, true));
    assert_eq!(device.string("label", None), ("hallway".to_string(), true));
    assert_eq!(device.int("rssi", None), (-71, true));
    assert_eq!(device.value_type("last_seen"), ValueType::Int);
    assert_eq!(
        retrieve(&device, "last_seen", time::decode_timestamp, None),
        (Utc.timestamp_millis_opt(1_650_000_000_000).unwrap(), true)
    );
    assert_eq!(
        retrieve(&device, "poll", time::decode_duration, None),
        (Duration::from_secs(30), true)
    );
}

#[test]
fn in_memory_backend() {
    let root = InMemorySection::new();
    record_device(&root);
    check_device(&root);
}

#[test]
fn disk_backend_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = LocalSectionConfig::default().with_flush_delay(Duration::from_secs(60));

    let root = JSONLocalSection::open_with_config(dir.path(), config).unwrap();
    record_device(&root);
    root.sync().unwrap();

    let reopened = JSONLocalSection::open(dir.path()).unwrap();
    check_device(&reopened);
}
