//! Encoders for points in time and spans of time.
//!
//! Both are stored as a single `Int` holding milliseconds, so anything finer
//! than a millisecond is lost.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sectionfs_core_store::{Error, Section};

/// Store a timestamp as milliseconds since the Unix epoch.
pub fn encode_timestamp<S: Section>(
    section: &S,
    key: &str,
    value: &DateTime<Utc>,
) -> Result<(), Error> {
    section.set(key, &value.timestamp_millis())
}

pub fn decode_timestamp<S: Section>(section: &S, key: &str) -> Option<DateTime<Utc>> {
    match section.int(key, None) {
        (millis, true) => DateTime::from_timestamp_millis(millis),
        _ => None,
    }
}

/// Store a duration as a whole number of milliseconds.
///
/// Fails with `Error::UnsupportedType` if the count does not fit in an `i64`.
pub fn encode_duration<S: Section>(section: &S, key: &str, value: &Duration) -> Result<(), Error> {
    let millis = i64::try_from(value.as_millis())
        .map_err(|_| Error::unsupported(format!("duration of {:?} overflows i64 milliseconds", value)))?;
    section.set(key, &millis)
}

/// Read a duration back. A negative count reads as absent.
pub fn decode_duration<S: Section>(section: &S, key: &str) -> Option<Duration> {
    match section.int(key, None) {
        (millis, true) => u64::try_from(millis).ok().map(Duration::from_millis),
        _ => None,
    }
}
