//! Adapters for keeping values that are not section scalars in a section.
//!
//! An encoder flattens a value into one or more scalar writes on a section; a
//! decoder reads them back. `store` and `retrieve` give the pair a uniform
//! call shape, with `retrieve` applying the same default handling as the
//! typed accessors on `Section`.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use sectionfs_converter::{retrieve, store, time};
//! use sectionfs_core_store::InMemorySection;
//!
//! let section = InMemorySection::new();
//! store(&section, "timeout", &Duration::from_secs(3), time::encode_duration)?;
//!
//! assert_eq!(
//!     retrieve(&section, "timeout", time::decode_duration, None),
//!     (Duration::from_secs(3), true)
//! );
//! # Ok::<(), sectionfs_core_store::Error>(())
//! ```

use sectionfs_core_store::{Error, Section};

pub mod time;

/// Writes a `T` under a key of a section.
pub type Encoder<S, T> = fn(&S, &str, &T) -> Result<(), Error>;

/// Reads a `T` back from a key of a section, or `None` if it is absent or
/// does not decode.
pub type Decoder<S, T> = fn(&S, &str) -> Option<T>;

/// Store `value` under `key` using `encoder`.
pub fn store<S: Section, T>(
    section: &S,
    key: &str,
    value: &T,
    encoder: Encoder<S, T>,
) -> Result<(), Error> {
    encoder(section, key, value)
}

/// Retrieve the value under `key` using `decoder`.
///
/// Returns the decoded value and `true`, or `default` (`T::default()` when
/// none is given) and `false`.
pub fn retrieve<S: Section, T: Default>(
    section: &S,
    key: &str,
    decoder: Decoder<S, T>,
    default: Option<T>,
) -> (T, bool) {
    match decoder(section, key) {
        Some(value) => (value, true),
        None => (default.unwrap_or_default(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sectionfs_core_store::InMemorySection;

    #[derive(Debug, Default, PartialEq)]
    struct Channel(u8);

    fn encode_channel(section: &InMemorySection, key: &str, value: &Channel) -> Result<(), Error> {
        section.set(key, &value.0)
    }

    fn decode_channel(section: &InMemorySection, key: &str) -> Option<Channel> {
        match section.uint(key, None) {
            (raw, true) => u8::try_from(raw).ok().map(Channel),
            _ => None,
        }
    }

    #[test]
    fn store_then_retrieve() {
        let s = InMemorySection::new();

        store(&s, "channel", &Channel(15), encode_channel).unwrap();
        assert_eq!(s.uint("channel", None), (15, true));
        assert_eq!(retrieve(&s, "channel", decode_channel, None), (Channel(15), true));
    }

    #[test]
    fn missing_key_yields_zero_value() {
        let s = InMemorySection::new();
        assert_eq!(retrieve(&s, "missing", decode_channel, None), (Channel(0), false));
    }

    #[test]
    fn missing_key_yields_default() {
        let s = InMemorySection::new();
        assert_eq!(
            retrieve(&s, "missing", decode_channel, Some(Channel(7))),
            (Channel(7), false)
        );
    }

    #[test]
    fn undecodable_value_yields_default() {
        let s = InMemorySection::new();
        s.set("channel", &300u16).unwrap();
        assert_eq!(
            retrieve(&s, "channel", decode_channel, Some(Channel(11))),
            (Channel(11), false)
        );
    }

    #[test]
    fn encoder_errors_propagate() {
        fn reject(_: &InMemorySection, _: &str, _: &Channel) -> Result<(), Error> {
            Err(Error::unsupported("Channel"))
        }

        let s = InMemorySection::new();
        let err = store(&s, "channel", &Channel(1), reject).unwrap_err();
        assert!(matches!(err, Error::UnsupportedType { .. }));
        assert!(!s.exists("channel"));
    }
}
