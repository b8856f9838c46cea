//! Configuration for disk-backed sections.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_FLUSH_DELAY: Duration = Duration::from_millis(500);

/// Tunables for a `JSONLocalSection` tree.
///
/// Child sections inherit the configuration of the section they were opened
/// from. The struct deserializes from a fragment such as
/// `{"flush_delay_ms": 250}` so it can be embedded in an application's own
/// configuration file; missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSectionConfig {
    /// Quiet period after the last mutation of a section before its data
    /// document is written.
    #[serde(rename = "flush_delay_ms", with = "duration_ms")]
    pub flush_delay: Duration,
}

impl LocalSectionConfig {
    pub fn with_flush_delay(mut self, flush_delay: Duration) -> Self {
        self.flush_delay = flush_delay;
        self
    }
}

impl Default for LocalSectionConfig {
    fn default() -> Self {
        Self {
            flush_delay: DEFAULT_FLUSH_DELAY,
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).map_err(serde::ser::Error::custom)?;
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
