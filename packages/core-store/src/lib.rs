//! Core SectionFS: the Section contract and the in-memory backend.
//!
//! A section is a node in a tree. It holds a flat map of typed scalar values
//! and a map of named child sections:
//! - `Value`: a tagged scalar (signed/unsigned integer, string, bool, float, bytes)
//! - `ValueType`: the tag, including the `None` answer for absent keys
//! - `Section`: the capability set every backend implements
//! - `InMemorySection`: the canonical concurrent backend
//!
//! # Example
//!
//! ```rust
//! use sectionfs_core_store::{section, InMemorySection, Section};
//!
//! let root = InMemorySection::new();
//! section!(root, "zigbee", "coordinator").set("pan_id", &0x1a62u16).unwrap();
//!
//! let coordinator = root.section("zigbee").section("coordinator");
//! assert_eq!(coordinator.uint("pan_id", None), (0x1a62, true));
//! ```

mod error;
mod in_memory;
mod scalar;
mod traits;
mod value;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_suite;

pub use error::Error;
pub use in_memory::InMemorySection;
pub use scalar::to_scalar;
pub use traits::Section;
pub use value::{Value, ValueType};
