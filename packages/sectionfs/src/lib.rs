//! SectionFS: a tree of typed key-value sections.
//!
//! Every node of the tree is a section holding scalar values under string
//! keys and named child sections. The same `Section` interface is served by
//! a purely in-memory backend and by a backend that mirrors the tree onto a
//! directory of `data.json` documents.
//!
//! ```rust
//! use sectionfs::{section, InMemorySection, Section};
//!
//! let root = InMemorySection::new();
//! section!(root, "devices", "lamp").set("brightness", &200u8)?;
//!
//! assert_eq!(
//!     root.section("devices").section("lamp").uint("brightness", None),
//!     (200, true)
//! );
//! # Ok::<(), sectionfs::Error>(())
//! ```

pub use sectionfs_core_store::{section, to_scalar, Error, InMemorySection, Section, Value, ValueType};
pub use sectionfs_json_store::{JSONLocalSection, LocalSectionConfig, DATA_FILE};

pub use sectionfs_converter as converter;
