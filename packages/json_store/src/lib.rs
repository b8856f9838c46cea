//! Disk-backed sections stored as a tree of JSON documents.
//!
//! A `JSONLocalSection` maps one section onto one directory. The section's
//! own values live in `data.json` inside the directory and every child
//! section is a subdirectory. Writes are cached in memory and flushed after
//! a short quiet period; `sync` forces the whole tree out immediately.
//!
//! ```rust,no_run
//! use sectionfs_core_store::Section;
//! use sectionfs_json_store::JSONLocalSection;
//!
//! let root = JSONLocalSection::open("/var/lib/myapp/state")?;
//! root.section("network").set("port", &8080u16)?;
//! root.sync()?;
//! # Ok::<(), sectionfs_core_store::Error>(())
//! ```

mod config;
mod debounce;
pub mod json_utils;
pub mod local_disk;

pub use config::LocalSectionConfig;
pub use json_utils::DATA_FILE;
pub use local_disk::JSONLocalSection;
