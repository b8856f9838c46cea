//! In-memory section backend.
//!
//! The canonical concurrent implementation of the Section contract. It never
//! performs I/O and is used directly, and as the live cache of the disk
//! backend.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{Section, Value};

/// A section kept entirely in memory.
///
/// Each node guards its value map and its child map with its own lock. A lock
/// is only held for the map access itself, never across a call into another
/// node, so operations on different nodes never contend.
///
/// # Example
///
/// ```rust
/// use sectionfs_core_store::{InMemorySection, Section, ValueType};
///
/// let root = InMemorySection::new();
/// root.set("name", "kitchen").unwrap();
///
/// assert_eq!(root.value_type("name"), ValueType::String);
/// assert_eq!(root.string("name", None), ("kitchen".to_string(), true));
/// ```
#[derive(Clone, Default)]
pub struct InMemorySection {
    node: Arc<Node>,
}

#[derive(Default)]
struct Node {
    values: RwLock<HashMap<String, Value>>,
    sections: RwLock<HashMap<String, InMemorySection>>,
}

// A panic while holding one of these locks cannot leave a map half-updated,
// so a poisoned lock is still safe to use.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl InMemorySection {
    /// Create a new, empty root section.
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of every key/value pair in this node.
    pub fn entries(&self) -> Vec<(String, Value)> {
        read(&self.node.values)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl std::fmt::Debug for InMemorySection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySection")
            .field("keys", &self.keys())
            .field("sections", &self.section_keys())
            .finish()
    }
}

impl Section for InMemorySection {
    fn keys(&self) -> Vec<String> {
        read(&self.node.values).keys().cloned().collect()
    }

    fn exists(&self, key: &str) -> bool {
        read(&self.node.values).contains_key(key)
    }

    fn get(&self, key: &str) -> Option<Value> {
        read(&self.node.values).get(key).cloned()
    }

    fn set_value(&self, key: &str, value: Value) {
        write(&self.node.values).insert(key.to_string(), value);
    }

    fn delete(&self, key: &str) -> bool {
        write(&self.node.values).remove(key).is_some()
    }

    fn section(&self, name: &str) -> Self {
        if let Some(existing) = read(&self.node.sections).get(name) {
            return existing.clone();
        }

        write(&self.node.sections)
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    fn section_keys(&self) -> Vec<String> {
        read(&self.node.sections).keys().cloned().collect()
    }

    fn section_exists(&self, name: &str) -> bool {
        read(&self.node.sections).contains_key(name)
    }

    fn section_delete(&self, name: &str) -> bool {
        // Dropping the handle drops the whole subtree once no other handle
        // refers to it.
        write(&self.node.sections).remove(name).is_some()
    }

    fn same_node(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}
