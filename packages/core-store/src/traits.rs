//! The Section contract shared by every backend.

use serde::Serialize;

use crate::scalar::to_scalar;
use crate::{Error, Value, ValueType};

/// A node in the persistence tree.
///
/// A section holds a flat map of typed scalar values and a map of named child
/// sections. The two maps are independent namespaces: a key `"x"` and a child
/// section `"x"` can coexist.
///
/// Implementations are handles: cloning one yields another handle onto the
/// same node, and every method takes `&self`. Each node is independently
/// locked, so a handle may be shared freely across threads.
///
/// Absence is reported through the returned flag, never as an error. A read
/// through an accessor whose type does not match the stored tag behaves
/// exactly like a read of a missing key.
///
/// # Example
///
/// ```rust
/// use sectionfs_core_store::{section, InMemorySection, Section};
///
/// let root = InMemorySection::new();
/// let radio = section!(root, "devices", "radio");
/// radio.set("channel", &15u8).unwrap();
///
/// assert_eq!(radio.uint("channel", None), (15, true));
/// assert_eq!(radio.int("channel", Some(-1)), (-1, false));
/// assert!(root.section("devices").section_exists("radio"));
/// ```
pub trait Section: Clone + Send + Sync + Sized {
    /// All value keys presently in this node, in no particular order.
    fn keys(&self) -> Vec<String>;

    /// Whether a value is stored under `key`.
    fn exists(&self, key: &str) -> bool;

    /// The stored value for `key`, if any.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store an already-widened value under `key`, replacing any previous one.
    fn set_value(&self, key: &str, value: Value);

    /// Remove `key`. Returns true if it existed.
    fn delete(&self, key: &str) -> bool;

    /// The child section `name`, created if it does not exist yet.
    ///
    /// Repeated navigation to the same name returns a handle onto the same
    /// node.
    fn section(&self, name: &str) -> Self;

    /// Names of all child sections, in no particular order.
    fn section_keys(&self) -> Vec<String>;

    /// Whether a child section `name` exists.
    fn section_exists(&self, name: &str) -> bool;

    /// Remove the child section `name` together with its whole subtree.
    /// Returns true if it existed.
    fn section_delete(&self, name: &str) -> bool;

    /// Whether `self` and `other` are handles onto the same node.
    fn same_node(&self, other: &Self) -> bool;

    /// The tag of the value stored under `key`, or `ValueType::None`.
    fn value_type(&self, key: &str) -> ValueType {
        self.get(key)
            .map(|value| value.value_type())
            .unwrap_or(ValueType::None)
    }

    /// Store `value` under `key`.
    ///
    /// Integers are widened to 64 bits keeping their signedness, `f32` to
    /// `f64`; strings and booleans are stored as-is. A `char` is stored as a
    /// one-character `String`, not as its code point. A `Value` is stored
    /// unchanged.
    ///
    /// Sequences are rejected, including `Vec<u8>`, `&[u8]` and `[u8; N]`:
    /// serde does not tell an empty byte vector apart from any other empty
    /// sequence. Use `set_bytes` (or pass a `Value::Bytes`) for byte strings.
    ///
    /// Any other shape is rejected with `Error::UnsupportedType` and the
    /// section is left unchanged.
    fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), Error> {
        let value = to_scalar(value)?;
        self.set_value(key, value);
        Ok(())
    }

    /// Store a byte string under `key`. Accepts vectors, slices and arrays.
    fn set_bytes(&self, key: &str, bytes: impl Into<Vec<u8>>) {
        self.set_value(key, Value::Bytes(bytes.into()));
    }

    /// Descend through `first` and then every name in `rest`, creating
    /// missing sections on the way, and return the last one.
    fn section_path(&self, first: &str, rest: &[&str]) -> Self {
        rest.iter()
            .fold(self.section(first), |section, name| section.section(name))
    }

    fn int(&self, key: &str, default: Option<i64>) -> (i64, bool) {
        lookup(self.get(key).and_then(|v| v.as_int()), default)
    }

    fn uint(&self, key: &str, default: Option<u64>) -> (u64, bool) {
        lookup(self.get(key).and_then(|v| v.as_uint()), default)
    }

    fn string(&self, key: &str, default: Option<String>) -> (String, bool) {
        let found = match self.get(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };
        lookup(found, default)
    }

    fn bool(&self, key: &str, default: Option<bool>) -> (bool, bool) {
        lookup(self.get(key).and_then(|v| v.as_bool()), default)
    }

    fn float(&self, key: &str, default: Option<f64>) -> (f64, bool) {
        lookup(self.get(key).and_then(|v| v.as_float()), default)
    }

    fn bytes(&self, key: &str, default: Option<Vec<u8>>) -> (Vec<u8>, bool) {
        let found = match self.get(key) {
            Some(Value::Bytes(b)) => Some(b),
            _ => None,
        };
        lookup(found, default)
    }
}

fn lookup<T: Default>(found: Option<T>, default: Option<T>) -> (T, bool) {
    match found {
        Some(value) => (value, true),
        None => (default.unwrap_or_default(), false),
    }
}

/// Navigate from a section through one or more child names.
///
/// `section!(root, "a", "b")` is shorthand for
/// `root.section("a").section("b")`, creating missing sections on the way.
#[macro_export]
macro_rules! section {
    ($root:expr, $first:expr $(, $rest:expr)* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::Section as _;
            ($root).section_path($first, &[$($rest),*])
        }
    };
}
