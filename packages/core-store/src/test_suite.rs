//! Conformance tests every `Section` backend must pass.
//!
//! A backend runs the suite by handing `run` a `Harness`: how to create a
//! fresh root, how to "reopen" it (a persistent backend flushes and loads a
//! new instance from the same storage; an in-memory one returns the same
//! handle), and how to release whatever storage a root used.

use crate::{section, Error, Section, Value, ValueType};

pub struct Harness<S: Section> {
    pub new: fn() -> S,
    pub reopen: fn(&S) -> S,
    pub done: fn(&S),
}

/// `reopen` for backends without durable storage.
pub fn same_handle<S: Section>(section: &S) -> S {
    section.clone()
}

/// `done` for backends without durable storage.
pub fn no_cleanup<S: Section>(_section: &S) {}

pub fn run<S: Section>(harness: &Harness<S>) {
    keys(harness);
    value_type(harness);
    delete(harness);
    bool_values(harness);
    bytes_values(harness);
    string_values(harness);
    float_values(harness);
    int_values(harness);
    uint_values(harness);
    mismatched_accessors(harness);
    unsupported_set(harness);
    chained_sections(harness);
    section_keys(harness);
    section_delete(harness);
    recursive_section_delete(harness);
    exists(harness);
    section_exists(harness);
    keys_and_sections_do_not_clash(harness);
}

pub fn keys<S: Section>(harness: &Harness<S>) {
    let s = (harness.new)();

    s.set("a", "one").unwrap();
    s.set("b", "two").unwrap();

    let keys = s.keys();
    assert_eq!(keys.len(), 2);
    assert!(keys.contains(&"a".to_string()));
    assert!(keys.contains(&"b".to_string()));

    (harness.done)(&s);
}

pub fn value_type<S: Section>(harness: &Harness<S>) {
    let s = (harness.new)();

    s.set("int", &1).unwrap();
    s.set("uint", &1u32).unwrap();
    s.set("string", "Hello World").unwrap();
    s.set("float", &1.0).unwrap();
    s.set("bool", &true).unwrap();
    s.set_bytes("bytes", b"data".as_slice());

    let s2 = (harness.reopen)(&s);

    assert_eq!(s2.value_type("int"), ValueType::Int);
    assert_eq!(s2.value_type("uint"), ValueType::UInt);
    assert_eq!(s2.value_type("string"), ValueType::String);
    assert_eq!(s2.value_type("float"), ValueType::Float);
    assert_eq!(s2.value_type("bool"), ValueType::Bool);
    assert_eq!(s2.value_type("bytes"), ValueType::Bytes);
    assert_eq!(s2.value_type("missing"), ValueType::None);

    (harness.done)(&s2);
    (harness.done)(&s);
}

pub fn delete<S: Section>(harness: &Harness<S>) {
    let s = (harness.new)();

    s.set("a", "one").unwrap();
    assert!(s.keys().contains(&"a".to_string()));

    assert!(s.delete("a"));
    assert!(!s.keys().contains(&"a".to_string()));

    // A second delete of the same key is a harmless no-op.
    assert!(!s.delete("a"));
    assert!(!s.delete("never-set"));
    assert!(s.keys().is_empty());

    let s2 = (harness.reopen)(&s);
    assert!(!s2.exists("a"));

    (harness.done)(&s2);
    (harness.done)(&s);
}

pub fn bool_values<S: Section>(harness: &Harness<S>) {
    let s = (harness.new)();

    assert_eq!(s.bool("boolKey", None), (false, false));
    assert_eq!(s.bool("boolKey", Some(true)), (true, false));

    s.set("boolKey", &true).unwrap();

    let s2 = (harness.reopen)(&s);
    assert_eq!(s2.bool("boolKey", Some(false)), (true, true));

    (harness.done)(&s2);
    (harness.done)(&s);
}

pub fn bytes_values<S: Section>(harness: &Harness<S>) {
    let s = (harness.new)();

    assert_eq!(s.bytes("bytesKey", None), (Vec::new(), false));
    assert_eq!(s.bytes("bytesKey", Some(vec![0x09])), (vec![0x09], false));

    s.set_bytes("bytesKey", vec![0x01u8]);
    s.set_bytes("allBytes", (0..=255u8).collect::<Vec<u8>>());
    s.set_bytes("empty", Vec::<u8>::new());
    s.set("fixed", &Value::Bytes(vec![0xaa, 0xbb])).unwrap();

    let s2 = (harness.reopen)(&s);
    assert_eq!(s2.bytes("bytesKey", None), (vec![0x01], true));
    assert_eq!(
        s2.bytes("allBytes", None),
        ((0..=255u8).collect::<Vec<u8>>(), true)
    );
    assert_eq!(s2.bytes("empty", Some(vec![0x01])), (Vec::new(), true));
    assert_eq!(s2.bytes("fixed", None), (vec![0xaa, 0xbb], true));

    (harness.done)(&s2);
    (harness.done)(&s);
}

pub fn string_values<S: Section>(harness: &Harness<S>) {
    let s = (harness.new)();

    assert_eq!(s.string("stringKey", None), (String::new(), false));
    assert_eq!(
        s.string("stringKey", Some("none".to_string())),
        ("none".to_string(), false)
    );

    s.set("stringKey", "test").unwrap();
    s.set("unicode", "żółw \u{1F422}").unwrap();

    let s2 = (harness.reopen)(&s);
    assert_eq!(
        s2.string("stringKey", Some("other".to_string())),
        ("test".to_string(), true)
    );
    assert_eq!(
        s2.string("unicode", None),
        ("żółw \u{1F422}".to_string(), true)
    );

    (harness.done)(&s2);
    (harness.done)(&s);
}

pub fn float_values<S: Section>(harness: &Harness<S>) {
    let s = (harness.new)();

    assert_eq!(s.float("float64Key", None), (0.0, false));
    assert_eq!(s.float("float64Key", Some(0.1)), (0.1, false));

    s.set("float64Key", &0.2).unwrap();
    assert_eq!(s.float("float64Key", Some(0.1)), (0.2, true));

    s.set("float32Key", &0.2f32).unwrap();
    s.set("wholeFloat", &2.0).unwrap();

    let s2 = (harness.reopen)(&s);
    assert_eq!(s2.float("float64Key", None), (0.2, true));

    let (val, found) = s2.float("float32Key", Some(0.1));
    assert!((val - 0.2).abs() < 0.0001);
    assert!(found);

    assert_eq!(s2.float("wholeFloat", None), (2.0, true));
    assert_eq!(s2.value_type("wholeFloat"), ValueType::Float);

    (harness.done)(&s2);
    (harness.done)(&s);
}

pub fn int_values<S: Section>(harness: &Harness<S>) {
    let s = (harness.new)();

    assert_eq!(s.int("intKey", None), (0, false));
    assert_eq!(s.int("intKey", Some(1)), (1, false));

    s.set("intKey", &2).unwrap();
    assert_eq!(s.int("intKey", Some(1)), (2, true));

    s.set("int8Key", &2i8).unwrap();
    s.set("int16Key", &2i16).unwrap();
    s.set("int32Key", &2i32).unwrap();
    s.set("int64Key", &2i64).unwrap();
    s.set("min", &i64::MIN).unwrap();
    s.set("max", &i64::MAX).unwrap();

    let s2 = (harness.reopen)(&s);
    assert_eq!(s2.int("int8Key", Some(1)), (2, true));
    assert_eq!(s2.int("int16Key", Some(1)), (2, true));
    assert_eq!(s2.int("int32Key", Some(1)), (2, true));
    assert_eq!(s2.int("int64Key", Some(1)), (2, true));
    assert_eq!(s2.int("min", None), (i64::MIN, true));
    assert_eq!(s2.int("max", None), (i64::MAX, true));

    (harness.done)(&s2);
    (harness.done)(&s);
}

pub fn uint_values<S: Section>(harness: &Harness<S>) {
    let s = (harness.new)();

    assert_eq!(s.uint("intKey", None), (0, false));
    assert_eq!(s.uint("intKey", Some(1)), (1, false));

    s.set("intKey", &2usize).unwrap();
    assert_eq!(s.uint("intKey", Some(1)), (2, true));

    s.set("int8Key", &2u8).unwrap();
    s.set("int16Key", &2u16).unwrap();
    s.set("int32Key", &2u32).unwrap();
    s.set("int64Key", &2u64).unwrap();
    s.set("max", &u64::MAX).unwrap();

    let s2 = (harness.reopen)(&s);
    assert_eq!(s2.uint("int8Key", Some(1)), (2, true));
    assert_eq!(s2.uint("int16Key", Some(1)), (2, true));
    assert_eq!(s2.uint("int32Key", Some(1)), (2, true));
    assert_eq!(s2.uint("int64Key", Some(1)), (2, true));
    assert_eq!(s2.uint("max", None), (u64::MAX, true));

    (harness.done)(&s2);
    (harness.done)(&s);
}

pub fn mismatched_accessors<S: Section>(harness: &Harness<S>) {
    let s = (harness.new)();

    s.set("int", &-7).unwrap();
    s.set("text", "7").unwrap();

    let s2 = (harness.reopen)(&s);

    assert_eq!(s2.uint("int", None), (0, false));
    assert_eq!(s2.float("int", Some(1.5)), (1.5, false));
    assert_eq!(s2.string("int", None), (String::new(), false));
    assert_eq!(s2.bool("int", None), (false, false));
    assert_eq!(s2.bytes("int", None), (Vec::new(), false));

    assert_eq!(s2.int("text", Some(3)), (3, false));
    assert_eq!(s2.string("text", None), ("7".to_string(), true));

    (harness.done)(&s2);
    (harness.done)(&s);
}

pub fn unsupported_set<S: Section>(harness: &Harness<S>) {
    let s = (harness.new)();

    assert!(s.set("list", &vec!["a", "b"]).is_err());
    assert!(s.set("unit", &()).is_err());
    assert!(matches!(
        s.set("strings", &Vec::<String>::new()),
        Err(Error::UnsupportedType { .. })
    ));
    assert!(matches!(
        s.set("ints", &Vec::<i32>::new()),
        Err(Error::UnsupportedType { .. })
    ));
    assert!(!s.exists("list"));
    assert!(!s.exists("unit"));
    assert!(!s.exists("strings"));
    assert!(!s.exists("ints"));
    assert!(s.keys().is_empty());

    (harness.done)(&s);
}

pub fn chained_sections<S: Section>(harness: &Harness<S>) {
    let s = (harness.new)();

    let cs = section!(s, "tier1", "tier2");
    cs.set("key", "value").unwrap();

    let s2 = (harness.reopen)(&s);

    assert!(s2.section_keys().contains(&"tier1".to_string()));
    let t1 = s2.section("tier1");

    assert!(t1.section_keys().contains(&"tier2".to_string()));
    let t2 = t1.section("tier2");

    assert_eq!(t2.string("key", None), ("value".to_string(), true));
    assert!(s2.section_path("tier1", &["tier2"]).same_node(&t2));

    (harness.done)(&s2);
    (harness.done)(&s);
}

pub fn section_keys<S: Section>(harness: &Harness<S>) {
    let s = (harness.new)();

    s.section("one");
    s.section("two");

    let s2 = (harness.reopen)(&s);
    let names = s2.section_keys();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"one".to_string()));
    assert!(names.contains(&"two".to_string()));

    (harness.done)(&s2);
    (harness.done)(&s);
}

pub fn section_delete<S: Section>(harness: &Harness<S>) {
    let s = (harness.new)();

    s.section("one");
    assert!(s.section_keys().contains(&"one".to_string()));

    assert!(s.section_delete("one"));
    assert!(!s.section_delete("one"));
    assert!(!s.section_delete("never-created"));

    let s2 = (harness.reopen)(&s);
    assert!(!s2.section_keys().contains(&"one".to_string()));

    (harness.done)(&s2);
    (harness.done)(&s);
}

pub fn recursive_section_delete<S: Section>(harness: &Harness<S>) {
    let s = (harness.new)();

    section!(s, "x", "y").set("leaf", &1).unwrap();
    s.section("keep").set("leaf", &2).unwrap();

    assert!(s.section_delete("x"));

    let s2 = (harness.reopen)(&s);
    assert!(!s2.section_exists("x"));
    assert!(s2.section_exists("keep"));
    assert_eq!(s2.section("keep").int("leaf", None), (2, true));

    // Navigating again yields a fresh, empty subtree.
    let x = s2.section("x");
    assert!(!x.section_exists("y"));
    assert!(x.keys().is_empty());

    (harness.done)(&s2);
    (harness.done)(&s);
}

pub fn exists<S: Section>(harness: &Harness<S>) {
    let s = (harness.new)();

    s.set("key", "value").unwrap();

    let s2 = (harness.reopen)(&s);
    assert!(s2.exists("key"));
    assert!(!s2.exists("otherKey"));

    (harness.done)(&s2);
    (harness.done)(&s);
}

pub fn section_exists<S: Section>(harness: &Harness<S>) {
    let s = (harness.new)();

    let _ = s.section("key");

    let s2 = (harness.reopen)(&s);
    assert!(s2.section_exists("key"));
    assert!(!s2.section_exists("otherKey"));

    (harness.done)(&s2);
    (harness.done)(&s);
}

pub fn keys_and_sections_do_not_clash<S: Section>(harness: &Harness<S>) {
    let s = (harness.new)();

    s.section("key");
    s.section("key2");
    s.set("key", &42).unwrap();
    s.set("key3", &42).unwrap();

    assert_eq!(s.int("key", None), (42, true));

    let s2 = (harness.reopen)(&s);

    let keys = s2.keys();
    assert!(keys.contains(&"key".to_string()));
    assert!(!keys.contains(&"key2".to_string()));
    assert!(keys.contains(&"key3".to_string()));

    let sections = s2.section_keys();
    assert!(sections.contains(&"key".to_string()));
    assert!(sections.contains(&"key2".to_string()));
    assert!(!sections.contains(&"key3".to_string()));

    (harness.done)(&s2);
    (harness.done)(&s);
}
