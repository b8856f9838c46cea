//! Conversion of arbitrary serializable values into scalar `Value`s.
//!
//! `Section::set` accepts anything implementing `Serialize` and decides the
//! stored tag from the serde data model instead of from the static type.
//! Only the six scalar kinds are accepted; every compound shape is rejected
//! with `Error::UnsupportedType` before the section is touched.
//!
//! Byte strings are only recognised through `serialize_bytes`. A `Vec<u8>` or
//! `&[u8]` serializes as a sequence of integers, which is indistinguishable
//! from any other sequence once it is empty, so sequences are always
//! rejected. Store bytes with `Section::set_bytes` or by passing a
//! `Value::Bytes`.

use serde::ser::{self, Impossible, Serialize};

use crate::{Error, Value};

/// Convert a serializable value into a widened scalar `Value`.
pub fn to_scalar<T: Serialize + ?Sized>(value: &T) -> Result<Value, Error> {
    value.serialize(ScalarSerializer)
}

struct ScalarSerializer;

impl ser::Serializer for ScalarSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = Impossible<Value, Error>;
    type SerializeTuple = Impossible<Value, Error>;
    type SerializeTupleStruct = Impossible<Value, Error>;
    type SerializeTupleVariant = Impossible<Value, Error>;
    type SerializeMap = Impossible<Value, Error>;
    type SerializeStruct = Impossible<Value, Error>;
    type SerializeStructVariant = Impossible<Value, Error>;

    fn serialize_bool(self, v: bool) -> Result<Value, Error> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, Error> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, Error> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, Error> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, Error> {
        Ok(Value::Int(v))
    }

    fn serialize_i128(self, _v: i128) -> Result<Value, Error> {
        Err(Error::unsupported("i128"))
    }

    fn serialize_u8(self, v: u8) -> Result<Value, Error> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, Error> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, Error> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, Error> {
        Ok(Value::UInt(v))
    }

    fn serialize_u128(self, _v: u128) -> Result<Value, Error> {
        Err(Error::unsupported("u128"))
    }

    fn serialize_f32(self, v: f32) -> Result<Value, Error> {
        Ok(Value::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value, Error> {
        Ok(Value::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Value, Error> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, Error> {
        Ok(Value::from(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, Error> {
        Ok(Value::from(v))
    }

    fn serialize_none(self) -> Result<Value, Error> {
        Err(Error::unsupported("none"))
    }

    fn serialize_some<T: Serialize + ?Sized>(self, _value: &T) -> Result<Value, Error> {
        Err(Error::unsupported("option"))
    }

    fn serialize_unit(self) -> Result<Value, Error> {
        Err(Error::unsupported("unit"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Value, Error> {
        Err(Error::unsupported(format!("unit struct {}", name)))
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, Error> {
        Err(Error::unsupported(format!("enum {}::{}", name, variant)))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        _value: &T,
    ) -> Result<Value, Error> {
        Err(Error::unsupported(format!("newtype struct {}", name)))
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _value: &T,
    ) -> Result<Value, Error> {
        Err(Error::unsupported(format!("enum {}::{}", name, variant)))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Error> {
        Err(Error::unsupported("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Error> {
        Err(Error::unsupported("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Error> {
        Err(Error::unsupported(format!("tuple struct {}", name)))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Error> {
        Err(Error::unsupported(format!("enum {}::{}", name, variant)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Error> {
        Err(Error::unsupported("map"))
    }

    fn serialize_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Error> {
        Err(Error::unsupported(format!("struct {}", name)))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Error> {
        Err(Error::unsupported(format!("enum {}::{}", name, variant)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::{BTreeMap, HashSet};

    #[test]
    fn integers_widen_by_signedness() {
        assert_eq!(to_scalar(&1).unwrap(), Value::Int(1));
        assert_eq!(to_scalar(&-3i8).unwrap(), Value::Int(-3));
        assert_eq!(to_scalar(&2i64).unwrap(), Value::Int(2));
        assert_eq!(to_scalar(&1u32).unwrap(), Value::UInt(1));
        assert_eq!(to_scalar(&u64::MAX).unwrap(), Value::UInt(u64::MAX));
    }

    #[test]
    fn strings_and_chars() {
        assert_eq!(to_scalar("hello").unwrap(), Value::String("hello".to_string()));
        assert_eq!(
            to_scalar(&"owned".to_string()).unwrap(),
            Value::String("owned".to_string())
        );
        assert_eq!(to_scalar(&'x').unwrap(), Value::String("x".to_string()));
    }

    #[test]
    fn bytes_come_through_serialize_bytes() {
        assert_eq!(
            to_scalar(&Value::Bytes(vec![0x01, 0xff])).unwrap(),
            Value::Bytes(vec![0x01, 0xff])
        );
        assert_eq!(
            to_scalar(&Value::Bytes(Vec::new())).unwrap(),
            Value::Bytes(Vec::new())
        );
    }

    #[test]
    fn values_pass_through_unchanged() {
        for value in [
            Value::Int(i64::MIN),
            Value::UInt(u64::MAX),
            Value::from("s"),
            Value::Bool(false),
            Value::Float(-0.5),
        ] {
            assert_eq!(to_scalar(&value).unwrap(), value);
        }
    }

    #[test]
    fn floats_and_bools() {
        assert_eq!(to_scalar(&0.5f64).unwrap(), Value::Float(0.5));
        assert_eq!(to_scalar(&true).unwrap(), Value::Bool(true));
    }

    #[test]
    fn sequences_rejected() {
        assert!(matches!(
            to_scalar(&vec![1u16, 2]),
            Err(Error::UnsupportedType { .. })
        ));
        assert!(matches!(
            to_scalar(&vec!["a"]),
            Err(Error::UnsupportedType { .. })
        ));
        assert!(matches!(
            to_scalar(&vec![0x01u8]),
            Err(Error::UnsupportedType { .. })
        ));
    }

    #[test]
    fn empty_sequences_rejected() {
        assert!(matches!(
            to_scalar(&Vec::<String>::new()),
            Err(Error::UnsupportedType { .. })
        ));
        assert!(matches!(
            to_scalar(&Vec::<i32>::new()),
            Err(Error::UnsupportedType { .. })
        ));
        assert!(matches!(
            to_scalar(&HashSet::<u64>::new()),
            Err(Error::UnsupportedType { .. })
        ));
        assert!(matches!(
            to_scalar(&Vec::<u8>::new()),
            Err(Error::UnsupportedType { .. })
        ));
    }

    #[test]
    fn fixed_size_arrays_rejected() {
        assert!(matches!(
            to_scalar(&[0u8; 4]),
            Err(Error::UnsupportedType { .. })
        ));
    }

    #[test]
    fn compound_values_rejected() {
        #[derive(Serialize)]
        struct Point {
            x: i32,
        }

        assert!(to_scalar(&Point { x: 1 }).is_err());
        assert!(to_scalar(&BTreeMap::<String, i32>::new()).is_err());
        assert!(to_scalar(&()).is_err());
        assert!(to_scalar(&Some(1)).is_err());
        assert!(to_scalar(&Option::<i32>::None).is_err());
        assert!(to_scalar(&(1, 2)).is_err());
        assert!(to_scalar(&1i128).is_err());
    }

    #[test]
    fn rejection_names_the_type() {
        #[derive(Serialize)]
        struct Point {
            x: i32,
        }

        let err = to_scalar(&Point { x: 1 }).unwrap_err();
        assert!(format!("{}", err).contains("Point"));
    }
}
