//! External (JSON-style) projection of decoded values.
//!
//! Records and bitfields serialize as maps in declaration order. Names
//! starting with the reserved marker are skipped. One-bit sub-fields become
//! booleans and wider ones `0b`-prefixed binary strings.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::{
    bitfield::{BitfieldValue, is_reserved},
    value::{Record, Value},
};

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::U64(v) => serializer.serialize_u64(*v),
            Value::I64(v) => serializer.serialize_i64(*v),
            Value::F32(v) => serializer.serialize_f32(*v),
            Value::F64(v) => serializer.serialize_f64(*v),
            Value::Char(c) => serializer.serialize_char(*c),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            Value::Struct(record) => record.serialize(serializer),
            Value::Bitfield(bits) => bits.serialize(serializer),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (name, value) in self.iter().filter(|(name, _)| !is_reserved(name)) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for BitfieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let projected = self.project();
        let mut map = serializer.serialize_map(Some(projected.len()))?;
        for (name, value) in &projected {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
