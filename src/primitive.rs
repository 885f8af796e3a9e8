//! Fixed catalogue of scalar codecs seeded into every registry.

use crate::{
    endian::Endianness,
    errors::{ReadError, WriteError},
    value::Value,
};

/// A built-in scalar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    U8,
    S8,
    U16,
    S16,
    U32,
    S32,
    U64,
    S64,
    Float,
    Double,
    /// Single Latin-1 character, one byte.
    Char,
    /// Four-byte integer, true iff non-zero.
    Bool,
    /// NUL-terminated, variable length, decode only.
    String,
}

impl Primitive {
    pub const ALL: [Primitive; 13] = [
        Primitive::U8,
        Primitive::S8,
        Primitive::U16,
        Primitive::S16,
        Primitive::U32,
        Primitive::S32,
        Primitive::U64,
        Primitive::S64,
        Primitive::Float,
        Primitive::Double,
        Primitive::Char,
        Primitive::Bool,
        Primitive::String,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Primitive::U8 => "u8",
            Primitive::S8 => "s8",
            Primitive::U16 => "u16",
            Primitive::S16 => "s16",
            Primitive::U32 => "u32",
            Primitive::S32 => "s32",
            Primitive::U64 => "u64",
            Primitive::S64 => "s64",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Char => "char",
            Primitive::Bool => "bool",
            Primitive::String => "string",
        }
    }

    /// Encoded size in bytes, `None` for the variable-length string.
    pub fn size(self) -> Option<usize> {
        match self {
            Primitive::U8 | Primitive::S8 | Primitive::Char => Some(1),
            Primitive::U16 | Primitive::S16 => Some(2),
            Primitive::U32 | Primitive::S32 | Primitive::Float | Primitive::Bool => Some(4),
            Primitive::U64 | Primitive::S64 | Primitive::Double => Some(8),
            Primitive::String => None,
        }
    }

    pub fn is_encodable(self) -> bool {
        self != Primitive::String
    }

    /// Decodes one value at `offset`. Returns the value and the bytes consumed.
    pub fn decode(
        self,
        buf: &[u8],
        offset: usize,
        endian: Endianness,
    ) -> Result<(Value, usize), ReadError> {
        let Some(size) = self.size() else {
            return decode_c_string(buf, offset);
        };
        let bytes = window(buf, offset, size)?;

        let value = match self {
            Primitive::U8 => Value::U64(bytes[0] as u64),
            Primitive::S8 => Value::I64(bytes[0] as i8 as i64),
            Primitive::U16 => Value::U64(endian.read_u16(bytes) as u64),
            Primitive::S16 => Value::I64(endian.read_i16(bytes) as i64),
            Primitive::U32 => Value::U64(endian.read_u32(bytes) as u64),
            Primitive::S32 => Value::I64(endian.read_i32(bytes) as i64),
            Primitive::U64 => Value::U64(endian.read_u64(bytes)),
            Primitive::S64 => Value::I64(endian.read_i64(bytes)),
            Primitive::Float => Value::F32(endian.read_f32(bytes)),
            Primitive::Double => Value::F64(endian.read_f64(bytes)),
            Primitive::Char => Value::Char(bytes[0] as char),
            Primitive::Bool => Value::Bool(endian.read_u32(bytes) != 0),
            Primitive::String => unreachable!("string has no fixed size"),
        };

        Ok((value, size))
    }

    /// Encodes `value` at `offset`. Returns the bytes written.
    pub fn encode(
        self,
        buf: &mut [u8],
        offset: usize,
        value: &Value,
        endian: Endianness,
    ) -> Result<usize, WriteError> {
        let Some(size) = self.size() else {
            return Err(WriteError::NotEncodable(self.name().to_string()));
        };

        let len = buf.len();
        let bytes = buf
            .get_mut(offset..offset.saturating_add(size))
            .ok_or(WriteError::OutOfBounds {
                position: offset,
                size,
                len,
            })?;

        match self {
            Primitive::U8 => bytes[0] = self.unsigned(value, u8::MAX as u64)? as u8,
            Primitive::S8 => bytes[0] = self.signed(value, i8::MIN as i64, i8::MAX as i64)? as u8,
            Primitive::U16 => endian.write_u16(bytes, self.unsigned(value, u16::MAX as u64)? as u16),
            Primitive::S16 => endian.write_i16(
                bytes,
                self.signed(value, i16::MIN as i64, i16::MAX as i64)? as i16,
            ),
            Primitive::U32 => endian.write_u32(bytes, self.unsigned(value, u32::MAX as u64)? as u32),
            Primitive::S32 => endian.write_i32(
                bytes,
                self.signed(value, i32::MIN as i64, i32::MAX as i64)? as i32,
            ),
            Primitive::U64 => endian.write_u64(bytes, self.unsigned(value, u64::MAX)?),
            Primitive::S64 => endian.write_i64(bytes, self.signed(value, i64::MIN, i64::MAX)?),
            Primitive::Float => match *value {
                Value::F32(v) => endian.write_f32(bytes, v),
                Value::F64(v) => endian.write_f32(bytes, v as f32),
                _ => return Err(self.mismatch(value)),
            },
            Primitive::Double => match *value {
                Value::F64(v) => endian.write_f64(bytes, v),
                Value::F32(v) => endian.write_f64(bytes, v as f64),
                _ => return Err(self.mismatch(value)),
            },
            Primitive::Char => match *value {
                Value::Char(c) => {
                    bytes[0] = u8::try_from(c).map_err(|_| self.out_of_range(c))?;
                }
                _ => return Err(self.mismatch(value)),
            },
            Primitive::Bool => match *value {
                Value::Bool(b) => endian.write_u32(bytes, b as u32),
                _ => return Err(self.mismatch(value)),
            },
            Primitive::String => unreachable!("string has no fixed size"),
        }

        Ok(size)
    }

    fn unsigned(self, value: &Value, max: u64) -> Result<u64, WriteError> {
        let v = match *value {
            Value::U64(v) => v,
            Value::I64(v) => u64::try_from(v).map_err(|_| self.out_of_range(v))?,
            _ => return Err(self.mismatch(value)),
        };

        if v > max {
            return Err(self.out_of_range(v));
        }

        Ok(v)
    }

    fn signed(self, value: &Value, min: i64, max: i64) -> Result<i64, WriteError> {
        let v = match *value {
            Value::I64(v) => v,
            Value::U64(v) => i64::try_from(v).map_err(|_| self.out_of_range(v))?,
            _ => return Err(self.mismatch(value)),
        };

        if v < min || v > max {
            return Err(self.out_of_range(v));
        }

        Ok(v)
    }

    fn mismatch(self, value: &Value) -> WriteError {
        WriteError::TypeMismatch {
            type_name: self.name().to_string(),
            found: value.kind(),
        }
    }

    fn out_of_range(self, value: impl std::fmt::Display) -> WriteError {
        WriteError::ValueOutOfRange {
            type_name: self.name().to_string(),
            value: value.to_string(),
        }
    }
}

/// Returns `size` bytes at `offset` or an out-of-bounds error.
pub(crate) fn window(buf: &[u8], offset: usize, size: usize) -> Result<&[u8], ReadError> {
    offset
        .checked_add(size)
        .and_then(|end| buf.get(offset..end))
        .ok_or(ReadError::OutOfBounds {
            position: offset,
            size,
            len: buf.len(),
        })
}

fn decode_c_string(buf: &[u8], offset: usize) -> Result<(Value, usize), ReadError> {
    let tail = buf.get(offset..).ok_or(ReadError::OutOfBounds {
        position: offset,
        size: 1,
        len: buf.len(),
    })?;
    let end = tail
        .iter()
        .position(|b| *b == 0)
        .ok_or(ReadError::UnterminatedString { position: offset })?;

    let text = String::from_utf8_lossy(&tail[..end]).into_owned();

    Ok((Value::String(text), end + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(Primitive::U8.size(), Some(1));
        assert_eq!(Primitive::S16.size(), Some(2));
        assert_eq!(Primitive::Bool.size(), Some(4));
        assert_eq!(Primitive::Double.size(), Some(8));
        assert_eq!(Primitive::String.size(), None);
    }

    #[test]
    fn test_decode_signed_sign_extends() {
        let data = [0xFF, 0xFE];
        let (value, used) = Primitive::S16.decode(&data, 0, Endianness::Big).unwrap();
        assert_eq!(value, Value::I64(-2));
        assert_eq!(used, 2);
    }

    #[test]
    fn test_decode_out_of_bounds() {
        let data = [0u8; 3];
        assert_eq!(
            Primitive::U32.decode(&data, 0, Endianness::Little).unwrap_err(),
            ReadError::OutOfBounds {
                position: 0,
                size: 4,
                len: 3
            }
        );
    }

    #[test]
    fn test_bool_is_nonzero() {
        let data = [0, 0, 2, 0];
        let (value, _) = Primitive::Bool.decode(&data, 0, Endianness::Little).unwrap();
        assert_eq!(value, Value::Bool(true));

        let mut out = [0xAA; 4];
        Primitive::Bool
            .encode(&mut out, 0, &Value::Bool(true), Endianness::Big)
            .unwrap();
        assert_eq!(out, [0, 0, 0, 1]);
    }

    #[test]
    fn test_decode_c_string() {
        let data = b"hi\0rest";
        let (value, used) = Primitive::String.decode(data, 0, Endianness::Little).unwrap();
        assert_eq!(value, Value::String("hi".to_string()));
        assert_eq!(used, 3);
    }

    #[test]
    fn test_decode_unterminated_string() {
        assert_eq!(
            Primitive::String
                .decode(b"abc", 1, Endianness::Little)
                .unwrap_err(),
            ReadError::UnterminatedString { position: 1 }
        );
    }

    #[test]
    fn test_string_is_decode_only() {
        let mut buf = [0u8; 8];
        assert_eq!(
            Primitive::String
                .encode(&mut buf, 0, &Value::String("x".into()), Endianness::Little)
                .unwrap_err(),
            WriteError::NotEncodable("string".to_string())
        );
    }

    #[test]
    fn test_encode_range_checks() {
        let mut buf = [0u8; 2];
        assert!(matches!(
            Primitive::U8.encode(&mut buf, 0, &Value::U64(256), Endianness::Little),
            Err(WriteError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            Primitive::S8.encode(&mut buf, 0, &Value::I64(-129), Endianness::Little),
            Err(WriteError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            Primitive::U16.encode(&mut buf, 0, &Value::F32(1.0), Endianness::Little),
            Err(WriteError::TypeMismatch { .. })
        ));

        Primitive::S16
            .encode(&mut buf, 0, &Value::I64(-2), Endianness::Little)
            .unwrap();
        assert_eq!(buf, [0xFE, 0xFF]);
    }

    #[test]
    fn test_char_is_latin1() {
        let mut buf = [0u8; 1];
        Primitive::Char
            .encode(&mut buf, 0, &Value::Char('é'), Endianness::Little)
            .unwrap();
        assert_eq!(buf, [0xE9]);

        assert!(matches!(
            Primitive::Char.encode(&mut buf, 0, &Value::Char('€'), Endianness::Little),
            Err(WriteError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn test_float_round_trip() {
        let mut buf = [0u8; 8];
        Primitive::Double
            .encode(&mut buf, 0, &Value::F64(3.5), Endianness::Big)
            .unwrap();
        let (value, _) = Primitive::Double.decode(&buf, 0, Endianness::Big).unwrap();
        assert_eq!(value, Value::F64(3.5));
    }
}
