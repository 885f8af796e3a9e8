//! Per-call byte order selection.
//!
//! Every multi-byte primitive touched during one codec call uses the same
//! [Endianness]; it is never stored per field.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Byte order applied to multi-byte primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

macro_rules! dispatch {
    ($read:ident, $write:ident, $ty:ty) => {
        #[inline]
        pub fn $read(self, buf: &[u8]) -> $ty {
            match self {
                Endianness::Little => LittleEndian::$read(buf),
                Endianness::Big => BigEndian::$read(buf),
            }
        }

        #[inline]
        pub fn $write(self, buf: &mut [u8], value: $ty) {
            match self {
                Endianness::Little => LittleEndian::$write(buf, value),
                Endianness::Big => BigEndian::$write(buf, value),
            }
        }
    };
}

impl Endianness {
    dispatch!(read_u16, write_u16, u16);
    dispatch!(read_i16, write_i16, i16);
    dispatch!(read_u32, write_u32, u32);
    dispatch!(read_i32, write_i32, i32);
    dispatch!(read_u64, write_u64, u64);
    dispatch!(read_i64, write_i64, i64);
    dispatch!(read_f32, write_f32, f32);
    dispatch!(read_f64, write_f64, f64);

    /// Reads an unsigned integer `bytes` wide, 1 to 8.
    pub fn read_uint(self, buf: &[u8], bytes: usize) -> u64 {
        match self {
            Endianness::Little => LittleEndian::read_uint(buf, bytes),
            Endianness::Big => BigEndian::read_uint(buf, bytes),
        }
    }

    /// Writes the low `bytes` bytes of `value`, 1 to 8.
    pub fn write_uint(self, buf: &mut [u8], bytes: usize, value: u64) {
        let value = value & crate::bits::mask(bytes as u32 * 8);
        match self {
            Endianness::Little => LittleEndian::write_uint(buf, value, bytes),
            Endianness::Big => BigEndian::write_uint(buf, value, bytes),
        }
    }
}
