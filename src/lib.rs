//! # structcraft
//!
//! A binary struct and bitfield codec driven by a small schema language.
//!
//! Schema text compiles into a [StructDescriptor] that is registered in a
//! [Registry] under its own name, so later schemas can nest it. The codec
//! then reads bytes into a [Record] and writes a [Record] back to bytes, with
//! byte order chosen per call. Supported field types are the primitive
//! table, previously compiled structs, fixed-length arrays, and bit-packed
//! `BitfieldW{..}` containers.
//!
//! ## Example
//!
//! ```
//! use structcraft::{Endianness, Registry, Value};
//!
//! let mut registry = Registry::new();
//! registry
//!     .compile(
//!         "u16 field1\nu8 field2\nBitfield16{flagA:1, flagB:3, fieldC:4} field3",
//!         "Header",
//!     )
//!     .unwrap();
//!
//! let data = [42, 0, 7, 0b0000_0000, 0b1010_0111];
//! let record = registry.read(&data, 0, "Header", Endianness::Little).unwrap();
//!
//! assert_eq!(record.get("field1"), Some(&Value::U64(42)));
//! let flags = record.get("field3").and_then(Value::as_bitfield).unwrap();
//! assert_eq!(flags.get("flagB").unwrap(), 0b010);
//!
//! let mut out = [0u8; 5];
//! registry.write(&mut out, 0, "Header", &record, Endianness::Little).unwrap();
//! assert_eq!(out, data);
//! ```

pub mod bitfield;
pub mod bits;
pub mod codec;
pub mod codegen;
pub mod compiled;
pub mod descriptor;
pub mod endian;
pub mod errors;
pub mod field;
pub mod primitive;
pub mod registry;
pub mod schema;
#[cfg(feature = "serde")]
pub mod serde;
pub mod stream;
pub mod value;

pub use bitfield::{BitfieldLayout, BitfieldValue, BitfieldWidth, Projection, RESERVED_MARKER};
pub use compiled::StructDescriptor;
pub use descriptor::{TypeCodec, TypeDescriptor, TypeEncoder};
pub use endian::Endianness;
pub use errors::{BitfieldError, DefinitionError, ReadError, RegistryError, SeekError, WriteError};
pub use field::FieldDescriptor;
pub use primitive::Primitive;
pub use registry::Registry;
pub use stream::StructStream;
pub use value::{Record, Value};
