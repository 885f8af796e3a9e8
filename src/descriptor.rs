//! Codec descriptors stored in the [crate::registry::Registry].

use std::{fmt, sync::Arc};

use crate::{
    bitfield::BitfieldWidth,
    compiled::StructDescriptor,
    endian::Endianness,
    errors::{ReadError, WriteError},
    primitive::Primitive,
    value::Value,
};

/// Capability contract for user-supplied types.
///
/// Implementors are registered by value through
/// [crate::registry::Registry::register_codec]; the name is checked once at
/// that point. Decode-only types keep the default [TypeCodec::encoder];
/// writable types return themselves (or a helper) from it.
pub trait TypeCodec: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Encoded size in bytes, `None` if the size depends on the data.
    fn fixed_size(&self) -> Option<usize>;

    fn decode(
        &self,
        buf: &[u8],
        offset: usize,
        endian: Endianness,
    ) -> Result<(Value, usize), ReadError>;

    /// Write half of the codec, `None` for decode-only types.
    fn encoder(&self) -> Option<&dyn TypeEncoder> {
        None
    }
}

/// Write half of a [TypeCodec].
pub trait TypeEncoder: Send + Sync {
    /// Encodes `value` at `offset`. Returns the bytes written.
    fn encode(
        &self,
        buf: &mut [u8],
        offset: usize,
        value: &Value,
        endian: Endianness,
    ) -> Result<usize, WriteError>;
}

/// A registered type.
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    Primitive(Primitive),
    /// Bitfield container; the sub-field layout is supplied per use.
    Bitfield(BitfieldWidth),
    Struct(Arc<StructDescriptor>),
    Custom(Arc<dyn TypeCodec>),
}

impl TypeDescriptor {
    pub fn name(&self) -> &str {
        match self {
            TypeDescriptor::Primitive(p) => p.name(),
            TypeDescriptor::Bitfield(w) => w.type_name(),
            TypeDescriptor::Struct(desc) => desc.name(),
            TypeDescriptor::Custom(codec) => codec.name(),
        }
    }

    /// Encoded size in bytes, `None` for variable-length types.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            TypeDescriptor::Primitive(p) => p.size(),
            TypeDescriptor::Bitfield(w) => Some(w.bytes()),
            TypeDescriptor::Struct(desc) => Some(desc.size()),
            TypeDescriptor::Custom(codec) => codec.fixed_size(),
        }
    }

    pub fn is_encodable(&self) -> bool {
        match self {
            TypeDescriptor::Primitive(p) => p.is_encodable(),
            TypeDescriptor::Bitfield(_) => true,
            TypeDescriptor::Struct(desc) => desc
                .fields()
                .iter()
                .all(|field| field.ty().is_encodable()),
            TypeDescriptor::Custom(codec) => codec.encoder().is_some(),
        }
    }

    pub fn as_struct(&self) -> Option<&Arc<StructDescriptor>> {
        match self {
            TypeDescriptor::Struct(desc) => Some(desc),
            _ => None,
        }
    }

    pub fn as_bitfield(&self) -> Option<BitfieldWidth> {
        match self {
            TypeDescriptor::Bitfield(w) => Some(*w),
            _ => None,
        }
    }
}

impl From<Primitive> for TypeDescriptor {
    fn from(p: Primitive) -> Self {
        TypeDescriptor::Primitive(p)
    }
}

impl From<BitfieldWidth> for TypeDescriptor {
    fn from(w: BitfieldWidth) -> Self {
        TypeDescriptor::Bitfield(w)
    }
}

impl From<Arc<StructDescriptor>> for TypeDescriptor {
    fn from(desc: Arc<StructDescriptor>) -> Self {
        TypeDescriptor::Struct(desc)
    }
}
