//! Name to codec mapping shared by the schema compiler and the struct codec.

use std::{collections::HashMap, sync::Arc};

use tracing::debug;

use crate::{
    bitfield::BitfieldWidth,
    codec,
    compiled::{self, StructDescriptor},
    descriptor::{TypeCodec, TypeDescriptor},
    endian::Endianness,
    errors::{DefinitionError, ReadError, RegistryError, WriteError},
    primitive::Primitive,
    schema,
    value::Record,
};

/// Insert-only set of named types.
///
/// [Registry::new] seeds the primitive table and the `Bitfield8`..`Bitfield64`
/// containers. Registration needs `&mut self`; once populated, a shared
/// `&Registry` can serve concurrent reads and writes on distinct buffers.
#[derive(Debug, Clone)]
pub struct Registry {
    types: HashMap<String, TypeDescriptor>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        let mut types = HashMap::new();

        for p in Primitive::ALL {
            types.insert(p.name().to_string(), TypeDescriptor::Primitive(p));
        }
        for w in BitfieldWidth::ALL {
            types.insert(w.type_name().to_string(), TypeDescriptor::Bitfield(w));
        }

        Registry { types }
    }

    /// Adds `desc` under its own name.
    pub fn register(&mut self, desc: TypeDescriptor) -> Result<(), RegistryError> {
        let name = desc.name().to_string();

        if self.types.contains_key(&name) {
            return Err(RegistryError::NameConflict(name));
        }
        if !schema::is_identifier(&name) {
            return Err(RegistryError::InvalidName(name));
        }

        debug!(name = %name, size = ?desc.fixed_size(), "registered type");
        self.types.insert(name, desc);

        Ok(())
    }

    /// Registers a user-supplied codec.
    pub fn register_codec(&mut self, codec: Arc<dyn TypeCodec>) -> Result<(), RegistryError> {
        self.register(TypeDescriptor::Custom(codec))
    }

    pub fn lookup(&self, name: &str) -> Result<&TypeDescriptor, RegistryError> {
        self.types
            .get(name)
            .ok_or_else(|| RegistryError::UnknownType(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// See [compiled::compile].
    pub fn compile(
        &mut self,
        text: &str,
        name: &str,
    ) -> Result<Arc<StructDescriptor>, DefinitionError> {
        compiled::compile(self, text, name)
    }

    /// See [codec::read].
    pub fn read(
        &self,
        buf: &[u8],
        position: usize,
        name: &str,
        endian: Endianness,
    ) -> Result<Record, ReadError> {
        codec::read(self, buf, position, name, endian)
    }

    /// See [codec::write].
    pub fn write(
        &self,
        buf: &mut [u8],
        position: usize,
        name: &str,
        record: &Record,
        endian: Endianness,
    ) -> Result<usize, WriteError> {
        codec::write(self, buf, position, name, record, endian)
    }
}
