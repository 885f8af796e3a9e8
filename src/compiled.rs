//! Compiled struct descriptors and the schema compiler.

use std::{collections::HashMap, sync::Arc};

use tracing::debug;

use crate::{
    bitfield::BitfieldLayout,
    descriptor::TypeDescriptor,
    errors::{DefinitionError, RegistryError},
    field::FieldDescriptor,
    registry::Registry,
    schema::{self, TypeExpr},
};

/// Named, ordered, immutable list of fields with a fixed total size.
#[derive(Debug)]
pub struct StructDescriptor {
    name: String,
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
    size: usize,
}

impl StructDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order; this order drives both read and write.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index.get(name).map(|i| &self.fields[*i])
    }

    /// Sum of `element size * array length` over all fields.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Byte offset of `name` from the start of the struct.
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        let i = *self.index.get(name)?;
        Some(self.fields[..i].iter().filter_map(FieldDescriptor::size).sum())
    }
}

/// Compiles `text` into a struct named `name` and registers it in `registry`.
///
/// Nothing is registered unless every line parses and every referenced type
/// resolves.
pub fn compile(
    registry: &mut Registry,
    text: &str,
    name: &str,
) -> Result<Arc<StructDescriptor>, DefinitionError> {
    if registry.contains(name) {
        return Err(RegistryError::NameConflict(name.to_string()).into());
    }
    if !schema::is_identifier(name) {
        return Err(RegistryError::InvalidName(name.to_string()).into());
    }

    let decls = schema::parse(text)?;
    let mut fields = Vec::with_capacity(decls.len());
    let mut index = HashMap::with_capacity(decls.len());
    let mut size = 0usize;

    for decl in decls {
        let ty = registry.lookup(decl.ty.type_name())?.clone();

        if ty.fixed_size().is_none() {
            return Err(DefinitionError::VariableSizeField {
                field: decl.name,
                type_name: ty.name().to_string(),
            });
        }

        let layout = match &decl.ty {
            TypeExpr::Bitfield {
                width,
                fields: sub_fields,
            } => {
                let layout = BitfieldLayout::new(*width, sub_fields.iter().cloned()).map_err(
                    |source| DefinitionError::Bitfield {
                        field: decl.name.clone(),
                        source,
                    },
                )?;
                Some(Arc::new(layout))
            }
            _ => None,
        };

        if index.contains_key(&decl.name) {
            return Err(DefinitionError::DuplicateField(decl.name));
        }

        let field = FieldDescriptor::new(decl.name, ty, decl.ty.array_len(), layout);

        if field.is_array() && field.element_size() == 0 {
            return Err(DefinitionError::ZeroSizedArray {
                field: field.name().to_string(),
                type_name: field.type_name().to_string(),
            });
        }

        size = field
            .size()
            .and_then(|field_size| size.checked_add(field_size))
            .ok_or_else(|| DefinitionError::SizeOverflow(field.name().to_string()))?;
        index.insert(field.name().to_string(), fields.len());
        fields.push(field);
    }

    let desc = Arc::new(StructDescriptor {
        name: name.to_string(),
        fields,
        index,
        size,
    });

    registry.register(TypeDescriptor::Struct(Arc::clone(&desc)))?;
    debug!(
        name,
        fields = desc.fields.len(),
        size = desc.size,
        "compiled struct"
    );

    Ok(desc)
}
