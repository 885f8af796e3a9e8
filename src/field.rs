//! Field descriptors: one member of a compiled struct.

use std::sync::Arc;

use crate::{bitfield::BitfieldLayout, descriptor::TypeDescriptor};

/// A single named member of a [crate::compiled::StructDescriptor].
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    type_name: String,
    ty: TypeDescriptor,
    array_len: usize,
    bitfield: Option<Arc<BitfieldLayout>>,
}

impl FieldDescriptor {
    /// Builds a field. `array_len` of 0 is raised to 1; bitfield containers
    /// without a layout get an empty one.
    pub(crate) fn new(
        name: String,
        ty: TypeDescriptor,
        array_len: usize,
        bitfield: Option<Arc<BitfieldLayout>>,
    ) -> Self {
        let bitfield = match (ty.as_bitfield(), bitfield) {
            (Some(width), None) => Some(Arc::new(BitfieldLayout::empty(width))),
            (_, layout) => layout,
        };

        FieldDescriptor {
            name,
            type_name: ty.name().to_string(),
            ty,
            array_len: array_len.max(1),
            bitfield,
        }
    }

    /// Name used as the key in decoded records.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the referenced type as written in the schema.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Type resolved from the registry at compile time.
    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    /// Number of elements; 1 means a scalar field.
    pub fn array_len(&self) -> usize {
        self.array_len
    }

    pub fn is_array(&self) -> bool {
        self.array_len > 1
    }

    /// Sub-field layout, present exactly when the type is a bitfield container.
    pub fn bitfield(&self) -> Option<&Arc<BitfieldLayout>> {
        self.bitfield.as_ref()
    }

    /// Bytes of one element.
    pub fn element_size(&self) -> usize {
        self.ty.fixed_size().unwrap_or(0)
    }

    /// Bytes of the whole field, `None` if the product overflows `usize`.
    pub fn size(&self) -> Option<usize> {
        self.element_size().checked_mul(self.array_len)
    }
}
