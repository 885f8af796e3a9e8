//! Recursive struct codec.
//!
//! Fields are visited in declaration order with a running cursor. The same
//! order drives [read] and [write], so a decoded [Record] written back with
//! the same endianness reproduces the source bytes.
//!
//! ## Partial writes
//!
//! [write] checks bounds and encodability for the whole struct before the
//! first byte is written. Failures detected later (a missing field, a value
//! of the wrong shape, a custom encoder error) stop the write where they
//! occur, leaving the fields before them already written.

use std::sync::Arc;

use tracing::trace;

use crate::{
    bitfield::BitfieldLayout,
    compiled::StructDescriptor,
    descriptor::TypeDescriptor,
    endian::Endianness,
    errors::{ReadError, WriteError},
    registry::Registry,
    value::{Record, Value},
};

/// Decodes the struct `name` from `buf` starting at `position`.
pub fn read(
    registry: &Registry,
    buf: &[u8],
    position: usize,
    name: &str,
    endian: Endianness,
) -> Result<Record, ReadError> {
    let desc = registry
        .lookup(name)?
        .as_struct()
        .ok_or_else(|| ReadError::NotAStruct(name.to_string()))?;

    if position
        .checked_add(desc.size())
        .is_none_or(|end| end > buf.len())
    {
        return Err(ReadError::OutOfBounds {
            position,
            size: desc.size(),
            len: buf.len(),
        });
    }

    trace!(name, position, ?endian, "read struct");
    let (record, _) = read_struct(desc, buf, position, endian)?;

    Ok(record)
}

/// Encodes `record` as the struct `name` into `buf` at `position`. Returns the bytes written.
pub fn write(
    registry: &Registry,
    buf: &mut [u8],
    position: usize,
    name: &str,
    record: &Record,
    endian: Endianness,
) -> Result<usize, WriteError> {
    let desc = registry
        .lookup(name)?
        .as_struct()
        .ok_or_else(|| WriteError::NotAStruct(name.to_string()))?;

    if position
        .checked_add(desc.size())
        .is_none_or(|end| end > buf.len())
    {
        return Err(WriteError::OutOfBounds {
            position,
            size: desc.size(),
            len: buf.len(),
        });
    }

    if let Some(type_name) = first_decode_only(desc) {
        return Err(WriteError::NotEncodable(type_name));
    }

    trace!(name, position, ?endian, "write struct");
    write_struct(desc, buf, position, record, endian)
}

/// Decodes the fields of `desc` at `offset`. Returns the record and bytes consumed.
pub fn read_struct(
    desc: &StructDescriptor,
    buf: &[u8],
    offset: usize,
    endian: Endianness,
) -> Result<(Record, usize), ReadError> {
    let mut record = Record::with_capacity(desc.fields().len());
    let mut cursor = offset;

    for field in desc.fields() {
        let layout = field.bitfield();

        let value = if field.is_array() {
            let mut values = Vec::with_capacity(field.array_len().min(buf.len()));
            for _ in 0..field.array_len() {
                let (value, used) = decode_value(field.ty(), layout, buf, cursor, endian)?;
                values.push(value);
                cursor += used;
            }
            Value::Array(values)
        } else {
            let (value, used) = decode_value(field.ty(), layout, buf, cursor, endian)?;
            cursor += used;
            value
        };

        record.insert(field.name(), value);
    }

    Ok((record, cursor - offset))
}

/// Encodes `record` field by field at `offset`. Returns the bytes written.
pub fn write_struct(
    desc: &StructDescriptor,
    buf: &mut [u8],
    offset: usize,
    record: &Record,
    endian: Endianness,
) -> Result<usize, WriteError> {
    let mut cursor = offset;

    for field in desc.fields() {
        let value = record
            .get(field.name())
            .ok_or_else(|| WriteError::MissingField(field.name().to_string()))?;

        if field.is_array() {
            let values = value.as_array().ok_or_else(|| WriteError::TypeMismatch {
                type_name: format!("{}[{}]", field.type_name(), field.array_len()),
                found: value.kind(),
            })?;

            if values.len() != field.array_len() {
                return Err(WriteError::ArrayLength {
                    field: field.name().to_string(),
                    expected: field.array_len(),
                    found: values.len(),
                });
            }

            for element in values {
                cursor += encode_value(field.ty(), buf, cursor, element, endian)?;
            }
        } else {
            cursor += encode_value(field.ty(), buf, cursor, value, endian)?;
        }
    }

    Ok(cursor - offset)
}

/// Decodes one value of type `ty`. `layout` is used only by bitfield containers.
pub fn decode_value(
    ty: &TypeDescriptor,
    layout: Option<&Arc<BitfieldLayout>>,
    buf: &[u8],
    offset: usize,
    endian: Endianness,
) -> Result<(Value, usize), ReadError> {
    match ty {
        TypeDescriptor::Primitive(p) => p.decode(buf, offset, endian),
        TypeDescriptor::Bitfield(width) => match layout {
            Some(layout) => width.decode(buf, offset, layout, endian),
            None => width.decode(buf, offset, &Arc::new(BitfieldLayout::empty(*width)), endian),
        },
        TypeDescriptor::Struct(desc) => {
            let (record, used) = read_struct(desc, buf, offset, endian)?;
            Ok((Value::Struct(record), used))
        }
        TypeDescriptor::Custom(codec) => codec.decode(buf, offset, endian),
    }
}

/// Encodes one value of type `ty`. Returns the bytes written.
pub fn encode_value(
    ty: &TypeDescriptor,
    buf: &mut [u8],
    offset: usize,
    value: &Value,
    endian: Endianness,
) -> Result<usize, WriteError> {
    match ty {
        TypeDescriptor::Primitive(p) => p.encode(buf, offset, value, endian),
        TypeDescriptor::Bitfield(width) => width.encode(buf, offset, value, endian),
        TypeDescriptor::Struct(desc) => match value {
            Value::Struct(record) => write_struct(desc, buf, offset, record, endian),
            other => Err(WriteError::TypeMismatch {
                type_name: desc.name().to_string(),
                found: other.kind(),
            }),
        },
        TypeDescriptor::Custom(codec) => codec
            .encoder()
            .ok_or_else(|| WriteError::NotEncodable(codec.name().to_string()))?
            .encode(buf, offset, value, endian),
    }
}

/// Name of the first type reachable from `desc` that has no encoder.
fn first_decode_only(desc: &StructDescriptor) -> Option<String> {
    desc.fields().iter().find_map(|field| match field.ty() {
        TypeDescriptor::Struct(nested) => first_decode_only(nested),
        ty if !ty.is_encodable() => Some(ty.name().to_string()),
        _ => None,
    })
}
