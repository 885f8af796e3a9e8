//! Bit-packed sub-fields inside a fixed-width unsigned container.
//!
//! A [BitfieldLayout] is the ordered `(name, width, offset)` table built once
//! from a schema; a [BitfieldValue] pairs a raw container value with a layout
//! and offers indexed `get`/`set` over it.

use std::{collections::HashMap, sync::Arc};

use crate::{
    bits,
    endian::Endianness,
    errors::{BitfieldError, ReadError, WriteError},
    primitive::window,
    value::Value,
};

/// Prefix marking a sub-field (or struct field) as reserved, e.g. padding.
pub const RESERVED_MARKER: char = '#';

/// Returns true if `name` carries the [RESERVED_MARKER].
pub fn is_reserved(name: &str) -> bool {
    name.starts_with(RESERVED_MARKER)
}

/// Width of a bitfield container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitfieldWidth {
    W8,
    W16,
    W32,
    W64,
}

impl BitfieldWidth {
    pub const ALL: [BitfieldWidth; 4] = [
        BitfieldWidth::W8,
        BitfieldWidth::W16,
        BitfieldWidth::W32,
        BitfieldWidth::W64,
    ];

    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            8 => Some(BitfieldWidth::W8),
            16 => Some(BitfieldWidth::W16),
            32 => Some(BitfieldWidth::W32),
            64 => Some(BitfieldWidth::W64),
            _ => None,
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            BitfieldWidth::W8 => 8,
            BitfieldWidth::W16 => 16,
            BitfieldWidth::W32 => 32,
            BitfieldWidth::W64 => 64,
        }
    }

    pub fn bytes(self) -> usize {
        self.bits() as usize / 8
    }

    /// Registry name of the container, e.g. `Bitfield16`.
    pub fn type_name(self) -> &'static str {
        match self {
            BitfieldWidth::W8 => "Bitfield8",
            BitfieldWidth::W16 => "Bitfield16",
            BitfieldWidth::W32 => "Bitfield32",
            BitfieldWidth::W64 => "Bitfield64",
        }
    }

    /// Reads the container's unsigned integer at `offset`.
    pub fn decode_raw(
        self,
        buf: &[u8],
        offset: usize,
        endian: Endianness,
    ) -> Result<u64, ReadError> {
        let bytes = window(buf, offset, self.bytes())?;
        Ok(endian.read_uint(bytes, self.bytes()))
    }

    /// Reads the container at `offset` and pairs it with `layout`.
    pub fn decode(
        self,
        buf: &[u8],
        offset: usize,
        layout: &Arc<BitfieldLayout>,
        endian: Endianness,
    ) -> Result<(Value, usize), ReadError> {
        let raw = self.decode_raw(buf, offset, endian)?;
        let value = BitfieldValue {
            raw,
            layout: Arc::clone(layout),
        };

        Ok((Value::Bitfield(value), self.bytes()))
    }

    /// Writes the raw container of a [Value::Bitfield], or a plain [Value::U64] that fits.
    pub fn encode(
        self,
        buf: &mut [u8],
        offset: usize,
        value: &Value,
        endian: Endianness,
    ) -> Result<usize, WriteError> {
        let raw = match value {
            Value::Bitfield(v) if v.width() == self => v.raw(),
            Value::U64(raw) if *raw <= bits::mask(self.bits()) => *raw,
            Value::U64(raw) => {
                return Err(WriteError::ValueOutOfRange {
                    type_name: self.type_name().to_string(),
                    value: raw.to_string(),
                });
            }
            other => {
                return Err(WriteError::TypeMismatch {
                    type_name: self.type_name().to_string(),
                    found: other.kind(),
                });
            }
        };

        let size = self.bytes();
        let len = buf.len();
        let bytes = buf
            .get_mut(offset..offset.saturating_add(size))
            .ok_or(WriteError::OutOfBounds {
                position: offset,
                size,
                len,
            })?;
        endian.write_uint(bytes, size, raw);

        Ok(size)
    }
}

/// One named span of a [BitfieldLayout].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitfieldSpan {
    pub name: String,
    pub width: u32,
    /// Distance from the container's most significant bit.
    pub offset: u32,
}

impl BitfieldSpan {
    pub fn is_reserved(&self) -> bool {
        is_reserved(&self.name)
    }
}

/// Ordered, validated sub-field table of a bitfield container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitfieldLayout {
    width: BitfieldWidth,
    spans: Vec<BitfieldSpan>,
    index: HashMap<String, usize>,
}

impl BitfieldLayout {
    /// Builds a layout, packing `fields` MSB-first in the given order.
    pub fn new<S, I>(width: BitfieldWidth, fields: I) -> Result<Self, BitfieldError>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, u32)>,
    {
        let mut spans = Vec::new();
        let mut index = HashMap::new();
        let mut total = 0u64;

        for (name, bits) in fields {
            let name = name.into();

            if bits == 0 {
                return Err(BitfieldError::ZeroWidth(name));
            }
            if index.contains_key(&name) {
                return Err(BitfieldError::DuplicateField(name));
            }

            index.insert(name.clone(), spans.len());
            spans.push(BitfieldSpan {
                name,
                width: bits,
                offset: total.min(u32::MAX as u64) as u32,
            });
            total += bits as u64;
        }

        if total > width.bits() as u64 {
            return Err(BitfieldError::WidthOverflow {
                total,
                capacity: width.bits(),
            });
        }

        Ok(BitfieldLayout {
            width,
            spans,
            index,
        })
    }

    /// Layout with no sub-fields, used for bare container fields.
    pub fn empty(width: BitfieldWidth) -> Self {
        BitfieldLayout {
            width,
            spans: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn width(&self) -> BitfieldWidth {
        self.width
    }

    pub fn spans(&self) -> &[BitfieldSpan] {
        &self.spans
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn span(&self, name: &str) -> Option<&BitfieldSpan> {
        self.position(name).map(|i| &self.spans[i])
    }

    /// Total bits claimed by sub-fields.
    pub fn used_bits(&self) -> u32 {
        self.spans.iter().map(|s| s.width).sum()
    }
}

/// External representation of one sub-field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum Projection {
    /// One-bit sub-field.
    Flag(bool),
    /// Wider sub-field as `0b` plus zero-padded binary digits.
    Bits(String),
}

/// Raw container value interpreted through a [BitfieldLayout].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitfieldValue {
    raw: u64,
    layout: Arc<BitfieldLayout>,
}

impl BitfieldValue {
    /// Pairs `raw` with `layout`. Fails if `raw` does not fit the container.
    pub fn new(raw: u64, layout: Arc<BitfieldLayout>) -> Result<Self, BitfieldError> {
        let capacity = layout.width.bits();
        if raw > bits::mask(capacity) {
            return Err(BitfieldError::RawOverflow { raw, capacity });
        }

        Ok(BitfieldValue { raw, layout })
    }

    /// Builds the layout and the value in one step.
    pub fn with_fields<S, I>(width: BitfieldWidth, raw: u64, fields: I) -> Result<Self, BitfieldError>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, u32)>,
    {
        let layout = BitfieldLayout::new(width, fields)?;
        Self::new(raw, Arc::new(layout))
    }

    pub fn raw(&self) -> u64 {
        self.raw
    }

    pub fn width(&self) -> BitfieldWidth {
        self.layout.width
    }

    pub fn layout(&self) -> &Arc<BitfieldLayout> {
        &self.layout
    }

    pub fn get(&self, name: &str) -> Result<u64, BitfieldError> {
        let i = self.index_of(name)?;
        Ok(self.get_at(i))
    }

    /// Replaces the span of `name`. Bits of `value` above the span width are dropped.
    pub fn set(&mut self, name: &str, value: u64) -> Result<(), BitfieldError> {
        let i = self.index_of(name)?;
        self.set_at(i, value);
        Ok(())
    }

    /// # Panics
    ///
    /// If `index` is not below the number of spans.
    pub fn get_at(&self, index: usize) -> u64 {
        let span = &self.layout.spans[index];
        bits::extract(self.raw, self.layout.width.bits(), span.offset, span.width)
    }

    /// # Panics
    ///
    /// If `index` is not below the number of spans.
    pub fn set_at(&mut self, index: usize, value: u64) {
        let span = &self.layout.spans[index];
        self.raw = bits::insert(
            self.raw,
            self.layout.width.bits(),
            span.offset,
            span.width,
            value,
        );
    }

    /// Non-reserved sub-fields in declaration order.
    pub fn project(&self) -> Vec<(&str, Projection)> {
        self.layout
            .spans
            .iter()
            .enumerate()
            .filter(|(_, span)| !span.is_reserved())
            .map(|(i, span)| {
                let v = self.get_at(i);
                let projected = if span.width == 1 {
                    Projection::Flag(v == 1)
                } else {
                    Projection::Bits(bits::to_binary_string(v, span.width))
                };
                (span.name.as_str(), projected)
            })
            .collect()
    }

    fn index_of(&self, name: &str) -> Result<usize, BitfieldError> {
        self.layout
            .position(name)
            .ok_or_else(|| BitfieldError::UnknownField(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BitfieldValue {
        BitfieldValue::with_fields(
            BitfieldWidth::W16,
            0b1010_0111_0000_0000,
            [("flagA", 1), ("flagB", 3), ("fieldC", 4)],
        )
        .unwrap()
    }

    #[test]
    fn test_offsets_are_prefix_sums() {
        let value = sample();
        let offsets: Vec<u32> = value.layout().spans().iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0, 1, 4]);
        assert_eq!(value.layout().used_bits(), 8);
    }

    #[test]
    fn test_get() {
        let value = sample();
        assert_eq!(value.get("flagA").unwrap(), 1);
        assert_eq!(value.get("flagB").unwrap(), 0b010);
        assert_eq!(value.get("fieldC").unwrap(), 0b0111);
    }

    #[test]
    fn test_set_isolates_span() {
        let mut value = sample();
        value.set("flagB", 0b101).unwrap();

        assert_eq!(value.get("flagB").unwrap(), 0b101);
        assert_eq!(value.get("flagA").unwrap(), 1);
        assert_eq!(value.get("fieldC").unwrap(), 0b0111);
        assert_eq!(value.raw(), 0b1101_0111_0000_0000);
    }

    #[test]
    fn test_set_truncates() {
        let mut value = sample();
        value.set("flagB", 0b1_1000).unwrap();
        assert_eq!(value.get("flagB").unwrap(), 0);
        assert_eq!(value.get("fieldC").unwrap(), 0b0111);
    }

    #[test]
    fn test_unknown_field() {
        let mut value = sample();
        assert_eq!(
            value.get("nope").unwrap_err(),
            BitfieldError::UnknownField("nope".to_string())
        );
        assert!(value.set("nope", 1).is_err());
    }

    #[test]
    fn test_width_overflow() {
        let err = BitfieldLayout::new(BitfieldWidth::W8, [("a", 4), ("b", 5)]).unwrap_err();
        assert_eq!(
            err,
            BitfieldError::WidthOverflow {
                total: 9,
                capacity: 8
            }
        );
    }

    #[test]
    fn test_exact_fit_full_width() {
        let mut value =
            BitfieldValue::with_fields(BitfieldWidth::W64, 0, [("all", 64)]).unwrap();
        value.set("all", u64::MAX).unwrap();
        assert_eq!(value.get("all").unwrap(), u64::MAX);
    }

    #[test]
    fn test_zero_width_and_duplicates() {
        assert_eq!(
            BitfieldLayout::new(BitfieldWidth::W8, [("a", 0)]).unwrap_err(),
            BitfieldError::ZeroWidth("a".to_string())
        );
        assert_eq!(
            BitfieldLayout::new(BitfieldWidth::W8, [("a", 1), ("a", 2)]).unwrap_err(),
            BitfieldError::DuplicateField("a".to_string())
        );
    }

    #[test]
    fn test_raw_overflow() {
        let layout = Arc::new(BitfieldLayout::empty(BitfieldWidth::W8));
        assert_eq!(
            BitfieldValue::new(0x100, layout).unwrap_err(),
            BitfieldError::RawOverflow {
                raw: 0x100,
                capacity: 8
            }
        );
    }

    #[test]
    fn test_project_skips_reserved() {
        let value = BitfieldValue::with_fields(
            BitfieldWidth::W8,
            0b1011_0110,
            [("on", 1), ("#pad", 3), ("mode", 4)],
        )
        .unwrap();

        assert_eq!(
            value.project(),
            vec![
                ("on", Projection::Flag(true)),
                ("mode", Projection::Bits("0b0110".to_string())),
            ]
        );
        assert_eq!(value.get("#pad").unwrap(), 0b011);
    }

    #[test]
    fn test_container_decode_encode() {
        let layout = Arc::new(
            BitfieldLayout::new(BitfieldWidth::W16, [("hi", 8), ("lo", 8)]).unwrap(),
        );
        let data = [0x12, 0x34];

        let (value, used) = BitfieldWidth::W16
            .decode(&data, 0, &layout, Endianness::Big)
            .unwrap();
        assert_eq!(used, 2);
        let bits = value.as_bitfield().unwrap();
        assert_eq!(bits.get("hi").unwrap(), 0x12);
        assert_eq!(bits.get("lo").unwrap(), 0x34);

        let mut out = [0u8; 2];
        BitfieldWidth::W16
            .encode(&mut out, 0, &value, Endianness::Little)
            .unwrap();
        assert_eq!(out, [0x34, 0x12]);
    }

    #[test]
    fn test_container_encode_rejects_other_width() {
        let value = Value::Bitfield(sample());
        let mut out = [0u8; 4];
        assert!(matches!(
            BitfieldWidth::W32.encode(&mut out, 0, &value, Endianness::Little),
            Err(WriteError::TypeMismatch { .. })
        ));
    }
}
