//! Low-level helpers for MSB-first spans inside a fixed-width container.
//!
//! Bit offset 0 is the most significant bit of the container, so a span at
//! `offset` with `len` bits sits `capacity - offset - len` bits above the LSB.

/// Mask of the low `len` bits. `len` may be 64.
pub fn mask(len: u32) -> u64 {
    if len >= 64 { u64::MAX } else { (1u64 << len) - 1 }
}

/// Right shift that moves the span at `offset..offset + len` down to bit 0.
pub fn shift(capacity: u32, offset: u32, len: u32) -> u32 {
    capacity - offset - len
}

/// Reads the span at `offset` with `len` bits from `raw`.
pub fn extract(raw: u64, capacity: u32, offset: u32, len: u32) -> u64 {
    (raw >> shift(capacity, offset, len)) & mask(len)
}

/// Replaces the span at `offset` with `len` bits in `raw` by `value`, truncating `value` to `len` bits.
pub fn insert(raw: u64, capacity: u32, offset: u32, len: u32, value: u64) -> u64 {
    let shift = shift(capacity, offset, len);
    let span = mask(len) << shift;

    (raw & !span) | ((value << shift) & span)
}

/// Renders the low `len` bits of `value` as `0b` followed by exactly `len` binary digits.
pub fn to_binary_string(value: u64, len: u32) -> String {
    format!("0b{:0width$b}", value & mask(len), width = len as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask() {
        assert_eq!(mask(0), 0);
        assert_eq!(mask(3), 0b111);
        assert_eq!(mask(64), u64::MAX);
    }

    #[test]
    fn test_extract_msb_first() {
        let raw = 0b1010_0111_0000_0000;
        assert_eq!(extract(raw, 16, 0, 1), 1);
        assert_eq!(extract(raw, 16, 1, 3), 0b010);
        assert_eq!(extract(raw, 16, 4, 4), 0b0111);
    }

    #[test]
    fn test_extract_full_width() {
        assert_eq!(extract(u64::MAX, 64, 0, 64), u64::MAX);
    }

    #[test]
    fn test_insert_leaves_other_bits() {
        let raw = 0b1111_1111;
        assert_eq!(insert(raw, 8, 2, 3, 0), 0b1100_0111);
        assert_eq!(insert(0, 8, 2, 3, 0b1111), 0b0011_1000);
    }

    #[test]
    fn test_to_binary_string() {
        assert_eq!(to_binary_string(2, 3), "0b010");
        assert_eq!(to_binary_string(7, 4), "0b0111");
        assert_eq!(to_binary_string(0xFF, 2), "0b11");
    }
}
