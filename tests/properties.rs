use proptest::prelude::*;
use structcraft::{
    BitfieldError, BitfieldLayout, BitfieldValue, BitfieldWidth, Endianness, Registry,
};

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .compile(
            "s16 a\nBitfield8{x:3, #r:2, y:3} b\nchar c\nu16[2] pair",
            "Inner",
        )
        .unwrap();
    registry
        .compile(
            "u8 tag
             Inner[3] inners
             u32 count
             float f
             double d
             s64 big
             u64 ubig
             s8 small
             s32 mid
             Bitfield32{p:7, q:25} bits
             Bitfield64 raw
             Bitfield16{#hi:4, lo:12} half
             char[5] label",
            "Outer",
        )
        .unwrap();
    registry
}

fn endianness() -> impl Strategy<Value = Endianness> {
    prop_oneof![Just(Endianness::Little), Just(Endianness::Big)]
}

fn width() -> impl Strategy<Value = BitfieldWidth> {
    prop_oneof![
        Just(BitfieldWidth::W8),
        Just(BitfieldWidth::W16),
        Just(BitfieldWidth::W32),
        Just(BitfieldWidth::W64),
    ]
}

proptest! {
    #[test]
    fn read_then_write_reproduces_bytes(
        data in proptest::collection::vec(any::<u8>(), 256),
        position in 0usize..64,
        endian in endianness(),
    ) {
        let registry = registry();
        let size = registry.lookup("Outer").unwrap().fixed_size().unwrap();
        prop_assert!(position + size <= data.len());

        let record = registry.read(&data, position, "Outer", endian).unwrap();

        let mut out = vec![0u8; data.len()];
        let written = registry.write(&mut out, position, "Outer", &record, endian).unwrap();

        prop_assert_eq!(written, size);
        prop_assert_eq!(&out[position..position + size], &data[position..position + size]);
        prop_assert!(out[..position].iter().all(|b| *b == 0));
        prop_assert!(out[position + size..].iter().all(|b| *b == 0));
    }

    #[test]
    fn set_touches_only_its_span(
        widths in proptest::collection::vec(1u32..=8, 1..8),
        raw in any::<u64>(),
        target in any::<prop::sample::Index>(),
        value in any::<u64>(),
    ) {
        let fields: Vec<(String, u32)> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| (format!("f{i}"), *w))
            .collect();
        let mut bits = BitfieldValue::with_fields(BitfieldWidth::W64, raw, fields.clone()).unwrap();

        let i = target.index(fields.len());
        let before: Vec<u64> = (0..fields.len()).map(|j| bits.get_at(j)).collect();

        bits.set(&fields[i].0, value).unwrap();

        let mask = if fields[i].1 >= 64 { u64::MAX } else { (1u64 << fields[i].1) - 1 };
        prop_assert_eq!(bits.get(&fields[i].0).unwrap(), value & mask);
        for j in (0..fields.len()).filter(|j| *j != i) {
            prop_assert_eq!(bits.get_at(j), before[j]);
        }

        let used: u32 = widths.iter().sum();
        let unused_mask = if used >= 64 { 0 } else { u64::MAX >> used };
        prop_assert_eq!(bits.raw() & unused_mask, raw & unused_mask);
    }

    #[test]
    fn oversized_layouts_always_fail(
        container in width(),
        extra in 1u32..16,
        split in 1u32..8,
    ) {
        let total = container.bits() + extra;
        let first = split.min(total - 1);
        let result = BitfieldLayout::new(container, [("a", first), ("b", total - first)]);

        prop_assert_eq!(
            result.unwrap_err(),
            BitfieldError::WidthOverflow { total: total as u64, capacity: container.bits() }
        );
    }
}
