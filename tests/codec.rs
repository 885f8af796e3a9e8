use structcraft::{
    DefinitionError, Endianness, Projection, Record, Registry, RegistryError, Value, WriteError,
};

const HEADER: &str = "u16 field1\nu8 field2\nBitfield16{flagA:1, flagB:3, fieldC:4} field3";

#[test]
fn decodes_header_scenario() {
    let mut registry = Registry::new();
    registry.compile(HEADER, "Header").unwrap();

    let raw: u16 = 0b1010_0111_0000_0000;
    let mut data = vec![42, 0, 7];
    data.extend_from_slice(&raw.to_le_bytes());

    let record = registry.read(&data, 0, "Header", Endianness::Little).unwrap();

    assert_eq!(record.get("field1"), Some(&Value::U64(42)));
    assert_eq!(record.get("field2"), Some(&Value::U64(7)));
    let field3 = record.get("field3").and_then(Value::as_bitfield).unwrap();
    assert_eq!(
        field3.project(),
        vec![
            ("flagA", Projection::Flag(true)),
            ("flagB", Projection::Bits("0b010".to_string())),
            ("fieldC", Projection::Bits("0b0111".to_string())),
        ]
    );
}

#[test]
fn unknown_type_leaves_registry_unchanged() {
    let mut registry = Registry::new();
    let before: Vec<String> = {
        let mut names: Vec<String> = registry.names().map(str::to_string).collect();
        names.sort();
        names
    };

    let err = registry
        .compile("u8 ok\nBitfield16{a:1} bits\nMystery m", "Attempt")
        .unwrap_err();
    assert_eq!(
        err,
        DefinitionError::Registry(RegistryError::UnknownType("Mystery".to_string()))
    );

    let mut after: Vec<String> = registry.names().map(str::to_string).collect();
    after.sort();
    assert_eq!(before, after);
}

#[test]
fn duplicate_struct_name_keeps_first() {
    let mut registry = Registry::new();
    registry.compile("u32 a", "Thing").unwrap();

    assert_eq!(
        registry.compile("u8 b", "Thing").unwrap_err(),
        DefinitionError::Registry(RegistryError::NameConflict("Thing".to_string()))
    );

    let thing = registry.lookup("Thing").unwrap().as_struct().unwrap();
    assert_eq!(thing.size(), 4);
    assert!(thing.field("a").is_some());
}

#[test]
fn out_of_bounds_write_touches_nothing() {
    let mut registry = Registry::new();
    registry.compile(HEADER, "Header").unwrap();

    let record = registry
        .read(&[1, 2, 3, 4, 5], 0, "Header", Endianness::Big)
        .unwrap();

    for position in [1usize, 3, 100, usize::MAX] {
        let mut buf = [0x5Au8; 5];
        let err = registry
            .write(&mut buf, position, "Header", &record, Endianness::Big)
            .unwrap_err();
        assert!(matches!(err, WriteError::OutOfBounds { .. }), "{position}");
        assert_eq!(buf, [0x5A; 5]);
    }
}

#[test]
fn nested_values_can_be_edited_and_written() {
    let mut registry = Registry::new();
    registry.compile(HEADER, "Header").unwrap();
    registry
        .compile("Header header\nbool valid\ndouble[2] xy", "Frame")
        .unwrap();

    let mut data = vec![0u8; 25];
    data[5..9].copy_from_slice(&1u32.to_be_bytes());
    data[9..17].copy_from_slice(&1.5f64.to_be_bytes());
    data[17..25].copy_from_slice(&(-2.25f64).to_be_bytes());

    let mut record = registry.read(&data, 0, "Frame", Endianness::Big).unwrap();
    assert_eq!(record.get("valid"), Some(&Value::Bool(true)));
    assert_eq!(
        record.get("xy"),
        Some(&Value::Array(vec![Value::F64(1.5), Value::F64(-2.25)]))
    );

    let Some(Value::Struct(header)) = record.get_mut("header") else {
        panic!("header is not a struct");
    };
    header.insert("field1", 0xCAFEu64);
    header
        .get_mut("field3")
        .and_then(Value::as_bitfield_mut)
        .unwrap()
        .set("flagB", 0b111)
        .unwrap();

    let mut out = vec![0u8; 25];
    registry
        .write(&mut out, 0, "Frame", &record, Endianness::Big)
        .unwrap();

    assert_eq!(&out[..5], &[0xCA, 0xFE, 0, 0b0111_0000, 0]);
    assert_eq!(&out[5..], &data[5..]);
}

#[test]
fn concurrent_readers_share_registry() {
    let mut registry = Registry::new();
    registry.compile(HEADER, "Header").unwrap();
    let registry = &registry;

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0u8..4)
            .map(|i| {
                scope.spawn(move || {
                    let data = [i, 0, i, 0, 0];
                    let record = registry
                        .read(&data, 0, "Header", Endianness::Little)
                        .unwrap();
                    let mut out = [0u8; 5];
                    registry
                        .write(&mut out, 0, "Header", &record, Endianness::Little)
                        .unwrap();
                    out == data
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    });
}

#[test]
fn record_built_by_hand_round_trips() {
    let mut registry = Registry::new();
    registry.compile("char[4] magic\ns32 offset", "Chunk").unwrap();

    let record = Record::new()
        .with(
            "magic",
            "RIFF".chars().map(Value::Char).collect::<Vec<_>>(),
        )
        .with("offset", -8i64);

    let mut out = [0u8; 8];
    let written = registry
        .write(&mut out, 0, "Chunk", &record, Endianness::Little)
        .unwrap();

    assert_eq!(written, 8);
    assert_eq!(&out, b"RIFF\xF8\xFF\xFF\xFF");
    assert_eq!(
        registry.read(&out, 0, "Chunk", Endianness::Little).unwrap(),
        record
    );
}
