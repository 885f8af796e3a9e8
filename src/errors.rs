//! Error types for registration, schema compilation, bitfields and the codec.

use thiserror::Error;

/// Errors produced by the [crate::registry::Registry] itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The name already denotes a primitive or a previously registered type.
    #[error("type `{0}` is already registered")]
    NameConflict(String),
    /// No type is registered under this name.
    #[error("unknown type `{0}`")]
    UnknownType(String),
    /// The name is not a valid identifier.
    #[error("`{0}` is not a valid type name")]
    InvalidName(String),
}

/// Errors produced when building or accessing a bitfield layout or value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitfieldError {
    /// Sum of the sub-field widths exceeds the container width.
    #[error("sub-fields need {total} bits but the container holds {capacity}")]
    WidthOverflow { total: u64, capacity: u32 },
    /// A sub-field was declared with zero bits.
    #[error("sub-field `{0}` has zero width")]
    ZeroWidth(String),
    /// Two sub-fields share a name.
    #[error("duplicate sub-field `{0}`")]
    DuplicateField(String),
    /// No sub-field with this name exists in the layout.
    #[error("unknown sub-field `{0}`")]
    UnknownField(String),
    /// Raw container value does not fit in the container width.
    #[error("raw value {raw:#x} does not fit in {capacity} bits")]
    RawOverflow { raw: u64, capacity: u32 },
}

/// Errors produced when compiling schema text into a [crate::compiled::StructDescriptor].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// Line does not match `<typeExpr> <fieldName>`.
    #[error("line {line}: malformed field declaration `{text}`")]
    MalformedLine { line: usize, text: String },
    /// Field or sub-field name is not an (optionally `#`-prefixed) identifier.
    #[error("line {line}: invalid field name `{name}`")]
    InvalidFieldName { line: usize, name: String },
    /// Array length is not a positive integer literal.
    #[error("line {line}: invalid array length `{text}`")]
    InvalidArrayLength { line: usize, text: String },
    /// Bitfield container width is not 8, 16, 32 or 64, or a sub-field width is not a number.
    #[error("line {line}: invalid bit width `{text}`")]
    InvalidBitWidth { line: usize, text: String },
    /// Field type has no fixed size and cannot take part in struct layout.
    #[error("field `{field}`: type `{type_name}` has no fixed size, use a char array instead")]
    VariableSizeField { field: String, type_name: String },
    /// Array of a zero-sized element type.
    #[error("field `{field}`: array of zero-sized type `{type_name}`")]
    ZeroSizedArray { field: String, type_name: String },
    /// Field or struct size does not fit in `usize`.
    #[error("field `{0}`: struct size overflows")]
    SizeOverflow(String),
    /// Two fields of the same struct share a name.
    #[error("duplicate field `{0}`")]
    DuplicateField(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Bitfield layout of a field is invalid.
    #[error("field `{field}`: {source}")]
    Bitfield {
        field: String,
        #[source]
        source: BitfieldError,
    },
}

/// Errors produced when decoding bytes (e.g. during [crate::codec::read]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// Requested byte range is beyond the end of the buffer.
    #[error("reading {size} bytes at {position} overruns a buffer of {len} bytes")]
    OutOfBounds {
        position: usize,
        size: usize,
        len: usize,
    },
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// The name resolves to a type that is not a struct.
    #[error("type `{0}` is not a struct")]
    NotAStruct(String),
    /// No NUL byte was found before the end of the buffer.
    #[error("string at {position} is not NUL-terminated")]
    UnterminatedString { position: usize },
}

/// Errors produced when encoding values (e.g. during [crate::codec::write]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    /// Buffer is too short to hold the value at the requested position.
    #[error("writing {size} bytes at {position} overruns a buffer of {len} bytes")]
    OutOfBounds {
        position: usize,
        size: usize,
        len: usize,
    },
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// The name resolves to a type that is not a struct.
    #[error("type `{0}` is not a struct")]
    NotAStruct(String),
    /// The record has no value for this field.
    #[error("missing field `{0}`")]
    MissingField(String),
    /// The value variant cannot be encoded as this type.
    #[error("cannot encode {found} as `{type_name}`")]
    TypeMismatch {
        type_name: String,
        found: &'static str,
    },
    /// The value does not fit in the target type.
    #[error("value {value} is out of range for `{type_name}`")]
    ValueOutOfRange { type_name: String, value: String },
    /// An array value has the wrong number of elements.
    #[error("field `{field}` expects {expected} elements, got {found}")]
    ArrayLength {
        field: String,
        expected: usize,
        found: usize,
    },
    /// The type has no encoder.
    #[error("type `{0}` is decode-only")]
    NotEncodable(String),
}

/// Errors produced when moving the cursor of a [crate::stream::StructStream].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeekError {
    /// Target position lies before the start of the buffer.
    #[error("seek to negative position {0}")]
    BeforeStart(i128),
    /// Target position is not representable.
    #[error("seek position overflows")]
    Overflow,
}
