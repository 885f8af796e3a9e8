//! Line-oriented schema text: one `<typeExpr> <fieldName>` declaration per line.
//!
//! ```text
//! u16 id
//! char[8] label
//! Bitfield16{enabled:1, #pad:3, mode:4} flags
//! ```
//!
//! Parsing here is purely syntactic; type names are resolved by
//! [crate::compiled::compile].

use crate::{bitfield::BitfieldWidth, errors::DefinitionError};

/// The type part of a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `TypeName`
    Named(String),
    /// `TypeName[N]`
    Array { name: String, len: usize },
    /// `BitfieldW{a:1, b:3}`, sub-fields in packing order.
    Bitfield {
        width: BitfieldWidth,
        fields: Vec<(String, u32)>,
    },
}

impl TypeExpr {
    /// Registry name this expression refers to.
    pub fn type_name(&self) -> &str {
        match self {
            TypeExpr::Named(name) | TypeExpr::Array { name, .. } => name,
            TypeExpr::Bitfield { width, .. } => width.type_name(),
        }
    }

    pub fn array_len(&self) -> usize {
        match self {
            TypeExpr::Array { len, .. } => *len,
            _ => 1,
        }
    }
}

/// One parsed schema line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// 1-based line number in the source text.
    pub line: usize,
    pub ty: TypeExpr,
    pub name: String,
}

/// Parses schema text into declarations, skipping blank lines and `\r`.
pub fn parse(text: &str) -> Result<Vec<FieldDecl>, DefinitionError> {
    let mut decls = Vec::new();

    for (i, raw) in text.split('\n').enumerate() {
        let line = raw.replace('\r', "");
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        decls.push(parse_line(i + 1, line)?);
    }

    Ok(decls)
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// An identifier, optionally prefixed with the reserved marker.
pub fn is_field_name(s: &str) -> bool {
    is_identifier(s.strip_prefix(crate::bitfield::RESERVED_MARKER).unwrap_or(s))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_line(line_no: usize, line: &str) -> Result<FieldDecl, DefinitionError> {
    let malformed = || DefinitionError::MalformedLine {
        line: line_no,
        text: line.to_string(),
    };

    let (ty_text, name) = match line.find('}') {
        Some(close) => {
            let rest = &line[close + 1..];
            if !rest.starts_with(char::is_whitespace) {
                return Err(malformed());
            }
            (&line[..=close], rest.trim())
        }
        None => {
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(ty), Some(name), None) => (ty, name),
                _ => return Err(malformed()),
            }
        }
    };

    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(malformed());
    }
    if !is_field_name(name) {
        return Err(DefinitionError::InvalidFieldName {
            line: line_no,
            name: name.to_string(),
        });
    }

    Ok(FieldDecl {
        line: line_no,
        ty: parse_type_expr(line_no, ty_text, malformed)?,
        name: name.to_string(),
    })
}

fn parse_type_expr(
    line_no: usize,
    text: &str,
    malformed: impl Fn() -> DefinitionError,
) -> Result<TypeExpr, DefinitionError> {
    if let Some(open) = text.find('{') {
        let inner = text[open + 1..].strip_suffix('}').ok_or_else(&malformed)?;
        let digits = text[..open].strip_prefix("Bitfield").ok_or_else(&malformed)?;

        let width = is_digits(digits)
            .then(|| digits.parse::<u32>().ok())
            .flatten()
            .and_then(BitfieldWidth::from_bits)
            .ok_or_else(|| DefinitionError::InvalidBitWidth {
                line: line_no,
                text: digits.to_string(),
            })?;

        if inner.trim().is_empty() {
            return Err(malformed());
        }

        let mut fields = Vec::new();
        for entry in inner.split(',') {
            let (name, bits) = entry.split_once(':').ok_or_else(&malformed)?;
            let (name, bits) = (name.trim(), bits.trim());

            if !is_field_name(name) {
                return Err(DefinitionError::InvalidFieldName {
                    line: line_no,
                    name: name.to_string(),
                });
            }

            let bits = is_digits(bits)
                .then(|| bits.parse::<u32>().ok())
                .flatten()
                .ok_or_else(|| DefinitionError::InvalidBitWidth {
                    line: line_no,
                    text: bits.to_string(),
                })?;

            fields.push((name.to_string(), bits));
        }

        return Ok(TypeExpr::Bitfield { width, fields });
    }

    if let Some(open) = text.find('[') {
        let name = &text[..open];
        let len_text = text[open + 1..].strip_suffix(']').ok_or_else(&malformed)?;

        if !is_identifier(name) {
            return Err(malformed());
        }

        let len = is_digits(len_text)
            .then(|| len_text.parse::<usize>().ok())
            .flatten()
            .filter(|len| *len > 0)
            .ok_or_else(|| DefinitionError::InvalidArrayLength {
                line: line_no,
                text: len_text.to_string(),
            })?;

        return Ok(TypeExpr::Array {
            name: name.to_string(),
            len,
        });
    }

    if !is_identifier(text) {
        return Err(malformed());
    }

    Ok(TypeExpr::Named(text.to_string()))
}
