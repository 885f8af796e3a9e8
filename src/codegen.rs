//! Rust source generation from compiled struct descriptors.
//!
//! Only reads descriptors; nothing here is used by the codec. Each struct
//! becomes a plain `pub struct` with a `SIZE` constant, and each bitfield
//! field with sub-fields becomes a newtype over its container integer with
//! a getter and setter per sub-field.

use std::{
    collections::{HashMap, HashSet},
    fmt::{self, Write},
    sync::Arc,
};

use crate::{
    bitfield::{BitfieldLayout, RESERVED_MARKER},
    bits,
    compiled::StructDescriptor,
    descriptor::TypeDescriptor,
    errors::RegistryError,
    field::FieldDescriptor,
    primitive::Primitive,
    registry::Registry,
};

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut",
    "pub", "ref", "return", "static", "struct", "trait", "true", "type", "unsafe", "use", "where",
    "while", "abstract", "become", "box", "do", "final", "macro", "override", "priv", "try",
    "typeof", "unsized", "virtual", "yield",
];

/// Generates Rust source for the struct registered as `name` and every struct it nests.
pub fn generate(registry: &Registry, name: &str) -> Result<String, RegistryError> {
    let desc = registry
        .lookup(name)?
        .as_struct()
        .ok_or_else(|| RegistryError::UnknownType(name.to_string()))?;

    Ok(generate_descriptor(desc))
}

/// Generates Rust source for `desc` and every struct it nests, dependencies first.
pub fn generate_descriptor(desc: &StructDescriptor) -> String {
    let mut out = String::new();
    let mut names = Names::default();

    emit_struct(&mut out, desc, &mut names).expect("formatting into a String cannot fail");

    out
}

/// Rust names handed out so far. Distinct schema names can map to the same
/// identifier (`point`/`Point`, `flagA`/`flag_a`), so every name is claimed
/// through [unique].
#[derive(Default)]
struct Names {
    /// Descriptor name to emitted Rust type name.
    structs: HashMap<String, String>,
    types: HashSet<String>,
}

fn emit_struct(out: &mut String, desc: &StructDescriptor, names: &mut Names) -> fmt::Result {
    if names.structs.contains_key(desc.name()) {
        return Ok(());
    }

    for field in desc.fields() {
        if let TypeDescriptor::Struct(nested) = field.ty() {
            emit_struct(out, nested, names)?;
        }
    }

    let struct_name = unique(&mut names.types, upper_camel(desc.name()), "");
    names
        .structs
        .insert(desc.name().to_string(), struct_name.clone());

    let mut idents = HashSet::new();
    let mut members = Vec::with_capacity(desc.fields().len());
    let mut newtypes = Vec::new();

    for field in desc.fields() {
        let ident = unique(&mut idents, field_ident(field.name()), "_");
        let element = match field.ty() {
            TypeDescriptor::Primitive(p) => primitive_type(*p).to_string(),
            TypeDescriptor::Bitfield(w) => match field.bitfield() {
                Some(layout) if !layout.spans().is_empty() => {
                    let newtype = unique(
                        &mut names.types,
                        format!("{struct_name}{}", upper_camel(bare(&ident))),
                        "",
                    );
                    newtypes.push((newtype.clone(), field, ident.clone(), Arc::clone(layout)));
                    newtype
                }
                _ => format!("u{}", w.bits()),
            },
            TypeDescriptor::Struct(nested) => names
                .structs
                .get(nested.name())
                .cloned()
                .unwrap_or_else(|| upper_camel(nested.name())),
            TypeDescriptor::Custom(codec) => codec.name().to_string(),
        };

        let ty = if field.is_array() {
            format!("[{element}; {}]", field.array_len())
        } else {
            element
        };
        members.push((ident, ty));
    }

    writeln!(out, "/// `{}`, {} bytes.", desc.name(), desc.size())?;
    writeln!(out, "#[derive(Debug, Clone, Copy, PartialEq)]")?;
    writeln!(out, "pub struct {struct_name} {{")?;
    for (ident, ty) in &members {
        writeln!(out, "    pub {ident}: {ty},")?;
    }
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "impl {struct_name} {{")?;
    writeln!(out, "    pub const SIZE: usize = {};", desc.size())?;
    writeln!(out, "}}")?;

    for (newtype, field, ident, layout) in &newtypes {
        writeln!(out)?;
        emit_bitfield(out, &struct_name, newtype, field, ident, layout)?;
    }

    writeln!(out)
}

fn emit_bitfield(
    out: &mut String,
    struct_name: &str,
    name: &str,
    field: &FieldDescriptor,
    ident: &str,
    layout: &BitfieldLayout,
) -> fmt::Result {
    let capacity = layout.width().bits();
    let int = format!("u{capacity}");
    let mut methods = HashSet::new();

    writeln!(
        out,
        "/// `{}` sub-fields of `{}::{}`.",
        field.type_name(),
        struct_name,
        ident
    )?;
    writeln!(out, "#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]")?;
    writeln!(out, "pub struct {name}(pub {int});")?;
    writeln!(out)?;
    writeln!(out, "impl {name} {{")?;

    for (i, span) in layout.spans().iter().enumerate() {
        let getter = unique(&mut methods, field_ident(&span.name), "_");
        let setter = unique(&mut methods, format!("set_{}", bare(&getter)), "_");
        let shift = bits::shift(capacity, span.offset, span.width);
        let mask = format!("{:#x}", bits::mask(span.width));

        if i > 0 {
            writeln!(out)?;
        }

        if span.width == 1 {
            writeln!(out, "    pub fn {getter}(&self) -> bool {{")?;
            writeln!(out, "        (self.0 >> {shift}) & 1 != 0")?;
            writeln!(out, "    }}")?;
            writeln!(out)?;
            writeln!(out, "    pub fn {setter}(&mut self, value: bool) {{")?;
            writeln!(
                out,
                "        self.0 = (self.0 & !(1 << {shift})) | ((value as {int}) << {shift});"
            )?;
        } else {
            writeln!(out, "    pub fn {getter}(&self) -> {int} {{")?;
            writeln!(out, "        (self.0 >> {shift}) & {mask}")?;
            writeln!(out, "    }}")?;
            writeln!(out)?;
            writeln!(out, "    pub fn {setter}(&mut self, value: {int}) {{")?;
            writeln!(
                out,
                "        self.0 = (self.0 & !({mask} << {shift})) | ((value & {mask}) << {shift});"
            )?;
        }
        writeln!(out, "    }}")?;
    }

    writeln!(out, "}}")
}

/// Claims `base` in `used`, appending `{sep}2`, `{sep}3`, ... until it is free.
fn unique(used: &mut HashSet<String>, base: String, sep: &str) -> String {
    if used.insert(base.clone()) {
        return base;
    }

    let mut n = 2;
    loop {
        let candidate = format!("{base}{sep}{n}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Identifier without the raw `r#` prefix.
fn bare(ident: &str) -> &str {
    ident.strip_prefix("r#").unwrap_or(ident)
}

fn primitive_type(p: Primitive) -> &'static str {
    match p {
        Primitive::U8 | Primitive::Char => "u8",
        Primitive::S8 => "i8",
        Primitive::U16 => "u16",
        Primitive::S16 => "i16",
        Primitive::U32 => "u32",
        Primitive::S32 => "i32",
        Primitive::U64 => "u64",
        Primitive::S64 => "i64",
        Primitive::Float => "f32",
        Primitive::Double => "f64",
        Primitive::Bool => "bool",
        Primitive::String => "String",
    }
}

fn strip_marker(name: &str) -> &str {
    name.strip_prefix(RESERVED_MARKER).unwrap_or(name)
}

/// `#pad` becomes `_pad`; keywords become raw identifiers.
fn field_ident(name: &str) -> String {
    let snake = snake_case(strip_marker(name));
    let ident = if name.starts_with(RESERVED_MARKER) {
        format!("_{snake}")
    } else {
        snake
    };

    match ident.as_str() {
        "_" => "__".to_string(),
        "self" | "Self" | "super" | "crate" => format!("{ident}_"),
        _ if KEYWORDS.contains(&ident.as_str()) => format!("r#{ident}"),
        _ => ident,
    }
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;

    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }

    out
}

fn upper_camel(name: &str) -> String {
    let camel: String = name
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();

    // `_` and `_1` leave nothing usable as a type name.
    match camel.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => camel,
        _ => format!("T{camel}"),
    }
}
