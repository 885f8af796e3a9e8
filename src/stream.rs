//! Cursor-tracking reader/writer on top of the struct codec.

use std::io::SeekFrom;

use crate::{
    codec,
    endian::Endianness,
    errors::{ReadError, SeekError, WriteError},
    registry::Registry,
    value::Record,
};

/// Sequential access to consecutive structs in a byte buffer.
///
/// ```
/// use structcraft::{Endianness, Registry, StructStream};
///
/// let mut registry = Registry::new();
/// registry.compile("u16 id\nu8 len", "Entry").unwrap();
///
/// let data = [1, 0, 10, 2, 0, 20];
/// let mut stream = StructStream::new(&registry, &data[..]);
/// let first = stream.read_next("Entry").unwrap();
/// let second = stream.read_next("Entry").unwrap();
///
/// assert_eq!(first.get("id").and_then(|v| v.as_u64()), Some(1));
/// assert_eq!(second.get("len").and_then(|v| v.as_u64()), Some(20));
/// assert_eq!(stream.position(), 6);
/// ```
#[derive(Debug)]
pub struct StructStream<'r, B> {
    registry: &'r Registry,
    buf: B,
    position: usize,
    endian: Endianness,
}

impl<'r, B: AsRef<[u8]>> StructStream<'r, B> {
    pub fn new(registry: &'r Registry, buf: B) -> Self {
        Self::with_endianness(registry, buf, Endianness::default())
    }

    pub fn with_endianness(registry: &'r Registry, buf: B, endian: Endianness) -> Self {
        StructStream {
            registry,
            buf,
            position: 0,
            endian,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.buf.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn endianness(&self) -> Endianness {
        self.endian
    }

    pub fn set_endianness(&mut self, endian: Endianness) {
        self.endian = endian;
    }

    pub fn get_ref(&self) -> &B {
        &self.buf
    }

    pub fn into_inner(self) -> B {
        self.buf
    }

    /// Moves the cursor. Positions past the end are allowed; the next access reports them.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<usize, SeekError> {
        let target = match pos {
            SeekFrom::Start(n) => n as i128,
            SeekFrom::Current(delta) => self.position as i128 + delta as i128,
            SeekFrom::End(delta) => self.len() as i128 + delta as i128,
        };

        if target < 0 {
            return Err(SeekError::BeforeStart(target));
        }

        self.position = usize::try_from(target).map_err(|_| SeekError::Overflow)?;
        Ok(self.position)
    }

    /// Decodes `name` at the cursor and advances past it.
    pub fn read_next(&mut self, name: &str) -> Result<Record, ReadError> {
        let record = codec::read(self.registry, self.buf.as_ref(), self.position, name, self.endian)?;
        self.position += self.struct_size(name);
        Ok(record)
    }

    /// Decodes `name` at `offset` without moving the cursor.
    pub fn read_at(&self, name: &str, offset: usize) -> Result<Record, ReadError> {
        codec::read(self.registry, self.buf.as_ref(), offset, name, self.endian)
    }

    fn struct_size(&self, name: &str) -> usize {
        self.registry
            .get(name)
            .and_then(|ty| ty.fixed_size())
            .unwrap_or(0)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> StructStream<'_, B> {
    /// Encodes `record` as `name` at the cursor and advances past it.
    pub fn write_next(&mut self, name: &str, record: &Record) -> Result<usize, WriteError> {
        let written = codec::write(
            self.registry,
            self.buf.as_mut(),
            self.position,
            name,
            record,
            self.endian,
        )?;
        self.position += written;
        Ok(written)
    }

    /// Encodes `record` as `name` at `offset` without moving the cursor.
    pub fn write_at(&mut self, name: &str, offset: usize, record: &Record) -> Result<usize, WriteError> {
        codec::write(self.registry, self.buf.as_mut(), offset, name, record, self.endian)
    }
}
