use std::io::{self, Write};

use crate::error::{LedgerError, Result};

/// Trait for objects that have a canonical binary representation for Hashing/Signing.
/// careful: This must be deterministic across platforms/versions.
pub trait CanonicalSerialize {
    fn canonical_serialize<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()>;

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.canonical_serialize(&mut buf).expect("memory write failed");
        buf
    }
}

/// Counterpart of [`CanonicalSerialize`]; reads the exact field order back.
pub trait CanonicalDeserialize: Sized {
    fn canonical_deserialize(reader: &mut Reader<'_>) -> Result<Self>;

    /// Decodes a value and reports how many bytes it occupied.
    fn from_bytes(bytes: &[u8]) -> Result<(Self, usize)> {
        let mut reader = Reader::new(bytes);
        let value = Self::canonical_deserialize(&mut reader)?;
        Ok((value, reader.consumed()))
    }
}

/// Cursor over an input buffer that remembers how far decoding got.
#[derive(Debug)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    pub fn consumed(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the next `n` bytes without consuming them.
    pub fn peek(&self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(LedgerError::malformed(
                self.pos,
                format!("need {} bytes, {} left", n, self.remaining()),
            ));
        }
        Ok(&self.buf[self.pos..self.pos + n])
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let bytes = self.peek(n)?;
        self.pos += n;
        Ok(bytes)
    }

    pub fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Reads a u32 length prefix and checks it against the remaining input.
    pub fn read_len(&mut self) -> Result<usize> {
        let start = self.pos;
        let len = u32::canonical_deserialize(self)? as usize;
        if len > self.remaining() {
            return Err(LedgerError::malformed(
                start,
                format!("length prefix {} exceeds remaining {} bytes", len, self.remaining()),
            ));
        }
        Ok(len)
    }
}

// --- Primitives ---

impl CanonicalSerialize for u8 {
    fn canonical_serialize<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&[*self])
    }
}

impl CanonicalSerialize for u16 {
    fn canonical_serialize<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.to_le_bytes())
    }
}

impl CanonicalSerialize for u32 {
    fn canonical_serialize<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.to_le_bytes())
    }
}

impl CanonicalSerialize for u64 {
    fn canonical_serialize<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.to_le_bytes())
    }
}

impl<T: CanonicalSerialize> CanonicalSerialize for Vec<T> {
    fn canonical_serialize<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        let len = self.len() as u32;
        writer.write_all(&len.to_le_bytes())?;
        for item in self {
            item.canonical_serialize(writer)?;
        }
        Ok(())
    }
}

impl CanonicalDeserialize for u8 {
    fn canonical_deserialize(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(reader.take(1)?[0])
    }
}

impl CanonicalDeserialize for u16 {
    fn canonical_deserialize(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(u16::from_le_bytes(reader.take_array()?))
    }
}

impl CanonicalDeserialize for u32 {
    fn canonical_deserialize(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(u32::from_le_bytes(reader.take_array()?))
    }
}

impl CanonicalDeserialize for u64 {
    fn canonical_deserialize(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(u64::from_le_bytes(reader.take_array()?))
    }
}

impl<T: CanonicalDeserialize> CanonicalDeserialize for Vec<T> {
    fn canonical_deserialize(reader: &mut Reader<'_>) -> Result<Self> {
        // every element occupies at least one byte, so read_len bounds the allocation
        let len = reader.read_len()?;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(T::canonical_deserialize(reader)?);
        }
        Ok(items)
    }
}
