// Bounds-checked big-endian cursor over a byte slice
use crate::error::{ModaError, Result};

/// Every read checks the remaining length before touching the slice, so a
/// corrupt length field can never cause an over-read or a huge allocation.
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Borrow the next `len` bytes and advance past them
    pub fn take(&mut self, len: usize, field: &'static str) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(ModaError::TruncatedInput {
                field,
                needed: len,
                remaining,
            });
        }

        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, field)?);
        Ok(out)
    }

    pub fn read_u16(&mut self, field: &'static str) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array(field)?))
    }

    pub fn read_u32(&mut self, field: &'static str) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array(field)?))
    }

    /// Read a length-prefixed UTF-8 name with a 2-byte prefix
    pub fn read_name(&mut self, field: &'static str) -> Result<String> {
        let len = self.read_u16(field)? as usize;
        self.read_str(len, field)
    }

    pub fn read_str(&mut self, len: usize, field: &'static str) -> Result<String> {
        let bytes = self.take(len, field)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ModaError::MalformedMetadata(format!("{} is not valid UTF-8: {}", field, e)))
    }

    /// Read a blob with a 4-byte length prefix
    pub fn read_blob(&mut self, field: &'static str) -> Result<&'a [u8]> {
        let len = self.read_u32(field)? as usize;
        self.take(len, field)
    }
}
