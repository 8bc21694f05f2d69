/// Reads big-endian fields from a byte slice.
#[derive(Debug)]
pub struct ByteReader<'a> {
    buffer: &'a [u8],
    cursor: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, cursor: 0 }
    }

    /// Return the next byte, or None if there is no more data to read
    pub fn byte(&mut self) -> Option<u8> {
        let byte = *self.buffer.get(self.cursor)?;
        self.cursor += 1;
        Some(byte)
    }

    /// Return the next n bytes as a slice, or None if fewer remain
    pub fn bytes(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.cursor.checked_add(n)?;
        let slice = self.buffer.get(self.cursor..end)?;
        self.cursor = end;
        Some(slice)
    }

    /// Return the next big-endian u32
    pub fn u32(&mut self) -> Option<u32> {
        let b = self.bytes(4)?;
        Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}
