/// Appends big-endian fields to an output buffer.
pub struct ByteWriter<'a> {
    /// Output buffer used to write the fields.
    output: &'a mut Vec<u8>,
}

impl<'a> ByteWriter<'a> {
    /// Create a writer that appends to `output`.
    pub fn new(output: &'a mut Vec<u8>) -> Self {
        Self { output }
    }

    /// Put a byte on the stream.
    pub fn out8(&mut self, data: u8) {
        self.output.push(data);
    }

    /// Put a u32 on the stream.
    pub fn out32(&mut self, data: u32) {
        self.output.extend_from_slice(&data.to_be_bytes());
    }

    /// Put a run of bytes on the stream.
    pub fn out_bytes(&mut self, data: &[u8]) {
        self.output.extend_from_slice(data);
    }
}
