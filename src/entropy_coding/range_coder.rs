//! Carryless binary arithmetic coder with 32 bit bounds and 12 bit probabilities.
//!
//! The interval `[low, high]` is split in proportion to the probability of a one. A one keeps
//! the lower part, a zero the upper part. Whenever both bounds agree in their top byte that
//! byte is final, so it is shifted out and the interval is widened again.
//!
//! The encoder flushes all four bytes of `low` at the end. The decoder reads four bytes up
//! front and one per shift, so it consumes exactly the bytes the encoder wrote and can tell a
//! truncated or padded payload from a good one.
//!
use crate::error::{BscError, Result};

#[inline(always)]
fn split(low: u32, high: u32, p: u32) -> u32 {
    let range = high - low;
    low + (range >> 12) * p + (((range & 0xfff) * p) >> 12)
}

/// Encoding half of the coder. Appends to a caller supplied buffer.
pub struct Encoder<'a> {
    low: u32,
    high: u32,
    out: &'a mut Vec<u8>,
}

impl<'a> Encoder<'a> {
    pub fn new(out: &'a mut Vec<u8>) -> Self {
        Self {
            low: 0,
            high: u32::MAX,
            out,
        }
    }

    /// Code `bit` where `p` is the 12 bit probability that it is a one.
    #[inline(always)]
    pub fn encode(&mut self, bit: bool, p: u32) {
        let mid = split(self.low, self.high, p);
        if bit {
            self.high = mid;
        } else {
            self.low = mid + 1;
        }
        while (self.low ^ self.high) & 0xff00_0000 == 0 {
            self.out.push((self.high >> 24) as u8);
            self.low <<= 8;
            self.high = (self.high << 8) | 0xff;
        }
    }

    /// Write the final code value. Returns the buffer length.
    pub fn finish(self) -> usize {
        self.out.extend_from_slice(&self.low.to_be_bytes());
        self.out.len()
    }
}

/// Decoding half of the coder, reading from a payload slice.
pub struct Decoder<'a> {
    low: u32,
    high: u32,
    x: u32,
    input: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(input: &'a [u8]) -> Result<Self> {
        if input.len() < 4 {
            return Err(BscError::corrupt("entropy payload shorter than its flush"));
        }
        Ok(Self {
            low: 0,
            high: u32::MAX,
            x: u32::from_be_bytes([input[0], input[1], input[2], input[3]]),
            input,
            pos: 4,
        })
    }

    /// Decode one bit coded with the 12 bit probability `p`.
    #[inline(always)]
    pub fn decode(&mut self, p: u32) -> Result<bool> {
        // A code value outside the interval can only come from a damaged payload
        if self.x < self.low || self.x > self.high {
            return Err(BscError::corrupt("range coder lost its interval"));
        }
        let mid = split(self.low, self.high, p);
        let bit = self.x <= mid;
        if bit {
            self.high = mid;
        } else {
            self.low = mid + 1;
        }
        while (self.low ^ self.high) & 0xff00_0000 == 0 {
            let byte = *self
                .input
                .get(self.pos)
                .ok_or_else(|| BscError::corrupt("entropy payload is truncated"))?;
            self.pos += 1;
            self.low <<= 8;
            self.high = (self.high << 8) | 0xff;
            self.x = (self.x << 8) | byte as u32;
        }
        Ok(bit)
    }

    /// Check that every payload byte was used.
    pub fn finish(self) -> Result<()> {
        if self.pos != self.input.len() {
            return Err(BscError::corrupt(format!(
                "entropy payload has {} unused bytes",
                self.input.len() - self.pos
            )));
        }
        Ok(())
    }
}
