//! The fixed 36 byte header in front of every encoded block.
//!
//! | Offset | Field | Size |
//! |---|---|---|
//! | 0 | magic `BSRT` | 4 |
//! | 4 | version | 1 |
//! | 5 | flags (bit 0: LZP applied, bit 1: Sort Transform) and ST depth (bits 4..8) | 1 |
//! | 6 | LZP hash bits | 1 |
//! | 7 | LZP minimum match | 1 |
//! | 8 | original length | 4 |
//! | 12 | filtered length (bytes entering the transform) | 4 |
//! | 16 | primary index | 4 |
//! | 20 | symbol count | 4 |
//! | 24 | payload length | 4 |
//! | 28 | xxh32 of the original bytes | 4 |
//! | 32 | xxh32 of header bytes 0..32 | 4 |
//!
//! All integers are big-endian. The header carries its own checksum so a damaged header is
//! caught before anything is allocated from its lengths.
//!
use crate::bitstream::bytereader::ByteReader;
use crate::bitstream::bytewriter::ByteWriter;
use crate::error::{BscError, Result};
use crate::tools::options::{LzpParams, Transform};
use log::trace;
use xxhash_rust::xxh32::xxh32;

pub const MAGIC: [u8; 4] = *b"BSRT";
pub const VERSION: u8 = 1;
pub const HEADER_SIZE: usize = 36;
/// The LZP pre-filter ran and its output was sorted instead of the raw block.
pub const FLAG_LZP: u8 = 0x01;
/// The block was sorted with the Sort Transform instead of the BWT.
pub const FLAG_ST: u8 = 0x02;
const KNOWN_FLAGS: u8 = FLAG_LZP | FLAG_ST;
/// Flags live in the low nibble of their byte, the ST depth in the high one.
const FLAG_BITS: u8 = 0x0F;
const CHECKSUM_SEED: u32 = 0;

/// xxh32 of a byte slice, as stored in the header.
pub fn checksum(data: &[u8]) -> u32 {
    xxh32(data, CHECKSUM_SEED)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub flags: u8,
    /// Context length of the Sort Transform, 0 for the BWT
    pub st_depth: u8,
    pub lzp_hash_bits: u8,
    pub lzp_min_len: u8,
    pub original_length: u32,
    pub filtered_length: u32,
    pub primary_index: u32,
    pub symbol_count: u32,
    pub payload_length: u32,
    pub checksum: u32,
}

/// Sizes of an encoded block, read from its header alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    /// Header plus payload
    pub encoded_size: usize,
    /// Length of the block after decompression
    pub original_size: usize,
}

impl Header {
    pub fn lzp_params(&self) -> Option<LzpParams> {
        if self.flags & FLAG_LZP != 0 {
            Some(LzpParams::new(self.lzp_hash_bits, self.lzp_min_len))
        } else {
            None
        }
    }

    pub fn transform(&self) -> Transform {
        if self.flags & FLAG_ST != 0 {
            Transform::St(self.st_depth)
        } else {
            Transform::Bwt
        }
    }

    /// Header plus payload.
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.payload_length as usize
    }

    /// Append the header to `out`.
    pub fn write(&self, out: &mut Vec<u8>) {
        let start = out.len();
        let mut bw = ByteWriter::new(out);
        bw.out_bytes(&MAGIC);
        bw.out8(VERSION);
        bw.out8(self.flags | self.st_depth << 4);
        bw.out8(self.lzp_hash_bits);
        bw.out8(self.lzp_min_len);
        bw.out32(self.original_length);
        bw.out32(self.filtered_length);
        bw.out32(self.primary_index);
        bw.out32(self.symbol_count);
        bw.out32(self.payload_length);
        bw.out32(self.checksum);
        let sum = checksum(&out[start..]);
        ByteWriter::new(out).out32(sum);
    }

    /// Read and check a header from the front of an encoded block. The payload itself is not
    /// required to be present.
    pub fn parse(encoded: &[u8]) -> Result<Header> {
        let mut br = ByteReader::new(encoded);
        let short = || BscError::corrupt("encoded block shorter than its header");

        let magic = br.bytes(MAGIC.len()).ok_or_else(short)?;
        if magic != MAGIC {
            return Err(BscError::unsupported(format!("unknown magic {:02x?}", magic)));
        }
        let version = br.byte().ok_or_else(short)?;
        if version != VERSION {
            return Err(BscError::unsupported(format!("unknown version {}", version)));
        }
        if encoded.len() < HEADER_SIZE {
            return Err(short());
        }
        let stored = u32::from_be_bytes([encoded[32], encoded[33], encoded[34], encoded[35]]);
        if checksum(&encoded[..HEADER_SIZE - 4]) != stored {
            return Err(BscError::corrupt("header checksum mismatch"));
        }

        let packed = br.byte().ok_or_else(short)?;
        let header = Header {
            flags: packed & FLAG_BITS,
            st_depth: packed >> 4,
            lzp_hash_bits: br.byte().ok_or_else(short)?,
            lzp_min_len: br.byte().ok_or_else(short)?,
            original_length: br.u32().ok_or_else(short)?,
            filtered_length: br.u32().ok_or_else(short)?,
            primary_index: br.u32().ok_or_else(short)?,
            symbol_count: br.u32().ok_or_else(short)?,
            payload_length: br.u32().ok_or_else(short)?,
            checksum: br.u32().ok_or_else(short)?,
        };
        trace!("{:?}", header);
        header.check()?;
        Ok(header)
    }

    /// Field consistency. Flags outside the known set are an unsupported format, anything else
    /// that cannot come out of the compressor is corruption.
    fn check(&self) -> Result<()> {
        if self.flags & !KNOWN_FLAGS != 0 {
            return Err(BscError::unsupported(format!("unknown flags {:#04x}", self.flags)));
        }
        match self.transform() {
            Transform::Bwt if self.st_depth != 0 => {
                return Err(BscError::corrupt("Sort Transform depth set without its flag"));
            }
            transform => transform
                .validate()
                .map_err(|_| BscError::corrupt("header carries an invalid Sort Transform depth"))?,
        }
        if self.original_length == 0 {
            return Err(BscError::corrupt("header declares an empty block"));
        }
        match self.lzp_params() {
            Some(params) => {
                params
                    .validate()
                    .map_err(|_| BscError::corrupt("header carries invalid LZP parameters"))?;
                if self.filtered_length == 0 || self.filtered_length >= self.original_length {
                    return Err(BscError::corrupt("filtered length does not fit the block"));
                }
            }
            None => {
                if self.lzp_hash_bits != 0 || self.lzp_min_len != 0 {
                    return Err(BscError::corrupt("LZP parameters set without the LZP flag"));
                }
                if self.filtered_length != self.original_length {
                    return Err(BscError::corrupt("filtered length differs from the block"));
                }
            }
        }
        if self.primary_index >= self.filtered_length {
            return Err(BscError::corrupt("primary index outside the block"));
        }
        // Every symbol stands for at least one byte of transform output
        if self.symbol_count == 0 || self.symbol_count > self.filtered_length {
            return Err(BscError::corrupt("symbol count does not fit the block"));
        }
        if (self.payload_length as usize) < 4 {
            return Err(BscError::corrupt("payload shorter than the coder flush"));
        }
        Ok(())
    }
}

/// Sizes of the encoded block at the front of `encoded`, from its header alone. Lets a caller
/// walk a concatenation of blocks without decoding them.
pub fn block_info(encoded: &[u8]) -> Result<BlockInfo> {
    let header = Header::parse(encoded)?;
    Ok(BlockInfo {
        encoded_size: header.encoded_len(),
        original_size: header.original_length as usize,
    })
}
