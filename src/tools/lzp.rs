//! LZP pre-filter: replaces long predicted repeats with short match references before sorting.
//!
//! A hash of the previous four bytes indexes a table holding the most recent position that
//! followed the same context. When the bytes at that position repeat for at least `min_len`
//! bytes, the whole repeat is replaced by the match flag and its length. The decoder rebuilds
//! the same table from the bytes it has already produced, so nothing else is transmitted.
//!
//! Wire rules:
//! - `MATCH_FLAG` followed by a byte below 255 starts a match. The length beyond `min_len` is
//!   written as a run of 254 bytes (each adding 254) closed by a byte below 254.
//! - A literal `MATCH_FLAG` is followed by 255, but only where the context has a candidate.
//!   Where it has none the decoder cannot start a match, so no stuffing byte is needed.
//! - The first four bytes are always literal.
//!
use crate::error::{try_alloc, try_grow, BscError, Result};
use crate::tools::options::LzpParams;
use log::debug;

pub const MATCH_FLAG: u8 = 0xF2;
const ESCAPE: u8 = 255;
const CHUNK: u8 = 254;
/// Context order in bytes.
const CONTEXT: usize = 4;

#[inline(always)]
fn slot(ctx: u32, hash_bits: u8) -> usize {
    (ctx.wrapping_mul(0x9E37_79B1) >> (32 - hash_bits as u32)) as usize
}

#[inline(always)]
fn context_at(data: &[u8], end: usize) -> u32 {
    u32::from_be_bytes([data[end - 4], data[end - 3], data[end - 2], data[end - 1]])
}

/// Run the pre-filter over a block. The output may be longer than the input, in which case the
/// caller should keep the raw block.
pub fn lzp_encode(input: &[u8], params: &LzpParams) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    lzp_encode_into(input, params, &mut out)?;
    Ok(out)
}

/// As `lzp_encode`, writing into a reusable buffer.
pub fn lzp_encode_into(input: &[u8], params: &LzpParams, out: &mut Vec<u8>) -> Result<()> {
    params.validate()?;
    let n = input.len();
    try_grow(out, n)?;
    if n <= CONTEXT {
        out.extend_from_slice(input);
        return Ok(());
    }

    let min_len = params.min_len as usize;
    let mut table: Vec<u32> = try_alloc(1 << params.hash_bits)?;
    out.extend_from_slice(&input[..CONTEXT]);
    let mut ctx = context_at(input, CONTEXT);
    let mut idx = CONTEXT;
    let mut matches = 0_usize;

    while idx < n {
        let s = slot(ctx, params.hash_bits);
        let candidate = table[s] as usize;
        table[s] = idx as u32;

        if candidate > 0 && n - idx >= min_len {
            let len = input[idx..]
                .iter()
                .zip(&input[candidate..])
                .take_while(|(a, b)| a == b)
                .count();
            if len >= min_len {
                out.push(MATCH_FLAG);
                let mut rest = len - min_len;
                while rest >= CHUNK as usize {
                    out.push(CHUNK);
                    rest -= CHUNK as usize;
                }
                out.push(rest as u8);
                idx += len;
                ctx = context_at(input, idx);
                matches += 1;
                continue;
            }
        }

        let byte = input[idx];
        out.push(byte);
        if byte == MATCH_FLAG && candidate > 0 {
            out.push(ESCAPE);
        }
        ctx = (ctx << 8) | byte as u32;
        idx += 1;
    }

    debug!(
        "LZP: {} bytes -> {} bytes with {} matches",
        n,
        out.len(),
        matches
    );
    Ok(())
}

/// Reverse the pre-filter. `size` is the exact length of the unfiltered block.
pub fn lzp_decode(input: &[u8], params: &LzpParams, size: usize) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    lzp_decode_into(input, params, size, &mut out)?;
    Ok(out)
}

/// As `lzp_decode`, writing into a reusable buffer.
pub fn lzp_decode_into(
    input: &[u8],
    params: &LzpParams,
    size: usize,
    out: &mut Vec<u8>,
) -> Result<()> {
    params.validate()?;
    try_grow(out, size)?;

    if size <= CONTEXT || input.len() <= CONTEXT {
        if input.len() != size {
            return Err(BscError::corrupt("LZP block length mismatch"));
        }
        out.extend_from_slice(input);
        return Ok(());
    }

    let min_len = params.min_len as usize;
    let mut table: Vec<u32> = try_alloc(1 << params.hash_bits)?;
    out.extend_from_slice(&input[..CONTEXT]);
    let mut ctx = context_at(out, CONTEXT);
    let mut pos = CONTEXT;
    let next_byte = |pos: &mut usize| -> Result<u8> {
        let byte = *input
            .get(*pos)
            .ok_or_else(|| BscError::corrupt("LZP stream ends inside a match"))?;
        *pos += 1;
        Ok(byte)
    };

    while pos < input.len() {
        if out.len() >= size {
            return Err(BscError::corrupt("LZP stream longer than its block"));
        }
        let s = slot(ctx, params.hash_bits);
        let candidate = table[s] as usize;
        table[s] = out.len() as u32;

        let byte = next_byte(&mut pos)?;
        if byte == MATCH_FLAG && candidate > 0 {
            let mut code = next_byte(&mut pos)?;
            if code != ESCAPE {
                let mut len = min_len;
                while code == CHUNK {
                    len += CHUNK as usize;
                    code = next_byte(&mut pos)?;
                }
                len += code as usize;
                if len > size - out.len() {
                    return Err(BscError::corrupt("LZP match runs past the block"));
                }
                // Byte by byte: the source may overlap what is being written.
                for k in 0..len {
                    let b = out[candidate + k];
                    out.push(b);
                }
                ctx = context_at(out, out.len());
                continue;
            }
        }
        out.push(byte);
        ctx = (ctx << 8) | byte as u32;
    }

    if out.len() != size {
        return Err(BscError::corrupt(format!(
            "LZP stream decoded to {} bytes, expected {}",
            out.len(),
            size
        )));
    }
    Ok(())
}
