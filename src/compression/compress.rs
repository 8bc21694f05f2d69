use log::{debug, info};

use super::header::{checksum, Header, FLAG_LZP, FLAG_ST, HEADER_SIZE};
use super::workspace::Workspace;
use crate::bwt_algorithms::bwt_sort::{bwt_encode_with_order_into, suffix_order_into};
use crate::bwt_algorithms::st::st_order_into;
use crate::entropy_coding::rank_coder::encode_symbols;
use crate::error::{BscError, Result};
use crate::tools::lzp::lzp_encode_into;
use crate::tools::mtf_rle::rle2_mtf_encode_into;
use crate::tools::options::{Config, Transform};

/*
    Each block goes through the same steps:
    - LZP (optional): replace long predicted repeats, kept only if it made the block smaller.
    - BWT (or ST, sorting on a short context only): sort all rotations and keep the byte in
      front of each.
    - MTF and zero-run coding of the transform output.
    - Context modelled binary range coding of the symbols.

    The header is written last since it records sizes from every stage.
*/

/// Compress one block with a fresh workspace.
pub fn compress(block: &[u8], config: &Config) -> Result<Vec<u8>> {
    Workspace::new().compress(block, config)
}

pub(crate) fn compress_block(ws: &mut Workspace, block: &[u8], config: &Config) -> Result<Vec<u8>> {
    config.validate()?;
    if block.is_empty() {
        return Err(BscError::invalid("empty block"));
    }
    if block.len() > config.max_block_size {
        return Err(BscError::invalid(format!(
            "block of {} bytes exceeds the {} byte ceiling",
            block.len(),
            config.max_block_size
        )));
    }

    // Pre-filter, if asked for and worth it
    let mut header = Header {
        flags: 0,
        st_depth: 0,
        lzp_hash_bits: 0,
        lzp_min_len: 0,
        original_length: block.len() as u32,
        filtered_length: block.len() as u32,
        primary_index: 0,
        symbol_count: 0,
        payload_length: 0,
        checksum: checksum(block),
    };
    if let Some(params) = &config.lzp {
        lzp_encode_into(block, params, &mut ws.filtered)?;
        if ws.filtered.len() < block.len() {
            info!("LZP applied: {} -> {} bytes", block.len(), ws.filtered.len());
            header.flags |= FLAG_LZP;
            header.lzp_hash_bits = params.hash_bits;
            header.lzp_min_len = params.min_len;
            header.filtered_length = ws.filtered.len() as u32;
        } else {
            info!("LZP skipped: no gain on {} bytes", block.len());
        }
    }
    let input: &[u8] = if header.flags & FLAG_LZP != 0 {
        &ws.filtered
    } else {
        block
    };

    // Block sort
    match config.transform {
        Transform::Bwt => suffix_order_into(input, &mut ws.links)?,
        Transform::St(depth) => {
            st_order_into(input, depth, &mut ws.links)?;
            header.flags |= FLAG_ST;
            header.st_depth = depth;
        }
    }
    header.primary_index = bwt_encode_with_order_into(input, &ws.links, &mut ws.bwt)?;

    // MTF and RLE2
    rle2_mtf_encode_into(&ws.bwt, &mut ws.symbols);
    header.symbol_count = ws.symbols.len() as u32;

    // Entropy coding, after room for the header
    let mut out = Vec::new();
    out.try_reserve(HEADER_SIZE + input.len() / 2)
        .map_err(|_| BscError::CapacityExceeded {
            requested: HEADER_SIZE + input.len() / 2,
        })?;
    out.resize(HEADER_SIZE, 0);
    let payload = encode_symbols(&ws.symbols, &mut out)?;
    header.payload_length = u32::try_from(payload)
        .map_err(|_| BscError::CapacityExceeded { requested: payload })?;

    let mut head = Vec::with_capacity(HEADER_SIZE);
    header.write(&mut head);
    out[..HEADER_SIZE].copy_from_slice(&head);

    debug!(
        "Block of {} bytes: {} sorted, {} symbols, {} payload bytes, primary index {}",
        block.len(),
        input.len(),
        header.symbol_count,
        payload,
        header.primary_index
    );
    Ok(out)
}
