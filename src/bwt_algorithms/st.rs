//! Sort Transform: a block sort that compares rotations on their first `depth` bytes only.
//!
//! Rotations with equal contexts keep their block order, so the forward sort is `depth` stable
//! counting passes instead of a full suffix sort. Output and primary index follow the BWT
//! convention: the byte in front of each sorted rotation, and the row holding rotation 0.
//!
//! The inverse cannot use the BWT's rank links, because rows that share a shorter context are
//! not in block order. Instead it rebuilds the context group of every row, one byte of context
//! per pass, and walks the block from the end. Inside a group the rows are in block order, so
//! walking backwards always lands on the last row of the group not yet visited.
//!
use super::bwt_sort::{bwt_encode_with_order_into, check_block};
use crate::error::{try_alloc, try_grow, BscError, Result};
use crate::tools::freq_count::{cumulative, freqs};
use crate::tools::options::Transform;
use log::debug;

fn check_depth(depth: u8) -> Result<()> {
    Transform::St(depth).validate()
}

/// Rotations of the block sorted on their first `depth` bytes (wrapping at the end), ties in
/// block order.
pub fn st_order_into(block: &[u8], depth: u8, order: &mut Vec<u32>) -> Result<()> {
    check_block(block)?;
    check_depth(depth)?;
    let n = block.len();
    try_grow(order, n)?;
    order.extend(0..n as u32);
    let mut scratch: Vec<u32> = try_alloc(n)?;

    // Least significant context byte first. Every column of the rotation matrix holds each byte
    // of the block once, so all passes share the same bucket starts.
    let starts = cumulative(&freqs(block));
    for d in (0..depth as usize).rev() {
        let mut next = starts;
        for &i in order.iter() {
            let c = block[(i as usize + d) % n] as usize;
            scratch[next[c] as usize] = i;
            next[c] += 1;
        }
        order.copy_from_slice(&scratch);
    }
    Ok(())
}

/// Sort Transform of the block. Returns the primary index and the transform output.
pub fn st_encode(block: &[u8], depth: u8) -> Result<(u32, Vec<u8>)> {
    let mut order = Vec::new();
    st_order_into(block, depth, &mut order)?;
    let mut out = Vec::new();
    let key = bwt_encode_with_order_into(block, &order, &mut out)?;
    debug!("ST{} of {} bytes, primary index {}", depth, block.len(), key);
    Ok((key, out))
}

/// Decode a Sort Transform.
pub fn st_decode(key: u32, depth: u8, st_in: &[u8]) -> Result<Vec<u8>> {
    let mut links = Vec::new();
    let mut out = Vec::new();
    st_decode_into(key, depth, st_in, &mut links, &mut out)?;
    Ok(out)
}

/// Decode a Sort Transform into `out`, using `links` as scratch. Both buffers are cleared
/// first so they can be reused across blocks.
pub fn st_decode_into(
    key: u32,
    depth: u8,
    st_in: &[u8],
    links: &mut Vec<u32>,
    out: &mut Vec<u8>,
) -> Result<()> {
    check_block(st_in)?;
    check_depth(depth)?;
    let n = st_in.len();
    if key as usize >= n {
        return Err(BscError::corrupt(format!(
            "Primary index {} outside a {} byte block",
            key, n
        )));
    }

    // Rows stably sorted on the byte in front of them. Context ids rise with the row, so this
    // is also the order of (byte in front, context id) pairs on every pass.
    try_grow(links, n)?;
    links.resize(n, 0);
    let mut next = cumulative(&freqs(st_in));
    for (row, &c) in st_in.iter().enumerate() {
        links[next[c as usize] as usize] = row as u32;
        next[c as usize] += 1;
    }

    // Each pass extends every row's context by one byte. The context of length j + 1 in row s
    // is the s-th smallest of all (byte in front, context of length j) pairs.
    let mut group: Vec<u32> = try_alloc(n)?;
    let mut next_group: Vec<u32> = try_alloc(n)?;
    for _ in 0..depth {
        let first = links[0] as usize;
        let mut prev = (st_in[first], group[first]);
        let mut id = 0_u32;
        for (s, &row) in links.iter().enumerate() {
            let ctx = (st_in[row as usize], group[row as usize]);
            if ctx != prev {
                id += 1;
                prev = ctx;
            }
            next_group[s] = id;
        }
        std::mem::swap(&mut group, &mut next_group);
    }

    // The pair of a row on the last pass is the context of the rotation one step back.
    let mut back = next_group;
    for (s, &row) in links.iter().enumerate() {
        back[row as usize] = group[s];
    }

    // First row and one past the last unvisited row of every group
    let groups = group[n - 1] as usize + 1;
    let mut top: Vec<u32> = try_alloc(groups)?;
    let mut bottom: Vec<u32> = try_alloc(groups)?;
    for (s, &g) in group.iter().enumerate() {
        if s == 0 || group[s - 1] != g {
            top[g as usize] = s as u32;
        }
        bottom[g as usize] = s as u32 + 1;
    }
    drop(group);

    try_grow(out, n)?;
    out.resize(n, 0);
    let mut row = key as usize;
    for i in (0..n).rev() {
        out[i] = st_in[row];
        if i == 0 {
            break;
        }
        let g = back[row] as usize;
        if bottom[g] == top[g] {
            return Err(BscError::corrupt("Sort Transform context group used up"));
        }
        bottom[g] -= 1;
        row = bottom[g] as usize;
    }
    Ok(())
}
