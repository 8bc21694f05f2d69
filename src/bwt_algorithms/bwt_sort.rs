use super::sais::{least_rotation, primitive_period, sa_is_into};
use crate::error::{try_alloc, try_grow, BscError, Result};
use crate::tools::freq_count::{cumulative, freqs};
use crate::tools::options::MAX_BLOCK_SIZE;
use log::{debug, trace};

/*
Rotation order is computed without a sentinel. The least rotation of any block is w^k for a
Lyndon word w, and for a Lyndon word suffix order and rotation order agree. So we suffix sort
w once with SA-IS and expand every rotation of w into the k identical rotations of the block,
which are then already in ascending start order.
*/

/// Sorted order of all cyclic rotations of the block. Equal rotations (periodic blocks only)
/// are ordered by smallest start index.
pub fn suffix_order(block: &[u8]) -> Result<Vec<u32>> {
    let mut order = Vec::new();
    suffix_order_into(block, &mut order)?;
    Ok(order)
}

/// As `suffix_order`, writing the order into a reusable buffer.
pub fn suffix_order_into(block: &[u8], order: &mut Vec<u32>) -> Result<()> {
    check_block(block)?;
    let n = block.len();
    try_grow(order, n)?;

    // Rotate the block so it starts at its least rotation.
    let offset = least_rotation(block);
    let mut rotated: Vec<u8> = try_alloc(n)?;
    rotated[..n - offset].copy_from_slice(&block[offset..]);
    rotated[n - offset..].copy_from_slice(&block[..offset]);

    // Strip it down to its Lyndon root and sort that.
    let period = primitive_period(&rotated)?;
    let repeats = n / period;
    trace!(
        "Least rotation at {}, period {} repeated {} times",
        offset,
        period,
        repeats
    );
    sa_is_into(&rotated[..period], 256, order)?;
    drop(rotated);

    if repeats == 1 {
        // Map rotation starts back to block coordinates in place.
        order.iter_mut().for_each(|el| {
            let pos = *el as usize + offset;
            *el = if pos >= n { pos - n } else { pos } as u32;
        });
        return Ok(());
    }

    // Expand in place, back to front. Class i fills slots i*repeats.., which never reach an
    // entry below i that is still to be read.
    order.resize(n, 0);
    for i in (0..period).rev() {
        let start = (order[i] as usize + offset) % period;
        for m in 0..repeats {
            order[i * repeats + m] = (start + m * period) as u32;
        }
    }
    Ok(())
}

/// Burrows-Wheeler-Transform of the block. Returns the primary index (the row of the
/// untransformed block in sorted order) and the last column.
pub fn bwt_encode(block: &[u8]) -> Result<(u32, Vec<u8>)> {
    let order = suffix_order(block)?;
    let (key, bwt) = bwt_encode_with_order(block, &order)?;

    #[cfg(debug_assertions)]
    {
        verify_permutation(&order)?;
        if bwt_decode(key, &bwt)? != block {
            return Err(BscError::corrupt("suffix order does not invert to the block"));
        }
    }

    debug!("BWT of {} bytes, primary index {}", block.len(), key);
    Ok((key, bwt))
}

/// Builds the transform output from a previously computed rotation order.
pub fn bwt_encode_with_order(block: &[u8], order: &[u32]) -> Result<(u32, Vec<u8>)> {
    let mut bwt = Vec::new();
    let key = bwt_encode_with_order_into(block, order, &mut bwt)?;
    Ok((key, bwt))
}

/// As `bwt_encode_with_order`, writing the last column into a reusable buffer. Returns the
/// primary index.
pub fn bwt_encode_with_order_into(block: &[u8], order: &[u32], bwt: &mut Vec<u8>) -> Result<u32> {
    check_block(block)?;
    if order.len() != block.len() {
        return Err(BscError::invalid(format!(
            "Order has {} entries for a {} byte block",
            order.len(),
            block.len()
        )));
    }
    let n = block.len();
    let mut key = None;
    try_grow(bwt, n)?;
    for (i, &pos) in order.iter().enumerate() {
        let pos = pos as usize;
        if pos >= n {
            return Err(BscError::invalid(format!("Order entry {} out of range", pos)));
        }
        // BWT is built from the byte before each rotation start, wrapping at 0.
        if pos == 0 {
            key = Some(i as u32);
            bwt.push(block[n - 1]);
        } else {
            bwt.push(block[pos - 1]);
        }
    }
    key.ok_or_else(|| BscError::invalid("Order does not contain rotation 0"))
}

/// Decode a Burrows-Wheeler-Transform.
pub fn bwt_decode(key: u32, bwt_in: &[u8]) -> Result<Vec<u8>> {
    let mut links = Vec::new();
    let mut out = Vec::new();
    bwt_decode_into(key, bwt_in, &mut links, &mut out)?;
    Ok(out)
}

/// Decode a Burrows-Wheeler-Transform into `out`, using `links` as scratch. Both buffers are
/// cleared first so they can be reused across blocks.
pub fn bwt_decode_into(
    key: u32,
    bwt_in: &[u8],
    links: &mut Vec<u32>,
    out: &mut Vec<u8>,
) -> Result<()> {
    check_block(bwt_in)?;
    let end = bwt_in.len();
    if key as usize >= end {
        return Err(BscError::corrupt(format!(
            "Primary index {} outside a {} byte block",
            key, end
        )));
    }

    // Convert frequency count to the first sorted row of each byte value
    let mut next = cumulative(&freqs(bwt_in));

    // Build the transformation vector to find the next character in the original data.
    // Equal bytes keep their relative order, which matches the index tie-break of the sort.
    try_grow(links, end)?;
    links.resize(end, 0);
    for (i, &s) in bwt_in.iter().enumerate() {
        links[next[s as usize] as usize] = i as u32;
        next[s as usize] += 1;
    }

    // Walk the links from the primary row, emitting one byte per step
    try_grow(out, end)?;
    let mut idx = links[key as usize] as usize;
    for _ in 0..end {
        out.push(bwt_in[idx]);
        idx = links[idx] as usize;
    }
    Ok(())
}

/// Self-check of a rotation order: it must be a permutation, adjacent rotations must be
/// non-decreasing with ties ordered by start index, and the transform it yields must invert
/// back to the block. Quadratic in the worst case, so meant for tests.
pub fn verify_order(block: &[u8], order: &[u32]) -> Result<()> {
    check_block(block)?;
    if order.len() != block.len() {
        return Err(BscError::corrupt("suffix order length differs from block"));
    }
    verify_permutation(order)?;
    for pair in order.windows(2) {
        let (a, b) = (pair[0] as usize, pair[1] as usize);
        match block_compare(a, b, block) {
            std::cmp::Ordering::Less => {}
            std::cmp::Ordering::Equal if a < b => {}
            _ => {
                return Err(BscError::corrupt(format!(
                    "rotations {} and {} are out of order",
                    a, b
                )))
            }
        }
    }
    let (key, bwt) = bwt_encode_with_order(block, order)?;
    if bwt_decode(key, &bwt)? != block {
        return Err(BscError::corrupt("suffix order does not invert to the block"));
    }
    Ok(())
}

/// Every index 0..n appears exactly once.
fn verify_permutation(order: &[u32]) -> Result<()> {
    let mut seen: Vec<bool> = try_alloc(order.len())?;
    for &el in order {
        match seen.get_mut(el as usize) {
            Some(flag) if !*flag => *flag = true,
            _ => return Err(BscError::corrupt(format!("suffix order repeats or skips {}", el))),
        }
    }
    Ok(())
}

/// compare the rotations starting at a and b, wrapping around the end of the block
fn block_compare(a: usize, b: usize, block: &[u8]) -> std::cmp::Ordering {
    let min = std::cmp::min(block[a..].len(), block[b..].len());

    // Lexicographical comparison
    let mut result = block[a..a + min].cmp(&block[b..b + min]);

    // Implement wraparound if needed
    if result == std::cmp::Ordering::Equal {
        if a < b {
            let to_end = block.len() - a - min;
            result = block[(a + min)..].cmp(&block[..to_end]);
            if result == std::cmp::Ordering::Equal {
                let rest_of_block = block.len() - to_end - min;
                return block[..rest_of_block].cmp(&block[to_end..(to_end + rest_of_block)]);
            }
        } else {
            let to_end = block.len() - b - min;
            result = block[..to_end].cmp(&block[(b + min)..]);
            if result == std::cmp::Ordering::Equal {
                let rest_of_block = block.len() - to_end - min;
                return block[to_end..(to_end + rest_of_block)].cmp(&block[..rest_of_block]);
            }
        }
    }
    result
}

pub(crate) fn check_block(block: &[u8]) -> Result<()> {
    if block.is_empty() {
        return Err(BscError::invalid("Block must hold at least one byte"));
    }
    if block.len() > MAX_BLOCK_SIZE {
        return Err(BscError::invalid(format!(
            "Block of {} bytes exceeds the {} byte ceiling",
            block.len(),
            MAX_BLOCK_SIZE
        )));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn naive_order(block: &[u8]) -> Vec<u32> {
        let mut order = (0..block.len() as u32).collect::<Vec<u32>>();
        order.sort_by(|&a, &b| block_compare(a as usize, b as usize, block).then(a.cmp(&b)));
        order
    }

    #[test]
    fn banana_order_test() {
        assert_eq!(suffix_order(b"banana").unwrap(), vec![5, 3, 1, 0, 4, 2]);
    }

    #[test]
    fn banana_bwt_test() {
        let (key, bwt) = bwt_encode(b"banana").unwrap();
        assert_eq!(bwt, b"nnbaaa".to_vec());
        assert_eq!(key, 3);
        assert_eq!(bwt_decode(key, &bwt).unwrap(), b"banana".to_vec());
    }

    #[test]
    fn single_byte_test() {
        assert_eq!(suffix_order(b"q").unwrap(), vec![0]);
        let (key, bwt) = bwt_encode(b"q").unwrap();
        assert_eq!((key, bwt.as_slice()), (0, b"q".as_slice()));
        assert_eq!(bwt_decode(key, &bwt).unwrap(), b"q".to_vec());
    }

    #[test]
    fn periodic_tie_break_test() {
        // Equal rotations must come out in index order
        assert_eq!(suffix_order(b"abab").unwrap(), vec![0, 2, 1, 3]);
        assert_eq!(suffix_order(b"aaaa").unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(suffix_order(b"babab").unwrap(), naive_order(b"babab"));
        assert_eq!(suffix_order(b"cabcab").unwrap(), vec![1, 4, 2, 5, 0, 3]);
        let (key, bwt) = bwt_encode(b"abab").unwrap();
        assert_eq!((key, bwt.as_slice()), (0, b"bbaa".as_slice()));
    }

    #[test]
    fn degenerate_blocks_test() {
        let run = vec![7_u8; 5000];
        let sorted: Vec<u8> = (0..=255).collect();
        let pattern: Vec<u8> = b"xyz".iter().cycle().take(3000).copied().collect();
        for block in [run, sorted, pattern] {
            let order = suffix_order(&block).unwrap();
            verify_order(&block, &order).unwrap();
            let (key, bwt) = bwt_encode(&block).unwrap();
            assert_eq!(bwt_decode(key, &bwt).unwrap(), block);
        }
    }

    #[test]
    fn against_naive_test() {
        let mut seed = 99_u32;
        for len in 1..150 {
            let block: Vec<u8> = (0..len)
                .map(|_| {
                    seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
                    b"ab"[(seed >> 24) as usize % 2]
                })
                .collect();
            assert_eq!(suffix_order(&block).unwrap(), naive_order(&block), "{:?}", block);
        }
    }

    #[test]
    fn order_buffer_reuse_test() {
        let mut order = Vec::new();
        suffix_order_into(b"the order buffer keeps its allocation", &mut order).unwrap();
        let ptr = order.as_ptr();
        // a periodic block is expanded inside the same buffer
        suffix_order_into(b"cabcab", &mut order).unwrap();
        assert_eq!(order, vec![1, 4, 2, 5, 0, 3]);
        assert_eq!(order.as_ptr(), ptr);
        suffix_order_into(b"banana", &mut order).unwrap();
        assert_eq!(order, vec![5, 3, 1, 0, 4, 2]);
        assert_eq!(order.as_ptr(), ptr);
    }

    #[test]
    fn periodic_expansion_test() {
        let block: Vec<u8> = b"abcab".iter().cycle().take(5 * 7).copied().collect();
        assert_eq!(suffix_order(&block).unwrap(), naive_order(&block));
    }

    #[test]
    fn empty_block_test() {
        assert!(matches!(suffix_order(b""), Err(BscError::InvalidInput(_))));
        assert!(matches!(bwt_encode(b""), Err(BscError::InvalidInput(_))));
        assert!(matches!(bwt_decode(0, b""), Err(BscError::InvalidInput(_))));
    }

    #[test]
    fn bad_primary_test() {
        assert!(matches!(bwt_decode(6, b"nnbaaa"), Err(BscError::CorruptStream(_))));
    }

    #[test]
    fn verify_rejects_bad_order_test() {
        assert!(verify_order(b"banana", &[5, 3, 1, 0, 2, 4]).is_err());
        assert!(verify_order(b"banana", &[5, 3, 1, 0, 4, 4]).is_err());
        assert!(verify_order(b"abab", &[2, 0, 1, 3]).is_err());
        assert!(verify_order(b"banana", &[5, 3, 1, 0, 4, 2]).is_ok());
    }

    #[test]
    fn block_compare_test() {
        use std::cmp::Ordering;
        assert_eq!(block_compare(1, 3, b"banana"), Ordering::Greater);
        assert_eq!(block_compare(5, 3, b"banana"), Ordering::Less);
        assert_eq!(block_compare(0, 2, b"abab"), Ordering::Equal);
    }
}
