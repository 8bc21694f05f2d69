//! Move-to-front transform and zero-run-length encoding of BWT output (the Rank/Run stage).
//!
//! The move-to-front transform turns clustered bytes into small ranks. Rank zero dominates
//! after a block transform, so runs of rank zero are written as a bijective base-2 number
//! using two digit symbols, RUNA and RUNB, least significant digit first.
//!
//! Symbol alphabet:
//! - `RUNA` (0) and `RUNB` (1): digits of a zero-run length
//! - `r + 1` (2..=256): a non-zero move-to-front rank `r`
//!
//! The move-to-front table starts as the identity and changes only with the symbols already
//! coded, so encoder and decoder stay in lockstep without side information.
//!
use crate::error::{BscError, Result};

pub const RUNA: u16 = 0;
pub const RUNB: u16 = 1;
/// Number of distinct symbols the stage can emit.
pub const ALPHABET_SIZE: usize = 257;

/// Move-to-front table shared by both directions.
struct MtfTable {
    index: [u8; 256],
}

impl MtfTable {
    fn new() -> Self {
        let mut index = [0_u8; 256];
        index
            .iter_mut()
            .enumerate()
            .for_each(|(i, el)| *el = i as u8);
        Self { index }
    }

    /// Rank of `byte`, moving it to the front.
    #[inline]
    fn encode(&mut self, byte: u8) -> usize {
        let idx = self.index.iter().position(|&c| c == byte).unwrap_or(0);
        self.promote(idx);
        idx
    }

    /// Byte at `rank`, moving it to the front.
    #[inline]
    fn decode(&mut self, rank: usize) -> u8 {
        let byte = self.index[rank];
        self.promote(rank);
        byte
    }

    #[inline]
    fn front(&self) -> u8 {
        self.index[0]
    }

    /// Shift everything in front of idx back one place and put idx's byte first.
    fn promote(&mut self, idx: usize) {
        let temp_sym = self.index[idx];
        self.index.copy_within(0..idx, 1);
        self.index[0] = temp_sym;
    }
}

/// Append the RUNA/RUNB digits of a run of `zeros` rank-zero bytes.
fn push_run(out: &mut Vec<u16>, zeros: usize) {
    if zeros == 0 {
        return;
    }
    // Bijective base 2: digit values are 1 (RUNA) and 2 (RUNB).
    let mut n = zeros;
    loop {
        out.push(((n - 1) & 1) as u16);
        if n <= 2 {
            break;
        }
        n = (n - 1) >> 1;
    }
}

/// Does the move-to-front transform and zero-run encoding of BWT output.
pub fn rle2_mtf_encode(block: &[u8]) -> Vec<u16> {
    let mut out = Vec::with_capacity(block.len() / 2 + 16);
    rle2_mtf_encode_into(block, &mut out);
    out
}

/// As `rle2_mtf_encode`, writing into a reusable buffer (cleared first).
pub fn rle2_mtf_encode_into(block: &[u8], out: &mut Vec<u16>) {
    out.clear();
    let mut mtf = MtfTable::new();
    let mut zeros = 0_usize;

    for &byte in block {
        // Fast path: the front symbol repeats
        if byte == mtf.front() {
            zeros += 1;
            continue;
        }
        // Not a zero, so output any pending zeros first
        push_run(out, zeros);
        zeros = 0;
        let rank = mtf.encode(byte);
        out.push(rank as u16 + 1);
    }
    // Write any trailing zeros
    push_run(out, zeros);
}

/// Undo the zero-run and move-to-front coding. `size` is the exact length the output must reach.
pub fn rle2_mtf_decode(data_in: &[u16], size: usize) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    rle2_mtf_decode_into(data_in, size, &mut out)?;
    Ok(out)
}

/// As `rle2_mtf_decode`, writing into a reusable buffer (cleared first).
pub fn rle2_mtf_decode_into(data_in: &[u16], size: usize, out: &mut Vec<u8>) -> Result<()> {
    out.clear();
    out.try_reserve_exact(size)
        .map_err(|_| BscError::CapacityExceeded { requested: size })?;
    let mut mtf = MtfTable::new();

    // Counters for a pending RUNA/RUNB sequence
    let mut zeros = 0_usize;
    let mut bit_multiplier = 1_usize;

    for &code in data_in {
        match code {
            RUNA | RUNB => {
                zeros += bit_multiplier << code;
                bit_multiplier <<= 1;
                // Anything beyond the block length is a damaged stream
                if zeros > size - out.len() {
                    return Err(BscError::corrupt("zero run overflows the block"));
                }
            }
            n if (n as usize) < ALPHABET_SIZE => {
                flush_run(out, mtf.front(), &mut zeros, &mut bit_multiplier);
                if out.len() == size {
                    return Err(BscError::corrupt("rank symbol past the end of the block"));
                }
                out.push(mtf.decode(n as usize - 1));
            }
            n => return Err(BscError::corrupt(format!("invalid rank symbol {}", n))),
        }
    }
    flush_run(out, mtf.front(), &mut zeros, &mut bit_multiplier);

    if out.len() != size {
        return Err(BscError::corrupt(format!(
            "rank stream decoded to {} bytes, expected {}",
            out.len(),
            size
        )));
    }
    Ok(())
}

fn flush_run(out: &mut Vec<u8>, front: u8, zeros: &mut usize, bit_multiplier: &mut usize) {
    if *zeros > 0 {
        out.resize(out.len() + *zeros, front);
        *zeros = 0;
        *bit_multiplier = 1;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn run_digits_test() {
        let digits = |zeros| {
            let mut out = vec![];
            push_run(&mut out, zeros);
            out
        };
        assert_eq!(digits(0), vec![]);
        assert_eq!(digits(1), vec![RUNA]);
        assert_eq!(digits(2), vec![RUNB]);
        assert_eq!(digits(3), vec![RUNA, RUNA]);
        assert_eq!(digits(4), vec![RUNB, RUNA]);
        assert_eq!(digits(5), vec![RUNA, RUNB]);
        assert_eq!(digits(6), vec![RUNB, RUNB]);
        assert_eq!(digits(7), vec![RUNA, RUNA, RUNA]);
    }

    #[test]
    fn encode_test() {
        // n n b a a a with the identity table:
        // n -> rank 110, n -> zero, b -> rank 99 (n moved ahead of it),
        // a -> rank 99 (b and n ahead of it), a a -> two zeros
        let out = rle2_mtf_encode(b"nnbaaa");
        assert_eq!(out, vec![111, RUNA, 100, 100, RUNB]);
        assert_eq!(rle2_mtf_decode(&out, 6).unwrap(), b"nnbaaa".to_vec());
    }

    #[test]
    fn leading_zero_bytes_test() {
        // Byte 0 starts at the front, so a leading run of it is a zero run
        let out = rle2_mtf_encode(&[0, 0, 0, 1]);
        assert_eq!(out, vec![RUNA, RUNA, 2]);
        assert_eq!(rle2_mtf_decode(&out, 4).unwrap(), vec![0, 0, 0, 1]);
    }

    #[test]
    fn long_run_test() {
        let block = vec![b'z'; 100_000];
        let out = rle2_mtf_encode(&block);
        // one rank symbol plus about log2 of the run
        assert!(out.len() < 20);
        assert_eq!(rle2_mtf_decode(&out, block.len()).unwrap(), block);
    }

    #[test]
    fn roundtrip_all_bytes_test() {
        let block: Vec<u8> = (0..=255_u8).rev().chain(0..=255).chain([9, 9, 9]).collect();
        let out = rle2_mtf_encode(&block);
        assert_eq!(rle2_mtf_decode(&out, block.len()).unwrap(), block);
    }

    #[test]
    fn corrupt_stream_test() {
        let out = rle2_mtf_encode(b"nnbaaa");
        // wrong expected length
        assert!(matches!(rle2_mtf_decode(&out, 5), Err(BscError::CorruptStream(_))));
        assert!(matches!(rle2_mtf_decode(&out, 7), Err(BscError::CorruptStream(_))));
        // symbol outside the alphabet
        assert!(matches!(rle2_mtf_decode(&[300], 1), Err(BscError::CorruptStream(_))));
        // a run far longer than the block
        let bomb = vec![RUNB; 40];
        assert!(matches!(rle2_mtf_decode(&bomb, 10), Err(BscError::CorruptStream(_))));
    }
}
