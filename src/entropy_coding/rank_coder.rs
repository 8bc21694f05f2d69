//! Context modelling of the rank/run symbol stream.
//!
//! Every symbol starts with a flag: run digit or rank. A run digit then costs one more bit
//! (RUNA or RUNB). A rank `r` in 1..=255 is split into its bucket `floor(log2(r))`, sent in
//! unary, and the bits below the leading one, sent through a binary tree of models per bucket.
//!
//! Contexts:
//! - the flag is keyed on the digit position while inside a run, else on the previous bucket
//! - run digits are keyed on their position in the run
//! - bucket bits are keyed on the previous bucket
//!
use super::model::BitModel;
use super::range_coder::{Decoder, Encoder};
use crate::error::{BscError, Result};
use crate::tools::mtf_rle::{ALPHABET_SIZE, RUNB};
use log::trace;

const BUCKETS: usize = 8;
/// Run digit positions with their own context. Longer runs share the last one.
const RUN_CONTEXTS: usize = 16;

/// Adaptive state for one block. Built fresh for every encode or decode pass.
pub struct RankCoder {
    flag: [BitModel; BUCKETS + RUN_CONTEXTS],
    digit: [BitModel; RUN_CONTEXTS],
    bucket: [[BitModel; BUCKETS - 1]; BUCKETS],
    mantissa: [[BitModel; 1 << (BUCKETS - 1)]; BUCKETS],
    /// Digits coded so far in the current run
    run_pos: usize,
    /// Bucket of the last rank
    prev_bucket: usize,
}

impl Default for RankCoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RankCoder {
    pub fn new() -> Self {
        Self {
            flag: [BitModel::new(); BUCKETS + RUN_CONTEXTS],
            digit: [BitModel::new(); RUN_CONTEXTS],
            bucket: [[BitModel::new(); BUCKETS - 1]; BUCKETS],
            mantissa: [[BitModel::new(); 1 << (BUCKETS - 1)]; BUCKETS],
            run_pos: 0,
            prev_bucket: 0,
        }
    }

    #[inline(always)]
    fn flag_ctx(&self) -> usize {
        if self.run_pos > 0 {
            BUCKETS + (self.run_pos - 1).min(RUN_CONTEXTS - 1)
        } else {
            self.prev_bucket
        }
    }

    #[inline(always)]
    fn digit_ctx(&self) -> usize {
        self.run_pos.min(RUN_CONTEXTS - 1)
    }

    /// Code one symbol of the rank/run alphabet.
    pub fn encode_symbol(&mut self, enc: &mut Encoder, sym: u16) {
        let ctx = self.flag_ctx();
        let is_digit = sym <= RUNB;
        enc.encode(is_digit, self.flag[ctx].p());
        self.flag[ctx].update(is_digit);

        if is_digit {
            let bit = sym == RUNB;
            let dctx = self.digit_ctx();
            let model = &mut self.digit[dctx];
            enc.encode(bit, model.p());
            model.update(bit);
            self.run_pos += 1;
            return;
        }

        let rank = (sym - 1) as usize;
        let b = (usize::BITS - 1 - rank.leading_zeros()) as usize;
        let models = &mut self.bucket[self.prev_bucket];
        for (i, model) in models.iter_mut().enumerate() {
            let bit = i < b;
            enc.encode(bit, model.p());
            model.update(bit);
            if !bit {
                break;
            }
        }

        let tree = &mut self.mantissa[b];
        let mut node = 1;
        for j in (0..b).rev() {
            let bit = (rank >> j) & 1 == 1;
            enc.encode(bit, tree[node].p());
            tree[node].update(bit);
            node = (node << 1) | bit as usize;
        }

        self.prev_bucket = b;
        self.run_pos = 0;
    }

    /// Decode one symbol. Always returns a symbol inside the alphabet.
    pub fn decode_symbol(&mut self, dec: &mut Decoder) -> Result<u16> {
        let ctx = self.flag_ctx();
        let is_digit = dec.decode(self.flag[ctx].p())?;
        self.flag[ctx].update(is_digit);

        if is_digit {
            let dctx = self.digit_ctx();
            let model = &mut self.digit[dctx];
            let bit = dec.decode(model.p())?;
            model.update(bit);
            self.run_pos += 1;
            return Ok(bit as u16);
        }

        let mut b = 0;
        let models = &mut self.bucket[self.prev_bucket];
        for model in models.iter_mut() {
            let bit = dec.decode(model.p())?;
            model.update(bit);
            if !bit {
                break;
            }
            b += 1;
        }

        let tree = &mut self.mantissa[b];
        let mut node = 1;
        for _ in 0..b {
            let bit = dec.decode(tree[node].p())?;
            tree[node].update(bit);
            node = (node << 1) | bit as usize;
        }
        // node now holds the rank with its leading one
        self.prev_bucket = b;
        self.run_pos = 0;
        Ok(node as u16 + 1)
    }
}

/// Entropy code a rank/run symbol stream, appending the payload to `out`. Returns the payload length.
pub fn encode_symbols(symbols: &[u16], out: &mut Vec<u8>) -> Result<usize> {
    if let Some(&bad) = symbols.iter().find(|&&s| s as usize >= ALPHABET_SIZE) {
        return Err(BscError::invalid(format!("symbol {} outside the rank alphabet", bad)));
    }
    let start = out.len();
    let mut coder = RankCoder::new();
    let mut enc = Encoder::new(out);
    for &sym in symbols {
        coder.encode_symbol(&mut enc, sym);
    }
    let len = enc.finish() - start;
    trace!("Entropy coded {} symbols into {} bytes", symbols.len(), len);
    Ok(len)
}

/// Decode exactly `count` symbols from `payload`, which must be consumed completely.
pub fn decode_symbols(payload: &[u8], count: usize, out: &mut Vec<u16>) -> Result<()> {
    out.clear();
    out.try_reserve_exact(count)
        .map_err(|_| BscError::CapacityExceeded {
            requested: count.saturating_mul(2),
        })?;
    let mut coder = RankCoder::new();
    let mut dec = Decoder::new(payload)?;
    for _ in 0..count {
        out.push(coder.decode_symbol(&mut dec)?);
    }
    dec.finish()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tools::mtf_rle::{rle2_mtf_encode, RUNA};

    fn roundtrip(symbols: &[u16]) -> usize {
        let mut payload = Vec::new();
        let len = encode_symbols(symbols, &mut payload).unwrap();
        assert_eq!(len, payload.len());
        let mut out = Vec::new();
        decode_symbols(&payload, symbols.len(), &mut out).unwrap();
        assert_eq!(out, symbols);
        len
    }

    #[test]
    fn every_symbol_test() {
        let symbols: Vec<u16> = (0..ALPHABET_SIZE as u16)
            .chain((0..ALPHABET_SIZE as u16).rev())
            .collect();
        roundtrip(&symbols);
    }

    #[test]
    fn empty_stream_test() {
        assert_eq!(roundtrip(&[]), 4);
    }

    #[test]
    fn skewed_stream_compresses_test() {
        // mostly short runs and low ranks, like real transform output
        let mut symbols = Vec::new();
        for i in 0..5_000_u16 {
            symbols.extend_from_slice(&[RUNA, RUNB, 2 + (i % 3), RUNA, 3]);
        }
        let len = roundtrip(&symbols);
        assert!(len < symbols.len() / 4, "{} bytes", len);
    }

    #[test]
    fn mtf_output_test() {
        let text = b"how much wood would a woodchuck chuck if a woodchuck could chuck wood";
        roundtrip(&rle2_mtf_encode(text));
    }

    #[test]
    fn appends_to_buffer_test() {
        let mut payload = vec![0xAA, 0xBB];
        let len = encode_symbols(&[5, RUNA, 9], &mut payload).unwrap();
        assert_eq!(payload.len(), len + 2);
        let mut out = Vec::new();
        decode_symbols(&payload[2..], 3, &mut out).unwrap();
        assert_eq!(out, vec![5, RUNA, 9]);
    }

    #[test]
    fn rejects_bad_symbol_test() {
        let mut payload = Vec::new();
        assert!(matches!(
            encode_symbols(&[2, 257], &mut payload),
            Err(BscError::InvalidInput(_))
        ));
    }

    #[test]
    fn count_mismatch_test() {
        let symbols: Vec<u16> = (2..200).collect();
        let mut payload = Vec::new();
        encode_symbols(&symbols, &mut payload).unwrap();
        let mut out = Vec::new();
        // asking for fewer symbols leaves payload bytes unread
        assert!(decode_symbols(&payload, 10, &mut out).is_err());
        // asking for more runs off the end
        assert!(decode_symbols(&payload, symbols.len() + 50, &mut out).is_err());
    }
}
