use log::debug;

use super::header::{checksum, Header, HEADER_SIZE};
use super::workspace::Workspace;
use crate::bwt_algorithms::bwt_sort::bwt_decode_into;
use crate::bwt_algorithms::st::st_decode_into;
use crate::entropy_coding::rank_coder::decode_symbols;
use crate::error::{try_with_capacity, BscError, Result};
use crate::tools::lzp::lzp_decode_into;
use crate::tools::mtf_rle::rle2_mtf_decode_into;
use crate::tools::options::{Config, Transform, MAX_BLOCK_SIZE};

/// Decompress one encoded block, accepting any size up to the hard ceiling.
pub fn decompress(encoded: &[u8]) -> Result<Vec<u8>> {
    let config = Config::new().without_lzp().with_max_block_size(MAX_BLOCK_SIZE);
    Workspace::new().decompress(encoded, &config)
}

/// Decompress one encoded block, refusing blocks larger than the configured ceiling.
pub fn decompress_with(encoded: &[u8], config: &Config) -> Result<Vec<u8>> {
    Workspace::new().decompress(encoded, config)
}

/// Decompression is the inverse of compression, run from the header's recorded sizes:
/// - Range decoding of exactly symbol_count symbols from exactly payload_length bytes.
/// - RLE2 and MTF: expand the zero runs and ranks back to the transform output.
/// - BWT or ST reversal from the primary index.
/// - LZP reversal, if the flag is set.
/// - Checksum of the result against the header.
pub(crate) fn decompress_block(
    ws: &mut Workspace,
    encoded: &[u8],
    config: &Config,
) -> Result<Vec<u8>> {
    config.validate()?;
    let header = Header::parse(encoded)?;
    let size = header.original_length as usize;
    if size > config.max_block_size {
        return Err(BscError::CapacityExceeded { requested: size });
    }
    if encoded.len() < header.encoded_len() {
        return Err(BscError::corrupt(format!(
            "encoded block truncated: {} of {} bytes",
            encoded.len(),
            header.encoded_len()
        )));
    }
    if encoded.len() > header.encoded_len() {
        return Err(BscError::corrupt(format!(
            "{} trailing bytes after the encoded block",
            encoded.len() - header.encoded_len()
        )));
    }

    let payload = &encoded[HEADER_SIZE..];
    decode_symbols(payload, header.symbol_count as usize, &mut ws.symbols)?;
    rle2_mtf_decode_into(&ws.symbols, header.filtered_length as usize, &mut ws.bwt)?;
    match header.transform() {
        Transform::Bwt => {
            bwt_decode_into(header.primary_index, &ws.bwt, &mut ws.links, &mut ws.restored)?
        }
        Transform::St(depth) => st_decode_into(
            header.primary_index,
            depth,
            &ws.bwt,
            &mut ws.links,
            &mut ws.restored,
        )?,
    }

    let block: &[u8] = match header.lzp_params() {
        Some(params) => {
            lzp_decode_into(&ws.restored, &params, size, &mut ws.filtered)?;
            &ws.filtered
        }
        None => &ws.restored,
    };

    if checksum(block) != header.checksum {
        return Err(BscError::corrupt("checksum mismatch"));
    }
    debug!(
        "Decoded block of {} bytes from {} payload bytes",
        block.len(),
        payload.len()
    );
    let mut out = try_with_capacity(block.len())?;
    out.extend_from_slice(block);
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compression::compress::compress;
    use crate::tools::options::LzpParams;

    #[test]
    fn banana_test() {
        let enc = compress(b"banana", &Config::new()).unwrap();
        assert_eq!(decompress(&enc).unwrap(), b"banana".to_vec());
    }

    #[test]
    fn lzp_roundtrip_test() {
        let text = b"abcdefgh".repeat(500);
        let config = Config::new().with_lzp(LzpParams::new(12, 16));
        let enc = compress(&text, &config).unwrap();
        assert!(Header::parse(&enc).unwrap().lzp_params().is_some());
        assert_eq!(decompress(&enc).unwrap(), text);
    }

    #[test]
    fn sort_transform_test() {
        let text = b"sort transform blocks decode without any configuration. ".repeat(30);
        for depth in 3..=8 {
            for config in [Config::new(), Config::new().without_lzp()] {
                let config = config.with_transform(Transform::St(depth));
                let enc = compress(&text, &config).unwrap();
                assert_eq!(decompress(&enc).unwrap(), text, "ST{}", depth);
            }
        }
    }

    #[test]
    fn ceiling_test() {
        let block = vec![7_u8; 1000];
        let enc = compress(&block, &Config::new()).unwrap();
        let small = Config::new().with_max_block_size(999);
        assert!(matches!(
            decompress_with(&enc, &small),
            Err(BscError::CapacityExceeded { requested: 1000 })
        ));
        assert_eq!(decompress_with(&enc, &Config::new()).unwrap(), block);
    }

    #[test]
    fn length_mismatch_test() {
        let enc = compress(b"mississippi", &Config::new()).unwrap();
        assert!(matches!(
            decompress(&enc[..enc.len() - 1]),
            Err(BscError::CorruptStream(_))
        ));
        let mut padded = enc.clone();
        padded.push(0);
        assert!(matches!(decompress(&padded), Err(BscError::CorruptStream(_))));
    }

    #[test]
    fn checksum_test() {
        // Rewrite the stored checksum with a valid header checksum: only the data check can fail.
        let enc = compress(b"mississippi", &Config::new()).unwrap();
        let mut header = Header::parse(&enc).unwrap();
        header.checksum ^= 1;
        let mut forged = Vec::new();
        header.write(&mut forged);
        forged.extend_from_slice(&enc[HEADER_SIZE..]);
        assert_eq!(
            decompress(&forged),
            Err(BscError::corrupt("checksum mismatch"))
        );
    }
}
