//! A block-sorting compressor.
//!
//! Each block of up to `MAX_BLOCK_SIZE` bytes is compressed on its own:
//! - an optional LZP pre-filter replaces long repeats predicted from the previous four bytes,
//! - a Burrows Wheeler Transform, sorted with SA-IS, clusters bytes by their following context
//!   (or the Sort Transform, which looks at a fixed number of context bytes only),
//! - move-to-front and zero-run coding turn the clusters into small integers,
//! - an adaptive binary range coder codes those integers against context models.
//!
//! The encoded block carries a header with the sizes of every stage, the filter parameters and
//! an xxh32 checksum of the original bytes. Decompression needs nothing but the encoded block.
//!
//! Basic usage:
//!
//! ```
//! use blocksort::{compress, decompress, Config};
//!
//! let block = b"banana bandana banana bandana";
//! let encoded = compress(block, &Config::default()).unwrap();
//! assert_eq!(decompress(&encoded).unwrap(), block.to_vec());
//! ```
//!
//! Blocks share no state, so independent blocks may be compressed in parallel, each with its
//! own `Workspace`.
//!
pub mod bitstream;
pub mod bwt_algorithms;
pub mod compression;
pub mod entropy_coding;
pub mod error;
pub mod tools;

pub use compression::compress::compress;
pub use compression::decompress::{decompress, decompress_with};
pub use compression::header::{block_info, BlockInfo, HEADER_SIZE};
pub use compression::workspace::{Workspace, WorkspacePool};
pub use error::{BscError, Result};
pub use tools::options::{Config, LzpParams, Transform, DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE};
