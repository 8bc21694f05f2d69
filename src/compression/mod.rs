//! The compression module is the block codec: it runs a block through every stage and wraps
//! the result in a header, and undoes both on the way back.
//!
//! Compression happens in the following steps:
//! - LZP pre-filter (optional): replace long repeats predicted from a 4 byte context.
//! - Burrows Wheeler Transform: sort all rotations so bytes with equal contexts cluster.
//! - Move To Front transform: turn the clustered bytes into mostly small ranks.
//! - Zero-run coding: write runs of rank zero as RUNA/RUNB digits.
//! - Range coding: code the symbols bit by bit against adaptive context models.
//!
//! Decompression follows the inverse of the compression process and checks the result
//! against the checksum of the original bytes.
//!
//! Every block is independent. Nothing is shared between calls except the buffers of a
//! `Workspace`, which carry no state.
//!
pub mod compress;
pub mod decompress;
pub mod header;
pub mod workspace;
