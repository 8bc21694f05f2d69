//! The tools module provides the byte-level stages around the block sort.
//!
//! The tools are:
//! - freq_count: byte frequency counts for the sorter buckets and the inverse transform.
//! - lzp: the LZP pre-filter and its inverse.
//! - mtf_rle: Move-To-Front transform and zero-run coding (integrated for speed).
//! - options: block size ceiling and pre-filter parameters.
//!
pub mod freq_count;
pub mod lzp;
pub mod mtf_rle;
pub mod options;
