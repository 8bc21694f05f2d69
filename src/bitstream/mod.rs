//! The bitstream module forms the byte-level I/O of the block compressor.
//!
//! Headers are written and read field by field, big-endian, through these two small helpers.
//! Reading is bounds checked: a short input shows up as `None`, never as a panic, so the
//! codec can report a truncated block as corrupt.
//!
pub mod bytereader;
pub mod bytewriter;
