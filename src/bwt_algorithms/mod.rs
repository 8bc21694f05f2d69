//! The bwt_algorithms module forms the sorting subsystem of the block compressor.
//!
//! The Burrows-Wheeler Transform sorts every rotation of a block and keeps the byte that precedes
//! each rotation. Bytes that share a following context end up next to each other, which turns
//! repeated contexts into runs.
//!
//! Sorting uses SA-IS, a linear time induced-sorting suffix array algorithm. The block is first
//! rotated to its least rotation and reduced to its Lyndon root, where suffix order and rotation
//! order coincide, so no sentinel byte has to be reserved from the alphabet.
//!
//! The Sort Transform is the cheaper alternative: rotations are compared on a fixed number of
//! leading bytes only, with ties left in block order.
//!
pub mod bwt_sort;
pub(crate) mod sais;
pub mod st;
