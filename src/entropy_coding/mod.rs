//! The entropy_coding module is the back end of the block compressor.
//!
//! The rank/run symbol stream is broken into binary decisions. Each decision is coded by a
//! carryless binary arithmetic coder against the probability held by an adaptive bit model,
//! and the model is then nudged toward the bit that was actually seen.
//!
//! Which model codes a decision depends on a small context: whether the coder is inside a
//! zero-run, the digit position within that run, and the magnitude class of the previous rank.
//! All model state lives in one `RankCoder` per block, so blocks never share statistics and can
//! be decoded independently.
//!
//! The coding itself is inherently sequential and does not benefit from multithreading.
//!
pub mod model;
pub mod range_coder;
pub mod rank_coder;
