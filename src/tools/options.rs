//! Block codec configuration: the size ceiling, the block sort and the optional LZP pre-filter.
//!
use crate::error::{BscError, Result};

/// Hard ceiling for a block. Keeps every index inside a u32.
pub const MAX_BLOCK_SIZE: usize = 1 << 30;
/// Default block size ceiling (25 MiB).
pub const DEFAULT_BLOCK_SIZE: usize = 25 * 1024 * 1024;

/// Parameters of the LZP pre-filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzpParams {
    /// log2 of the number of hash table slots (10..=28)
    pub hash_bits: u8,
    /// Shortest match worth replacing with a reference (4..=255)
    pub min_len: u8,
}

impl LzpParams {
    pub const MIN_HASH_BITS: u8 = 10;
    pub const MAX_HASH_BITS: u8 = 28;
    pub const MIN_MATCH: u8 = 4;

    pub fn new(hash_bits: u8, min_len: u8) -> Self {
        Self { hash_bits, min_len }
    }

    /// Check that both parameters are in range.
    pub fn validate(&self) -> Result<()> {
        if !(Self::MIN_HASH_BITS..=Self::MAX_HASH_BITS).contains(&self.hash_bits) {
            return Err(BscError::invalid(format!(
                "LZP hash bits must be {}..={}, got {}",
                Self::MIN_HASH_BITS,
                Self::MAX_HASH_BITS,
                self.hash_bits
            )));
        }
        if self.min_len < Self::MIN_MATCH {
            return Err(BscError::invalid(format!(
                "LZP minimum match must be at least {}, got {}",
                Self::MIN_MATCH,
                self.min_len
            )));
        }
        Ok(())
    }
}

impl Default for LzpParams {
    fn default() -> Self {
        Self::new(16, 128)
    }
}

/// Block sort run ahead of the rank/run stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Burrows-Wheeler Transform: rotations sorted in full
    Bwt,
    /// Sort Transform: rotations sorted on their first `depth` bytes, ties kept in block order
    St(u8),
}

impl Transform {
    pub const MIN_ST_DEPTH: u8 = 3;
    pub const MAX_ST_DEPTH: u8 = 8;

    pub fn validate(&self) -> Result<()> {
        match *self {
            Transform::Bwt => Ok(()),
            Transform::St(depth) if (Self::MIN_ST_DEPTH..=Self::MAX_ST_DEPTH).contains(&depth) => {
                Ok(())
            }
            Transform::St(depth) => Err(BscError::invalid(format!(
                "Sort Transform depth must be {}..={}, got {}",
                Self::MIN_ST_DEPTH,
                Self::MAX_ST_DEPTH,
                depth
            ))),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Transform::Bwt
    }
}

/// Everything the caller chooses per block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Largest block accepted by compress and declared by a header on decompress
    pub max_block_size: usize,
    /// Run the LZP pre-filter before sorting. None disables it.
    pub lzp: Option<LzpParams>,
    /// Block sort used by compress. Decompression reads it from the header.
    pub transform: Transform,
}

impl Config {
    pub fn new() -> Self {
        Self {
            max_block_size: DEFAULT_BLOCK_SIZE,
            lzp: Some(LzpParams::default()),
            transform: Transform::default(),
        }
    }

    pub fn with_max_block_size(mut self, max_block_size: usize) -> Self {
        self.max_block_size = max_block_size;
        self
    }

    pub fn with_lzp(mut self, params: LzpParams) -> Self {
        self.lzp = Some(params);
        self
    }

    pub fn without_lzp(mut self) -> Self {
        self.lzp = None;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Reject ceilings of zero or above MAX_BLOCK_SIZE, bad LZP parameters and Sort Transform
    /// depths outside 3..=8.
    pub fn validate(&self) -> Result<()> {
        if self.max_block_size == 0 || self.max_block_size > MAX_BLOCK_SIZE {
            return Err(BscError::invalid(format!(
                "Block size ceiling must be 1..={}, got {}",
                MAX_BLOCK_SIZE, self.max_block_size
            )));
        }
        if let Some(params) = &self.lzp {
            params.validate()?;
        }
        self.transform.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_test() {
        let cfg = Config::default();
        assert_eq!(cfg.max_block_size, DEFAULT_BLOCK_SIZE);
        assert_eq!(cfg.lzp, Some(LzpParams::new(16, 128)));
        assert_eq!(cfg.transform, Transform::Bwt);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn builder_test() {
        let cfg = Config::new().without_lzp().with_max_block_size(1000);
        assert_eq!(cfg.lzp, None);
        assert_eq!(cfg.max_block_size, 1000);
    }

    #[test]
    fn validate_test() {
        assert!(Config::new().with_max_block_size(0).validate().is_err());
        assert!(Config::new()
            .with_max_block_size(MAX_BLOCK_SIZE + 1)
            .validate()
            .is_err());
        assert!(Config::new()
            .with_lzp(LzpParams::new(9, 32))
            .validate()
            .is_err());
        assert!(Config::new()
            .with_lzp(LzpParams::new(16, 3))
            .validate()
            .is_err());
        assert!(Config::new()
            .with_lzp(LzpParams::new(28, 4))
            .validate()
            .is_ok());
    }

    #[test]
    fn transform_validate_test() {
        for depth in [0, 2, 9, 255] {
            let cfg = Config::new().with_transform(Transform::St(depth));
            assert!(matches!(cfg.validate(), Err(BscError::InvalidInput(_))), "{}", depth);
        }
        for depth in 3..=8 {
            assert!(Config::new().with_transform(Transform::St(depth)).validate().is_ok());
        }
    }
}
