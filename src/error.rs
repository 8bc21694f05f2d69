//! Error type shared by every stage of the block pipeline.
//!
//! No stage attempts partial recovery. A block either compresses completely or the
//! error is handed back to the caller, and decompression never returns best-effort output.

use thiserror::Error;

/// Errors returned by compression and decompression of a block.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BscError {
    /// Empty block, block above the configured ceiling, or bad configuration
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unknown magic, version or filter flag
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Checksum mismatch, truncated or inconsistent bitstream
    #[error("Corrupt stream: {0}")]
    CorruptStream(String),

    /// A buffer for the declared block size could not be allocated
    #[error("Capacity exceeded: could not allocate {requested} bytes")]
    CapacityExceeded {
        /// Number of bytes requested
        requested: usize,
    },
}

impl BscError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        BscError::InvalidInput(msg.into())
    }

    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        BscError::CorruptStream(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        BscError::UnsupportedFormat(msg.into())
    }
}

impl From<BscError> for std::io::Error {
    fn from(err: BscError) -> Self {
        let kind = match err {
            BscError::InvalidInput(_) => std::io::ErrorKind::InvalidInput,
            BscError::CapacityExceeded { .. } => std::io::ErrorKind::OutOfMemory,
            _ => std::io::ErrorKind::InvalidData,
        };
        std::io::Error::new(kind, err)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BscError>;

/// Allocate a zeroed buffer of `len` elements, reporting allocation failure as
/// `CapacityExceeded` instead of aborting.
pub(crate) fn try_alloc<T: Clone + Default>(len: usize) -> Result<Vec<T>> {
    let mut buf = try_with_capacity(len)?;
    buf.resize(len, T::default());
    Ok(buf)
}

/// Empty buffer with room for `len` elements, or `CapacityExceeded`.
pub(crate) fn try_with_capacity<T>(len: usize) -> Result<Vec<T>> {
    let mut buf: Vec<T> = Vec::new();
    try_grow(&mut buf, len)?;
    Ok(buf)
}

/// Clear a reused buffer and make sure it can hold `len` elements. Keeps the existing
/// allocation when it is already large enough.
pub(crate) fn try_grow<T>(buf: &mut Vec<T>, len: usize) -> Result<()> {
    buf.clear();
    buf.try_reserve_exact(len)
        .map_err(|_| BscError::CapacityExceeded {
            requested: len.saturating_mul(std::mem::size_of::<T>()),
        })
}
