//! Buffers reused from one block to the next.
//!
//! Each block-processing slot owns one `Workspace`. A caller that compresses many blocks
//! keeps the workspace (or a `WorkspacePool` of them, one per worker) alive between calls
//! so the transform and symbol buffers are allocated once and grown only when a larger block
//! comes along. No model state lives here: every call starts from fresh statistics.
//!
use crate::error::Result;
use crate::tools::options::Config;

/// Intermediate buffers of one block pipeline.
#[derive(Debug, Default)]
pub struct Workspace {
    /// LZP side of the block: filter output when compressing, its reversal when decompressing
    pub(crate) filtered: Vec<u8>,
    /// Transform output on the way in, rank/run output on the way back
    pub(crate) bwt: Vec<u8>,
    /// Rotation order when compressing, inverse transform links when decompressing
    pub(crate) links: Vec<u32>,
    /// Rank/run symbol stream
    pub(crate) symbols: Vec<u16>,
    /// Inverse transform output
    pub(crate) restored: Vec<u8>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compress one block into a self-contained encoded block.
    pub fn compress(&mut self, block: &[u8], config: &Config) -> Result<Vec<u8>> {
        super::compress::compress_block(self, block, config)
    }

    /// Decompress one encoded block, checking its declared size against `config`.
    pub fn decompress(&mut self, encoded: &[u8], config: &Config) -> Result<Vec<u8>> {
        super::decompress::decompress_block(self, encoded, config)
    }

    /// Bytes currently held by the buffers.
    pub fn capacity(&self) -> usize {
        self.filtered.capacity()
            + self.bwt.capacity()
            + self.restored.capacity()
            + self.links.capacity() * 4
            + self.symbols.capacity() * 2
    }

    /// Drop all buffers.
    pub fn release(&mut self) {
        *self = Self::default();
    }
}

/// One workspace per block-processing slot.
#[derive(Debug, Default)]
pub struct WorkspacePool {
    slots: Vec<Workspace>,
}

impl WorkspacePool {
    pub fn new(slots: usize) -> Self {
        Self {
            slots: (0..slots).map(|_| Workspace::new()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Workspace of slot `idx`, if there is one.
    pub fn slot(&mut self, idx: usize) -> Option<&mut Workspace> {
        self.slots.get_mut(idx)
    }

    /// Every slot at once, so each can be handed to its own worker.
    pub fn slots_mut(&mut self) -> std::slice::IterMut<'_, Workspace> {
        self.slots.iter_mut()
    }
}
