/// Probability that the next bit is a one, kept as two counters that adapt at different rates.
///
/// The fast counter follows local changes, the slow one holds the long term estimate. The
/// coder sees their average, scaled to 12 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitModel {
    fast: u16,
    slow: u16,
}

const FAST_RATE: u32 = 4;
const SLOW_RATE: u32 = 7;

impl Default for BitModel {
    fn default() -> Self {
        Self::new()
    }
}

impl BitModel {
    /// Even odds.
    pub const fn new() -> Self {
        Self {
            fast: 1 << 15,
            slow: 1 << 15,
        }
    }

    /// 12 bit probability of a one, never 0 or 4096.
    #[inline(always)]
    pub fn p(&self) -> u32 {
        ((self.fast as u32 + self.slow as u32) >> 5).clamp(1, 4095)
    }

    #[inline(always)]
    pub fn update(&mut self, bit: bool) {
        if bit {
            self.fast += (u16::MAX - self.fast) >> FAST_RATE;
            self.slow += (u16::MAX - self.slow) >> SLOW_RATE;
        } else {
            self.fast -= self.fast >> FAST_RATE;
            self.slow -= self.slow >> SLOW_RATE;
        }
    }
}
