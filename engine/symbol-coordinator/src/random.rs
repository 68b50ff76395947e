//! Random sources for symbol placement

use rand::rngs::OsRng;
use rand::Rng;

/// Source of uniform worker indices
pub trait RandomSource: Send {
    /// Draw an index in `0..upper`; callers guarantee `upper >= 1`
    fn index_below(&mut self, upper: usize) -> usize;
}

/// Operating-system CSPRNG
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn index_below(&mut self, upper: usize) -> usize {
        let mut rng = OsRng;
        rng.gen_range(0..upper)
    }
}

/// Replays a fixed list of draws, cycling when exhausted
///
/// Each draw is reduced modulo `upper`, so scripts stay in range for any pool size.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    draws: Vec<usize>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(draws: impl Into<Vec<usize>>) -> Self {
        Self { draws: draws.into(), cursor: 0 }
    }
}

impl RandomSource for ScriptedRandom {
    fn index_below(&mut self, upper: usize) -> usize {
        if self.draws.is_empty() {
            return 0;
        }
        let draw = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        draw % upper
    }
}
