use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of commit ids for the interpreter.
///
/// Abstracted behind a trait so tests can substitute a fixed sequence and
/// assert exact transcripts.
pub trait CommitIdSource {
    /// Produce the next 7-hex-character commit id
    fn next_id(&mut self) -> String;
}

/// Seedable id source. The same seed always yields the same id sequence.
#[derive(Debug)]
pub struct SeededIds {
    rng: StdRng,
}

impl SeededIds {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl CommitIdSource for SeededIds {
    fn next_id(&mut self) -> String {
        let bits: u32 = self.rng.random();
        // 28 bits -> exactly 7 hex digits
        format!("{:07x}", bits & 0x0FFF_FFFF)
    }
}

impl Default for SeededIds {
    fn default() -> Self {
        Self::new(0)
    }
}
