//! Deterministic PRNG for placement jitter.
//!
//! Uses the SplitMix64 algorithm: fast, 8 bytes of state, and seedable from
//! config so a replayed session lands its items on the same coordinates.

/// SplitMix64 pseudo-random number generator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    /// Create a new RNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform value in `[0, 1)`, built from the top 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform offset in `[-radius, radius]`. A non-positive radius yields 0.
    pub fn jitter(&mut self, radius: f64) -> f64 {
        if radius <= 0.0 {
            return 0.0;
        }
        (self.next_f64() * 2.0 - 1.0) * radius
    }

    /// Get the internal state.
    pub fn state(&self) -> u64 {
        self.state
    }
}
