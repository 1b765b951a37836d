//! Deterministic random numbers for battle start seeding and escape rolls.
//!
//! Randomness is derived from `(battle seed, nonce, combatant, context)` rather
//! than a stateful stream, so a replay with the same seed and the same tick
//! sequence draws exactly the same values no matter how many previews were
//! computed in between.

/// RNG oracle for deterministic random number generation.
///
/// Implementations must be deterministic and produce the same values
/// given the same seed.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Uniform value in `[0, upper)`. Returns 0 when `upper` is 0.
    fn below(&self, seed: u64, upper: u32) -> u32 {
        if upper == 0 {
            return 0;
        }
        ((u64::from(self.next_u32(seed)) * u64::from(upper)) >> 32) as u32
    }

    /// Uniform value in `[0.0, 1.0)`.
    fn unit(&self, seed: u64) -> f64 {
        f64::from(self.next_u32(seed)) / 4_294_967_296.0
    }
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Roll contexts, so that two draws in the same tick for the same combatant
/// stay independent.
pub mod context {
    pub const INITIAL_READINESS: u32 = 0;
    pub const ESCAPE: u32 = 1;
}

/// Compute a deterministic seed from session components.
///
/// * `battle_seed` - Seed fixed at battle start (for replay/determinism)
/// * `nonce` - Tick counter of the session
/// * `combatant` - Raw id of the combatant the roll is for
/// * `context` - One of [`context`]
pub fn compute_seed(battle_seed: u64, nonce: u64, combatant: u32, context: u32) -> u64 {
    let mut hash = battle_seed;

    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(combatant).wrapping_mul(0x517cc1b727220a95);
    hash ^= u64::from(context).wrapping_mul(0x85ebca6b);

    // Final avalanche step
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}
