//! Turn-count conditions ("on turn A, then every B turns").

/// Condition over a turn counter `n`.
///
/// - `every == 0`: met only when `n == start`
/// - otherwise: met when `n >= start` and `n ≡ start (mod every)`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnCondition {
    pub start: u32,
    pub every: u32,
}

impl TurnCondition {
    pub const fn new(start: u32, every: u32) -> Self {
        Self { start, every }
    }

    pub const fn is_met(&self, n: u32) -> bool {
        if self.every == 0 {
            n == self.start
        } else {
            n >= self.start && n % self.every == self.start % self.every
        }
    }
}
