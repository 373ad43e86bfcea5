//! Clock Module
//!
//! Logical access clock used to weight recent accesses more heavily.

// == Clock ==
/// Monotonic access counter.
///
/// `tick` counts every scored access over the life of the cache and is never
/// reset. `base` marks the tick of the last score rebase; scoring uses the
/// distance `tick - base` as its exponent so the growth factor stays finite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clock {
    tick: u64,
    base: u64,
}

impl Clock {
    // == Constructor ==
    /// Creates a clock at tick 0.
    pub fn new() -> Self {
        Self::default()
    }

    // == Advance ==
    /// Advances the clock by one access and returns the new tick.
    pub fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    // == Tick ==
    /// Total number of accesses so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    // == Exponent ==
    /// Ticks elapsed since the last rebase.
    pub fn exponent(&self) -> u64 {
        self.tick - self.base
    }

    // == Rebase ==
    /// Moves the scoring origin to the current tick.
    pub fn rebase(&mut self) {
        self.base = self.tick;
    }
}
