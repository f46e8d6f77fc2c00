//! Linear-congruential generator shared by both rulesets.
//!
//! Every draw must match the historical generator bit for bit, including
//! the floating-point scaling used to pick one of three values.

use serde::{Deserialize, Serialize};

const MULTIPLIER: u32 = 1_103_515_245;
const INCREMENT: u32 = 12_345;
const MASK: u32 = 0x7FFF_FFFF;

/// 31-bit linear-congruential pseudo-random generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Prng {
    initial: u32,
    value: u32,
}

impl Prng {
    /// Creates a generator seeded with the low 31 bits of `seed`.
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        let seed = seed & MASK;
        Self {
            initial: seed,
            value: seed,
        }
    }

    /// Restarts the sequence from a new seed.
    pub fn reseed(&mut self, seed: u32) {
        *self = Self::new(seed);
    }

    /// Seed the current sequence started from.
    #[must_use]
    pub const fn initial(&self) -> u32 {
        self.initial
    }

    /// Current internal state.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.value
    }

    fn advance(&mut self) -> u32 {
        self.value = self
            .value
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT)
            & MASK;
        self.value
    }

    /// Draws a value in `0..4` from the top two bits of the state.
    pub fn next4(&mut self) -> u8 {
        (self.advance() >> 29) as u8
    }

    /// Picks one of three values with the historical scaling.
    pub fn next_of3<T>(&mut self, first: T, second: T, third: T) -> T {
        let value = self.advance();
        match scale3(value & 0x3FFF_FFFF, 0x4000_0000) {
            0 => first,
            1 => second,
            _ => third,
        }
    }

    /// Shuffles three values in place with a single draw.
    pub fn permute3<T>(&mut self, values: &mut [T; 3]) {
        let value = self.advance();
        values.swap((value >> 30) as usize, 1);
        values.swap(scale3(value & 0x0FFF_FFFF, 0x1000_0000), 2);
    }

    /// Shuffles four values in place with a single draw.
    pub fn permute4<T>(&mut self, values: &mut [T; 4]) {
        let value = self.advance();
        values.swap((value >> 30) as usize, 1);
        values.swap(scale3(value & 0x0FFF_FFFF, 0x1000_0000), 2);
        values.swap(((value >> 26) & 3) as usize, 3);
    }
}

fn scale3(numerator: u32, denominator: u32) -> usize {
    ((3.0 * f64::from(numerator)) / f64::from(denominator)) as usize
}
