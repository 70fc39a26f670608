//! Dice rolls and the dice sources that produce them.

use crate::rules::{MAX_DIE, MIN_DIE};
use derive_new::new;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, instrument};

/// A pair of die values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
pub struct Roll {
    /// First die.
    pub first: u8,
    /// Second die.
    pub second: u8,
}

impl Roll {
    /// Sum of both dice.
    pub fn total(&self) -> u8 {
        self.first + self.second
    }

    /// True when both dice show the same value.
    pub fn is_doubles(&self) -> bool {
        self.first == self.second
    }

    /// True when both dice are within the die range.
    pub fn is_valid(&self) -> bool {
        (MIN_DIE..=MAX_DIE).contains(&self.first) && (MIN_DIE..=MAX_DIE).contains(&self.second)
    }
}

impl std::fmt::Display for Roll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}+{}", self.first, self.second)
    }
}

/// Source of dice rolls for a game.
///
/// Sessions use [`RandomDice`]; tests and replays script rolls with
/// [`LoadedDice`].
pub trait Dice: std::fmt::Debug + Send {
    /// Produces the next roll.
    fn roll(&mut self) -> Roll;
}

/// Ordinary PRNG-backed dice.
#[derive(Debug, Clone)]
pub struct RandomDice {
    rng: StdRng,
}

impl RandomDice {
    /// Dice with a fixed seed, for reproducible sessions.
    #[instrument]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Dice seeded from system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when a seed is given, entropy otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl Dice for RandomDice {
    fn roll(&mut self) -> Roll {
        Roll::new(
            self.rng.gen_range(MIN_DIE..=MAX_DIE),
            self.rng.gen_range(MIN_DIE..=MAX_DIE),
        )
    }
}

/// Dice that replay a scripted sequence of rolls.
///
/// Once the script runs out the dice fall back to a fixed-seed PRNG.
#[derive(Debug, Clone)]
pub struct LoadedDice {
    script: VecDeque<Roll>,
    fallback: RandomDice,
}

impl LoadedDice {
    /// Creates dice that return `rolls` in order.
    pub fn new(rolls: impl IntoIterator<Item = Roll>) -> Self {
        Self {
            script: rolls.into_iter().collect(),
            fallback: RandomDice::seeded(0),
        }
    }

    /// Appends a roll to the end of the script.
    pub fn push(&mut self, roll: Roll) {
        self.script.push_back(roll);
    }

    /// Rolls left in the script.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Dice for LoadedDice {
    fn roll(&mut self) -> Roll {
        match self.script.pop_front() {
            Some(roll) => roll,
            None => {
                debug!("Dice script exhausted, using fallback");
                self.fallback.roll()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_and_doubles() {
        let roll = Roll::new(3, 3);
        assert_eq!(roll.total(), 6);
        assert!(roll.is_doubles());
        assert!(!Roll::new(2, 5).is_doubles());
    }

    #[test]
    fn test_validity_bounds() {
        assert!(Roll::new(1, 6).is_valid());
        assert!(!Roll::new(0, 0).is_valid());
        assert!(!Roll::new(7, 7).is_valid());
        assert!(!Roll::new(3, 7).is_valid());
    }

    #[test]
    fn test_random_dice_stay_in_range() {
        let mut dice = RandomDice::seeded(42);
        for _ in 0..500 {
            assert!(dice.roll().is_valid());
        }
    }

    #[test]
    fn test_seeded_dice_are_reproducible() {
        let mut a = RandomDice::seeded(7);
        let mut b = RandomDice::seeded(7);
        for _ in 0..20 {
            assert_eq!(a.roll(), b.roll());
        }
    }

    #[test]
    fn test_loaded_dice_follow_script() {
        let mut dice = LoadedDice::new([Roll::new(1, 1), Roll::new(2, 5)]);
        assert_eq!(dice.roll(), Roll::new(1, 1));
        assert_eq!(dice.roll(), Roll::new(2, 5));
        assert_eq!(dice.remaining(), 0);
        assert!(dice.roll().is_valid());
    }
}
