//! Tunable round parameters.

use derive_getters::Getters;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};

/// Limits and point values applied to every round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters, Setters)]
#[serde(default)]
#[setters(prefix = "with_")]
pub struct GameRules {
    /// Wrong guesses allowed before the round is lost.
    max_attempts: u32,
    /// Score awarded for revealing the whole word.
    completion_bonus: u32,
    /// Score per correct letter when the round is lost.
    points_per_letter: u32,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            max_attempts: 7,
            completion_bonus: 20,
            points_per_letter: 1,
        }
    }
}
