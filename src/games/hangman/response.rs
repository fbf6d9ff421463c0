//! What a caller sees after starting a round or guessing.

use derive_getters::Getters;
use serde::Serialize;

/// Snapshot of a round as returned by start and guess operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct SessionResponse {
    masked_word: String,
    attempted_letters: Vec<char>,
    remaining_attempts: u32,
    is_complete: bool,
    score: u32,
}

impl SessionResponse {
    pub(super) fn new(
        masked_word: String,
        attempted_letters: Vec<char>,
        remaining_attempts: u32,
        is_complete: bool,
        score: u32,
    ) -> Self {
        Self {
            masked_word,
            attempted_letters,
            remaining_attempts,
            is_complete,
            score,
        }
    }

    /// True once the round is won or out of attempts.
    pub fn is_terminal(&self) -> bool {
        self.is_complete || self.remaining_attempts == 0
    }
}
