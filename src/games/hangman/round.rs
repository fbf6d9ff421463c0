//! Round state machine.
//!
//! A round moves from `InProgress` to exactly one of `Won` or `Lost`. Both
//! are terminal: once there, guesses no longer change anything.

use serde::Serialize;
use tracing::{debug, info, instrument};

use super::{AttemptedLetters, GameRules, Letter, SessionResponse, is_complete, reveal, score};

/// Where a round stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundStatus {
    /// Letters remain hidden and attempts remain.
    InProgress,
    /// Every letter was revealed.
    Won,
    /// Attempts ran out first.
    Lost,
}

impl RoundStatus {
    /// True for `Won` and `Lost`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// Effect of a single guess on a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// New letter that occurs in the secret.
    Hit,
    /// New letter that does not occur; one attempt was spent.
    Miss,
    /// Letter already attempted; nothing changed.
    Repeated,
    /// Round had already ended; nothing changed.
    RoundOver,
}

impl GuessOutcome {
    /// True when the guess mutated the round and must be persisted.
    pub fn changed_state(self) -> bool {
        matches!(self, Self::Hit | Self::Miss)
    }
}

/// One round against a secret word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    secret: String,
    attempted: AttemptedLetters,
    remaining_attempts: u32,
}

impl Round {
    /// Starts a fresh round with nothing attempted and full attempts.
    #[instrument(skip(secret))]
    pub fn new(secret: &str, rules: &GameRules) -> Self {
        Self::resume(secret, AttemptedLetters::new(), *rules.max_attempts())
    }

    /// Rebuilds a round from stored state.
    #[instrument(skip(secret, attempted))]
    pub fn resume(secret: &str, attempted: AttemptedLetters, remaining_attempts: u32) -> Self {
        Self {
            secret: secret.to_uppercase(),
            attempted,
            remaining_attempts,
        }
    }

    /// The uppercased secret word.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Letters attempted so far.
    pub fn attempted(&self) -> &AttemptedLetters {
        &self.attempted
    }

    /// Wrong guesses still allowed.
    pub fn remaining_attempts(&self) -> u32 {
        self.remaining_attempts
    }

    /// Secret with unguessed letters replaced by [`super::PLACEHOLDER`].
    pub fn masked_word(&self) -> String {
        reveal(&self.secret, &self.attempted)
    }

    /// True once every non-space character has been guessed.
    pub fn is_complete(&self) -> bool {
        is_complete(&self.secret, &self.attempted)
    }

    /// Current state of the round. Completion wins over exhausted attempts.
    pub fn status(&self) -> RoundStatus {
        if self.is_complete() {
            RoundStatus::Won
        } else if self.remaining_attempts == 0 {
            RoundStatus::Lost
        } else {
            RoundStatus::InProgress
        }
    }

    /// Applies a guess.
    ///
    /// Repeated letters and guesses after the round ended leave the round
    /// untouched. A new letter missing from the secret costs one attempt.
    #[instrument(skip(self), fields(remaining = self.remaining_attempts))]
    pub fn guess(&mut self, letter: Letter) -> GuessOutcome {
        if self.status().is_terminal() {
            debug!(status = %self.status(), "Guess after round ended");
            return GuessOutcome::RoundOver;
        }

        if !self.attempted.insert(letter) {
            debug!(%letter, "Letter already attempted");
            return GuessOutcome::Repeated;
        }

        if self.secret.contains(letter.as_char()) {
            debug!(%letter, "Hit");
            GuessOutcome::Hit
        } else {
            self.remaining_attempts = self.remaining_attempts.saturating_sub(1);
            info!(%letter, remaining = self.remaining_attempts, "Miss");
            GuessOutcome::Miss
        }
    }

    /// Score of the round as it stands.
    pub fn score(&self, rules: &GameRules) -> u32 {
        score(
            &self.secret,
            &self.attempted,
            self.is_complete(),
            self.remaining_attempts,
            rules,
        )
    }

    /// Builds the caller-facing snapshot.
    #[instrument(skip(self, rules))]
    pub fn response(&self, rules: &GameRules) -> SessionResponse {
        SessionResponse::new(
            self.masked_word(),
            self.attempted.iter().collect(),
            self.remaining_attempts,
            self.is_complete(),
            self.score(rules),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter(c: char) -> Letter {
        Letter::parse(c).expect("valid letter")
    }

    #[test]
    fn test_new_round() {
        let round = Round::new("cat", &GameRules::default());
        let response = round.response(&GameRules::default());
        assert_eq!(response.masked_word(), "___");
        assert!(response.attempted_letters().is_empty());
        assert_eq!(*response.remaining_attempts(), 7);
        assert!(!response.is_complete());
        assert_eq!(*response.score(), 0);
        assert_eq!(round.status(), RoundStatus::InProgress);
    }

    #[test]
    fn test_winning_sequence() {
        let rules = GameRules::default();
        let mut round = Round::new("cat", &rules);

        assert_eq!(round.guess(letter('c')), GuessOutcome::Hit);
        assert_eq!(round.masked_word(), "C__");
        assert_eq!(round.guess(letter('A')), GuessOutcome::Hit);
        assert_eq!(round.masked_word(), "CA_");
        assert_eq!(round.guess(letter('t')), GuessOutcome::Hit);

        let response = round.response(&rules);
        assert_eq!(response.masked_word(), "CAT");
        assert_eq!(*response.remaining_attempts(), 7);
        assert!(response.is_complete());
        assert_eq!(*response.score(), 20);
        assert_eq!(round.status(), RoundStatus::Won);
    }

    #[test]
    fn test_repeated_guess_is_free() {
        let rules = GameRules::default();
        let mut round = Round::new("cat", &rules);
        assert_eq!(round.guess(letter('x')), GuessOutcome::Miss);
        let before = round.clone();

        assert_eq!(round.guess(letter('x')), GuessOutcome::Repeated);
        assert_eq!(round.guess(letter('X')), GuessOutcome::Repeated);
        assert_eq!(round, before);
        assert_eq!(round.remaining_attempts(), 6);
    }

    #[test]
    fn test_attempts_decrease_per_new_miss() {
        let rules = GameRules::default();
        let mut round = Round::new("cat", &rules);
        for (n, c) in "XYZQW".chars().enumerate() {
            round.guess(letter(c));
            assert_eq!(round.remaining_attempts(), 7 - (n as u32 + 1));
        }
        assert_eq!(round.status(), RoundStatus::InProgress);
    }

    #[test]
    fn test_losing_sequence() {
        let rules = GameRules::default();
        let mut round = Round::new("cat", &rules);
        round.guess(letter('c'));
        for c in "XYZQWER".chars() {
            round.guess(letter(c));
        }
        assert_eq!(round.remaining_attempts(), 0);
        assert_eq!(round.status(), RoundStatus::Lost);
        assert_eq!(round.score(&rules), 1);
    }

    #[test]
    fn test_no_change_after_round_over() {
        let rules = GameRules::default().with_max_attempts(1);
        let mut round = Round::new("cat", &rules);
        assert_eq!(round.guess(letter('z')), GuessOutcome::Miss);
        assert_eq!(round.status(), RoundStatus::Lost);

        let before = round.clone();
        assert_eq!(round.guess(letter('c')), GuessOutcome::RoundOver);
        assert_eq!(round, before);
        assert_eq!(round.remaining_attempts(), 0);
    }

    #[test]
    fn test_resume_from_stored_state() {
        let rules = GameRules::default();
        let round = Round::resume("ice cream", AttemptedLetters::decode("E,Z"), 6);
        assert_eq!(round.masked_word(), "__E __E__");
        assert_eq!(round.secret(), "ICE CREAM");
        assert_eq!(round.response(&rules).attempted_letters(), &vec!['E', 'Z']);
    }
}
