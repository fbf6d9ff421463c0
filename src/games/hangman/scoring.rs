//! Round scoring.

use tracing::instrument;

use super::{AttemptedLetters, GameRules};

/// Computes the score of a round.
///
/// A completed word earns the completion bonus regardless of attempts used.
/// A lost round (no attempts left) earns partial credit for every attempted
/// letter that occurs in the secret. A round still in progress scores 0.
#[instrument(skip(secret, attempted, rules))]
pub fn score(
    secret: &str,
    attempted: &AttemptedLetters,
    complete: bool,
    remaining_attempts: u32,
    rules: &GameRules,
) -> u32 {
    if complete {
        return *rules.completion_bonus();
    }
    if remaining_attempts > 0 {
        return 0;
    }

    let secret = secret.to_uppercase();
    let correct = attempted.iter().filter(|&c| secret.contains(c)).count();
    u32::try_from(correct)
        .unwrap_or(u32::MAX)
        .saturating_mul(*rules.points_per_letter())
}
