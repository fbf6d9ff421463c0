//! Masked-word projection.

use tracing::instrument;

use super::AttemptedLetters;

/// Character shown in place of a letter that has not been guessed.
pub const PLACEHOLDER: char = '_';

/// Masks every character of the uppercased `secret` that is neither a space
/// nor an attempted letter.
#[instrument(skip(secret, attempted))]
pub fn reveal(secret: &str, attempted: &AttemptedLetters) -> String {
    secret
        .to_uppercase()
        .chars()
        .map(|c| {
            if c == ' ' || attempted.contains(c) {
                c
            } else {
                PLACEHOLDER
            }
        })
        .collect()
}

/// Returns true once the masked word equals the uppercased secret.
#[instrument(skip(secret, attempted))]
pub fn is_complete(secret: &str, attempted: &AttemptedLetters) -> bool {
    reveal(secret, attempted) == secret.to_uppercase()
}
