//! Word-guessing rounds: letter bookkeeping, reveal, scoring and the round
//! state machine. Everything here is pure; persistence lives in `db`.

mod letters;
mod response;
mod reveal;
mod round;
mod rules;
mod scoring;

pub use letters::{AttemptedLetters, Letter};
pub use response::SessionResponse;
pub use reveal::{PLACEHOLDER, is_complete, reveal};
pub use round::{GuessOutcome, Round, RoundStatus};
pub use rules::GameRules;
pub use scoring::score;
