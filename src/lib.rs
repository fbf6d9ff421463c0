//! Hangman Sessions - word-guessing rounds with persistent history
//!
//! A player starts a round against a secret word drawn from the word supply,
//! guesses one letter at a time, and the finished round is written to an
//! immutable history.
//!
//! # Architecture
//!
//! - **Games**: pure round logic (letter set codec, reveal, scoring, state machine)
//! - **Service**: session lifecycle, one store transaction per operation
//! - **History**: finalizing rounds and listing finished games
//! - **Db**: SQLite persistence through diesel
//!
//! # Example
//!
//! ```no_run
//! use hangman_sessions::{GameRepository, GameRules, GameService};
//!
//! # fn example() -> anyhow::Result<()> {
//! let repository = GameRepository::new("hangman.db".to_string())?;
//! repository.migrate()?;
//!
//! let player = repository.create_player("Alice".to_string())?;
//! let service = GameService::new(repository, GameRules::default());
//! service.add_words(["cat".to_string()])?;
//!
//! let response = service.start_session(*player.id())?;
//! assert_eq!(response.masked_word(), "___");
//! let response = service.make_guess(*player.id(), 'c')?;
//! assert_eq!(response.masked_word(), "C__");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod db;
mod game_service;
mod games;
mod history;

// Crate-level exports - Configuration
pub use config::{AppConfig, ConfigError, DATABASE_URL_ENV};

// Crate-level exports - Persistence
pub use db::{
    DbError, GameOutcome, GameRecord, GameRepository, GameSession, GameSummary, NewGameRecord,
    NewGameSession, NewPlayer, NewWord, Player, SessionProgress, Store, Word,
};

// Crate-level exports - Session lifecycle
pub use game_service::{GameError, GameService};

// Crate-level exports - History
pub use history::{GameHistory, record_finished_round};

// Crate-level exports - Round logic
pub use games::hangman::{
    AttemptedLetters, GameRules, GuessOutcome, Letter, PLACEHOLDER, Round, RoundStatus,
    SessionResponse, is_complete, reveal, score,
};
