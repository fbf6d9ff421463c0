//! Database persistence layer for players, words, sessions and game history.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only
mod store;

pub use error::DbError;
pub use models::{
    GameOutcome, GameRecord, GameSession, GameSummary, NewGameRecord, NewGameSession, NewPlayer,
    NewWord, Player, SessionProgress, Word,
};
pub use repository::GameRepository;
pub use store::Store;
