//! Database models and domain types.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::{DbError, schema};

/// Player database model. Read-only from the game's point of view.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters, Serialize)]
#[diesel(table_name = schema::players)]
pub struct Player {
    id: i32,
    display_name: String,
    created_at: NaiveDateTime,
}

/// Insertable player model.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::players)]
pub struct NewPlayer {
    display_name: String,
}

/// Candidate secret word owned by the word supply.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::words)]
pub struct Word {
    id: i32,
    text: String,
    used: bool,
}

/// Insertable word model. New words always start unused.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::words)]
pub struct NewWord {
    text: String,
}

/// In-progress round for one player against one word.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters)]
#[diesel(table_name = schema::sessions)]
#[diesel(belongs_to(Player))]
#[diesel(belongs_to(Word))]
pub struct GameSession {
    id: i32,
    player_id: i32,
    word_id: i32,
    attempted_letters: String,
    remaining_attempts: i32,
    started_at: NaiveDateTime,
}

impl GameSession {
    /// Remaining attempts as stored, floored at zero.
    #[instrument(skip(self), fields(session_id = self.id))]
    pub fn remaining_attempts_floor(&self) -> u32 {
        u32::try_from(self.remaining_attempts).unwrap_or(0)
    }
}

/// Insertable session model.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::sessions)]
pub struct NewGameSession {
    player_id: i32,
    word_id: i32,
    attempted_letters: String,
    remaining_attempts: i32,
    started_at: NaiveDateTime,
}

/// Mutable part of a session written back after each guess.
#[derive(Debug, Clone, AsChangeset, new)]
#[diesel(table_name = schema::sessions)]
pub struct SessionProgress {
    attempted_letters: String,
    remaining_attempts: i32,
}

/// Immutable record of a finished round.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters)]
#[diesel(table_name = schema::game_records)]
#[diesel(belongs_to(Player))]
pub struct GameRecord {
    id: i32,
    player_id: i32,
    word_id: Option<i32>,
    session_id: Option<i32>,
    outcome: String,
    score: i32,
    completed_at: NaiveDateTime,
}

impl GameRecord {
    /// Parses the stored outcome string into a [`GameOutcome`].
    #[instrument(skip(self), fields(outcome = %self.outcome))]
    pub fn parse_outcome(&self) -> Result<GameOutcome, DbError> {
        GameOutcome::from_db_string(self.outcome())
    }
}

/// Insertable game record.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::game_records)]
pub struct NewGameRecord {
    player_id: i32,
    word_id: Option<i32>,
    session_id: Option<i32>,
    outcome: String,
    score: i32,
    completed_at: NaiveDateTime,
}

/// Outcome of a finished round from the player's perspective.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum GameOutcome {
    /// Every letter of the word was revealed.
    Won,
    /// Attempts ran out first.
    Lost,
}

impl GameOutcome {
    /// Maps a completion flag to an outcome.
    pub fn from_won(won: bool) -> Self {
        if won { Self::Won } else { Self::Lost }
    }

    /// Converts outcome to the string stored in the database.
    #[instrument]
    pub fn to_db_string(self) -> &'static str {
        self.into()
    }

    /// Parses outcome from the string stored in the database.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the string is not a valid outcome value.
    #[instrument(skip(s), fields(s = %s))]
    pub fn from_db_string(s: &str) -> Result<Self, DbError> {
        s.parse()
            .map_err(|_| DbError::new(format!("Invalid outcome: '{}'", s)))
    }
}

/// Flat projection of a [`GameRecord`] joined with player and word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters, new)]
pub struct GameSummary {
    record_id: i32,
    player_id: i32,
    player_name: String,
    outcome: GameOutcome,
    score: i32,
    completed_at: NaiveDateTime,
    word_text: Option<String>,
}
