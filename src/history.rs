//! Finished-round history: recording rounds as they end and listing them.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::{
    DbError, GameOutcome, GameRecord, GameRepository, GameSummary, NewGameRecord, Store, Word,
};

/// Writes the immutable record for a round that just ended.
///
/// Makes sure the word is flagged as used before inserting exactly one record
/// stamped with the current time. Must run inside the same transaction as the
/// guess that ended the round.
///
/// # Errors
///
/// Returns [`DbError`] if a record for `session_id` already exists or a
/// database error occurs.
#[instrument(skip(store, word), fields(word_id = word.id()))]
pub fn record_finished_round(
    store: &mut Store<'_>,
    player_id: i32,
    word: &Word,
    session_id: i32,
    outcome: GameOutcome,
    score: u32,
) -> Result<GameRecord, DbError> {
    if !*word.used() && store.mark_word_used(*word.id())? {
        warn!("Word of a finished round was still unused");
    }

    let score = i32::try_from(score)
        .map_err(|_| DbError::new(format!("Score {} does not fit the store", score)))?;

    let record = store.insert_game_record(NewGameRecord::new(
        player_id,
        Some(*word.id()),
        Some(session_id),
        outcome.to_db_string().to_string(),
        score,
        Utc::now().naive_utc(),
    ))?;

    info!(record_id = record.id(), %outcome, "Round finalized");
    Ok(record)
}

/// Read-only listing of finished games.
#[derive(Debug, Clone)]
pub struct GameHistory {
    repository: GameRepository,
}

impl GameHistory {
    /// Creates a history view over the given repository.
    #[instrument(skip(repository))]
    pub fn new(repository: GameRepository) -> Self {
        Self { repository }
    }

    /// Finished games of one player, most recent first.
    ///
    /// An unknown player simply has no games.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_by_player(&self, player_id: i32) -> Result<Vec<GameSummary>, DbError> {
        self.repository.read(|store| {
            let records = store.find_records_by_player(player_id)?;
            summarize(store, records)
        })
    }

    /// Every finished game, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_all(&self) -> Result<Vec<GameSummary>, DbError> {
        self.repository.read(|store| {
            let records = store.find_all_records()?;
            summarize(store, records)
        })
    }
}

/// Joins records with player names and word text.
fn summarize(store: &mut Store<'_>, records: Vec<GameRecord>) -> Result<Vec<GameSummary>, DbError> {
    let player_ids: BTreeSet<i32> = records.iter().map(|r| *r.player_id()).collect();
    let word_ids: BTreeSet<i32> = records.iter().filter_map(|r| *r.word_id()).collect();

    let names: HashMap<i32, String> = store
        .find_players(player_ids.into_iter().collect())?
        .into_iter()
        .map(|p| (*p.id(), p.display_name().clone()))
        .collect();
    let words: HashMap<i32, String> = store
        .find_words(word_ids.into_iter().collect())?
        .into_iter()
        .map(|w| (*w.id(), w.text().clone()))
        .collect();

    let summaries = records
        .into_iter()
        .map(|record| {
            let player_name = names
                .get(record.player_id())
                .cloned()
                .ok_or_else(|| DbError::corrupt("game_records", *record.id(), "unknown player"))?;
            let word_text = record.word_id().and_then(|id| words.get(&id).cloned());
            Ok(GameSummary::new(
                *record.id(),
                *record.player_id(),
                player_name,
                record.parse_outcome()?,
                *record.score(),
                *record.completed_at(),
                word_text,
            ))
        })
        .collect::<Result<Vec<_>, DbError>>()?;

    debug!(count = summaries.len(), "Game summaries built");
    Ok(summaries)
}
