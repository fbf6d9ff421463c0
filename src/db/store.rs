//! Queries executed on a connection that is already inside a transaction.

use diesel::prelude::*;
use tracing::{debug, info, instrument};

use crate::db::{
    DbError, GameRecord, GameSession, NewGameRecord, NewGameSession, NewWord, Player,
    SessionProgress, Word, schema,
};

// SQLite `random()`, used to draw words in no fixed order.
diesel::define_sql_function! {
    fn random() -> BigInt;
}

/// Handle to the store for the duration of one transaction.
///
/// Obtained from [`crate::GameRepository::write`] or
/// [`crate::GameRepository::read`]; every call shares the same connection so
/// a unit of work commits or rolls back as a whole.
pub struct Store<'c> {
    conn: &'c mut SqliteConnection,
}

impl std::fmt::Debug for Store<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

impl<'c> Store<'c> {
    pub(crate) fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    fn conn(&mut self) -> &mut SqliteConnection {
        self.conn
    }

    // ── Players ────────────────────────────────────────────────

    /// Finds a player by id.
    #[instrument(skip(self))]
    pub fn find_player(&mut self, player_id: i32) -> Result<Option<Player>, DbError> {
        let player = schema::players::table
            .find(player_id)
            .select(Player::as_select())
            .first(self.conn())
            .optional()?;
        debug!(found = player.is_some(), "Player lookup");
        Ok(player)
    }

    /// Loads the players with the given ids, in no particular order.
    #[instrument(skip(self, player_ids), fields(count = player_ids.len()))]
    pub fn find_players(&mut self, player_ids: Vec<i32>) -> Result<Vec<Player>, DbError> {
        let players = schema::players::table
            .filter(schema::players::id.eq_any(player_ids))
            .select(Player::as_select())
            .load(self.conn())?;
        Ok(players)
    }

    // ── Word supply ────────────────────────────────────────────

    /// Picks a random word that no round has used yet.
    #[instrument(skip(self))]
    pub fn find_random_unused_word(&mut self) -> Result<Option<Word>, DbError> {
        let word = schema::words::table
            .filter(schema::words::used.eq(false))
            .order(random())
            .select(Word::as_select())
            .first(self.conn())
            .optional()?;
        debug!(word_id = word.as_ref().map(|w| *w.id()), "Random unused word");
        Ok(word)
    }

    /// Finds a word by id.
    #[instrument(skip(self))]
    pub fn find_word(&mut self, word_id: i32) -> Result<Option<Word>, DbError> {
        let word = schema::words::table
            .find(word_id)
            .select(Word::as_select())
            .first(self.conn())
            .optional()?;
        Ok(word)
    }

    /// Loads the words with the given ids, in no particular order.
    #[instrument(skip(self, word_ids), fields(count = word_ids.len()))]
    pub fn find_words(&mut self, word_ids: Vec<i32>) -> Result<Vec<Word>, DbError> {
        let words = schema::words::table
            .filter(schema::words::id.eq_any(word_ids))
            .select(Word::as_select())
            .load(self.conn())?;
        Ok(words)
    }

    /// Adds a word to the supply.
    ///
    /// Fails if the text is already stored.
    #[instrument(skip(self, word))]
    pub fn add_word(&mut self, word: NewWord) -> Result<Word, DbError> {
        let word = diesel::insert_into(schema::words::table)
            .values(&word)
            .returning(Word::as_returning())
            .get_result(self.conn())?;
        debug!(word_id = word.id(), "Word added");
        Ok(word)
    }

    /// Flags a word as used. Returns `false` if it already was.
    ///
    /// The update only matches unused rows, so the flag never reverts.
    #[instrument(skip(self))]
    pub fn mark_word_used(&mut self, word_id: i32) -> Result<bool, DbError> {
        let updated = diesel::update(
            schema::words::table
                .filter(schema::words::id.eq(word_id))
                .filter(schema::words::used.eq(false)),
        )
        .set(schema::words::used.eq(true))
        .execute(self.conn())?;

        if updated > 0 {
            info!(word_id, "Word marked used");
        }
        Ok(updated > 0)
    }

    // ── Sessions ───────────────────────────────────────────────

    /// Finds the most recent session for a (player, word) pair.
    #[instrument(skip(self))]
    pub fn find_session_by_player_and_word(
        &mut self,
        player_id: i32,
        word_id: i32,
    ) -> Result<Option<GameSession>, DbError> {
        let session = schema::sessions::table
            .filter(schema::sessions::player_id.eq(player_id))
            .filter(schema::sessions::word_id.eq(word_id))
            .order((
                schema::sessions::started_at.desc(),
                schema::sessions::id.desc(),
            ))
            .select(GameSession::as_select())
            .first(self.conn())
            .optional()?;
        Ok(session)
    }

    /// Finds the player's most recently started session.
    ///
    /// Ties on start time go to the higher id.
    #[instrument(skip(self))]
    pub fn find_latest_session(&mut self, player_id: i32) -> Result<Option<GameSession>, DbError> {
        let session = schema::sessions::table
            .filter(schema::sessions::player_id.eq(player_id))
            .order((
                schema::sessions::started_at.desc(),
                schema::sessions::id.desc(),
            ))
            .select(GameSession::as_select())
            .first(self.conn())
            .optional()?;
        debug!(session_id = session.as_ref().map(|s| *s.id()), "Latest session");
        Ok(session)
    }

    /// Inserts a new session.
    #[instrument(skip(self, session), fields(player_id = session.player_id(), word_id = session.word_id()))]
    pub fn insert_session(&mut self, session: NewGameSession) -> Result<GameSession, DbError> {
        let session = diesel::insert_into(schema::sessions::table)
            .values(&session)
            .returning(GameSession::as_returning())
            .get_result(self.conn())?;
        info!(session_id = session.id(), "Session created");
        Ok(session)
    }

    /// Writes back attempted letters and remaining attempts.
    #[instrument(skip(self, progress))]
    pub fn update_session(
        &mut self,
        session_id: i32,
        progress: SessionProgress,
    ) -> Result<GameSession, DbError> {
        let session = diesel::update(schema::sessions::table.find(session_id))
            .set(&progress)
            .returning(GameSession::as_returning())
            .get_result(self.conn())?;
        debug!(
            letters = %session.attempted_letters(),
            remaining = session.remaining_attempts(),
            "Session updated"
        );
        Ok(session)
    }

    // ── History ────────────────────────────────────────────────

    /// Inserts a finished-game record.
    ///
    /// Fails if a record already exists for the same session.
    #[instrument(skip(self, record), fields(player_id = record.player_id(), outcome = %record.outcome()))]
    pub fn insert_game_record(&mut self, record: NewGameRecord) -> Result<GameRecord, DbError> {
        let record = diesel::insert_into(schema::game_records::table)
            .values(&record)
            .returning(GameRecord::as_returning())
            .get_result(self.conn())?;
        info!(record_id = record.id(), score = record.score(), "Game recorded");
        Ok(record)
    }

    /// Finds the record written for a session, if any.
    #[instrument(skip(self))]
    pub fn find_record_by_session(
        &mut self,
        session_id: i32,
    ) -> Result<Option<GameRecord>, DbError> {
        let record = schema::game_records::table
            .filter(schema::game_records::session_id.eq(session_id))
            .select(GameRecord::as_select())
            .first(self.conn())
            .optional()?;
        Ok(record)
    }

    /// Records for one player, most recent first.
    #[instrument(skip(self))]
    pub fn find_records_by_player(&mut self, player_id: i32) -> Result<Vec<GameRecord>, DbError> {
        let records = schema::game_records::table
            .filter(schema::game_records::player_id.eq(player_id))
            .order((
                schema::game_records::completed_at.desc(),
                schema::game_records::id.desc(),
            ))
            .select(GameRecord::as_select())
            .load(self.conn())?;
        Ok(records)
    }

    /// Every record, most recent first.
    #[instrument(skip(self))]
    pub fn find_all_records(&mut self) -> Result<Vec<GameRecord>, DbError> {
        let records = schema::game_records::table
            .order((
                schema::game_records::completed_at.desc(),
                schema::game_records::id.desc(),
            ))
            .select(GameRecord::as_select())
            .load(self.conn())?;
        Ok(records)
    }
}
