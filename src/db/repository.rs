//! Database repository for players, words, sessions and finished games.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::db::{DbError, NewPlayer, NewWord, Player, Store, Word, schema};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Milliseconds a writer waits for the database lock before giving up.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Database repository. Opens one connection per unit of work.
#[derive(Debug, Clone)]
pub struct GameRepository {
    db_path: String,
}

impl GameRepository {
    /// Creates a new repository for the database at the given path.
    ///
    /// Every unit of work opens its own connection, so `":memory:"` does not
    /// keep data between calls; tests use a temporary file instead.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::new("Database path is empty"));
        }
        info!(path = %db_path, "Creating GameRepository");
        Ok(Self { db_path })
    }

    /// Path or URL of the underlying database.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Establishes a database connection with foreign keys enforced.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path).map_err(|e| {
            DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e))
        })?;
        conn.batch_execute(&format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            BUSY_TIMEOUT_MS
        ))?;
        Ok(conn)
    }

    /// Applies any pending schema migrations. Returns how many ran.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn migrate(&self) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let applied = conn.run_pending_migrations(MIGRATIONS)?.len();
        info!(applied, "Migrations complete");
        Ok(applied)
    }

    /// Runs `f` inside a write transaction.
    ///
    /// The transaction is `IMMEDIATE`: the write lock is taken before `f`
    /// reads anything, so concurrent writers are serialized. Any error
    /// returned by `f` rolls back every write it made.
    #[instrument(skip(self, f))]
    pub fn write<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Store<'_>) -> Result<T, E>,
        E: From<DbError> + From<diesel::result::Error>,
    {
        let mut conn = self.connection()?;
        conn.immediate_transaction(|conn| f(&mut Store::new(conn)))
    }

    /// Runs `f` inside a read transaction for a consistent snapshot.
    #[instrument(skip(self, f))]
    pub fn read<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Store<'_>) -> Result<T, E>,
        E: From<DbError> + From<diesel::result::Error>,
    {
        let mut conn = self.connection()?;
        conn.transaction(|conn| f(&mut Store::new(conn)))
    }

    /// Creates a new player.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the display name is already taken or a database error occurs.
    #[instrument(skip(self))]
    pub fn create_player(&self, display_name: String) -> Result<Player, DbError> {
        debug!(display_name = %display_name, "Creating player");
        let mut conn = self.connection()?;

        let player = diesel::insert_into(schema::players::table)
            .values(&NewPlayer::new(display_name))
            .returning(Player::as_returning())
            .get_result(&mut conn)?;

        info!(player_id = player.id(), display_name = %player.display_name(), "Player created");
        Ok(player)
    }

    /// Gets a player by display name. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_player_by_name(&self, display_name: &str) -> Result<Option<Player>, DbError> {
        debug!(display_name = %display_name, "Looking up player by name");
        let mut conn = self.connection()?;

        let player = schema::players::table
            .filter(schema::players::display_name.eq(display_name))
            .select(Player::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(player)
    }

    /// Lists all players, ordered by creation time.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_players(&self) -> Result<Vec<Player>, DbError> {
        let mut conn = self.connection()?;

        let players = schema::players::table
            .order((schema::players::created_at.asc(), schema::players::id.asc()))
            .select(Player::as_select())
            .load(&mut conn)?;

        info!(count = players.len(), "Players loaded");
        Ok(players)
    }

    /// Adds a word to the supply. The text is stored as given.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the word already exists or a database error occurs.
    #[instrument(skip(self))]
    pub fn add_word(&self, text: String) -> Result<Word, DbError> {
        self.write(|store| store.add_word(NewWord::new(text)))
    }

    /// Counts words that have not been used by any round yet.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn count_unused_words(&self) -> Result<i64, DbError> {
        let mut conn = self.connection()?;

        let count = schema::words::table
            .filter(schema::words::used.eq(false))
            .count()
            .get_result(&mut conn)?;

        Ok(count)
    }
}
