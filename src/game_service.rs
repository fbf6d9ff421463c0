//! Session lifecycle: starting rounds, applying guesses, finalizing results.

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::history::{GameHistory, record_finished_round};
use crate::{
    AttemptedLetters, DbError, GameOutcome, GameRepository, GameRules, GameSession, GameSummary,
    Letter, NewGameSession, NewWord, Player, Round, SessionProgress, SessionResponse, Store, Word,
};

/// Failure of a game operation.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
pub enum GameError {
    /// No player with this id exists.
    #[display("Player {} not found", player_id)]
    PlayerNotFound {
        /// Requested player id.
        player_id: i32,
    },

    /// The word supply is exhausted.
    #[display("No words available")]
    NoWordsAvailable,

    /// The player has never started a round.
    #[display("Player {} has no active session", player_id)]
    NoActiveSession {
        /// Requested player id.
        player_id: i32,
    },

    /// The guess is not a single letter.
    #[display("'{}' is not a letter", letter)]
    InvalidLetter {
        /// Rejected input.
        letter: char,
    },

    /// A word offered to the supply cannot be played.
    #[display("Invalid word '{}': {}", word, reason)]
    InvalidWord {
        /// Rejected input.
        word: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The store failed; the transaction was rolled back.
    #[display("{}", _0)]
    Database(#[error(source)] DbError),
}

impl From<DbError> for GameError {
    fn from(err: DbError) -> Self {
        Self::Database(err)
    }
}

impl From<diesel::result::Error> for GameError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(DbError::from(err))
    }
}

/// Orchestrates rounds for players against words from the supply.
///
/// Each operation runs as a single write transaction: either every change it
/// makes is committed or none is.
#[derive(Debug, Clone)]
pub struct GameService {
    repository: GameRepository,
    rules: GameRules,
}

impl GameService {
    /// Creates a service backed by the given repository.
    #[instrument(skip(repository))]
    pub fn new(repository: GameRepository, rules: GameRules) -> Self {
        info!("Creating GameService");
        Self { repository, rules }
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &GameRepository {
        &self.repository
    }

    /// Returns the rules applied to new rounds and scoring.
    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// Starts a round for a player, or resumes the one already running.
    ///
    /// If the player's latest round is still in progress it is returned as is
    /// and no word is drawn. Otherwise a random unused word is drawn; if the
    /// player already has a session for that word it is resumed, else the
    /// word is marked used and a fresh session is created.
    ///
    /// # Errors
    ///
    /// - [`GameError::PlayerNotFound`] if the player does not exist.
    /// - [`GameError::NoWordsAvailable`] if every word has been used.
    #[instrument(skip(self))]
    pub fn start_session(&self, player_id: i32) -> Result<SessionResponse, GameError> {
        let rules = self.rules;
        self.repository.write(|store| {
            let player = require_player(store, player_id)?;

            if let Some(session) = store.find_latest_session(*player.id())? {
                let (_, round) = load_round(store, &session)?;
                if !round.status().is_terminal() {
                    info!(session_id = session.id(), "Resuming round in progress");
                    return Ok(round.response(&rules));
                }
            }

            let word = store
                .find_random_unused_word()?
                .ok_or(GameError::NoWordsAvailable)?;

            if let Some(existing) =
                store.find_session_by_player_and_word(*player.id(), *word.id())?
            {
                info!(session_id = existing.id(), "Session exists for this word");
                let (_, round) = load_round(store, &existing)?;
                return Ok(round.response(&rules));
            }

            store.mark_word_used(*word.id())?;
            let round = Round::new(word.text(), &rules);
            let session = store.insert_session(NewGameSession::new(
                *player.id(),
                *word.id(),
                round.attempted().encode(),
                to_stored(round.remaining_attempts())?,
                Utc::now().naive_utc(),
            ))?;

            info!(
                session_id = session.id(),
                length = round.secret().chars().count(),
                "Round started"
            );
            Ok(round.response(&rules))
        })
    }

    /// Applies a letter guess to the player's latest round.
    ///
    /// The letter is uppercased. A letter already attempted, or any guess
    /// after the round ended, returns the current state without changing it.
    /// A new wrong letter costs one attempt. When the guess wins or loses the
    /// round, a history record is written in the same transaction.
    ///
    /// # Errors
    ///
    /// - [`GameError::PlayerNotFound`] if the player does not exist.
    /// - [`GameError::InvalidLetter`] if `letter` is not a letter.
    /// - [`GameError::NoActiveSession`] if the player has no session.
    #[instrument(skip(self))]
    pub fn make_guess(&self, player_id: i32, letter: char) -> Result<SessionResponse, GameError> {
        let rules = self.rules;
        self.repository.write(|store| {
            let player = require_player(store, player_id)?;

            let letter = Letter::parse(letter).ok_or_else(|| {
                warn!(%letter, "Rejected guess");
                GameError::InvalidLetter { letter }
            })?;

            let session = store
                .find_latest_session(*player.id())?
                .ok_or(GameError::NoActiveSession { player_id })?;

            let (word, mut round) = load_round(store, &session)?;
            let outcome = round.guess(letter);
            if !outcome.changed_state() {
                debug!(?outcome, "Guess left round unchanged");
                return Ok(round.response(&rules));
            }

            store.update_session(
                *session.id(),
                SessionProgress::new(
                    round.attempted().encode(),
                    to_stored(round.remaining_attempts())?,
                ),
            )?;

            let response = round.response(&rules);
            if response.is_terminal() {
                record_finished_round(
                    store,
                    *player.id(),
                    &word,
                    *session.id(),
                    GameOutcome::from_won(*response.is_complete()),
                    *response.score(),
                )?;
            }

            Ok(response)
        })
    }

    /// Finished games of one player, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Database`] if the store fails.
    #[instrument(skip(self))]
    pub fn list_games_by_player(&self, player_id: i32) -> Result<Vec<GameSummary>, GameError> {
        Ok(self.history().list_by_player(player_id)?)
    }

    /// Every finished game, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Database`] if the store fails.
    #[instrument(skip(self))]
    pub fn list_all_games(&self) -> Result<Vec<GameSummary>, GameError> {
        Ok(self.history().list_all()?)
    }

    /// Read-only view of finished games.
    pub fn history(&self) -> GameHistory {
        GameHistory::new(self.repository.clone())
    }

    /// Validates and adds words to the supply.
    ///
    /// Words are trimmed and uppercased; blank lines are skipped. Every word
    /// must consist of letters and single spaces. Nothing is added if any
    /// word is rejected.
    ///
    /// # Errors
    ///
    /// - [`GameError::InvalidWord`] for a word that cannot be played.
    /// - [`GameError::Database`] if a word already exists, including a
    ///   repeat within the same batch.
    #[instrument(skip(self, words))]
    pub fn add_words<I>(&self, words: I) -> Result<Vec<Word>, GameError>
    where
        I: IntoIterator<Item = String>,
    {
        let cleaned = words
            .into_iter()
            .map(|w| w.trim().to_uppercase())
            .filter(|w| !w.is_empty())
            .map(validate_word)
            .collect::<Result<Vec<_>, _>>()?;

        let added = self.repository.write(|store| {
            cleaned
                .into_iter()
                .map(|w| store.add_word(NewWord::new(w)))
                .collect::<Result<Vec<_>, DbError>>()
        })?;

        info!(count = added.len(), "Words added");
        Ok(added)
    }
}

#[instrument(skip(store))]
fn require_player(store: &mut Store<'_>, player_id: i32) -> Result<Player, GameError> {
    store.find_player(player_id)?.ok_or_else(|| {
        warn!(player_id, "Unknown player");
        GameError::PlayerNotFound { player_id }
    })
}

/// Rebuilds the round for a stored session together with its word.
#[instrument(skip(store, session), fields(session_id = session.id()))]
fn load_round(store: &mut Store<'_>, session: &GameSession) -> Result<(Word, Round), GameError> {
    let word = store
        .find_word(*session.word_id())?
        .ok_or_else(|| DbError::corrupt("sessions", *session.id(), "word missing"))?;
    let round = Round::resume(
        word.text(),
        AttemptedLetters::decode(session.attempted_letters()),
        session.remaining_attempts_floor(),
    );
    Ok((word, round))
}

fn to_stored(remaining_attempts: u32) -> Result<i32, DbError> {
    i32::try_from(remaining_attempts)
        .map_err(|_| DbError::new(format!("{} attempts do not fit the store", remaining_attempts)))
}

fn validate_word(word: String) -> Result<String, GameError> {
    let reason = if !word.chars().all(|c| c == ' ' || Letter::parse(c).is_some()) {
        Some("only letters and spaces are allowed")
    } else if word.contains("  ") {
        Some("words must be separated by a single space")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(GameError::InvalidWord { word, reason }),
        None => Ok(word),
    }
}
