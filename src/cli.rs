//! Command-line interface for hangman_sessions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Hangman Sessions - word-guessing rounds with persistent history
#[derive(Parser, Debug)]
#[command(name = "hangman_sessions")]
#[command(about = "Play word-guessing rounds backed by SQLite", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = "hangman.toml")]
    pub config: PathBuf,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create or upgrade the database schema
    Migrate,

    /// Register a new player
    AddPlayer {
        /// Display name (must be unique)
        name: String,
    },

    /// List registered players
    Players,

    /// Add words to the supply
    AddWords {
        /// Words given inline
        words: Vec<String>,

        /// File with one word per line
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Start a round, or resume the one in progress
    Start {
        /// Player id
        player_id: i32,
    },

    /// Guess a letter in the latest round
    Guess {
        /// Player id
        player_id: i32,

        /// Letter to guess
        letter: char,
    },

    /// List finished games
    History {
        /// Only games of this player
        #[arg(long)]
        player: Option<i32>,
    },
}
