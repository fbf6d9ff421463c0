//! Hangman Sessions - CLI
//!
//! Manages players and words, and plays rounds from the command line.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use hangman_sessions::{
    AppConfig, GameRepository, GameService, GameSummary, Player, SessionResponse,
};
use serde::Serialize;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr so `--json` output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load(&cli.config)?;
    let repository = GameRepository::new(config.database_path().clone())?;
    let service = GameService::new(repository, *config.rules());

    run(&service, cli.command, cli.json)
}

#[instrument(skip(service))]
fn run(service: &GameService, command: Command, json: bool) -> Result<()> {
    match command {
        Command::Migrate => {
            let applied = service.repository().migrate()?;
            info!(applied, "Database ready");
            println!("Applied {} migration(s)", applied);
        }
        Command::AddPlayer { name } => {
            let player = service.repository().create_player(name)?;
            print_players(&[player], json)?;
        }
        Command::Players => {
            let players = service.repository().list_players()?;
            print_players(&players, json)?;
        }
        Command::AddWords { mut words, file } => {
            if let Some(file) = file {
                let content = std::fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                words.extend(content.lines().map(str::to_string));
            }
            let added = service.add_words(words)?;
            let unused = service.repository().count_unused_words()?;
            println!("Added {} word(s), {} unused", added.len(), unused);
        }
        Command::Start { player_id } => {
            let response = service.start_session(player_id)?;
            print_response(&response, json)?;
        }
        Command::Guess { player_id, letter } => {
            let response = service.make_guess(player_id, letter)?;
            print_response(&response, json)?;
        }
        Command::History { player } => {
            let games = match player {
                Some(player_id) => service.list_games_by_player(player_id)?,
                None => service.list_all_games()?,
            };
            print_games(&games, json)?;
        }
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_players(players: &[Player], json: bool) -> Result<()> {
    if json {
        return print_json(players);
    }
    for player in players {
        println!("{:>5}  {}", player.id(), player.display_name());
    }
    Ok(())
}

fn print_response(response: &SessionResponse, json: bool) -> Result<()> {
    if json {
        return print_json(response);
    }
    let masked: Vec<String> = response.masked_word().chars().map(String::from).collect();
    let attempted: Vec<String> = response
        .attempted_letters()
        .iter()
        .map(char::to_string)
        .collect();

    println!("{}", masked.join(" "));
    println!("Attempted: {}", attempted.join(" "));
    println!("Attempts left: {}", response.remaining_attempts());
    if *response.is_complete() {
        println!("Solved! Score: {}", response.score());
    } else if response.is_terminal() {
        println!("Out of attempts. Score: {}", response.score());
    }
    Ok(())
}

fn print_games(games: &[GameSummary], json: bool) -> Result<()> {
    if json {
        return print_json(games);
    }
    if games.is_empty() {
        println!("No finished games");
    }
    for game in games {
        println!(
            "{:>5}  {:<16} {:<4} {:>3}  {}  {}",
            game.record_id(),
            game.player_name(),
            game.outcome(),
            game.score(),
            game.completed_at().format("%Y-%m-%d %H:%M:%S"),
            game.word_text().as_deref().unwrap_or("-"),
        )
    }
    Ok(())
}
