//! Chess Replay - Rebuilds a game from its recorded moves.
//!
//! Loads a session configuration, replays a move history through the rules
//! engine the same way a reconnecting client would be restored, and prints
//! the resulting state as JSON.

use anyhow::{bail, Context};
use chess_core::{Color, MoveRequest};
use chess_rules::{BoardSnapshot, Game, GameStatus, MoveRecord, SessionConfig, Variant};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;

/// Chess Replay - Replays move histories through the rules engine.
#[derive(Parser)]
#[command(name = "chess-replay")]
#[command(about = "Replays chess move histories and prints the resulting state")]
struct Cli {
    /// Path to a session config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Variant to play, overriding the config (classic, chess960, horde, kirby, bomb)
    #[arg(long, value_parser = parse_variant)]
    variant: Option<Variant>,

    /// Chess960 seed, overriding the config
    #[arg(long)]
    seed: Option<u64>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON array of move requests ("-" reads stdin)
    Replay {
        /// File holding the move requests
        file: PathBuf,
    },
    /// Play moves given in coordinate notation, e.g. `e2e4 e7e5 e7e8q`
    Play {
        /// Moves in order, starting with the side to move
        moves: Vec<String>,
    },
    /// Print the starting state of the configured variant
    Start,
}

/// Final state of a replayed session.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    variant: Variant,
    status: GameStatus,
    active_color: Color,
    half_move_clock: u32,
    full_move_number: u32,
    check: bool,
    legal_moves: usize,
    moves: &'a [MoveRecord],
    board: BoardSnapshot,
}

impl<'a> Report<'a> {
    fn new(game: &'a Game) -> Self {
        Report {
            variant: game.variant(),
            status: game.status(),
            active_color: game.active_color(),
            half_move_clock: game.half_move_clock(),
            full_move_number: game.full_move_number(),
            check: game.is_check(),
            legal_moves: game.legal_moves().len(),
            moves: game.moves(),
            board: game.snapshot(),
        }
    }
}

fn parse_variant(s: &str) -> Result<Variant, String> {
    serde_json::from_value(serde_json::Value::String(s.to_lowercase()))
        .map_err(|_| format!("unknown variant: {}", s))
}

fn load_config(cli: &Cli) -> anyhow::Result<SessionConfig> {
    let mut config = match &cli.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(variant) = cli.variant {
        config.variant = variant;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    Ok(config)
}

fn read_moves(file: &PathBuf) -> anyhow::Result<Vec<MoveRequest>> {
    let mut content = String::new();
    if file.as_os_str() == "-" {
        std::io::stdin().read_to_string(&mut content)?;
    } else {
        content = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
    }
    serde_json::from_str(&content).context("Move file must be a JSON array of move requests")
}

fn play_coordinates(game: &mut Game, moves: &[String]) -> anyhow::Result<()> {
    for (index, text) in moves.iter().enumerate() {
        let Some(request) = MoveRequest::from_coords(text, game.active_color()) else {
            bail!("move {} ({}) is not in coordinate notation", index, text);
        };
        let info = game
            .make_move(request)
            .with_context(|| format!("move {} ({}) was rejected", index, text))?;
        tracing::debug!("{} -> {}", text, serde_json::to_string(&info)?);
        if let Some(over) = info.game_over {
            tracing::info!("Game over after move {}: {}", index, over);
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    tracing::info!("Variant: {}", config.variant);
    let mut game = Game::from_config(&config).context("Invalid session config")?;

    match &cli.command {
        Commands::Replay { file } => {
            let moves = read_moves(file)?;
            tracing::info!("Replaying {} moves", moves.len());
            game = game.replay(&moves)?;
        }
        Commands::Play { moves } => play_coordinates(&mut game, moves)?,
        Commands::Start => {}
    }

    if let Some(result) = game.result() {
        tracing::info!("Result: {}", result);
    }

    let report = Report::new(&game);
    let output = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", output);
    Ok(())
}
