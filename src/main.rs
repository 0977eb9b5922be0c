use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};

use std::io::{stdin, stdout, Write};
use std::path::PathBuf;

use connect4_search::compare::{load_positions, verify};
use connect4_search::export::ArtifactWriter;
use connect4_search::*;

/// The position used by `compare --position midgame`
const MIDGAME: &str = "33242415";

#[derive(Parser, Debug)]
#[command(name = "connect4_compare", version, about = "Minimax vs alpha-beta on Connect 4")]
struct Cli {
    /// TOML file with default search and output settings
    #[arg(long, global = true, default_value = "connect4.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play against the AI, you are X and move first
    Play {
        /// minimax or alphabeta
        #[arg(long)]
        ai: Option<Algorithm>,
        #[arg(long)]
        depth: Option<usize>,
        #[arg(long)]
        trace_depth: Option<usize>,
        /// Write a board snapshot after every move
        #[arg(long)]
        snapshots: bool,
    },
    /// Search one position with both algorithms and write the artifacts
    Compare {
        #[arg(long)]
        depth: Option<usize>,
        #[arg(long)]
        trace_depth: Option<usize>,
        /// empty, midgame, or a string of 0-indexed columns
        #[arg(long, default_value = "midgame")]
        position: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Check that both algorithms agree on every position of a file
    Verify {
        #[arg(long, default_value_t = 4)]
        depth: usize,
        #[arg(long, default_value = "test_data/positions")]
        positions: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;

    match cli.command {
        Command::Play {
            ai,
            depth,
            trace_depth,
            snapshots,
        } => {
            let mut search_config = SearchConfig::new(
                ai.unwrap_or(config.search.algorithm),
                depth.unwrap_or(config.search.depth),
            );
            if let Some(trace_depth) = trace_depth {
                search_config = search_config.with_trace(trace_depth);
            }
            search_config.validate()?;
            let writer = if snapshots {
                Some(ArtifactWriter::new(&config.output.dir)?)
            } else {
                None
            };
            play(&search_config, writer.as_ref())
        }
        Command::Compare {
            depth,
            trace_depth,
            position,
            out,
        } => {
            let depth = depth.unwrap_or(config.search.depth);
            let trace_depth = trace_depth.unwrap_or(config.search.trace_depth);
            let moves = match position.as_str() {
                "empty" => "",
                "midgame" => MIDGAME,
                moves => moves,
            };
            let board = Board::from_moves(moves)
                .with_context(|| format!("invalid position '{}'", position))?;

            let comparison = Comparison::run(&board, board.to_move(), depth, trace_depth)?;
            let writer = ArtifactWriter::new(out.unwrap_or(config.output.dir))?;
            writer.write_comparison(&position, &board, &comparison)?;

            println!("{}", board);
            println!();
            print!("{}", export::performance_summary(&position, &comparison));
            Ok(())
        }
        Command::Verify { depth, positions } => {
            let boards = load_positions(&positions)
                .with_context(|| format!("failed to load positions from {}", positions.display()))?;
            let mismatches = verify(&boards, depth, true)?;
            if mismatches.is_empty() {
                println!(
                    "Minimax and alpha-beta agree on all {} positions at depths 1 to {}",
                    boards.len(),
                    depth
                );
                Ok(())
            } else {
                for mismatch in &mismatches {
                    println!("{}", mismatch);
                }
                Err(anyhow!("{} mismatches found", mismatches.len()))
            }
        }
    }
}

fn draw(board: &Board) {
    // fall back to plain text when the terminal can't be driven
    if let Err(err) = board.display() {
        debug!("failed to draw board: {}", err);
        println!("{}\n", board);
    }
}

fn play(config: &SearchConfig, writer: Option<&ArtifactWriter>) -> Result<()> {
    let mut board = Board::new();
    let human = Player::One;
    let stdin = stdin();

    println!("Welcome to Connect 4\n");
    println!(
        "You are {}, the AI plays {} with depth {}\n",
        human,
        config.algorithm.name(),
        config.depth
    );

    if let Some(writer) = writer {
        writer.write_snapshot(0, &board, "Start", None)?;
    }

    // game loop
    loop {
        draw(&board);

        match board.game_result() {
            GameResult::Ongoing => {
                let player = board.to_move();
                let next_move = if player == human {
                    print!("Move input (0-6) > ");
                    stdout().flush().context("failed to flush stdout")?;
                    let mut input_str = String::new();
                    if stdin.read_line(&mut input_str)? == 0 {
                        println!();
                        return Ok(());
                    }

                    match input_str.trim().parse::<usize>() {
                        Err(_) => {
                            println!("Invalid number: {}", input_str.trim());
                            continue;
                        }
                        Ok(column) => column,
                    }
                } else {
                    println!("AI is thinking...");
                    stdout().flush().context("failed to flush stdout")?;

                    let outcome = search(&board, player, config)?;
                    let stats = &outcome.stats;
                    println!(
                        "{} searched {} nodes ({} pruned) to depth {} in {:.3}ms, {:.0} nodes/s",
                        outcome.algorithm.name(),
                        stats.nodes_expanded,
                        stats.nodes_pruned,
                        stats.max_depth_reached,
                        stats.elapsed_ms(),
                        stats.nodes_per_sec()
                    );
                    if let Some((winner, plies)) = outcome.forced_win() {
                        let ply_string = if plies == 1 { "ply" } else { "plies" };
                        println!(
                            "{} can force a win in at most {} {}.",
                            winner, plies, ply_string
                        );
                    }
                    if let (Some(writer), Some(_)) = (writer, outcome.trace.trace_depth()) {
                        writer.write(
                            &format!("snapshots/tree_move_{:02}.dot", board.num_moves() + 1),
                            &export::trace_to_dot(&outcome.trace, outcome.algorithm.name()),
                        )?;
                    }

                    let column = outcome
                        .best_move
                        .ok_or_else(|| anyhow!("no legal move for the AI"))?;
                    println!("Best move: {}", column);
                    column
                };

                if let Err(err) = board.play_checked(next_move) {
                    println!("{}", err);
                    // try the move again
                    continue;
                }
                if let Some(writer) = writer {
                    writer.write_snapshot(
                        board.num_moves(),
                        &board,
                        &format!("Move {}", board.num_moves()),
                        Some((player, next_move)),
                    )?;
                }
            }

            // end states
            GameResult::Win(winner) => {
                println!("{} wins!", winner);
                break;
            }
            GameResult::Draw => {
                println!("Draw!");
                break;
            }
        }
    }
    info!("game over after {} moves", board.num_moves());
    Ok(())
}
