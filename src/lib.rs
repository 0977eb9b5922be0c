//! Depth-limited game tree search for the board game 'Connect 4'
//!
//! Plain minimax and alpha-beta pruning are run over the same tree with the
//! same heuristic, so they always choose the same move. The search records
//! node counts, timings and an optional partial trace of the tree, which can
//! be diffed between the two algorithms and exported as Graphviz or JSON.
//!
//! # Basic Usage
//!
//! ```
//! use connect4_search::{search, Algorithm, Board, SearchConfig};
//!
//!# fn main() -> Result<(), connect4_search::Connect4Error> {
//! let board = Board::from_moves("")?;
//! let config = SearchConfig::new(Algorithm::AlphaBeta, 1);
//! let outcome = search(&board, board.to_move(), &config)?;
//!
//! assert!((outcome.score, outcome.best_move) == (11, Some(3)));
//!# Ok(())
//!# }
//! ```

use static_assertions::*;
pub use anyhow;

pub mod board;

pub mod evaluation;

pub mod trace;

pub mod search;

pub mod diff;

pub mod compare;

pub mod export;

pub mod config;

pub mod error;


pub use board::{Board, Cell, GameResult, Player};
pub use compare::{Comparison, Mismatch};
pub use config::AppConfig;
pub use diff::{diff, DiffStatus, TraceDiff};
pub use error::{Connect4Error, Result};
pub use search::{search, Algorithm, SearchConfig, SearchOutcome, SearchStats, MAX_DEPTH};
pub use trace::{NodeKind, Trace, TraceNode};

/// The width of the game board in tiles
pub const WIDTH: usize = 7;

/// The height of the game board in tiles
pub const HEIGHT: usize = 6;

// ensure that the given dimensions fit in a u64 for the bitboard representation
const_assert!(WIDTH * (HEIGHT + 1) < 64);
