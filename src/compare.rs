//! Running minimax and alpha-beta side by side

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rayon::prelude::*;

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::board::{Board, Player};
use crate::diff::{diff, TraceDiff};
use crate::error::{Connect4Error, Result};
use crate::search::{search, Algorithm, SearchConfig, SearchOutcome};

/// Both searches of one position, with the difference between their traces
#[derive(Clone, Debug)]
pub struct Comparison {
    pub minimax: SearchOutcome,
    pub alphabeta: SearchOutcome,
    pub diff: TraceDiff,
}

impl Comparison {
    /// Runs minimax, then alpha-beta, on separate copies of `board`
    pub fn run(board: &Board, player: Player, depth: usize, trace_depth: usize) -> Result<Self> {
        let minimax_config = SearchConfig::new(Algorithm::Minimax, depth).with_trace(trace_depth);
        let alphabeta_config =
            SearchConfig::new(Algorithm::AlphaBeta, depth).with_trace(trace_depth);
        // validate both up front so a bad configuration runs neither search
        minimax_config.validate()?;
        alphabeta_config.validate()?;

        let minimax = search(board, player, &minimax_config)?;
        let alphabeta = search(board, player, &alphabeta_config)?;
        let diff = diff(&minimax, &alphabeta);

        if !diff.decision.agrees() {
            warn!(
                "minimax and alpha-beta disagree: {:?} ({}) vs {:?} ({})",
                minimax.best_move, minimax.score, alphabeta.best_move, alphabeta.score
            );
        }

        Ok(Self {
            minimax,
            alphabeta,
            diff,
        })
    }

    /// Alpha-beta nodes as a fraction of minimax nodes
    pub fn efficiency_ratio(&self) -> f64 {
        if self.minimax.stats.nodes_expanded == 0 {
            return 1.0;
        }
        self.alphabeta.stats.nodes_expanded as f64 / self.minimax.stats.nodes_expanded as f64
    }
}

/// A position where the two algorithms did not behave as expected
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mismatch {
    pub position: String,
    pub depth: usize,
    pub reason: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "position '{}' at depth {}: {}",
            self.position, self.depth, self.reason
        )
    }
}

/// Checks one position at one depth: same move, same score, no more nodes for alpha-beta
pub fn check_position(moves: &str, board: &Board, depth: usize) -> Result<Option<Mismatch>> {
    let player = board.to_move();
    let minimax = search(board, player, &SearchConfig::new(Algorithm::Minimax, depth))?;
    let alphabeta = search(board, player, &SearchConfig::new(Algorithm::AlphaBeta, depth))?;

    let reason = if minimax.best_move != alphabeta.best_move {
        Some(format!(
            "moves differ: minimax {:?}, alpha-beta {:?}",
            minimax.best_move, alphabeta.best_move
        ))
    } else if minimax.score != alphabeta.score {
        Some(format!(
            "scores differ: minimax {}, alpha-beta {}",
            minimax.score, alphabeta.score
        ))
    } else if alphabeta.stats.nodes_expanded > minimax.stats.nodes_expanded {
        Some(format!(
            "alpha-beta expanded more nodes: {} > {}",
            alphabeta.stats.nodes_expanded, minimax.stats.nodes_expanded
        ))
    } else if (alphabeta.stats.nodes_expanded == minimax.stats.nodes_expanded)
        != (alphabeta.stats.nodes_pruned == 0)
    {
        Some(format!(
            "node counts equal ({}) but {} subtrees pruned",
            minimax.stats.nodes_expanded, alphabeta.stats.nodes_pruned
        ))
    } else {
        None
    };

    Ok(reason.map(|reason| Mismatch {
        position: moves.to_string(),
        depth,
        reason,
    }))
}

/// Checks every position at every depth from 1 to `max_depth`, in parallel
///
/// Each task searches its own copy of its position.
pub fn verify(
    positions: &[(String, Board)],
    max_depth: usize,
    show_progress: bool,
) -> Result<Vec<Mismatch>> {
    SearchConfig::new(Algorithm::Minimax, max_depth).validate()?;

    let tasks: Vec<(&str, &Board, usize)> = positions
        .iter()
        .flat_map(|(moves, board)| (1..=max_depth).map(move |depth| (moves.as_str(), board, depth)))
        .collect();

    let progress = if show_progress {
        ProgressBar::new(tasks.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    progress.set_style(
        ProgressStyle::default_bar()
            .template("Verifying positions: {bar:40.cyan/blue} {pos}/{len} ~{eta} remaining")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░  "),
    );

    let results: Vec<Result<Option<Mismatch>>> = tasks
        .par_iter()
        .map(|&(moves, board, depth)| {
            let result = check_position(moves, board, depth);
            progress.inc(1);
            result
        })
        .collect();
    progress.finish_and_clear();

    let mut mismatches = Vec::new();
    for result in results {
        if let Some(mismatch) = result? {
            mismatches.push(mismatch);
        }
    }
    info!(
        "verified {} positions at depths 1..={}, {} mismatches",
        positions.len(),
        max_depth,
        mismatches.len()
    );
    Ok(mismatches)
}

/// Reads positions as move strings, one per line
///
/// Only the first whitespace separated field of each line is used, blank lines
/// and lines starting with '#' are skipped.
pub fn load_positions<P: AsRef<Path>>(path: P) -> Result<Vec<(String, Board)>> {
    let path = path.as_ref();
    let file = BufReader::new(File::open(path).map_err(|source| Connect4Error::Read {
        path: path.to_path_buf(),
        source,
    })?);

    let mut positions = Vec::new();
    for line in file.lines() {
        let line = line.map_err(|source| Connect4Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let moves = match line.split_whitespace().next() {
            Some(moves) if !moves.starts_with('#') => moves,
            _ => continue,
        };
        positions.push((moves.to_string(), Board::from_moves(moves)?));
    }
    Ok(positions)
}
