//! Depth-limited minimax and alpha-beta search
//!
//! Both algorithms walk the same tree in the same (ascending column) order,
//! score leaves from the searching player's point of view and keep the first
//! move reaching the best score, so they always agree on the chosen move and
//! its score. Alpha-beta only differs in how many nodes it needs to get there.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::board::{Board, GameResult, Player};
use crate::error::{Connect4Error, Result};
use crate::evaluation::{evaluate, MAX_HEURISTIC, WIN_SCORE};
use crate::trace::{NodeKind, Trace};
use crate::{HEIGHT, WIDTH};

/// The deepest search allowed, enough to play out any game
pub const MAX_DEPTH: usize = WIDTH * HEIGHT;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Minimax,
    AlphaBeta,
}

impl Algorithm {
    /// Human readable name for reports
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Minimax => "Minimax",
            Algorithm::AlphaBeta => "Alpha-Beta",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Algorithm::Minimax => write!(f, "minimax"),
            Algorithm::AlphaBeta => write!(f, "alphabeta"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = Connect4Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "minimax" => Ok(Algorithm::Minimax),
            "alphabeta" | "alpha-beta" => Ok(Algorithm::AlphaBeta),
            other => Err(Connect4Error::invalid_config(format!(
                "unknown algorithm '{}' (expected 'minimax' or 'alphabeta')",
                other
            ))),
        }
    }
}

/// Parameters of a single search
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct SearchConfig {
    pub algorithm: Algorithm,
    /// Plies to look ahead
    pub depth: usize,
    /// Plies of the tree to record, `None` to record nothing
    pub trace_depth: Option<usize>,
}

impl SearchConfig {
    pub fn new(algorithm: Algorithm, depth: usize) -> Self {
        Self {
            algorithm,
            depth,
            trace_depth: None,
        }
    }

    pub fn with_trace(mut self, trace_depth: usize) -> Self {
        self.trace_depth = Some(trace_depth);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.depth == 0 {
            return Err(Connect4Error::invalid_config("depth must be >= 1"));
        }
        if self.depth > MAX_DEPTH {
            return Err(Connect4Error::invalid_config(format!(
                "depth must be <= {}",
                MAX_DEPTH
            )));
        }
        if let Some(trace_depth) = self.trace_depth {
            if trace_depth > self.depth {
                return Err(Connect4Error::invalid_config(format!(
                    "trace depth {} exceeds search depth {}",
                    trace_depth, self.depth
                )));
            }
        }
        Ok(())
    }
}

/// Counters collected during a search
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct SearchStats {
    /// Every node visited, the root included
    pub nodes_expanded: u64,
    /// Sibling subtrees skipped by cutoffs, one per subtree
    pub nodes_pruned: u64,
    /// Number of cutoffs taken
    pub cutoffs: u64,
    pub max_depth_reached: usize,
    pub elapsed: Duration,
}

impl SearchStats {
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    pub fn nodes_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.nodes_expanded as f64 / secs
        } else {
            f64::INFINITY
        }
    }
}

/// The result of a search
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    pub algorithm: Algorithm,
    pub depth: usize,
    /// The player the search was run for, scores are from their point of view
    pub player: Player,
    /// `None` only if the game was already over
    pub best_move: Option<usize>,
    pub score: i32,
    pub stats: SearchStats,
    pub trace: Trace,
}

impl SearchOutcome {
    /// If the score shows a forced result, the winner and the number of plies until the win
    pub fn forced_win(&self) -> Option<(Player, usize)> {
        if self.score.abs() <= MAX_HEURISTIC {
            return None;
        }
        let plies = (WIN_SCORE - self.score.abs()) as usize;
        if self.score > 0 {
            Some((self.player, plies))
        } else {
            Some((self.player.other(), plies))
        }
    }
}

/// Searches `board` for the best move for `player`
///
/// The caller's board is left untouched, the search works on its own copy.
pub fn search(board: &Board, player: Player, config: &SearchConfig) -> Result<SearchOutcome> {
    config.validate()?;
    Ok(Searcher::new(*board, player, config).run())
}

/// A single search over a private copy of a position
///
/// # Scoring
/// Scores are from the searching player's point of view. A won game scores
/// `WIN_SCORE` minus the number of plies from the root, a lost game the
/// negation of that, so quicker wins and slower losses are preferred. Draws
/// score 0, and positions at the depth limit take the heuristic evaluation.
pub struct Searcher {
    board: Board,
    player: Player,
    algorithm: Algorithm,
    depth: usize,
    stats: SearchStats,
    trace: Trace,
}

impl Searcher {
    pub fn new(board: Board, player: Player, config: &SearchConfig) -> Self {
        Self {
            board,
            player,
            algorithm: config.algorithm,
            depth: config.depth,
            stats: SearchStats::default(),
            trace: config.trace_depth.map_or_else(Trace::disabled, Trace::new),
        }
    }

    pub fn run(mut self) -> SearchOutcome {
        let start = Instant::now();

        let (score, best_move) = match self.algorithm {
            Algorithm::Minimax => {
                let root = self.visit(None, None, 0, None);
                self.minimax(0, root)
            }
            Algorithm::AlphaBeta => {
                let (alpha, beta) = (i32::MIN, i32::MAX);
                let root = self.visit(None, None, 0, Some((alpha, beta)));
                self.alphabeta(0, alpha, beta, root)
            }
        };
        self.stats.elapsed = start.elapsed();

        debug!(
            "{} depth {}: move {:?}, score {}, {} nodes, {} pruned, {:.3}ms",
            self.algorithm.name(),
            self.depth,
            best_move,
            score,
            self.stats.nodes_expanded,
            self.stats.nodes_pruned,
            self.stats.elapsed_ms()
        );

        SearchOutcome {
            algorithm: self.algorithm,
            depth: self.depth,
            player: self.player,
            best_move,
            score,
            stats: self.stats,
            trace: self.trace,
        }
    }

    fn maximizing(&self) -> bool {
        self.board.to_move() == self.player
    }

    /// Score of the current node if the search stops here
    fn leaf_score(&self, ply: usize) -> Option<i32> {
        match self.board.game_result() {
            GameResult::Win(winner) if winner == self.player => Some(WIN_SCORE - ply as i32),
            GameResult::Win(_) => Some(ply as i32 - WIN_SCORE),
            GameResult::Draw => Some(0),
            GameResult::Ongoing if ply >= self.depth => Some(evaluate(&self.board, self.player)),
            GameResult::Ongoing => None,
        }
    }

    fn enter(&mut self, ply: usize) {
        self.stats.nodes_expanded += 1;
        self.stats.max_depth_reached = self.stats.max_depth_reached.max(ply);
    }

    fn visit(
        &mut self,
        parent: Option<usize>,
        column: Option<usize>,
        ply: usize,
        bounds: Option<(i32, i32)>,
    ) -> Option<usize> {
        let kind = if self.maximizing() {
            NodeKind::Max
        } else {
            NodeKind::Min
        };
        self.trace
            .record(&self.board, parent, column, ply, kind, bounds)
    }

    /// Plain minimax, returns the score and best move of the current position
    fn minimax(&mut self, ply: usize, node: Option<usize>) -> (i32, Option<usize>) {
        self.enter(ply);

        if let Some(score) = self.leaf_score(ply) {
            self.trace.set_score(node, score);
            return (score, None);
        }

        let maximizing = self.maximizing();
        let mut best_score = if maximizing { i32::MIN } else { i32::MAX };
        let mut best_move = None;

        for column in self.board.legal_moves() {
            self.board.play(column);
            let child = self.visit(node, Some(column), ply + 1, None);
            let (score, _) = self.minimax(ply + 1, child);
            self.board.undo(column);

            // strict comparison keeps the first of equally scored moves
            if (maximizing && score > best_score) || (!maximizing && score < best_score) {
                best_score = score;
                best_move = Some(column);
            }
        }

        self.trace.set_score(node, best_score);
        (best_score, best_move)
    }

    /// Minimax with alpha-beta pruning
    ///
    /// `alpha` is the score the maximizing player is already guaranteed
    /// elsewhere in the tree and `beta` the same for the minimizing player.
    fn alphabeta(
        &mut self,
        ply: usize,
        mut alpha: i32,
        mut beta: i32,
        node: Option<usize>,
    ) -> (i32, Option<usize>) {
        self.enter(ply);

        if let Some(score) = self.leaf_score(ply) {
            self.trace.set_score(node, score);
            return (score, None);
        }

        let maximizing = self.maximizing();
        let mut best_score = if maximizing { i32::MIN } else { i32::MAX };
        let mut best_move = None;

        let moves = self.board.legal_moves();
        for (i, &column) in moves.as_slice().iter().enumerate() {
            self.board.play(column);
            let child = self.visit(node, Some(column), ply + 1, Some((alpha, beta)));
            let (score, _) = self.alphabeta(ply + 1, alpha, beta, child);
            self.board.undo(column);

            if (maximizing && score > best_score) || (!maximizing && score < best_score) {
                best_score = score;
                best_move = Some(column);
            }
            if maximizing {
                alpha = alpha.max(best_score);
            } else {
                beta = beta.min(best_score);
            }

            // the other player will never allow this position, skip the remaining siblings
            if alpha >= beta {
                let skipped = &moves.as_slice()[i + 1..];
                self.stats.cutoffs += 1;
                self.stats.nodes_pruned += skipped.len() as u64;
                trace!(
                    "cutoff at ply {} after column {}: alpha {} >= beta {}, {} siblings pruned",
                    ply,
                    column,
                    alpha,
                    beta,
                    skipped.len()
                );
                self.record_pruned(node, skipped, ply + 1, (alpha, beta));
                break;
            }
        }

        self.trace.set_score(node, best_score);
        (best_score, best_move)
    }

    fn record_pruned(
        &mut self,
        parent: Option<usize>,
        columns: &[usize],
        ply: usize,
        bounds: (i32, i32),
    ) {
        if parent.is_none() {
            return;
        }
        for &column in columns {
            self.board.play(column);
            self.trace.record(
                &self.board,
                parent,
                Some(column),
                ply,
                NodeKind::Pruned,
                Some(bounds),
            );
            self.board.undo(column);
        }
    }
}
