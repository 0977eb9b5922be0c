//! Text artifacts describing searches: Graphviz trees, JSON traces, board
//! snapshots and performance summaries

use log::info;

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::board::{Board, Player};
use crate::compare::Comparison;
use crate::diff::{DiffStatus, TraceDiff};
use crate::error::{Connect4Error, Result};
use crate::search::{Algorithm, SearchOutcome};
use crate::trace::{NodeKind, Trace, TraceNode};

fn bound_label(bound: i32) -> String {
    match bound {
        i32::MIN => "-inf".to_string(),
        i32::MAX => "+inf".to_string(),
        value => value.to_string(),
    }
}

fn node_label(node: &TraceNode) -> String {
    let column = node
        .column
        .map_or_else(|| "root".to_string(), |column| format!("c{}", column));
    let kind = match node.kind {
        NodeKind::Max => "MAX",
        NodeKind::Min => "MIN",
        NodeKind::Pruned => "PRUNED",
    };
    let mut label = format!("{}\\n{}", column, kind);
    if node.kind != NodeKind::Pruned {
        let score = node.score.map_or_else(|| "?".to_string(), |score| score.to_string());
        write!(label, "\\nturn={}\\nv={}", node.to_move.symbol(), score).ok();
    }
    if let (Some(alpha), Some(beta)) = (node.alpha, node.beta) {
        write!(label, "\\nα={}\\nβ={}", bound_label(alpha), bound_label(beta)).ok();
    }
    label
}

/// Renders a search trace as a Graphviz digraph, pruned branches drawn dashed red
pub fn trace_to_dot(trace: &Trace, title: &str) -> String {
    let mut dot = String::new();
    dot.push_str("digraph G {\n");
    dot.push_str("  rankdir=TB;\n");
    dot.push_str("  labelloc=\"t\";\n");
    writeln!(dot, "  label=\"{}\";", title).ok();
    dot.push_str("  node [shape=box, fontsize=10];\n");

    for node in trace.nodes() {
        let style = match node.kind {
            NodeKind::Pruned => ", style=\"dashed\", color=\"red\"",
            NodeKind::Max => ", color=\"blue\"",
            NodeKind::Min => ", color=\"black\"",
        };
        writeln!(dot, "  n{} [label=\"{}\"{}];", node.id, node_label(node), style).ok();
    }
    for node in trace.nodes() {
        if let Some(parent) = node.parent {
            let style = if node.pruned {
                " [style=dashed, color=red]"
            } else {
                ""
            };
            writeln!(dot, "  n{} -> n{}{};", parent, node.id, style).ok();
        }
    }
    dot.push_str("}\n");
    dot
}

/// Renders the minimax tree annotated with what alpha-beta did at each node,
/// under a header comparing the two root decisions
pub fn diff_to_dot(diff: &TraceDiff, minimax_trace: &Trace, title: &str) -> String {
    let decision = &diff.decision;
    let status = if decision.agrees() { "SAME" } else { "DIFFERENT" };
    let show = |column: Option<usize>| column.map_or_else(|| "none".to_string(), |c| format!("c{}", c));

    let mut dot = String::new();
    dot.push_str("digraph D {\n");
    dot.push_str("  rankdir=TB;\n");
    dot.push_str("  labelloc=\"t\";\n");
    writeln!(dot, "  label=\"{}\";", title).ok();
    dot.push_str("  node [shape=box, fontsize=10];\n");
    writeln!(dot, "  decision [label=\"Decision: {}\", shape=ellipse];", status).ok();
    writeln!(
        dot,
        "  mm [label=\"Minimax\\nmove={}\\nvalue={}\"];",
        show(decision.minimax_move),
        decision.minimax_score
    )
    .ok();
    writeln!(
        dot,
        "  ab [label=\"Alpha-Beta\\nmove={}\\nvalue={}\"];",
        show(decision.alphabeta_move),
        decision.alphabeta_score
    )
    .ok();
    dot.push_str("  decision -> mm;\n  decision -> ab;\n");

    for entry in &diff.nodes {
        let column = minimax_trace
            .get(entry.minimax_id)
            .and_then(|node| node.column)
            .map_or_else(|| "root".to_string(), |column| format!("c{}", column));
        let (status, style) = match entry.status {
            DiffStatus::Expanded => ("expanded", ""),
            DiffStatus::Pruned => ("pruned", ", style=\"dashed\", color=\"red\""),
            DiffStatus::Skipped => ("skipped", ", style=\"dotted\", color=\"gray\""),
        };
        writeln!(
            dot,
            "  n{} [label=\"{}\\n{}\"{}];",
            entry.minimax_id, column, status, style
        )
        .ok();
    }
    for entry in &diff.nodes {
        if let Some(parent) = minimax_trace
            .get(entry.minimax_id)
            .and_then(|node| node.parent)
        {
            let style = match entry.status {
                DiffStatus::Expanded => "",
                DiffStatus::Pruned => " [style=dashed, color=red]",
                DiffStatus::Skipped => " [style=dotted, color=gray]",
            };
            writeln!(dot, "  n{} -> n{}{};", parent, entry.minimax_id, style).ok();
        }
    }
    dot.push_str("}\n");
    dot
}

/// The trace as a pretty-printed JSON array of nodes
pub fn trace_to_json(trace: &Trace) -> Result<String> {
    Ok(serde_json::to_string_pretty(trace.nodes())?)
}

/// A plain-text board snapshot with an optional title and last move
pub fn snapshot(board: &Board, title: &str, last_move: Option<(Player, usize)>) -> String {
    let mut text = String::new();
    if !title.is_empty() {
        writeln!(text, "{}\n", title).ok();
    }
    writeln!(text, "{}", board).ok();
    match last_move {
        Some((player, column)) => writeln!(text, "\nLast move: {} @ column {}", player.symbol(), column),
        None => writeln!(text, "\nLast move: None"),
    }
    .ok();
    text
}

fn outcome_summary(text: &mut String, outcome: &SearchOutcome) {
    let stats = &outcome.stats;
    writeln!(text, "{}:", outcome.algorithm.name()).ok();
    writeln!(text, "  time_ms           = {:.3}", stats.elapsed_ms()).ok();
    writeln!(text, "  nodes_expanded    = {}", stats.nodes_expanded).ok();
    if outcome.algorithm == Algorithm::AlphaBeta {
        writeln!(text, "  nodes_pruned      = {}", stats.nodes_pruned).ok();
        writeln!(text, "  cutoffs           = {}", stats.cutoffs).ok();
    }
    writeln!(text, "  max_depth_reached = {}", stats.max_depth_reached).ok();
    writeln!(text, "  nodes_per_sec     = {:.2}", stats.nodes_per_sec()).ok();
    match outcome.best_move {
        Some(column) => writeln!(text, "  chosen_move       = {}", column),
        None => writeln!(text, "  chosen_move       = none"),
    }
    .ok();
    writeln!(text, "  score             = {}\n", outcome.score).ok();
}

/// The performance comparison report for one position
pub fn performance_summary(position: &str, comparison: &Comparison) -> String {
    let mut text = String::new();
    text.push_str("Performance Comparison (same position, same depth limit)\n\n");
    writeln!(text, "Position: {}", position).ok();
    writeln!(text, "Depth limit: {}\n", comparison.minimax.depth).ok();

    outcome_summary(&mut text, &comparison.minimax);
    outcome_summary(&mut text, &comparison.alphabeta);

    let decision = &comparison.diff.decision;
    text.push_str("Decision comparison:\n");
    writeln!(
        text,
        "  same_move?        = {}",
        decision.minimax_move == decision.alphabeta_move
    )
    .ok();
    writeln!(
        text,
        "  same_root_value?  = {}",
        decision.minimax_score == decision.alphabeta_score
    )
    .ok();
    writeln!(
        text,
        "  efficiency_ratio  = {:.4} (alpha-beta nodes / minimax nodes)",
        comparison.efficiency_ratio()
    )
    .ok();
    text
}

/// Writes artifacts into a single output directory
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    /// Creates the output directory if needed
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| Connect4Error::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes one artifact, leaving any others already written untouched
    pub fn write(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| Connect4Error::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, contents).map_err(|source| Connect4Error::Io {
            path: path.clone(),
            source,
        })?;
        info!("wrote {}", path.display());
        Ok(path)
    }

    /// Writes a board snapshot as `snapshots/move_NN.txt`
    pub fn write_snapshot(
        &self,
        move_index: usize,
        board: &Board,
        title: &str,
        last_move: Option<(Player, usize)>,
    ) -> Result<PathBuf> {
        self.write(
            &format!("snapshots/move_{:02}.txt", move_index),
            &snapshot(board, title, last_move),
        )
    }

    /// Writes every artifact of a comparison run, returning the paths written
    pub fn write_comparison(
        &self,
        position: &str,
        board: &Board,
        comparison: &Comparison,
    ) -> Result<Vec<PathBuf>> {
        let depth = comparison.minimax.depth;
        let trace_depth = comparison.minimax.trace.trace_depth().unwrap_or(0);

        let mut written = Vec::new();
        written.push(self.write_snapshot(
            0,
            board,
            &format!("Start position ({})", position),
            None,
        )?);
        for outcome in [&comparison.minimax, &comparison.alphabeta].iter() {
            let stem = match outcome.algorithm {
                Algorithm::Minimax => "tree_minimax",
                Algorithm::AlphaBeta => "tree_alphabeta",
            };
            let title = format!(
                "{} (depth={}, trace_depth={})",
                outcome.algorithm.name(),
                depth,
                trace_depth
            );
            written.push(self.write(&format!("{}.json", stem), &trace_to_json(&outcome.trace)?)?);
            written.push(self.write(&format!("{}.dot", stem), &trace_to_dot(&outcome.trace, &title))?);
        }
        written.push(self.write(
            "decision_diff.dot",
            &diff_to_dot(
                &comparison.diff,
                &comparison.minimax.trace,
                &format!("Minimax vs Alpha-Beta (depth={}, trace_depth={})", depth, trace_depth),
            ),
        )?);
        written.push(self.write(
            "performance_comparison.txt",
            &performance_summary(position, comparison),
        )?);
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{search, SearchConfig};

    #[test]
    fn test_trace_dot_marks_pruned_nodes() {
        let config = SearchConfig::new(Algorithm::AlphaBeta, 3).with_trace(2);
        let outcome = search(&Board::new(), Player::One, &config).unwrap();
        let dot = trace_to_dot(&outcome.trace, "Alpha-Beta");

        assert!(dot.starts_with("digraph G {"));
        assert!(dot.trim_end().ends_with('}'));
        assert!(dot.contains("label=\"Alpha-Beta\";"));
        assert!(dot.contains("n0 [label=\"root\\nMAX"));
        assert!(dot.contains("α=-inf\\nβ=+inf"));
        assert_eq!(
            dot.matches("[style=dashed, color=red]").count(),
            outcome.trace.pruned_count()
        );
    }

    #[test]
    fn test_trace_json_lists_every_node() {
        let config = SearchConfig::new(Algorithm::Minimax, 2).with_trace(1);
        let outcome = search(&Board::new(), Player::One, &config).unwrap();
        let json = trace_to_json(&outcome.trace).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let nodes = value.as_array().unwrap();
        assert_eq!(nodes.len(), 8);
        assert_eq!(nodes[0]["kind"], "MAX");
        assert_eq!(nodes[1]["column"], 0);
        assert_eq!(nodes[1]["parent"], 0);
        assert_eq!(nodes[1]["pruned"], false);
    }

    #[test]
    fn test_snapshot_text() {
        let board = Board::from_moves("3").unwrap();
        let text = snapshot(&board, "Move 1", Some((Player::One, 3)));
        assert!(text.starts_with("Move 1\n\n0 1 2 3 4 5 6\n"));
        assert!(text.contains(". . . X . . .\n"));
        assert!(text.ends_with("Last move: X @ column 3\n"));
    }

    #[test]
    fn test_performance_summary_contents() {
        let board = Board::new();
        let comparison = Comparison::run(&board, Player::One, 3, 1).unwrap();
        let text = performance_summary("empty", &comparison);
        assert!(text.contains("Position: empty"));
        assert!(text.contains("Depth limit: 3"));
        assert!(text.contains("Minimax:"));
        assert!(text.contains("Alpha-Beta:"));
        assert!(text.contains("nodes_pruned"));
        assert!(text.contains("same_move?        = true"));
        assert!(text.contains("efficiency_ratio"));
    }
}
