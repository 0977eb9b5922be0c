//! Node-by-node comparison of a minimax trace against an alpha-beta trace

use serde::Serialize;

use std::collections::HashMap;

use crate::search::SearchOutcome;
use crate::trace::Trace;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffStatus {
    /// Searched by both algorithms
    Expanded,
    /// Cut off by alpha-beta at this node
    Pruned,
    /// Never reached by alpha-beta because an ancestor was cut off
    Skipped,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct DiffNode {
    pub minimax_id: usize,
    pub alphabeta_id: Option<usize>,
    pub path: Vec<usize>,
    pub status: DiffStatus,
}

/// The root decisions of both algorithms
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize)]
pub struct Decision {
    pub minimax_move: Option<usize>,
    pub minimax_score: i32,
    pub alphabeta_move: Option<usize>,
    pub alphabeta_score: i32,
}

impl Decision {
    pub fn agrees(&self) -> bool {
        self.minimax_move == self.alphabeta_move && self.minimax_score == self.alphabeta_score
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct TraceDiff {
    pub decision: Decision,
    /// One entry per minimax trace node, in the minimax trace's order
    pub nodes: Vec<DiffNode>,
}

impl TraceDiff {
    pub fn count(&self, status: DiffStatus) -> usize {
        self.nodes.iter().filter(|node| node.status == status).count()
    }
}

/// Matches the nodes of two traces by their path from the root and position digest
pub fn diff(minimax: &SearchOutcome, alphabeta: &SearchOutcome) -> TraceDiff {
    let decision = Decision {
        minimax_move: minimax.best_move,
        minimax_score: minimax.score,
        alphabeta_move: alphabeta.best_move,
        alphabeta_score: alphabeta.score,
    };

    let index = identities(&alphabeta.trace);
    let nodes = minimax
        .trace
        .nodes()
        .iter()
        .map(|node| {
            let path = minimax.trace.path(node.id);
            let matched = index
                .get(&(path.clone(), node.digest))
                .and_then(|&id| alphabeta.trace.get(id));
            let status = match matched {
                Some(other) if other.pruned => DiffStatus::Pruned,
                Some(_) => DiffStatus::Expanded,
                None => DiffStatus::Skipped,
            };
            DiffNode {
                minimax_id: node.id,
                alphabeta_id: matched.map(|other| other.id),
                path,
                status,
            }
        })
        .collect();

    TraceDiff { decision, nodes }
}

fn identities(trace: &Trace) -> HashMap<(Vec<usize>, u64), usize> {
    trace
        .nodes()
        .iter()
        .map(|node| ((trace.path(node.id), node.digest), node.id))
        .collect()
}
