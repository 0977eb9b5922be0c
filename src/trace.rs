//! Records of the nodes visited during a search

use serde::Serialize;

use crate::board::{Board, Player};

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeKind {
    /// The searching player is to move
    Max,
    /// The opponent is to move
    Min,
    /// Skipped by an alpha-beta cutoff
    Pruned,
}

/// A single visited (or pruned) position in a search tree
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct TraceNode {
    pub id: usize,
    pub parent: Option<usize>,
    /// The column played from the parent, `None` for the root
    pub column: Option<usize>,
    /// Plies from the root
    pub depth: usize,
    pub to_move: Player,
    pub kind: NodeKind,
    pub digest: u64,
    /// Alpha-beta bounds when the node was reached (or cut off)
    pub alpha: Option<i32>,
    pub beta: Option<i32>,
    /// Backed-up score, `None` for pruned nodes
    pub score: Option<i32>,
    pub pruned: bool,
}

/// The partial tree recorded by a search, in visiting order
///
/// Only nodes down to `trace_depth` plies are recorded. Deeper nodes are still
/// searched and counted, they just leave no record.
#[derive(Clone, Debug, Default)]
pub struct Trace {
    trace_depth: Option<usize>,
    nodes: Vec<TraceNode>,
}

impl Trace {
    /// A trace that records nothing
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn new(trace_depth: usize) -> Self {
        Self {
            trace_depth: Some(trace_depth),
            nodes: Vec::new(),
        }
    }

    pub fn trace_depth(&self) -> Option<usize> {
        self.trace_depth
    }

    fn records(&self, depth: usize) -> bool {
        self.trace_depth.map_or(false, |max| depth <= max)
    }

    /// Records the position `board` reached from `parent`, returning the new node's id
    pub(crate) fn record(
        &mut self,
        board: &Board,
        parent: Option<usize>,
        column: Option<usize>,
        depth: usize,
        kind: NodeKind,
        bounds: Option<(i32, i32)>,
    ) -> Option<usize> {
        // a node is only recorded below a recorded parent
        if !self.records(depth) || (depth > 0 && parent.is_none()) {
            return None;
        }
        let id = self.nodes.len();
        self.nodes.push(TraceNode {
            id,
            parent,
            column,
            depth,
            to_move: board.to_move(),
            kind,
            digest: board.digest(),
            alpha: bounds.map(|(alpha, _)| alpha),
            beta: bounds.map(|(_, beta)| beta),
            score: None,
            pruned: kind == NodeKind::Pruned,
        });
        Some(id)
    }

    pub(crate) fn set_score(&mut self, id: Option<usize>, score: i32) {
        if let Some(node) = id.and_then(|id| self.nodes.get_mut(id)) {
            node.score = Some(score);
        }
    }

    pub fn nodes(&self) -> &[TraceNode] {
        &self.nodes
    }

    pub fn get(&self, id: usize) -> Option<&TraceNode> {
        self.nodes.get(id)
    }

    pub fn root(&self) -> Option<&TraceNode> {
        self.nodes.first()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: usize) -> impl Iterator<Item = &TraceNode> {
        self.nodes.iter().filter(move |node| node.parent == Some(id))
    }

    pub fn pruned_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.pruned).count()
    }

    /// The columns played from the root to reach node `id`
    pub fn path(&self, id: usize) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = self.nodes.get(id);
        while let Some(node) = current {
            if let Some(column) = node.column {
                path.push(column);
            }
            current = node.parent.and_then(|parent| self.nodes.get(parent));
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_trace_records_nothing() {
        let mut trace = Trace::disabled();
        let id = trace.record(&Board::new(), None, None, 0, NodeKind::Max, None);
        assert_eq!(id, None);
        assert!(trace.is_empty());
    }

    #[test]
    fn test_depth_limit_and_paths() {
        let mut board = Board::new();
        let mut trace = Trace::new(1);
        let root = trace.record(&board, None, None, 0, NodeKind::Max, None);
        board.play(3);
        let child = trace.record(&board, root, Some(3), 1, NodeKind::Min, Some((-5, 5)));
        board.play(2);
        let grandchild = trace.record(&board, child, Some(2), 2, NodeKind::Max, None);

        assert_eq!(root, Some(0));
        assert_eq!(child, Some(1));
        assert_eq!(grandchild, None);
        assert_eq!(trace.path(1), vec![3]);
        assert_eq!(trace.get(1).and_then(|node| node.alpha), Some(-5));
        assert_eq!(trace.children(0).count(), 1);

        trace.set_score(child, 42);
        assert_eq!(trace.get(1).and_then(|node| node.score), Some(42));
    }

    #[test]
    fn test_orphans_are_not_recorded() {
        let mut trace = Trace::new(3);
        let id = trace.record(&Board::new(), None, Some(1), 2, NodeKind::Min, None);
        assert_eq!(id, None);
    }
}
