//! Seeding tree of a bracket
//!
//! The tree records who meets whom in which round. It carries no results:
//! a `Match` only says that the winners of its two children meet.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawNode {
    /// Entrant by position in the input list
    Entrant { index: usize },
    /// Empty slot; the other side advances unopposed
    Bye,
    /// Pairing whose winner advances; `round` is 0 for the first round
    Match {
        round: usize,
        top: Box<DrawNode>,
        bottom: Box<DrawNode>,
    },
}

impl DrawNode {
    pub fn entrant(index: usize) -> Self {
        DrawNode::Entrant { index }
    }

    pub fn pairing(round: usize, top: DrawNode, bottom: DrawNode) -> Self {
        DrawNode::Match {
            round,
            top: Box::new(top),
            bottom: Box::new(bottom),
        }
    }

    /// Entrant indices in top-to-bottom order
    pub fn entrants(&self) -> Vec<usize> {
        let mut out = Vec::new();
        self.collect_entrants(&mut out);
        out
    }

    fn collect_entrants(&self, out: &mut Vec<usize>) {
        match self {
            DrawNode::Entrant { index } => out.push(*index),
            DrawNode::Bye => {}
            DrawNode::Match { top, bottom, .. } => {
                top.collect_entrants(out);
                bottom.collect_entrants(out);
            }
        }
    }

    pub fn bye_count(&self) -> usize {
        match self {
            DrawNode::Entrant { .. } => 0,
            DrawNode::Bye => 1,
            DrawNode::Match { top, bottom, .. } => top.bye_count() + bottom.bye_count(),
        }
    }

    /// Number of rounds, i.e. the depth of match nesting
    pub fn rounds(&self) -> usize {
        match self {
            DrawNode::Match { top, bottom, .. } => 1 + top.rounds().max(bottom.rounds()),
            _ => 0,
        }
    }
}
