//! The operator stack: an immutable, structurally shared list of stages.
//!
//! `push` returns a new stack whose prefix is shared with the old one, so
//! forking a pipeline at stage N and extending the two forks differently
//! costs one node per appended stage and neither fork observes the
//! other's additions.

use crate::stage::{Seq, Stage};
use std::sync::Arc;

struct StackNode {
    stage: Arc<dyn Stage>,
    prev: Option<Arc<StackNode>>,
    depth: usize,
}

/// An ordered list of deferred stages. Stage 0 is applied first (directly
/// to the raw source), the last-pushed stage sits closest to the
/// consumer — stages run in the order the caller chained them.
#[derive(Clone, Default)]
pub(crate) struct OperatorStack {
    top: Option<Arc<StackNode>>,
}

impl OperatorStack {
    /// A new stack with one more stage; `self` is untouched.
    pub(crate) fn push(&self, stage: Arc<dyn Stage>) -> Self {
        let depth = self.len() + 1;
        Self {
            top: Some(Arc::new(StackNode { stage, prev: self.top.clone(), depth })),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.top.as_ref().map_or(0, |n| n.depth)
    }

    /// Compose every stage over `raw`, innermost first. The result is one
    /// fully lazy iterator chain; nothing is pulled here.
    pub(crate) fn apply(&self, raw: Seq) -> Seq {
        let mut stages = Vec::with_capacity(self.len());
        let mut node = self.top.clone();
        while let Some(n) = node {
            stages.push(Arc::clone(&n.stage));
            node = n.prev.clone();
        }
        stages.into_iter().rev().fold(raw, |seq, stage| stage.apply(seq))
    }
}
