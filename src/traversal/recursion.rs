//! Bookkeeping for active `exploreRecursive` selectors.
//!
//! Frames form a linked stack that lives on the native call stack of the
//! evaluator: each frame borrows its parent, so pushing is free and popping
//! happens when the evaluating call returns. An `exploreRecursiveEdge`
//! always resolves to the innermost frame.

use std::collections::HashSet;

use super::error::StructuralError;
use crate::selector::{ExploreRecursive, Selector};

/// One active `exploreRecursive` iteration.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    recursive: &'a ExploreRecursive,
    remaining_depth: u64,
    parent: Option<&'a Frame<'a>>,
}

impl<'a> Frame<'a> {
    /// Creates a frame on top of `parent`.
    pub fn push(
        recursive: &'a ExploreRecursive,
        remaining_depth: u64,
        parent: Option<&'a Frame<'a>>,
    ) -> Self {
        Frame {
            recursive,
            remaining_depth,
            parent,
        }
    }

    /// The selector that opened this frame.
    pub fn recursive(&self) -> &'a ExploreRecursive {
        self.recursive
    }

    pub fn remaining_depth(&self) -> u64 {
        self.remaining_depth
    }

    /// The enclosing frame, which an edge re-entering this loop runs under.
    pub fn parent(&self) -> Option<&'a Frame<'a>> {
        self.parent
    }

    /// Number of frames from this one to the bottom of the stack.
    pub fn height(&self) -> usize {
        let mut count = 1;
        let mut current = self.parent;
        while let Some(frame) = current {
            count += 1;
            current = frame.parent;
        }
        count
    }
}

/// Why a recursive branch stopped without descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    DepthExhausted,
    StopCondition,
}

/// Tracks which recursive selectors have passed structural validation.
///
/// Validation happens the first time a frame would be pushed for a selector,
/// so a recursion that never iterates (depth zero, or stopped immediately)
/// is never validated.
#[derive(Debug, Default)]
pub struct RecursionController {
    validated: HashSet<usize>,
}

impl RecursionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks that `recursive` has a reachable edge, once per selector instance.
    pub fn validate(&mut self, recursive: &ExploreRecursive) -> Result<(), StructuralError> {
        let key = recursive as *const ExploreRecursive as usize;
        if self.validated.contains(&key) {
            return Ok(());
        }
        if !has_reachable_edge(&recursive.sequence) {
            return Err(StructuralError::MissingEdge);
        }
        self.validated.insert(key);
        Ok(())
    }

    /// Resolves an edge to the innermost active frame.
    pub fn resolve_edge<'a>(
        &self,
        stack: Option<&'a Frame<'a>>,
    ) -> Result<&'a Frame<'a>, StructuralError> {
        stack.ok_or(StructuralError::EdgeWithoutRecursion)
    }
}

/// Returns true if `sequence` contains an edge that belongs to the
/// recursion owning it. Edges inside a nested `exploreRecursive` belong to
/// the nested one and are not counted.
pub fn has_reachable_edge(sequence: &Selector) -> bool {
    match sequence {
        Selector::ExploreRecursiveEdge => true,
        Selector::ExploreRecursive(_) | Selector::Matcher(_) => false,
        Selector::ExploreAll(explore) => has_reachable_edge(&explore.next),
        Selector::ExploreIndex(explore) => has_reachable_edge(&explore.next),
        Selector::ExploreRange(explore) => has_reachable_edge(&explore.next),
        Selector::ExploreConditional(explore) => has_reachable_edge(&explore.next),
        Selector::ExploreFields(explore) => explore.fields.values().any(has_reachable_edge),
        Selector::ExploreUnion(members) => members.iter().any(has_reachable_edge),
    }
}
