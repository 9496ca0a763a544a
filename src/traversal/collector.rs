//! Delivery of covered nodes and matches.
//!
//! The evaluator reports events to a [`TraversalSink`] as they happen, in
//! canonical traversal order. [`Collector`] buffers them into a
//! [`Traversal`]; [`FnSink`] forwards them to closures so large traversals
//! can stream results without holding them in memory.

use indexmap::IndexSet;
use serde::Serialize;
use std::hash::Hash;

/// Receives traversal events in order.
pub trait TraversalSink<Id> {
    /// Called when the walk arrives at a node. The same node may be reported
    /// more than once if several branches reach it.
    fn covered(&mut self, node: &Id);

    /// Called when a matcher reports a node.
    fn matched(&mut self, node: &Id, label: Option<&str>);
}

/// A reported node with its optional label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match<Id> {
    pub node: Id,
    pub label: Option<String>,
}

/// The buffered outcome of a traversal.
#[derive(Debug, Clone, Serialize)]
pub struct Traversal<Id> {
    /// Every visited node, in first-arrival order, without duplicates.
    pub covered: IndexSet<Id>,
    /// Matches in traversal order.
    pub results: Vec<Match<Id>>,
}

impl<Id: Eq + Hash> Traversal<Id> {
    pub fn is_covered(&self, node: &Id) -> bool {
        self.covered.contains(node)
    }

    /// Returns the covered nodes in first-arrival order.
    pub fn covered_nodes(&self) -> Vec<&Id> {
        self.covered.iter().collect()
    }

    /// Returns the matched nodes without labels.
    pub fn matched_nodes(&self) -> Vec<&Id> {
        self.results.iter().map(|found| &found.node).collect()
    }
}

/// Buffers events into a [`Traversal`].
#[derive(Debug, Clone)]
pub struct Collector<Id> {
    covered: IndexSet<Id>,
    results: Vec<Match<Id>>,
}

impl<Id: Clone + Eq + Hash> Collector<Id> {
    pub fn new() -> Self {
        Self {
            covered: IndexSet::new(),
            results: Vec::new(),
        }
    }

    pub fn covered_len(&self) -> usize {
        self.covered.len()
    }

    pub fn results_len(&self) -> usize {
        self.results.len()
    }

    pub fn finish(self) -> Traversal<Id> {
        Traversal {
            covered: self.covered,
            results: self.results,
        }
    }
}

impl<Id: Clone + Eq + Hash> Default for Collector<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: Clone + Eq + Hash> TraversalSink<Id> for Collector<Id> {
    fn covered(&mut self, node: &Id) {
        // A repeated insert keeps the first position
        self.covered.insert(node.clone());
    }

    fn matched(&mut self, node: &Id, label: Option<&str>) {
        self.results.push(Match {
            node: node.clone(),
            label: label.map(str::to_string),
        });
    }
}

/// Forwards events to a pair of closures.
pub struct FnSink<C, M> {
    on_covered: C,
    on_matched: M,
}

impl<C, M> FnSink<C, M> {
    pub fn new(on_covered: C, on_matched: M) -> Self {
        Self {
            on_covered,
            on_matched,
        }
    }
}

impl<Id, C, M> TraversalSink<Id> for FnSink<C, M>
where
    C: FnMut(&Id),
    M: FnMut(&Id, Option<&str>),
{
    fn covered(&mut self, node: &Id) {
        (self.on_covered)(node)
    }

    fn matched(&mut self, node: &Id, label: Option<&str>) {
        (self.on_matched)(node, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_dedups_covered_in_first_arrival_order() {
        let mut collector = Collector::new();
        collector.covered(&"b");
        collector.covered(&"a");
        collector.covered(&"b");
        collector.matched(&"a", Some("first"));
        collector.matched(&"a", None);

        let traversal = collector.finish();
        assert_eq!(traversal.covered_nodes(), vec![&"b", &"a"]);
        assert_eq!(traversal.results.len(), 2);
        assert_eq!(traversal.results[0].label.as_deref(), Some("first"));
        assert_eq!(traversal.results[1].label, None);
        assert!(traversal.is_covered(&"a"));
        assert_eq!(traversal.matched_nodes(), vec![&"a", &"a"]);
    }

    #[test]
    fn test_fn_sink_streams_every_event() {
        let mut covered = Vec::new();
        let mut matched = Vec::new();
        {
            let mut sink = FnSink::new(
                |node: &u32| covered.push(*node),
                |node: &u32, label: Option<&str>| matched.push((*node, label.map(String::from))),
            );
            sink.covered(&1);
            sink.covered(&1);
            sink.matched(&1, Some("x"));
        }
        assert_eq!(covered, vec![1, 1]);
        assert_eq!(matched, vec![(1, Some("x".to_string()))]);
    }
}
