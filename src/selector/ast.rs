//! Selector and condition types.
//!
//! A selector is an immutable tree built once per query. The evaluator reads
//! it but never rewrites it: the "decremented depth" copies of an
//! [`ExploreRecursive`] only exist as runtime frames.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::traversal::accessor::{NodeKind, Scalar};

/// A declarative traversal and match query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Selector {
    /// Report the current node as a result
    Matcher(Matcher),
    /// Descend into every child of a map or list
    ExploreAll(ExploreAll),
    /// Descend into named map fields
    ExploreFields(ExploreFields),
    /// Descend into one list element
    ExploreIndex(ExploreIndex),
    /// Descend into list elements in `[start, end)`
    ExploreRange(ExploreRange),
    /// Bounded recursive descent
    ExploreRecursive(ExploreRecursive),
    /// Loop back to the nearest enclosing `ExploreRecursive`
    ExploreRecursiveEdge,
    /// Evaluate every member against the same node
    ExploreUnion(Vec<Selector>),
    /// Continue with `next` on the same node if a condition holds
    ExploreConditional(ExploreConditional),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Matcher {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_if: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExploreAll {
    pub next: Box<Selector>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExploreFields {
    pub fields: IndexMap<String, Selector>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExploreIndex {
    pub index: u64,
    pub next: Box<Selector>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExploreRange {
    pub start: u64,
    pub end: u64,
    pub next: Box<Selector>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreRecursive {
    pub sequence: Box<Selector>,
    pub max_depth: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_at: Option<Condition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExploreConditional {
    pub condition: Condition,
    pub next: Box<Selector>,
}

/// A predicate evaluated against a single node.
///
/// New predicates are added as variants; the condition engine matches
/// exhaustively so every addition is checked at compile time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Condition {
    /// Node is a map containing the key
    HasField(String),
    /// Node is a scalar equal to the value
    HasValue(Scalar),
    /// Node has the given kind
    HasKind(NodeKind),
    /// Node is a link
    IsLink,
    /// Node is a scalar ordered after the value
    GreaterThan(Scalar),
    /// Node is a scalar ordered before the value
    LessThan(Scalar),
    /// Every operand holds (short-circuits left to right)
    And(Vec<Condition>),
    /// Any operand holds (short-circuits left to right)
    Or(Vec<Condition>),
    /// The operand does not hold
    Not(Box<Condition>),
}

impl Selector {
    pub fn matcher() -> Self {
        Selector::Matcher(Matcher::default())
    }

    pub fn labelled(label: impl Into<String>) -> Self {
        Selector::Matcher(Matcher {
            only_if: None,
            label: Some(label.into()),
        })
    }

    pub fn match_if(condition: Condition) -> Self {
        Selector::Matcher(Matcher {
            only_if: Some(condition),
            label: None,
        })
    }

    pub fn explore_all(next: Selector) -> Self {
        Selector::ExploreAll(ExploreAll {
            next: Box::new(next),
        })
    }

    /// Builds an `ExploreFields` selector, keeping the given field order.
    pub fn explore_fields<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Selector)>,
    {
        Selector::ExploreFields(ExploreFields {
            fields: fields
                .into_iter()
                .map(|(key, selector)| (key.into(), selector))
                .collect(),
        })
    }

    pub fn explore_index(index: u64, next: Selector) -> Self {
        Selector::ExploreIndex(ExploreIndex {
            index,
            next: Box::new(next),
        })
    }

    pub fn explore_range(start: u64, end: u64, next: Selector) -> Self {
        Selector::ExploreRange(ExploreRange {
            start,
            end,
            next: Box::new(next),
        })
    }

    pub fn explore_recursive(max_depth: u64, sequence: Selector) -> Self {
        Selector::ExploreRecursive(ExploreRecursive {
            sequence: Box::new(sequence),
            max_depth,
            stop_at: None,
        })
    }

    pub fn explore_recursive_until(max_depth: u64, stop_at: Condition, sequence: Selector) -> Self {
        Selector::ExploreRecursive(ExploreRecursive {
            sequence: Box::new(sequence),
            max_depth,
            stop_at: Some(stop_at),
        })
    }

    pub fn edge() -> Self {
        Selector::ExploreRecursiveEdge
    }

    pub fn union(members: Vec<Selector>) -> Self {
        Selector::ExploreUnion(members)
    }

    pub fn conditional(condition: Condition, next: Selector) -> Self {
        Selector::ExploreConditional(ExploreConditional {
            condition,
            next: Box::new(next),
        })
    }

    /// Returns the variant name used in selector paths and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Selector::Matcher(_) => "matcher",
            Selector::ExploreAll(_) => "exploreAll",
            Selector::ExploreFields(_) => "exploreFields",
            Selector::ExploreIndex(_) => "exploreIndex",
            Selector::ExploreRange(_) => "exploreRange",
            Selector::ExploreRecursive(_) => "exploreRecursive",
            Selector::ExploreRecursiveEdge => "exploreRecursiveEdge",
            Selector::ExploreUnion(_) => "exploreUnion",
            Selector::ExploreConditional(_) => "exploreConditional",
        }
    }
}

impl Condition {
    pub fn has_field(key: impl Into<String>) -> Self {
        Condition::HasField(key.into())
    }

    pub fn and(operands: Vec<Condition>) -> Self {
        Condition::And(operands)
    }

    pub fn or(operands: Vec<Condition>) -> Self {
        Condition::Or(operands)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(operand: Condition) -> Self {
        Condition::Not(Box::new(operand))
    }

    /// Number of predicate nodes in this condition tree.
    pub fn size(&self) -> usize {
        match self {
            Condition::And(operands) | Condition::Or(operands) => {
                1 + operands.iter().map(Condition::size).sum::<usize>()
            }
            Condition::Not(operand) => 1 + operand.size(),
            _ => 1,
        }
    }
}
