//! Condition evaluation with a bounded budget.
//!
//! Every predicate node visited costs one unit of budget, including each
//! operand of `and`, `or` and `not`. A condition tree that would need more
//! units than remain fails before producing a boolean.

use std::cmp::Ordering;

use thiserror::Error;

use super::accessor::{AccessError, NodeAccessor, NodeKind, Scalar};
use crate::selector::Condition;

/// Errors raised while evaluating a condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("condition budget of {budget} exhausted")]
    BudgetExhausted { budget: u64 },

    #[error(transparent)]
    Access(#[from] AccessError),
}

/// Remaining predicate evaluations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionBudget {
    limit: u64,
    remaining: u64,
}

impl ConditionBudget {
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            remaining: limit,
        }
    }

    /// Takes one unit, failing once the budget is spent.
    pub fn consume(&mut self) -> Result<(), ConditionError> {
        if self.remaining == 0 {
            return Err(ConditionError::BudgetExhausted { budget: self.limit });
        }
        self.remaining -= 1;
        Ok(())
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn used(&self) -> u64 {
        self.limit - self.remaining
    }

    /// Restores the full budget.
    pub fn reset(&mut self) {
        self.remaining = self.limit;
    }
}

/// Evaluates conditions against nodes of one accessor.
pub struct ConditionEngine<'a, A: NodeAccessor> {
    accessor: &'a A,
}

impl<'a, A: NodeAccessor> ConditionEngine<'a, A> {
    pub fn new(accessor: &'a A) -> Self {
        ConditionEngine { accessor }
    }

    /// Evaluates `condition` on `node`, charging `budget` per predicate node.
    pub fn evaluate(
        &self,
        condition: &Condition,
        node: &A::Node,
        budget: &mut ConditionBudget,
    ) -> Result<bool, ConditionError> {
        budget.consume()?;

        match condition {
            Condition::HasField(key) => {
                if self.accessor.kind(node) != NodeKind::Map {
                    return Ok(false);
                }
                Ok(self.accessor.child(node, key)?.is_some())
            }
            Condition::HasValue(expected) => Ok(self.compare(node, expected) == Some(Ordering::Equal)),
            Condition::HasKind(kind) => Ok(self.accessor.kind(node) == *kind),
            Condition::IsLink => Ok(self.accessor.kind(node) == NodeKind::Link),
            Condition::GreaterThan(bound) => Ok(self.compare(node, bound) == Some(Ordering::Greater)),
            Condition::LessThan(bound) => Ok(self.compare(node, bound) == Some(Ordering::Less)),
            Condition::And(operands) => {
                for operand in operands {
                    if !self.evaluate(operand, node, budget)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Condition::Or(operands) => {
                for operand in operands {
                    if self.evaluate(operand, node, budget)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Condition::Not(operand) => Ok(!self.evaluate(operand, node, budget)?),
        }
    }

    fn compare(&self, node: &A::Node, other: &Scalar) -> Option<Ordering> {
        self.accessor.scalar(node)?.compare(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentStore, YamlNode};

    fn store() -> DocumentStore {
        let root = YamlNode::map(vec![
            ("name", YamlNode::string("widget")),
            ("count", YamlNode::int(12)),
            ("ratio", YamlNode::float(0.5)),
            ("next", YamlNode::link("other")),
        ]);
        DocumentStore::single("root", root)
    }

    fn check(store: &DocumentStore, path: Option<&str>, condition: &Condition) -> bool {
        let engine = ConditionEngine::new(store);
        let root = store.root_node().unwrap();
        let node = match path {
            Some(key) => store.child(&root, key).unwrap().unwrap(),
            None => root,
        };
        engine
            .evaluate(condition, &node, &mut ConditionBudget::new(64))
            .unwrap()
    }

    #[test]
    fn test_has_field() {
        let store = store();
        assert!(check(&store, None, &Condition::has_field("name")));
        assert!(!check(&store, None, &Condition::has_field("missing")));
        assert!(!check(&store, Some("name"), &Condition::has_field("name")));
    }

    #[test]
    fn test_has_value_and_kind() {
        let store = store();
        assert!(check(
            &store,
            Some("name"),
            &Condition::HasValue(Scalar::String("widget".to_string()))
        ));
        assert!(check(&store, Some("count"), &Condition::HasValue(Scalar::Float(12.0))));
        assert!(check(&store, Some("count"), &Condition::HasKind(NodeKind::Int)));
        assert!(!check(&store, None, &Condition::HasKind(NodeKind::List)));
    }

    #[test]
    fn test_is_link() {
        let store = store();
        assert!(check(&store, Some("next"), &Condition::IsLink));
        assert!(!check(&store, Some("name"), &Condition::IsLink));
    }

    #[test]
    fn test_ordering_predicates() {
        let store = store();
        assert!(check(&store, Some("count"), &Condition::GreaterThan(Scalar::Int(10))));
        assert!(!check(&store, Some("count"), &Condition::LessThan(Scalar::Int(10))));
        assert!(check(&store, Some("ratio"), &Condition::LessThan(Scalar::Int(1))));
        // mismatched kinds never compare
        assert!(!check(&store, Some("name"), &Condition::GreaterThan(Scalar::Int(0))));
        assert!(!check(&store, Some("name"), &Condition::LessThan(Scalar::Int(0))));
    }

    #[test]
    fn test_and_or_not() {
        let store = store();
        let both = Condition::and(vec![Condition::has_field("name"), Condition::has_field("count")]);
        let either = Condition::or(vec![Condition::has_field("nope"), Condition::has_field("count")]);
        assert!(check(&store, None, &both));
        assert!(check(&store, None, &either));
        assert!(!check(&store, None, &Condition::not(both)));
        assert!(check(&store, None, &Condition::and(vec![])));
        assert!(!check(&store, None, &Condition::or(vec![])));
    }

    #[test]
    fn test_short_circuit_saves_budget() {
        let store = store();
        let engine = ConditionEngine::new(&store);
        let root = store.root_node().unwrap();
        let condition = Condition::and(vec![
            Condition::has_field("missing"),
            Condition::has_field("name"),
            Condition::has_field("count"),
        ]);
        let mut budget = ConditionBudget::new(10);
        assert!(!engine.evaluate(&condition, &root, &mut budget).unwrap());
        assert_eq!(budget.used(), 2);
    }

    #[test]
    fn test_deep_condition_exhausts_budget() {
        let store = store();
        let engine = ConditionEngine::new(&store);
        let root = store.root_node().unwrap();

        let mut condition = Condition::HasKind(NodeKind::Map);
        for _ in 0..9 {
            condition = Condition::and(vec![condition]);
        }
        assert_eq!(condition.size(), 10);

        let mut budget = ConditionBudget::new(9);
        assert_eq!(
            engine.evaluate(&condition, &root, &mut budget),
            Err(ConditionError::BudgetExhausted { budget: 9 })
        );

        let mut budget = ConditionBudget::new(10);
        assert_eq!(engine.evaluate(&condition, &root, &mut budget), Ok(true));
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_budget_reset() {
        let mut budget = ConditionBudget::new(1);
        budget.consume().unwrap();
        assert!(budget.consume().is_err());
        budget.reset();
        assert_eq!(budget.remaining(), 1);
    }
}
