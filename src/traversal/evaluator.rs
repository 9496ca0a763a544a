//! The selector evaluator.
//!
//! Walks a data tree depth-first under the guidance of a selector. Each node
//! the walk arrives at is reported as covered; each node a matcher accepts is
//! reported as a result. Both streams are emitted in one canonical order that
//! depends only on the selector and on the accessor's child order.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::accessor::{AccessError, NodeAccessor, NodeKind};
use super::cancel::CancelToken;
use super::collector::{Collector, Traversal, TraversalSink};
use super::condition::{ConditionBudget, ConditionEngine, ConditionError};
use super::error::{ResourceLimit, SelectError, SelectorPath, StructuralError};
use super::recursion::{Frame, RecursionController, Termination};
use crate::selector::{
    Condition, ExploreAll, ExploreFields, ExploreIndex, ExploreRange, ExploreRecursive, Matcher,
    Selector,
};

/// How the condition budget is shared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetScope {
    /// Every condition evaluation starts with the full budget
    #[default]
    PerCheck,
    /// One budget is drawn down by all conditions of a traversal
    PerTraversal,
}

/// What to do when the accessor fails to fetch a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessErrorPolicy {
    /// Stop the traversal and report the error
    #[default]
    Abort,
    /// Treat the failing branch as empty and continue
    Skip,
}

/// Default selector nesting limit. Each level costs a few native stack
/// frames, so this stays well inside a 2 MiB thread stack.
pub const DEFAULT_MAX_NESTING: usize = 128;

/// Bounds applied to a single traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalLimits {
    /// Predicate nodes a condition may visit
    pub condition_budget: u64,
    pub condition_budget_scope: BudgetScope,
    /// Maximum node arrivals, unbounded when `None`
    pub max_visits: Option<u64>,
    /// Maximum selector steps, including steps that stay on the same node
    pub max_steps: Option<u64>,
    /// Maximum selector nesting depth
    pub max_nesting: usize,
    pub on_access_error: AccessErrorPolicy,
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self {
            condition_budget: 64,
            condition_budget_scope: BudgetScope::PerCheck,
            max_visits: None,
            max_steps: None,
            max_nesting: DEFAULT_MAX_NESTING,
            on_access_error: AccessErrorPolicy::Abort,
        }
    }
}

/// Counters collected during a traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TraversalStats {
    /// Node arrivals, including repeated arrivals at the same node
    pub visits: u64,
    /// Selector applications, including those that stay on the same node
    pub steps: u64,
    pub matches: u64,
    pub condition_checks: u64,
    pub deepest_nesting: usize,
}

/// Evaluates selectors against the nodes of one accessor.
///
/// # Example
///
/// ```
/// use yamlselect::document::{DocumentStore, YamlNode};
/// use yamlselect::selector::Selector;
/// use yamlselect::traversal::Evaluator;
///
/// let store = DocumentStore::single(
///     "root",
///     YamlNode::map(vec![("a", YamlNode::int(1)), ("b", YamlNode::int(2))]),
/// );
/// let root = store.root_node().unwrap();
/// let selector = Selector::explore_fields([("a", Selector::matcher())]);
///
/// let traversal = Evaluator::new(&store).evaluate(&selector, &root).unwrap();
/// assert_eq!(traversal.covered.len(), 2);
/// assert_eq!(traversal.results.len(), 1);
/// ```
pub struct Evaluator<'a, A: NodeAccessor> {
    accessor: &'a A,
    limits: TraversalLimits,
    cancel: Option<CancelToken>,
}

impl<'a, A: NodeAccessor> Evaluator<'a, A> {
    pub fn new(accessor: &'a A) -> Self {
        Evaluator {
            accessor,
            limits: TraversalLimits::default(),
            cancel: None,
        }
    }

    pub fn with_limits(mut self, limits: TraversalLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn limits(&self) -> &TraversalLimits {
        &self.limits
    }

    /// Runs a traversal and buffers its covered set and results.
    pub fn evaluate(
        &self,
        selector: &Selector,
        root: &A::Node,
    ) -> Result<Traversal<A::Id>, SelectError> {
        let mut collector = Collector::new();
        self.walk(selector, root, &mut collector)?;
        Ok(collector.finish())
    }

    /// Runs a traversal, streaming events into `sink` as they happen.
    ///
    /// On error, events already delivered remain valid: they describe the
    /// traversal up to the failing step.
    pub fn walk<S>(
        &self,
        selector: &Selector,
        root: &A::Node,
        sink: &mut S,
    ) -> Result<TraversalStats, SelectError>
    where
        S: TraversalSink<A::Id> + ?Sized,
    {
        let mut walk = Walk {
            accessor: self.accessor,
            limits: &self.limits,
            cancel: self.cancel.as_ref(),
            sink,
            controller: RecursionController::new(),
            shared_budget: ConditionBudget::new(self.limits.condition_budget),
            stats: TraversalStats::default(),
        };

        let trail = Trail::root(selector.name());
        walk.arrive(root, &trail)?;
        walk.step(selector, root, None, &trail)?;

        debug!(
            visits = walk.stats.visits,
            steps = walk.stats.steps,
            matches = walk.stats.matches,
            condition_checks = walk.stats.condition_checks,
            deepest_nesting = walk.stats.deepest_nesting,
            "traversal complete"
        );
        Ok(walk.stats)
    }
}

/// The chain of selector steps leading to the current one.
struct Trail<'t> {
    name: &'static str,
    parent: Option<&'t Trail<'t>>,
    nesting: usize,
}

impl Trail<'static> {
    fn root(name: &'static str) -> Self {
        Trail {
            name,
            parent: None,
            nesting: 1,
        }
    }
}

impl<'t> Trail<'t> {
    fn child<'p>(&'p self, name: &'static str) -> Trail<'p> {
        Trail {
            name,
            parent: Some(self),
            nesting: self.nesting + 1,
        }
    }

    fn path(&self) -> SelectorPath {
        let mut steps = vec![self.name];
        let mut current = self.parent;
        while let Some(trail) = current {
            steps.push(trail.name);
            current = trail.parent;
        }
        steps.reverse();
        SelectorPath::new(steps)
    }
}

/// Mutable state of one traversal.
struct Walk<'e, 'k, A: NodeAccessor, S: TraversalSink<A::Id> + ?Sized> {
    accessor: &'e A,
    limits: &'e TraversalLimits,
    cancel: Option<&'e CancelToken>,
    sink: &'k mut S,
    controller: RecursionController,
    shared_budget: ConditionBudget,
    stats: TraversalStats,
}

impl<'e, 'k, A, S> Walk<'e, 'k, A, S>
where
    A: NodeAccessor,
    S: TraversalSink<A::Id> + ?Sized,
{
    /// Applies `selector` to `node`. Every step is a cancellation point and
    /// is charged against the step budget, including steps that stay on the
    /// same node.
    fn step<'s>(
        &mut self,
        selector: &'s Selector,
        node: &A::Node,
        stack: Option<&'s Frame<'s>>,
        trail: &Trail<'_>,
    ) -> Result<(), SelectError> {
        self.enter_step(node, trail)?;

        match selector {
            Selector::Matcher(matcher) => self.matcher(matcher, node, trail),
            Selector::ExploreAll(explore) => self.explore_all(explore, node, stack, trail),
            Selector::ExploreFields(explore) => self.explore_fields(explore, node, stack, trail),
            Selector::ExploreIndex(explore) => self.explore_index(explore, node, stack, trail),
            Selector::ExploreRange(explore) => self.explore_range(explore, node, stack, trail),
            Selector::ExploreUnion(members) => {
                for member in members {
                    let member_trail = trail.child(member.name());
                    self.step(member, node, stack, &member_trail)?;
                }
                Ok(())
            }
            Selector::ExploreConditional(explore) => {
                if self.check(&explore.condition, node, trail)? {
                    let next_trail = trail.child(explore.next.name());
                    self.step(&explore.next, node, stack, &next_trail)?;
                }
                Ok(())
            }
            Selector::ExploreRecursive(recursive) => {
                self.enter_recursive(recursive, recursive.max_depth, node, stack, trail)
            }
            Selector::ExploreRecursiveEdge => self.follow_edge(node, stack, trail),
        }
    }

    /// Enforces cancellation, the step budget and the nesting limit.
    fn enter_step(&mut self, node: &A::Node, trail: &Trail<'_>) -> Result<(), SelectError> {
        if self.cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(self.cancelled(node, trail));
        }

        self.stats.steps += 1;
        if let Some(budget) = self.limits.max_steps {
            if self.stats.steps > budget {
                return Err(self.limit_error(ResourceLimit::StepBudget { budget }, node, trail));
            }
        }

        if trail.nesting > self.limits.max_nesting {
            return Err(self.limit_error(
                ResourceLimit::Nesting {
                    limit: self.limits.max_nesting,
                },
                node,
                trail,
            ));
        }
        self.stats.deepest_nesting = self.stats.deepest_nesting.max(trail.nesting);
        Ok(())
    }

    fn matcher(&mut self, matcher: &Matcher, node: &A::Node, trail: &Trail<'_>) -> Result<(), SelectError> {
        if let Some(condition) = &matcher.only_if {
            if !self.check(condition, node, trail)? {
                return Ok(());
            }
        }
        let id = self.accessor.identity(node);
        trace!(node = %id, label = ?matcher.label, "matched");
        self.stats.matches += 1;
        self.sink.matched(&id, matcher.label.as_deref());
        Ok(())
    }

    fn explore_all<'s>(
        &mut self,
        explore: &'s ExploreAll,
        node: &A::Node,
        stack: Option<&'s Frame<'s>>,
        trail: &Trail<'_>,
    ) -> Result<(), SelectError> {
        let Some(target) = self.resolve(node, trail)? else {
            return Ok(());
        };
        let children = self.accessor.children(&target);
        let Some(children) = self.fetch(children, &target, trail)? else {
            return Ok(());
        };
        let next_trail = trail.child(explore.next.name());
        for (_, child) in children {
            self.descend(&explore.next, &child, stack, &next_trail)?;
        }
        Ok(())
    }

    fn explore_fields<'s>(
        &mut self,
        explore: &'s ExploreFields,
        node: &A::Node,
        stack: Option<&'s Frame<'s>>,
        trail: &Trail<'_>,
    ) -> Result<(), SelectError> {
        let Some(target) = self.resolve(node, trail)? else {
            return Ok(());
        };
        if self.accessor.kind(&target) != NodeKind::Map {
            return Ok(());
        }
        for (key, next) in &explore.fields {
            let child = self.accessor.child(&target, key);
            if let Some(Some(child)) = self.fetch(child, &target, trail)? {
                let next_trail = trail.child(next.name());
                self.descend(next, &child, stack, &next_trail)?;
            }
        }
        Ok(())
    }

    fn explore_index<'s>(
        &mut self,
        explore: &'s ExploreIndex,
        node: &A::Node,
        stack: Option<&'s Frame<'s>>,
        trail: &Trail<'_>,
    ) -> Result<(), SelectError> {
        let Some(target) = self.resolve(node, trail)? else {
            return Ok(());
        };
        let element = self.accessor.element(&target, explore.index);
        if let Some(Some(element)) = self.fetch(element, &target, trail)? {
            let next_trail = trail.child(explore.next.name());
            self.descend(&explore.next, &element, stack, &next_trail)?;
        }
        Ok(())
    }

    fn explore_range<'s>(
        &mut self,
        explore: &'s ExploreRange,
        node: &A::Node,
        stack: Option<&'s Frame<'s>>,
        trail: &Trail<'_>,
    ) -> Result<(), SelectError> {
        let Some(target) = self.resolve(node, trail)? else {
            return Ok(());
        };
        let Some(length) = self.accessor.length(&target) else {
            return Ok(());
        };
        let next_trail = trail.child(explore.next.name());
        for index in explore.start..explore.end.min(length) {
            let element = self.accessor.element(&target, index);
            if let Some(Some(element)) = self.fetch(element, &target, trail)? {
                self.descend(&explore.next, &element, stack, &next_trail)?;
            }
        }
        Ok(())
    }

    /// Re-enters the innermost recursive selector with one iteration fewer.
    fn follow_edge<'s>(
        &mut self,
        node: &A::Node,
        stack: Option<&'s Frame<'s>>,
        trail: &Trail<'_>,
    ) -> Result<(), SelectError> {
        let frame = match self.controller.resolve_edge(stack) {
            Ok(frame) => frame,
            Err(kind) => return Err(self.structural_error(kind, node, trail)),
        };
        let remaining = frame.remaining_depth().saturating_sub(1);
        let loop_trail = trail.child("exploreRecursive");
        self.enter_recursive(frame.recursive(), remaining, node, frame.parent(), &loop_trail)
    }

    /// Starts one iteration of a recursive selector with `depth` iterations left.
    fn enter_recursive<'s>(
        &mut self,
        recursive: &'s ExploreRecursive,
        depth: u64,
        node: &A::Node,
        parent: Option<&'s Frame<'s>>,
        trail: &Trail<'_>,
    ) -> Result<(), SelectError> {
        if depth == 0 {
            self.terminate(Termination::DepthExhausted, node);
            return Ok(());
        }
        if let Some(stop_at) = &recursive.stop_at {
            if self.check(stop_at, node, trail)? {
                self.terminate(Termination::StopCondition, node);
                return Ok(());
            }
        }
        if let Err(kind) = self.controller.validate(recursive) {
            return Err(self.structural_error(kind, node, trail));
        }

        let frame = Frame::push(recursive, depth, parent);
        debug!(
            node = %self.accessor.identity(node),
            remaining_depth = depth,
            frames = frame.height(),
            "entering recursive frame"
        );
        let sequence_trail = trail.child(recursive.sequence.name());
        self.step(&recursive.sequence, node, Some(&frame), &sequence_trail)
    }

    fn terminate(&self, reason: Termination, node: &A::Node) {
        debug!(node = %self.accessor.identity(node), ?reason, "recursive branch terminated");
    }

    /// Arrives at a child node and continues with `next` there.
    fn descend<'s>(
        &mut self,
        next: &'s Selector,
        child: &A::Node,
        stack: Option<&'s Frame<'s>>,
        trail: &Trail<'_>,
    ) -> Result<(), SelectError> {
        self.arrive(child, trail)?;
        self.step(next, child, stack, trail)
    }

    /// Records a node arrival, enforcing cancellation and the visit budget.
    fn arrive(&mut self, node: &A::Node, trail: &Trail<'_>) -> Result<(), SelectError> {
        if self.cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(self.cancelled(node, trail));
        }

        self.stats.visits += 1;
        if let Some(budget) = self.limits.max_visits {
            if self.stats.visits > budget {
                return Err(self.limit_error(ResourceLimit::TraversalBudget { budget }, node, trail));
            }
        }

        let id = self.accessor.identity(node);
        trace!(node = %id, "covered");
        self.sink.covered(&id);
        Ok(())
    }

    /// Returns the node whose children an explore step enumerates.
    ///
    /// Links are dereferenced and their target is recorded as covered.
    fn resolve(&mut self, node: &A::Node, trail: &Trail<'_>) -> Result<Option<A::Node>, SelectError> {
        if self.accessor.kind(node) != NodeKind::Link {
            return Ok(Some(node.clone()));
        }
        let target = self.accessor.dereference(node);
        match self.fetch(target, node, trail)? {
            Some(target) => {
                self.arrive(&target, trail)?;
                Ok(Some(target))
            }
            None => Ok(None),
        }
    }

    /// Applies the access error policy to the result of an accessor call.
    fn fetch<T>(
        &self,
        result: Result<T, AccessError>,
        node: &A::Node,
        trail: &Trail<'_>,
    ) -> Result<Option<T>, SelectError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(source) => match self.limits.on_access_error {
                AccessErrorPolicy::Abort => Err(SelectError::Access {
                    source,
                    selector_path: trail.path(),
                    node: self.accessor.identity(node).to_string(),
                }),
                AccessErrorPolicy::Skip => {
                    warn!(
                        node = %self.accessor.identity(node),
                        selector = %trail.path(),
                        error = %source,
                        "skipping branch after access error"
                    );
                    Ok(None)
                }
            },
        }
    }

    fn check(&mut self, condition: &Condition, node: &A::Node, trail: &Trail<'_>) -> Result<bool, SelectError> {
        self.stats.condition_checks += 1;
        let engine = ConditionEngine::new(self.accessor);
        let outcome = match self.limits.condition_budget_scope {
            BudgetScope::PerCheck => {
                let mut budget = ConditionBudget::new(self.limits.condition_budget);
                engine.evaluate(condition, node, &mut budget)
            }
            BudgetScope::PerTraversal => engine.evaluate(condition, node, &mut self.shared_budget),
        };

        match outcome {
            Ok(holds) => Ok(holds),
            Err(ConditionError::BudgetExhausted { budget }) => Err(self.limit_error(
                ResourceLimit::ConditionBudget { budget },
                node,
                trail,
            )),
            Err(ConditionError::Access(source)) => {
                Ok(self.fetch::<bool>(Err(source), node, trail)?.unwrap_or(false))
            }
        }
    }

    fn cancelled(&self, node: &A::Node, trail: &Trail<'_>) -> SelectError {
        SelectError::Cancelled {
            selector_path: trail.path(),
            node: self.accessor.identity(node).to_string(),
        }
    }

    fn structural_error(&self, kind: StructuralError, node: &A::Node, trail: &Trail<'_>) -> SelectError {
        SelectError::Structural {
            kind,
            selector_path: trail.path(),
            node: self.accessor.identity(node).to_string(),
        }
    }

    fn limit_error(&self, limit: ResourceLimit, node: &A::Node, trail: &Trail<'_>) -> SelectError {
        SelectError::ResourceLimit {
            limit,
            selector_path: trail.path(),
            node: self.accessor.identity(node).to_string(),
        }
    }
}
