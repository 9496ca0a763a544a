use yamlselect::document::{DocumentStore, NodeId, YamlNode};
use yamlselect::selector::{Condition, Selector};
use yamlselect::traversal::{
    Evaluator, NodeKind, Scalar, SelectError, StructuralError, Traversal, TraversalLimits,
};

fn fixture() -> DocumentStore {
    DocumentStore::single(
        "root",
        YamlNode::map(vec![
            (
                "x",
                YamlNode::map(vec![("y", YamlNode::map(vec![("z", YamlNode::int(1))]))]),
            ),
            (
                "w",
                YamlNode::list(vec![YamlNode::map(vec![("v", YamlNode::int(2))])]),
            ),
            ("n", YamlNode::int(7)),
        ]),
    )
}

fn ids(store: &DocumentStore, paths: &[&str]) -> Vec<NodeId> {
    paths.iter().map(|path| store.id_for("root", path)).collect()
}

fn covered(traversal: &Traversal<NodeId>) -> Vec<NodeId> {
    traversal.covered.iter().cloned().collect()
}

fn run(store: &DocumentStore, selector: &Selector) -> Traversal<NodeId> {
    let root = store.root_node().unwrap();
    Evaluator::new(store).evaluate(selector, &root).unwrap()
}

#[test]
fn test_results_are_always_covered() {
    let store = fixture();
    let selectors = vec![
        Selector::matcher(),
        Selector::explore_all(Selector::matcher()),
        Selector::explore_recursive(5, Selector::explore_all(Selector::union(vec![
            Selector::matcher(),
            Selector::edge(),
        ]))),
        Selector::explore_fields([
            ("w", Selector::explore_index(0, Selector::labelled("first"))),
            ("n", Selector::match_if(Condition::GreaterThan(Scalar::Int(5)))),
        ]),
        Selector::conditional(
            Condition::has_field("x"),
            Selector::explore_all(Selector::explore_all(Selector::matcher())),
        ),
    ];

    for selector in &selectors {
        let traversal = run(&store, selector);
        assert!(!traversal.results.is_empty(), "no results for {:?}", selector);
        for found in &traversal.results {
            assert!(
                traversal.is_covered(&found.node),
                "{} matched but not covered by {:?}",
                found.node,
                selector
            );
        }
    }
}

#[test]
fn test_union_covers_both_members_and_orders_results_by_member() {
    let store = fixture();
    let first = Selector::explore_fields([("n", Selector::labelled("first"))]);
    let second = Selector::explore_all(Selector::labelled("second"));
    let union = Selector::union(vec![first.clone(), second.clone()]);

    let a = run(&store, &first);
    let b = run(&store, &second);
    let both = run(&store, &union);

    let mut expected = covered(&a);
    for id in &b.covered {
        if !expected.contains(id) {
            expected.push(id.clone());
        }
    }
    assert_eq!(covered(&both), expected);

    let mut expected_results = a.results.clone();
    expected_results.extend(b.results.clone());
    assert_eq!(both.results, expected_results);
    assert_eq!(both.results[0].label.as_deref(), Some("first"));
    assert_eq!(both.results[1].label.as_deref(), Some("second"));
}

#[test]
fn test_recursion_with_zero_depth_never_matches() {
    let store = fixture();
    let traversal = run(&store, &Selector::explore_recursive(0, Selector::matcher()));
    assert!(traversal.results.is_empty());
    assert_eq!(covered(&traversal), ids(&store, &["/"]));
}

#[test]
fn test_recursion_of_depth_two_stops_at_grandchildren() {
    let store = fixture();
    let selector = Selector::explore_recursive(2, Selector::explore_all(Selector::edge()));
    let traversal = run(&store, &selector);
    assert_eq!(
        covered(&traversal),
        ids(&store, &["/", "/x", "/x/y", "/w", "/w/0", "/n"])
    );
    assert!(!traversal.is_covered(&store.id_for("root", "/x/y/z")));
    assert!(!traversal.is_covered(&store.id_for("root", "/w/0/v")));
}

#[test]
fn test_explore_fields_never_visits_other_keys() {
    let store = DocumentStore::single(
        "root",
        YamlNode::map(vec![("a", YamlNode::string("X")), ("b", YamlNode::string("Y"))]),
    );
    let traversal = run(&store, &Selector::explore_fields([("a", Selector::matcher())]));
    assert_eq!(covered(&traversal), ids(&store, &["/", "/a"]));
    assert_eq!(traversal.matched_nodes(), vec![&store.id_for("root", "/a")]);
}

#[test]
fn test_explore_fields_skips_missing_keys() {
    let store = fixture();
    let selector = Selector::explore_fields([
        ("missing", Selector::matcher()),
        ("n", Selector::matcher()),
    ]);
    let traversal = run(&store, &selector);
    assert_eq!(covered(&traversal), ids(&store, &["/", "/n"]));
}

#[test]
fn test_conditional_on_non_map_covers_only_the_node() {
    let store = DocumentStore::single("root", YamlNode::int(5));
    let selector = Selector::conditional(
        Condition::HasKind(NodeKind::Map),
        Selector::explore_all(Selector::matcher()),
    );
    let traversal = run(&store, &selector);
    assert!(traversal.results.is_empty());
    assert_eq!(covered(&traversal), ids(&store, &["/"]));
}

#[test]
fn test_conditional_stays_on_same_node() {
    let store = fixture();
    let selector = Selector::conditional(Condition::has_field("n"), Selector::matcher());
    let traversal = run(&store, &selector);
    assert_eq!(covered(&traversal), ids(&store, &["/"]));
    assert_eq!(traversal.matched_nodes(), vec![&store.id_for("root", "/")]);
}

#[test]
fn test_edge_without_recursion_is_structural() {
    let store = fixture();
    let root = store.root_node().unwrap();

    let err = Evaluator::new(&store)
        .evaluate(&Selector::edge(), &root)
        .unwrap_err();
    assert!(matches!(
        err,
        SelectError::Structural {
            kind: StructuralError::EdgeWithoutRecursion,
            ..
        }
    ));
    assert_eq!(err.node(), "root:/");

    let nested = Selector::explore_fields([("x", Selector::edge())]);
    let err = Evaluator::new(&store).evaluate(&nested, &root).unwrap_err();
    assert!(err.is_structural());
    assert_eq!(err.node(), "root:/x");
    assert_eq!(
        err.selector_path().steps(),
        &["exploreFields", "exploreRecursiveEdge"]
    );
}

#[test]
fn test_condition_deeper_than_budget_fails() {
    let store = fixture();
    let root = store.root_node().unwrap();
    let condition = Condition::not(Condition::not(Condition::not(Condition::IsLink)));
    assert_eq!(condition.size(), 4);

    let limits = TraversalLimits {
        condition_budget: 3,
        ..Default::default()
    };
    let err = Evaluator::new(&store)
        .with_limits(limits)
        .evaluate(&Selector::match_if(condition.clone()), &root)
        .unwrap_err();
    assert!(err.is_resource_limit());

    let traversal = run(&store, &Selector::match_if(condition));
    assert_eq!(traversal.results.len(), 1);
}

#[test]
fn test_range_visits_indices_in_ascending_order() {
    let store = DocumentStore::single(
        "root",
        YamlNode::list((0..6).map(YamlNode::int).collect()),
    );
    let traversal = run(&store, &Selector::explore_range(2, 5, Selector::matcher()));
    assert_eq!(covered(&traversal), ids(&store, &["/", "/2", "/3", "/4"]));
    assert_eq!(traversal.results.len(), 3);

    let empty = run(&store, &Selector::explore_range(4, 2, Selector::matcher()));
    assert!(empty.results.is_empty());
}
