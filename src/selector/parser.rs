//! Reading selectors from JSON and YAML text.
//!
//! Both formats use the externally tagged, camelCase form of [`Selector`]:
//!
//! ```json
//! {"exploreRecursive": {
//!     "maxDepth": 3,
//!     "sequence": {"exploreAll": {"next": "exploreRecursiveEdge"}}
//! }}
//! ```
//!
//! YAML input writes each variant as a single-key mapping, the same shape as
//! the JSON form.

use super::ast::Selector;
use super::error::SelectorParseError;

impl Selector {
    /// Parses a selector from its JSON form.
    ///
    /// # Example
    ///
    /// ```
    /// use yamlselect::selector::Selector;
    ///
    /// let selector = Selector::from_json(r#"{"exploreAll": {"next": {"matcher": {}}}}"#).unwrap();
    /// assert_eq!(selector, Selector::explore_all(Selector::matcher()));
    /// ```
    pub fn from_json(input: &str) -> Result<Self, SelectorParseError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Parses a selector from YAML written with single-key mappings for variants.
    pub fn from_yaml(input: &str) -> Result<Self, SelectorParseError> {
        let deserializer = serde_yaml::Deserializer::from_str(input);
        Ok(serde_yaml::with::singleton_map_recursive::deserialize(
            deserializer,
        )?)
    }

    /// Renders the selector in its JSON form.
    pub fn to_json(&self) -> Result<String, SelectorParseError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use crate::selector::{Condition, Selector};
    use crate::traversal::accessor::{NodeKind, Scalar};

    #[test]
    fn test_parse_recursive_selector() {
        let json = r#"{"exploreRecursive": {
            "maxDepth": 3,
            "sequence": {"exploreAll": {"next": "exploreRecursiveEdge"}}
        }}"#;
        let selector = Selector::from_json(json).unwrap();
        assert_eq!(
            selector,
            Selector::explore_recursive(3, Selector::explore_all(Selector::edge()))
        );
    }

    #[test]
    fn test_parse_matcher_with_condition_and_label() {
        let json = r#"{"matcher": {
            "onlyIf": {"and": [{"hasKind": "int"}, {"greaterThan": 10}]},
            "label": "big"
        }}"#;
        let selector = Selector::from_json(json).unwrap();
        match selector {
            Selector::Matcher(matcher) => {
                assert_eq!(matcher.label.as_deref(), Some("big"));
                assert_eq!(
                    matcher.only_if,
                    Some(Condition::and(vec![
                        Condition::HasKind(NodeKind::Int),
                        Condition::GreaterThan(Scalar::Int(10)),
                    ]))
                );
            }
            other => panic!("Expected matcher, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_fields_union_and_range() {
        let json = r#"{"exploreFields": {"fields": {
            "items": {"exploreRange": {"start": 1, "end": 3, "next": {"matcher": {}}}},
            "meta": {"exploreUnion": [{"matcher": {}}, {"exploreIndex": {"index": 0, "next": {"matcher": {}}}}]}
        }}}"#;
        let selector = Selector::from_json(json).unwrap();
        assert_eq!(
            selector,
            Selector::explore_fields([
                ("items", Selector::explore_range(1, 3, Selector::matcher())),
                (
                    "meta",
                    Selector::union(vec![
                        Selector::matcher(),
                        Selector::explore_index(0, Selector::matcher()),
                    ])
                ),
            ])
        );
    }

    #[test]
    fn test_parse_yaml_selector() {
        let yaml = r#"
exploreConditional:
  condition: isLink
  next:
    matcher:
      label: link
"#;
        let selector = Selector::from_yaml(yaml).unwrap();
        assert_eq!(
            selector,
            Selector::conditional(Condition::IsLink, Selector::labelled("link"))
        );
    }

    #[test]
    fn test_json_round_trip_preserves_stop_condition() {
        let selector = Selector::explore_recursive_until(
            5,
            Condition::has_field("stop"),
            Selector::explore_all(Selector::edge()),
        );
        let json = selector.to_json().unwrap();
        assert_eq!(Selector::from_json(&json).unwrap(), selector);
    }

    #[test]
    fn test_parse_rejects_unknown_variant() {
        assert!(Selector::from_json(r#"{"exploreSideways": {}}"#).is_err());
    }
}
