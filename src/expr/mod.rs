//! The expression engine (C3): parses a `/`-separated path expression into
//! an ordered iterator pipeline, then evaluates it against a tree.
//!
//! This is the component the rest of the crate exists to serve; the other
//! two components are its concrete syntax (C1) and tree-building (C2). No
//! single teacher file grounds this one directly - the teacher has no query
//! language - so it is built from the design notes in §9, generalizing the
//! teacher's dynamic-dispatch-by-map idiom (seen in its `ast_node!` macro's
//! `can_cast`/`cast` dispatch) to a registry of iterator factories.

mod eval;
mod kind;
pub mod registry;

use crate::error::Error;
use crate::tree::{Node, NodeId, Tree};
use crate::value::Value;
use kind::IterKind;

/// A parsed path expression: its canonical source plus the iterator
/// pipeline compiled from it (§3).
#[derive(Debug, Clone)]
pub struct Expression {
    source: String,
    iterators: Vec<IterKind>,
}

impl Expression {
    /// Parse an expression from its `/`-separated source text.
    pub fn parse(source: &str) -> Result<Self, Error> {
        let tokens = kind::tokenize(source)?;
        let mut iterators = Vec::with_capacity(tokens.len());
        let mut canonical_tokens = Vec::with_capacity(tokens.len());
        for (raw, quoted) in &tokens {
            iterators.push(kind::classify(raw, *quoted)?);
            canonical_tokens.push(kind::canonicalize_token(raw, *quoted));
        }
        if iterators.is_empty() {
            return Err(Error::expression_syntax(
                "an expression must have at least one iterator",
            ));
        }
        Ok(Expression {
            source: canonical_tokens.join("/"),
            iterators,
        })
    }

    /// The canonical source text (quoting normalized away where unneeded).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate this expression starting from `identity` (§4.3.3).
    pub fn evaluate<'a>(&self, tree: &'a Tree, identity: Node<'a>) -> Result<Vec<Node<'a>>, Error> {
        let ids = self.evaluate_ids(tree, identity.id())?;
        Ok(ids.into_iter().map(|id| tree.node(id)).collect())
    }

    pub(crate) fn evaluate_ids(&self, tree: &Tree, identity: NodeId) -> Result<Vec<NodeId>, Error> {
        let mut current = vec![identity];
        for kind in &self.iterators {
            current = eval::eval_builtin(kind, tree, identity, &current)?;
        }
        Ok(current)
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Expression {}

impl std::hash::Hash for Expression {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

/// Evaluate the expression held in `node`'s own value, using `node` itself
/// as identity (§4.3.3). Fails if the node's value is not an expression.
pub fn evaluate_node<'a>(tree: &'a Tree, node: Node<'a>) -> Result<Vec<Node<'a>>, Error> {
    match node.value() {
        Some(Value::Expr(expr)) => expr.evaluate(tree, node),
        _ => Err(Error::evaluation(
            "evaluation was requested on a node whose value is not an expression",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;
    use registry::register_static;
    use std::sync::Arc;

    fn names(nodes: &[Node]) -> Vec<&str> {
        nodes.iter().map(|n| n.name()).collect()
    }

    // Scenario 1. `NameEquals` filters the literal input sequence by name,
    // so identity must already be the "foo" node for the leading "foo"
    // token to match anything.
    #[test]
    fn children_then_name_filter() {
        let tree = parse_str("foo\n   bar\n   xxx\n   bar\n").unwrap();
        let foo = tree.root().children().next().unwrap();
        let expr = Expression::parse("foo/*/bar").unwrap();
        let out = expr.evaluate(&tree, foo).unwrap();
        assert_eq!(names(&out), vec!["bar", "bar"]);
    }

    // Scenario 2.
    #[test]
    fn root_of_identity_then_nth_child_then_descendants() {
        let tree = parse_str("foo\n   bar\n   xxx\n   bar\n").unwrap();
        let foo = tree.root().children().next().unwrap();
        let bar1 = foo.children().next().unwrap();
        let expr = Expression::parse("../0/**").unwrap();
        let out = expr.evaluate(&tree, bar1).unwrap();
        assert_eq!(names(&out), vec!["foo", "bar", "xxx", "bar"]);
    }

    // Scenario 3.
    #[test]
    fn wildcard_children_across_repeated_top_level_name() {
        let tree = parse_str("foo\n   bar1\n   bar2\nfoo\n   bar3\n").unwrap();
        let expr = Expression::parse("*/foo/*").unwrap();
        let out = expr.evaluate(&tree, tree.root()).unwrap();
        assert_eq!(names(&out), vec!["bar1", "bar2", "bar3"]);
    }

    // Scenario 4.
    #[test]
    fn value_equals_string_literal() {
        let tree = parse_str("foo\n   bar1:xxx\n   bar1:yyy\n").unwrap();
        let foo = tree.root().children().next().unwrap();
        let expr = Expression::parse("foo/*/bar1/=xxx").unwrap();
        let out = expr.evaluate(&tree, foo).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name(), "bar1");
        assert_eq!(out[0].value(), Some(&Value::Str("xxx".to_string())));
    }

    // Scenario 5.
    #[test]
    fn value_equals_coerces_typed_integer() {
        let tree = parse_str("foo\n   bar1:int:5\n   bar1:yyy\n").unwrap();
        let foo = tree.root().children().next().unwrap();
        let expr = Expression::parse("foo/*/bar1/=5").unwrap();
        let out = expr.evaluate(&tree, foo).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value(), Some(&Value::Int(5)));
    }

    // Scenario 6.
    #[test]
    fn quoted_token_with_embedded_slash_matches_name_literally() {
        let tree = parse_str("foo\n   how/dy\n").unwrap();
        let expr = Expression::parse("../**/\"how/dy\"").unwrap();
        let out = expr.evaluate(&tree, tree.root()).unwrap();
        assert_eq!(names(&out), vec!["how/dy"]);
    }

    // Scenario 7.
    #[test]
    fn registered_static_iterator_filters_by_value() {
        register_static(
            "scenario-7-^^",
            Arc::new(|tree: &Tree, _identity: NodeId, input: &[NodeId]| {
                input
                    .iter()
                    .filter(|&&id| {
                        tree.node(id)
                            .value()
                            .and_then(|v| v.comparison_text())
                            .as_deref()
                            == Some("XXX")
                    })
                    .copied()
                    .collect()
            }),
        );
        let tree = parse_str("foo\n   howdy:XXX\n").unwrap();
        let expr = Expression::parse("../**/scenario-7-^^").unwrap();
        let out = expr.evaluate(&tree, tree.root()).unwrap();
        assert_eq!(names(&out), vec!["howdy"]);
    }

    // Scenario 8.
    #[test]
    fn registered_dynamic_iterator_filters_by_value_length() {
        registry::register_dynamic(
            '\u{2603}',
            Arc::new(|token: &str| {
                let n: usize = token[1..].parse().expect("length suffix");
                Arc::new(move |tree: &Tree, _identity, input: &[NodeId]| {
                    input
                        .iter()
                        .filter(|&&id| {
                            tree.node(id)
                                .value()
                                .and_then(|v| v.comparison_text())
                                .is_some_and(|s| s.len() == n)
                        })
                        .copied()
                        .collect()
                })
            }),
        );
        let tree = parse_str("foo\n   a:x\n   b:xx\n   c:xxx\n").unwrap();
        let expr = Expression::parse("../**/\u{2603}3").unwrap();
        let out = expr.evaluate(&tree, tree.root()).unwrap();
        assert_eq!(names(&out), vec!["c"]);
    }

    #[test]
    fn invariant_root_then_nth_then_descendants_visits_every_node() {
        let tree = parse_str("foo\n   bar\n      baz\n   qux\n").unwrap();
        let baz = tree
            .root()
            .descendants()
            .find(|n| n.name() == "baz")
            .unwrap();
        let expr = Expression::parse("../0/**").unwrap();
        let out = expr.evaluate(&tree, baz).unwrap();
        assert_eq!(names(&out), vec!["foo", "bar", "baz", "qux"]);
    }

    #[test]
    fn deref_follows_node_reference() {
        // A `node`-typed value's reference points at the synthetic wrapper
        // root of its detached subtree (mirroring the document root), so a
        // bare deref lands there; "*" steps down to the actual content.
        let tree = parse_str("outer:node:\"inner\"\n").unwrap();
        let outer = tree.root().children().next().unwrap();
        let expr = Expression::parse("#/*").unwrap();
        let out = expr.evaluate(&tree, outer).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name(), "inner");
    }

    #[test]
    fn deref_evaluates_expression_on_holding_node() {
        // Open question (b): a deref over an expression-typed value
        // re-evaluates that expression with the holding node as identity.
        let tree = parse_str("foo\n   target\n   link:x:\"./*/target\"\n").unwrap();
        let foo = tree.root().children().next().unwrap();
        let link = foo.children().nth(1).unwrap();
        let expr = Expression::parse("#").unwrap();
        let out = expr.evaluate(&tree, link).unwrap();
        assert_eq!(names(&out), vec!["target"]);
    }

    #[test]
    fn evaluate_node_rejects_non_expression_value() {
        let tree = parse_str("plain:xxx\n").unwrap();
        let node = tree.root().children().next().unwrap();
        let err = evaluate_node(&tree, node).unwrap_err();
        assert!(matches!(err, Error::Evaluation(_)));
    }

    #[test]
    fn evaluate_node_runs_the_held_expression() {
        // The node's own expression runs with the node itself as identity,
        // so "./*" reaches its parent and lists siblings (including self).
        let tree = parse_str("foo\n   bar\n   link:x:\"./*\"\n").unwrap();
        let foo = tree.root().children().next().unwrap();
        let link = foo.children().nth(1).unwrap();
        let out = evaluate_node(&tree, link).unwrap();
        assert_eq!(names(&out), vec!["bar", "link"]);
    }

    #[test]
    fn expression_equality_and_hash_are_canonical_source_only() {
        use std::collections::HashSet;
        let a = Expression::parse("foo/\"bar\"").unwrap();
        let b = Expression::parse("foo/bar").unwrap();
        assert_eq!(a, b);
        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn slice_iterator_takes_a_flat_range() {
        let tree = parse_str("foo\n   a\n   b\n   c\n   d\n").unwrap();
        let foo = tree.root().children().next().unwrap();
        let expr = Expression::parse("*/[1,2]").unwrap();
        let out = expr.evaluate(&tree, foo).unwrap();
        assert_eq!(names(&out), vec!["b", "c"]);
    }

    #[test]
    fn out_of_range_nth_child_yields_empty_not_error() {
        let tree = parse_str("foo\n   a\n").unwrap();
        let foo = tree.root().children().next().unwrap();
        let expr = Expression::parse("99").unwrap();
        let out = expr.evaluate(&tree, foo).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn named_ancestor_walks_up_including_self() {
        let tree = parse_str("foo\n   bar\n      baz\n").unwrap();
        let baz = tree
            .root()
            .descendants()
            .find(|n| n.name() == "baz")
            .unwrap();
        let expr = Expression::parse("@foo").unwrap();
        let out = expr.evaluate(&tree, baz).unwrap();
        assert_eq!(names(&out), vec!["foo"]);
    }
}
