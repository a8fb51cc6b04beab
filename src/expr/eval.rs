//! Evaluating one classified [`IterKind`] against a tree (§4.3.2, §4.3.3).

use super::kind::IterKind;
use super::registry;
use crate::error::Error;
use crate::tree::{NodeId, Tree};
use crate::value::Value;

pub(super) fn eval_builtin(
    kind: &IterKind,
    tree: &Tree,
    identity: NodeId,
    input: &[NodeId],
) -> Result<Vec<NodeId>, Error> {
    let out = match kind {
        IterKind::Root => input.iter().map(|&id| root_of(tree, id)).collect(),
        IterKind::Children => input
            .iter()
            .flat_map(|&id| tree.node(id).children().map(|c| c.id()).collect::<Vec<_>>())
            .collect(),
        IterKind::Descendants => {
            let mut out = Vec::new();
            for &id in input {
                out.push(id);
                out.extend(tree.node(id).descendants().map(|n| n.id()));
            }
            out
        }
        IterKind::Parent => input
            .iter()
            .filter_map(|&id| tree.node(id).parent().map(|p| p.id()))
            .collect(),
        IterKind::RootOfIdentity => vec![root_of(tree, identity)],
        IterKind::Deref => {
            let mut out = Vec::new();
            for &id in input {
                match tree.node(id).value() {
                    Some(Value::NodeRef(target)) => out.push(*target),
                    Some(Value::Expr(expr)) => {
                        out.extend(expr.evaluate_ids(tree, id)?);
                    }
                    _ => {}
                }
            }
            out
        }
        IterKind::PrevSibling(n) => input
            .iter()
            .filter_map(|&id| sibling_offset(tree, id, -(*n as i64)))
            .collect(),
        IterKind::NextSibling(n) => input
            .iter()
            .filter_map(|&id| sibling_offset(tree, id, *n as i64))
            .collect(),
        IterKind::NthChild(n) => input
            .iter()
            .filter_map(|&id| tree.node(id).children().nth(*n as usize).map(|c| c.id()))
            .collect(),
        IterKind::NamedAncestor(name) => input
            .iter()
            .filter_map(|&id| {
                tree.node(id)
                    .ancestors()
                    .find(|a| a.name() == name)
                    .map(|a| a.id())
            })
            .collect(),
        IterKind::Slice(start, count) => {
            let start = (*start).min(input.len());
            let end = start.saturating_add(*count).min(input.len());
            input[start..end].to_vec()
        }
        IterKind::ValueEquals(literal) => input
            .iter()
            .filter(|&&id| {
                tree.node(id)
                    .value()
                    .is_some_and(|v| literal_matches(v, literal))
            })
            .copied()
            .collect(),
        IterKind::NameEquals(name) => input
            .iter()
            .filter(|&&id| tree.node(id).name() == name)
            .copied()
            .collect(),
        IterKind::Custom(token) => return eval_custom(tree, identity, input, token),
    };
    Ok(out)
}

fn eval_custom(
    tree: &Tree,
    identity: NodeId,
    input: &[NodeId],
    token: &str,
) -> Result<Vec<NodeId>, Error> {
    if let Some(f) = registry::lookup_static(token) {
        return Ok(f(tree, identity, input));
    }
    if let Some(leading) = token.chars().next() {
        if let Some(factory) = registry::lookup_dynamic(leading) {
            let f = factory(token);
            return Ok(f(tree, identity, input));
        }
    }
    Err(Error::expression_syntax(format!(
        "no iterator registered for token {:?}",
        token
    )))
}

fn root_of(tree: &Tree, mut id: NodeId) -> NodeId {
    while let Some(parent) = tree.node(id).parent() {
        id = parent.id();
    }
    id
}

/// Sibling arithmetic for `-N`/`+N` (§4.3.2), wrapping via modulo per the
/// design note in §9(a). A node with no parent is its own single-element
/// sibling group.
fn sibling_offset(tree: &Tree, id: NodeId, delta: i64) -> Option<NodeId> {
    let node = tree.node(id);
    let siblings: Vec<NodeId> = match node.parent() {
        Some(parent) => parent.children().map(|c| c.id()).collect(),
        None => vec![id],
    };
    let len = siblings.len() as i64;
    if len == 0 {
        return None;
    }
    let pos = siblings.iter().position(|&s| s == id)? as i64;
    let idx = (((pos + delta) % len) + len) % len;
    siblings.get(idx as usize).copied()
}

/// `=value` comparison (§4.3.2): attempt integer, then boolean, conversion
/// of the node's value to the literal's inferred type; otherwise compare as
/// strings.
fn literal_matches(value: &Value, literal: &str) -> bool {
    if let Ok(n) = literal.parse::<i64>() {
        if let Some(node_n) = as_i64(value) {
            return node_n == n;
        }
    }
    if literal == "true" || literal == "false" {
        let want = literal == "true";
        if let Some(node_b) = as_bool(value) {
            return node_b == want;
        }
    }
    value.comparison_text().as_deref() == Some(literal)
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        Value::UInt(u) => i64::try_from(*u).ok(),
        Value::Str(s) => s.parse().ok(),
        Value::Host(h) => h.lexeme.parse().ok(),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Str(s) => match s.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    #[test]
    fn sibling_offset_wraps_around() {
        let tree = parse_str("foo\n   a\n   b\n   c\n").unwrap();
        let foo = tree.root().children().next().unwrap();
        let a = foo.children().next().unwrap();
        // a is the first child; one step back should wrap to the last (c).
        let wrapped = sibling_offset(&tree, a.id(), -1).unwrap();
        assert_eq!(tree.node(wrapped).name(), "c");
    }

    #[test]
    fn literal_matches_compares_typed_int() {
        assert!(literal_matches(&Value::Int(5), "5"));
        assert!(!literal_matches(&Value::Int(5), "6"));
    }

    #[test]
    fn literal_matches_falls_back_to_string_compare() {
        assert!(literal_matches(&Value::Str("xxx".to_string()), "xxx"));
    }
}
