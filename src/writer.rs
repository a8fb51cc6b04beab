//! Writing a [`Tree`] back to indented-tree source text (§6.3).
//!
//! The teacher's `Deb822`/`Paragraph`/`Entry` wrap a `rowan::GreenNode`,
//! which stores the original text verbatim (including whitespace and
//! comments) token by token, so `Display` for those types is just
//! `self.0.text()` replayed back out (`lossless.rs`). This crate's arena
//! throws the original text away at parse time - a node only remembers its
//! name and typed [`Value`], not the bytes it came from - so there is no
//! buffer to replay; the writer below re-derives wire-format text from the
//! tree structure itself, quoting and escaping whatever the reader (§4.1's
//! `Lexer`) would otherwise misread.

use crate::tree::{Node, NodeId, Tree};
use crate::value::{type_registry, Value};

const INDENT: &str = "   ";

/// Render `tree` back to indented-tree source text: three-space indents per
/// depth level, `\r\n` line endings, one node per line.
///
/// Parsing this output again yields a tree structurally equal to `tree`
/// (§3's round-trip invariant, §8).
pub fn write_to_string(tree: &Tree) -> String {
    let mut out = String::new();
    for child in tree.root().children() {
        write_node(tree, &mut out, child, 0, "\r\n");
    }
    out
}

impl std::fmt::Display for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", write_to_string(self))
    }
}

fn write_node(tree: &Tree, out: &mut String, node: Node, depth: usize, newline: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    write_text(out, node.name());
    if let Some(value) = node.value() {
        out.push(':');
        write_value(tree, out, value, newline);
    }
    out.push_str(newline);
    for child in node.children() {
        write_node(tree, out, child, depth + 1, newline);
    }
}

fn write_value(tree: &Tree, out: &mut String, value: &Value, newline: &str) {
    match value {
        Value::Str(s) => write_text(out, s),
        Value::Int(_) => write_typed(out, "int", value),
        Value::UInt(_) => write_typed(out, "uint", value),
        Value::Bool(_) => write_typed(out, "bool", value),
        Value::Float(_) => write_typed(out, "float", value),
        Value::Expr(e) => {
            out.push_str("x:");
            write_text(out, e.source());
        }
        Value::NodeRef(id) => {
            out.push_str("node:");
            write_text(out, &render_nested(tree, *id));
        }
        Value::Host(h) => {
            out.push_str(&h.type_name);
            out.push(':');
            write_text(out, &type_registry().serialize(&h.type_name, value));
        }
    }
}

fn write_typed(out: &mut String, type_name: &str, value: &Value) {
    out.push_str(type_name);
    out.push(':');
    write_text(out, &type_registry().serialize(type_name, value));
}

/// A `node`-typed value's nested subtree is itself indented-tree source,
/// embedded as the lexeme of the `node:` value (§6.2). Its internal
/// newlines use plain `\n` rather than `\r\n`: they never reach a terminal
/// unescaped, since the whole lexeme is always quoted below.
fn render_nested(tree: &Tree, root: NodeId) -> String {
    let mut inner = String::new();
    for child in tree.node(root).children() {
        write_node(tree, &mut inner, child, 0, "\n");
    }
    inner
}

fn write_text(out: &mut String, s: &str) {
    if needs_quoting(s) {
        out.push_str(&quote(s));
    } else {
        out.push_str(s);
    }
}

/// Whether bare text would be misread by the C1 tokenizer: empty, starting
/// with a comment marker, starting with a digit/sign (§6.3's bare-token
/// exclusion), or containing whitespace or a character the lexer treats
/// specially at a token boundary.
fn needs_quoting(s: &str) -> bool {
    s.is_empty()
        || s.starts_with("//")
        || s.starts_with("/*")
        || s.chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-')
        || s.chars()
            .any(|c| c.is_whitespace() || matches!(c, ':' | '"' | '\''))
}

/// Quote `s` using the same escapes [`crate::lex::Lexer::read_quoted`]
/// decodes: backslash, double quote, `\n`/`\r`/`\t`, and `\xHHHH` for other
/// control characters.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
