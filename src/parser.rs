//! The parser (C2): token stream → rooted [`Tree`].
//!
//! Grounded on the teacher's `parse()` / local `Parser` struct in
//! `lossless.rs`, which drives a `GreenNodeBuilder` off a reversed token
//! stack with `bump()`/`current()`/`skip_ws()` helpers and collects errors
//! into a `Vec<String>` instead of failing fast. This crate fails fast
//! instead (§7 policy: "all errors are fatal at the operation boundary"),
//! but keeps the teacher's shape of a private `Parser` pulling tokens one
//! at a time and folding them onto a tree builder - here an ancestry stack
//! of `NodeId`s standing in for the teacher's `GreenNodeBuilder` checkpoints.

use crate::error::Error;
use crate::expr::Expression;
use crate::lex::{Lexer, Token};
use crate::source::{CharSource, ReadSource, StrSource};
use crate::tree::{NodeId, Tree};
use crate::value::{type_registry, Value};

/// Parse an indented-tree document from a string.
pub fn parse_str(input: &str) -> Result<Tree, Error> {
    parse(StrSource::new(input))
}

/// Parse an indented-tree document from any `std::io::Read` implementation.
pub fn parse_read(reader: impl std::io::Read) -> Result<Tree, Error> {
    parse(ReadSource::new(reader)?)
}

/// Parse an indented-tree document from a path.
pub fn parse_file(path: impl AsRef<std::path::Path>) -> Result<Tree, Error> {
    let file = std::fs::File::open(path)?;
    parse_read(file)
}

/// Parse an indented-tree document from an arbitrary character source.
pub fn parse(source: impl CharSource) -> Result<Tree, Error> {
    let mut tree = Tree::with_root("");
    let root = tree.root;
    let mut lexer = Lexer::new(source);
    parse_tokens(&mut tree, root, &mut lexer)?;
    Ok(tree)
}

/// Runs the ancestry-stack algorithm (§4.2) over `lexer`, inserting children
/// of `root` into `tree`. Shared between top-level document parsing and the
/// `node`-typed value parser, which nests a second document into the same
/// arena as a detached subtree.
fn parse_tokens<S: CharSource>(
    tree: &mut Tree,
    root: NodeId,
    lexer: &mut Lexer<S>,
) -> Result<(), Error> {
    let mut stack: Vec<NodeId> = vec![root];
    let mut current_depth: isize = -1;
    let mut next = lexer.next_token()?;

    loop {
        // Skip blank lines.
        while let Some((Token::Newline, _)) = next {
            next = lexer.next_token()?;
        }
        let Some((tok, line)) = next else { break };

        let (depth, after_indent) = match tok {
            Token::Indent(d) => (d as isize, lexer.next_token()?),
            other => (0, Some((other, line))),
        };

        // A blank line that happens to carry leading whitespace.
        let Some((name_tok, name_line)) = after_indent else {
            break;
        };
        if matches!(name_tok, Token::Newline) {
            next = Some((Token::Newline, name_line));
            continue;
        }

        if depth > current_depth + 1 {
            return Err(Error::structural(format!(
                "indentation jumps from depth {} to depth {}",
                current_depth.max(0),
                depth
            ))
            .at_line(line));
        }

        let (name, after_name) = match name_tok {
            Token::Colon => (String::new(), Some((Token::Colon, name_line))),
            Token::Literal(s, quoted) => {
                if !quoted && s.chars().any(|c| c.is_whitespace() || c == ':') {
                    return Err(Error::structural(
                        "name containing whitespace or ':' must be quoted",
                    )
                    .at_line(name_line)
                    .with_lexeme(s));
                }
                (s, lexer.next_token()?)
            }
            Token::Indent(_) => {
                return Err(Error::structural("unexpected indentation").at_line(name_line))
            }
            Token::Newline => unreachable!("handled above"),
        };

        let (value, after_value) = match after_name {
            Some((Token::Colon, _)) => {
                let (value, rest) = parse_value(tree, lexer, name_line)?;
                (Some(value), rest)
            }
            other => (None, other),
        };

        let parent = stack[depth as usize];
        let new_id = tree.push_child(parent, name, value);
        stack.truncate(depth as usize + 1);
        stack.push(new_id);
        current_depth = depth;

        next = match after_value {
            Some((Token::Newline, _)) => lexer.next_token()?,
            other => other,
        };
    }
    Ok(())
}

/// Reads the value spec following a `:` (§4.2 step 3): either a bare
/// `<lexeme>` string value, or a `<type>:<lexeme>` typed value.
fn parse_value<S: CharSource>(
    tree: &mut Tree,
    lexer: &mut Lexer<S>,
    colon_line: usize,
) -> Result<(Value, Option<(Token, usize)>), Error> {
    let Some((first_tok, first_line)) = lexer.next_token()? else {
        return Err(Error::lexical("expected a value after ':'").at_line(colon_line));
    };
    let first_lexeme = match first_tok {
        Token::Literal(s, _) => s,
        _ => return Err(Error::lexical("expected a value after ':'").at_line(first_line)),
    };

    let after_first = lexer.next_token()?;
    if let Some((Token::Colon, _)) = after_first {
        let type_name = first_lexeme;
        let Some((lexeme_tok, lexeme_line)) = lexer.next_token()? else {
            return Err(
                Error::lexical("expected a value after type name").at_line(first_line)
            );
        };
        let lexeme = match lexeme_tok {
            Token::Literal(s, _) => s,
            _ => {
                return Err(Error::lexical("expected a value after type name")
                    .at_line(lexeme_line))
            }
        };
        let value = match type_name.as_str() {
            "node" => {
                let nested_root = tree.push_detached("", None);
                let mut nested_lexer = Lexer::new(StrSource::new(&lexeme));
                parse_tokens(tree, nested_root, &mut nested_lexer)?;
                Value::NodeRef(nested_root)
            }
            "x" => Value::Expr(Expression::parse(&lexeme)?),
            other => type_registry()
                .parse(other, &lexeme)
                .map_err(|e| e.at_line(lexeme_line).with_lexeme(lexeme))?,
        };
        let next = lexer.next_token()?;
        Ok((value, next))
    } else {
        Ok((Value::Str(first_lexeme), after_first))
    }
}
