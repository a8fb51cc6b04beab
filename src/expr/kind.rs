//! Expression tokenizing and iterator-kind classification (§4.3.1, §4.3.2).
//!
//! Grounded on the `regex` idiom already in the pack (`debian-copyright/src/glob.rs`,
//! `debian-control/src/vcs.rs`): a `Regex` is constructed inline at the call
//! site rather than cached, since classification runs once per token at
//! expression-parse time, not on a hot path.

use crate::error::Error;
use crate::expr::registry;
use regex::Regex;

/// One link of a parsed expression pipeline (§4.3.2).
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum IterKind {
    Root,
    Children,
    Descendants,
    Parent,
    RootOfIdentity,
    Deref,
    PrevSibling(u64),
    NextSibling(u64),
    NthChild(u64),
    NamedAncestor(String),
    Slice(usize, usize),
    ValueEquals(String),
    NameEquals(String),
    /// Token text, resolved against the registries at evaluation time.
    Custom(String),
}

/// Split an expression source into raw tokens on unquoted `/`, tracking
/// whether each token was delimited by `"..."` (§4.3.1).
pub(crate) fn tokenize(source: &str) -> Result<Vec<(String, bool)>, Error> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut chars = source.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => in_quotes = false,
            '"' if current.is_empty() => {
                in_quotes = true;
                quoted = true;
            }
            '"' => {
                return Err(Error::expression_syntax(
                    "a quote may only start a token, not appear inside an unquoted one",
                ))
            }
            '/' if !in_quotes => {
                tokens.push((std::mem::take(&mut current), quoted));
                quoted = false;
            }
            other => current.push(other),
        }
    }
    if in_quotes {
        return Err(Error::expression_syntax("unterminated quoted token"));
    }
    tokens.push((current, quoted));
    Ok(tokens)
}

/// Classify one token (first matching rule wins, per §4.3.2's tie-breaks).
pub(crate) fn classify(token: &str, quoted: bool) -> Result<IterKind, Error> {
    if !quoted {
        if let Some(rest) = token.strip_prefix('\\') {
            return Ok(IterKind::NameEquals(rest.to_string()));
        }
    }
    if quoted {
        return Ok(IterKind::NameEquals(token.to_string()));
    }
    if token.starts_with('[') {
        let slice_re = Regex::new(r"^\[(\d+),(\d+)\]$").unwrap();
        let caps = slice_re
            .captures(token)
            .ok_or_else(|| Error::expression_syntax(format!("malformed slice {:?}", token)))?;
        let start: usize = caps[1]
            .parse()
            .map_err(|_| Error::expression_syntax(format!("slice start out of range in {:?}", token)))?;
        let count: usize = caps[2]
            .parse()
            .map_err(|_| Error::expression_syntax(format!("slice count out of range in {:?}", token)))?;
        return Ok(IterKind::Slice(start, count));
    }
    if let Some(lit) = token.strip_prefix('=') {
        if lit.is_empty() {
            return Err(Error::expression_syntax("empty value after '='"));
        }
        return Ok(IterKind::ValueEquals(lit.to_string()));
    }
    let integer_re = Regex::new(r"^[0-9]+$").unwrap();
    if integer_re.is_match(token) {
        let n = token
            .parse()
            .map_err(|_| Error::expression_syntax(format!("integer out of range: {:?}", token)))?;
        return Ok(IterKind::NthChild(n));
    }
    let signed_re = Regex::new(r"^[+-][0-9]*$").unwrap();
    if signed_re.is_match(token) {
        let count: u64 = if token.len() > 1 {
            token[1..]
                .parse()
                .map_err(|_| Error::expression_syntax(format!("sibling count out of range: {:?}", token)))?
        } else {
            1
        };
        return Ok(if token.starts_with('-') {
            IterKind::PrevSibling(count)
        } else {
            IterKind::NextSibling(count)
        });
    }
    if let Some(name) = token.strip_prefix('@') {
        if name.is_empty() {
            return Err(Error::expression_syntax("empty ancestor name after '@'"));
        }
        return Ok(IterKind::NamedAncestor(name.to_string()));
    }
    if token == "#" {
        return Ok(IterKind::Deref);
    }
    match token {
        "" => return Ok(IterKind::Root),
        "." => return Ok(IterKind::Parent),
        ".." => return Ok(IterKind::RootOfIdentity),
        "*" => return Ok(IterKind::Children),
        "**" => return Ok(IterKind::Descendants),
        _ => {}
    }
    if registry::is_static(token) {
        return Ok(IterKind::Custom(token.to_string()));
    }
    if let Some(leading) = token.chars().next() {
        if registry::has_dynamic_prefix(leading) {
            return Ok(IterKind::Custom(token.to_string()));
        }
    }
    Ok(IterKind::NameEquals(token.to_string()))
}

/// The canonical textual form of one token: quotes are dropped whenever the
/// bare token would classify to the same name-equals meaning (§3, §6.4).
pub(crate) fn canonicalize_token(raw: &str, quoted: bool) -> String {
    if !quoted {
        return raw.to_string();
    }
    if raw.contains('/') {
        return format!("\"{}\"", raw);
    }
    match classify(raw, false) {
        Ok(IterKind::NameEquals(s)) if s == raw => raw.to_string(),
        _ => format!("\"{}\"", raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_splits_on_unquoted_slash() {
        assert_eq!(
            tokenize("foo/*/bar").unwrap(),
            vec![
                ("foo".to_string(), false),
                ("*".to_string(), false),
                ("bar".to_string(), false),
            ]
        );
    }

    #[test]
    fn tokenize_keeps_quoted_slash_intact() {
        assert_eq!(
            tokenize("../**/\"how/dy\"").unwrap(),
            vec![
                ("..".to_string(), false),
                ("**".to_string(), false),
                ("how/dy".to_string(), true),
            ]
        );
    }

    #[test]
    fn classify_recognizes_slice_and_equals() {
        assert_eq!(classify("[1,2]", false).unwrap(), IterKind::Slice(1, 2));
        assert_eq!(
            classify("=xxx", false).unwrap(),
            IterKind::ValueEquals("xxx".to_string())
        );
    }

    #[test]
    fn classify_prefers_escape_over_name_equals() {
        assert_eq!(
            classify("\\3", false).unwrap(),
            IterKind::NameEquals("3".to_string())
        );
        assert_eq!(classify("3", false).unwrap(), IterKind::NthChild(3));
    }

    #[test]
    fn classify_signed_defaults_count_to_one() {
        assert_eq!(classify("-", false).unwrap(), IterKind::PrevSibling(1));
        assert_eq!(classify("+2", false).unwrap(), IterKind::NextSibling(2));
    }

    #[test]
    fn canonicalize_drops_unnecessary_quotes() {
        assert_eq!(canonicalize_token("plain", true), "plain");
        assert_eq!(canonicalize_token("how/dy", true), "\"how/dy\"");
        assert_eq!(canonicalize_token("3", true), "\"3\"");
    }

    #[test]
    fn classify_oversized_integer_errors_instead_of_panicking() {
        let err = classify("18446744073709551616", false).unwrap_err();
        assert!(matches!(err, Error::ExpressionSyntax(_)));
    }

    #[test]
    fn classify_oversized_signed_count_errors_instead_of_panicking() {
        let err = classify("+99999999999999999999", false).unwrap_err();
        assert!(matches!(err, Error::ExpressionSyntax(_)));
    }

    #[test]
    fn classify_oversized_slice_bound_errors_instead_of_panicking() {
        let err = classify("[99999999999999999999,1]", false).unwrap_err();
        assert!(matches!(err, Error::ExpressionSyntax(_)));
    }
}
