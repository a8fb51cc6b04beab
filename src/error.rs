//! Crate-wide error type.
//!
//! Grounded on the teacher's `ParseError`/`Error` pair: a lightweight collector
//! with a `Display` impl that writes one message per line, plus a top-level
//! enum that also carries I/O failures from the `std::io::Read`-based entry
//! points. Every fallible operation in this crate - tokenizing, parsing,
//! expression parsing, expression evaluation - funnels into one `Error` enum
//! so callers can match on a single type.

use std::fmt;

/// The five error kinds from the error handling design, collapsed into one
/// enum so every fallible entry point can return the same `Result<_, Error>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Bad CR without LF, odd indentation, unterminated string, unknown
    /// escape, or an unterminated block comment.
    Lexical(Context),

    /// A line's indentation jumps more than one depth past its parent.
    Structural(Context),

    /// An unknown type name, or a lexeme that does not parse under the
    /// named type.
    Type(Context),

    /// A malformed slice, an empty token where one is not allowed, or
    /// illegal quoting in an expression source.
    ExpressionSyntax(Context),

    /// Evaluation of an identity node's own value was requested, but the
    /// value is not an expression.
    Evaluation(Context),

    /// Propagated I/O failure from a `Read`-based entry point.
    Io(String),
}

/// The offending lexeme and/or line, plus a message, carried by every
/// non-I/O error variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// Human-readable description of what went wrong.
    pub message: String,

    /// 1-based line number, when the originating code tracked one.
    pub line: Option<usize>,

    /// The text that triggered the error, when there is a meaningful one.
    pub lexeme: Option<String>,
}

impl Context {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Context {
            message: message.into(),
            line: None,
            lexeme: None,
        }
    }

    pub(crate) fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub(crate) fn with_lexeme(mut self, lexeme: impl Into<String>) -> Self {
        self.lexeme = Some(lexeme.into());
        self
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(line) = self.line {
            write!(f, " (line {})", line)?;
        }
        if let Some(lexeme) = &self.lexeme {
            write!(f, ": {:?}", lexeme)?;
        }
        Ok(())
    }
}

impl Error {
    pub(crate) fn lexical(message: impl Into<String>) -> Self {
        Error::Lexical(Context::new(message))
    }

    pub(crate) fn structural(message: impl Into<String>) -> Self {
        Error::Structural(Context::new(message))
    }

    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        Error::Type(Context::new(message))
    }

    pub(crate) fn expression_syntax(message: impl Into<String>) -> Self {
        Error::ExpressionSyntax(Context::new(message))
    }

    pub(crate) fn evaluation(message: impl Into<String>) -> Self {
        Error::Evaluation(Context::new(message))
    }

    /// Attach a 1-based line number to this error, if it carries a context.
    pub(crate) fn at_line(self, line: usize) -> Self {
        self.map_context(|ctx| ctx.with_line(line))
    }

    /// Attach the offending lexeme to this error, if it carries a context.
    pub(crate) fn with_lexeme(self, lexeme: impl Into<String>) -> Self {
        self.map_context(|ctx| ctx.with_lexeme(lexeme))
    }

    fn map_context(self, f: impl FnOnce(Context) -> Context) -> Self {
        match self {
            Error::Lexical(ctx) => Error::Lexical(f(ctx)),
            Error::Structural(ctx) => Error::Structural(f(ctx)),
            Error::Type(ctx) => Error::Type(f(ctx)),
            Error::ExpressionSyntax(ctx) => Error::ExpressionSyntax(f(ctx)),
            Error::Evaluation(ctx) => Error::Evaluation(f(ctx)),
            Error::Io(msg) => Error::Io(msg),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Lexical(ctx) => write!(f, "lexical error: {}", ctx),
            Error::Structural(ctx) => write!(f, "structural error: {}", ctx),
            Error::Type(ctx) => write!(f, "type error: {}", ctx),
            Error::ExpressionSyntax(ctx) => write!(f, "expression syntax error: {}", ctx),
            Error::Evaluation(ctx) => write!(f, "evaluation error: {}", ctx),
            Error::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
