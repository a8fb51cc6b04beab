//! An indented-tree serialization format, with a chained-iterator path
//! expression language for querying and dereferencing it.
//!
//! A document is a rooted, ordered tree of named nodes, each with an
//! optional typed value, written with indentation in multiples of three
//! spaces standing in for parent/child nesting. Parsing happens in two
//! stages: [`lex`] turns source text into a token stream, and [`parser`]
//! folds that stream onto a [`Tree`].
//!
//! Once parsed, a [`Tree`] can be searched with a path [`expr::Expression`]:
//! a `/`-separated pipeline of iterators, each narrowing or expanding the
//! sequence produced by the one before it. [`writer::write_to_string`] (also
//! reachable through `Tree`'s `Display` impl) goes the other way, rendering a
//! tree back to source text.
//!
//! # Example
//!
//! ```rust
//! use itree_query::parse_str;
//!
//! let input = "package\n   name:itree-query\n   name:other\n";
//! let tree = parse_str(input).unwrap();
//! let package = tree.root().children().next().unwrap();
//! let names: Vec<&str> = package.children().map(|n| n.name()).collect();
//! assert_eq!(names, vec!["name", "name"]);
//! ```

mod error;
pub mod expr;
mod lex;
mod parser;
mod source;
mod tree;
mod value;
mod writer;

pub use error::{Context, Error};
pub use expr::{evaluate_node, Expression};
pub use parser::{parse, parse_file, parse_read, parse_str};
pub use source::{CharSource, ReadSource, StrSource};
pub use tree::{Node, NodeId, Tree};
pub use value::{type_registry, HostValue, ParseFn, SerializeFn, TypeRegistry, Value};
pub use writer::write_to_string;
