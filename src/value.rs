//! The dynamically typed value domain (§3, §6.2) and the type registry that
//! maps a type name onto a parser/serializer pair.
//!
//! Grounded on the teacher's `FromDeb822Paragraph`/`ToDeb822Paragraph` pair
//! (`convert.rs`), generalized from "paragraph ⇄ struct" to "lexeme ⇄ typed
//! value". Unlike the teacher's compile-time derive macro - which maps onto
//! this crate's explicitly out-of-scope value-conversion helpers - type
//! dispatch here is a runtime lookup, because the type name driving it comes
//! from parsed text, not from a Rust type known at compile time.

use crate::error::Error;
use crate::expr::Expression;
use crate::tree::NodeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};

/// A node's value: the fixed built-in universe plus an escape hatch for
/// host-registered types (design note in SPEC_FULL §9).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A plain string value (the unnamed default type).
    Str(String),
    /// A signed integer. Narrower type names (`i8`, `i16`, `i32`) range-check
    /// at parse time but share this one runtime representation.
    Int(i64),
    /// An unsigned integer, likewise shared across `u8`..`u64`.
    UInt(u64),
    /// A boolean.
    Bool(bool),
    /// A floating-point number, shared across `f32`/`f64`/`decimal`.
    Float(f64),
    /// A reference to another node in the same tree, produced by the `node`
    /// built-in type (a nested indented-tree value) or by a host type.
    NodeRef(NodeId),
    /// A parsed expression, produced by the `x` built-in type.
    Expr(Expression),
    /// An opaque host-registered value: its type name plus the canonical
    /// lexeme its serializer produced at parse time. The core only ever
    /// needs to print and compare this text; turning it back into a host
    /// Rust type is the out-of-scope value-conversion layer's job.
    Host(HostValue),
}

/// An opaque value of a host-registered type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostValue {
    pub type_name: Arc<str>,
    pub lexeme: String,
}

impl Value {
    /// The textual form used for `=value` comparisons (§4.3.2) and for
    /// round-tripping back to source. Node references and expressions have
    /// no meaningful flat text form and never participate in `=` matches.
    pub fn comparison_text(&self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::UInt(u) => Some(u.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Host(h) => Some(h.lexeme.clone()),
            Value::NodeRef(_) | Value::Expr(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::UInt(u) => write!(f, "{}", u),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Float(x) => write!(f, "{}", x),
            Value::NodeRef(_) => write!(f, "<node>"),
            Value::Expr(e) => write!(f, "{}", e.source()),
            Value::Host(h) => write!(f, "{}", h.lexeme),
        }
    }
}

/// A parser from lexeme text to a typed [`Value`].
pub type ParseFn = Arc<dyn Fn(&str) -> Result<Value, Error> + Send + Sync>;

/// A serializer from a typed [`Value`] back to lexeme text.
pub type SerializeFn = Arc<dyn Fn(&Value) -> String + Send + Sync>;

#[derive(Clone)]
struct TypeDef {
    parse: ParseFn,
    serialize: SerializeFn,
}

/// The process-wide name → (parser, serializer) map (§6.2).
///
/// Populated at construction with the built-in types; hosts register
/// additional types before the first parse. Concurrent registration during
/// an in-progress parse is not supported (§5).
pub struct TypeRegistry {
    types: RwLock<HashMap<String, TypeDef>>,
}

impl TypeRegistry {
    fn new() -> Self {
        let registry = TypeRegistry {
            types: RwLock::new(HashMap::new()),
        };
        registry.register_builtins();
        registry
    }

    fn register_builtins(&self) {
        self.register_int("i8", i8::MIN as i64, i8::MAX as i64);
        self.register_int("i16", i16::MIN as i64, i16::MAX as i64);
        self.register_int("i32", i32::MIN as i64, i32::MAX as i64);
        self.register_int("i64", i64::MIN, i64::MAX);
        self.register_int("int", i64::MIN, i64::MAX);

        self.register_uint("u8", u8::MAX as u64);
        self.register_uint("u16", u16::MAX as u64);
        self.register_uint("u32", u32::MAX as u64);
        self.register_uint("u64", u64::MAX);
        self.register_uint("uint", u64::MAX);

        self.register(
            "bool",
            Arc::new(|lexeme: &str| match lexeme {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                other => Err(Error::type_error(format!(
                    "invalid bool lexeme {:?}, expected \"true\" or \"false\"",
                    other
                ))),
            }),
            Arc::new(|v: &Value| match v {
                Value::Bool(b) => b.to_string(),
                other => other.to_string(),
            }),
        );

        for name in ["f32", "f64", "decimal", "float"] {
            self.register(
                name,
                Arc::new(|lexeme: &str| {
                    lexeme
                        .parse::<f64>()
                        .map(Value::Float)
                        .map_err(|e| Error::type_error(format!("invalid float lexeme: {}", e)))
                }),
                Arc::new(|v: &Value| match v {
                    Value::Float(f) => f.to_string(),
                    other => other.to_string(),
                }),
            );
        }

        self.register(
            "string",
            Arc::new(|lexeme: &str| Ok(Value::Str(lexeme.to_string()))),
            Arc::new(|v: &Value| match v {
                Value::Str(s) => s.clone(),
                other => other.to_string(),
            }),
        );

        // `node` and `x` are handled directly by the parser (they need the
        // tree arena / expression parser respectively), not through this
        // lexeme-in-lexeme-out registry shape. Reserve the names so a host
        // registration attempt fails loudly instead of silently shadowing
        // parser built-ins.
        self.register(
            "node",
            Arc::new(|_: &str| {
                Err(Error::type_error(
                    "\"node\" values are parsed by the tree parser, not the type registry",
                ))
            }),
            Arc::new(|_: &Value| String::new()),
        );
        self.register(
            "x",
            Arc::new(|lexeme: &str| {
                Expression::parse(lexeme).map(Value::Expr)
            }),
            Arc::new(|v: &Value| match v {
                Value::Expr(e) => e.source().to_string(),
                other => other.to_string(),
            }),
        );
    }

    fn register_int(&self, name: &str, min: i64, max: i64) {
        self.register(
            name,
            Arc::new(move |lexeme: &str| {
                let n: i64 = lexeme
                    .parse()
                    .map_err(|e| Error::type_error(format!("invalid integer lexeme: {}", e)))?;
                if n < min || n > max {
                    return Err(Error::type_error(format!(
                        "integer {} out of range for this type",
                        n
                    )));
                }
                Ok(Value::Int(n))
            }),
            Arc::new(|v: &Value| match v {
                Value::Int(i) => i.to_string(),
                other => other.to_string(),
            }),
        );
    }

    fn register_uint(&self, name: &str, max: u64) {
        self.register(
            name,
            Arc::new(move |lexeme: &str| {
                let n: u64 = lexeme
                    .parse()
                    .map_err(|e| Error::type_error(format!("invalid unsigned integer lexeme: {}", e)))?;
                if n > max {
                    return Err(Error::type_error(format!(
                        "unsigned integer {} out of range for this type",
                        n
                    )));
                }
                Ok(Value::UInt(n))
            }),
            Arc::new(|v: &Value| match v {
                Value::UInt(u) => u.to_string(),
                other => other.to_string(),
            }),
        );
    }

    /// Register (or replace) a type by name.
    pub fn register(&self, name: impl Into<String>, parse: ParseFn, serialize: SerializeFn) {
        self.types
            .write()
            .unwrap()
            .insert(name.into(), TypeDef { parse, serialize });
    }

    /// Parse `lexeme` under the named type, producing a host or built-in
    /// [`Value`]. A host type must be registered (see [`TypeRegistry::register`])
    /// before any `<type>:<lexeme>` value under that name can parse; an
    /// unregistered name is a [`Error::Type`] error, not a silent pass-through.
    pub fn parse(&self, type_name: &str, lexeme: &str) -> Result<Value, Error> {
        let types = self.types.read().unwrap();
        match types.get(type_name) {
            Some(def) => (def.parse)(lexeme),
            None => Err(Error::type_error(format!(
                "unknown type name {:?}",
                type_name
            ))),
        }
    }

    /// Serialize a [`Value`] back to lexeme text under the named type.
    pub fn serialize(&self, type_name: &str, value: &Value) -> String {
        let types = self.types.read().unwrap();
        match types.get(type_name) {
            Some(def) => (def.serialize)(value),
            None => value.to_string(),
        }
    }

    /// Whether a type name is currently registered (built-in or host).
    pub fn contains(&self, type_name: &str) -> bool {
        self.types.read().unwrap().contains_key(type_name)
    }
}

static REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();

/// The process-wide type registry, lazily initialized with the built-ins on
/// first access.
pub fn type_registry() -> &'static TypeRegistry {
    REGISTRY.get_or_init(TypeRegistry::new)
}
