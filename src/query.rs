//! Structured predicates and the textual query language.
//!
//! A query can be expressed two ways: as a [`Predicate`] tree built in code, or as query text
//! in the store's `SELECT * FROM alias WHERE ...` dialect. The textual form is compiled into a
//! [`Predicate`] before it reaches the store, so both entry points execute the same logical
//! filter. See [`Collection::find`](crate::Collection::find) and
//! [`Collection::query`](crate::Collection::query).

mod text;

pub(crate) use text::parse_query;

use std::cmp::Ordering;

use serde_json::Value;

use crate::Document;

/// A structured filter over the documents of a collection.
///
/// Leaves compare a property path against a literal; branches combine sub-predicates with
/// boolean connectives. Paths are `.`-separated and resolved against nested objects, so
/// `"Address.City"` addresses `{"Address": {"City": ...}}`.
///
/// A comparison whose path is absent from a document is false, as is a comparison between
/// values of different types; no three-valued logic is surfaced.
///
/// ```rust
/// use docstore::query::Predicate;
///
/// let filter = Predicate::eq("LastName", "Andersen").and(Predicate::lt("Children.0.Grade", 6));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    /// Matches every document.
    All,

    /// Compares the value at `path` against `value`.
    Compare {
        /// The `.`-separated property path to compare.
        path: String,
        /// The comparison operator.
        op: Comparison,
        /// The literal to compare against.
        value: Value,
    },

    /// Matches when both sub-predicates match.
    And(Box<Predicate>, Box<Predicate>),

    /// Matches when either sub-predicate matches.
    Or(Box<Predicate>, Box<Predicate>),

    /// Matches when the sub-predicate does not match.
    Not(Box<Predicate>),
}

/// The comparison operators usable in a [`Predicate`] leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
}

impl Comparison {
    fn is_range(&self) -> bool {
        matches!(
            self,
            Comparison::Lt | Comparison::Le | Comparison::Gt | Comparison::Ge
        )
    }
}

impl Predicate {
    fn compare(path: impl Into<String>, op: Comparison, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            path: path.into(),
            op,
            value: value.into(),
        }
    }

    /// Matches documents whose value at `path` equals `value`.
    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(path, Comparison::Eq, value)
    }

    /// Matches documents whose value at `path` is present and differs from `value`.
    pub fn ne(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(path, Comparison::Ne, value)
    }

    /// Matches documents whose value at `path` is less than `value`.
    pub fn lt(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(path, Comparison::Lt, value)
    }

    /// Matches documents whose value at `path` is at most `value`.
    pub fn le(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(path, Comparison::Le, value)
    }

    /// Matches documents whose value at `path` is greater than `value`.
    pub fn gt(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(path, Comparison::Gt, value)
    }

    /// Matches documents whose value at `path` is at least `value`.
    pub fn ge(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(path, Comparison::Ge, value)
    }

    /// Combines this predicate with `rhs`; both must match.
    #[must_use]
    pub fn and(self, rhs: Self) -> Self {
        Predicate::And(Box::new(self), Box::new(rhs))
    }

    /// Combines this predicate with `rhs`; either may match.
    #[must_use]
    pub fn or(self, rhs: Self) -> Self {
        Predicate::Or(Box::new(self), Box::new(rhs))
    }

    /// Negates this predicate.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Whether `document` satisfies this predicate.
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Compare { path, op, value } => {
                match lookup(document, path) {
                    Some(actual) => eval_compare(*op, actual, value),
                    // An absent path satisfies no comparison, including Ne.
                    None => false,
                }
            }
            Predicate::And(lhs, rhs) => lhs.matches(document) && rhs.matches(document),
            Predicate::Or(lhs, rhs) => lhs.matches(document) || rhs.matches(document),
            Predicate::Not(inner) => !inner.matches(document),
        }
    }

    /// Whether any leaf performs a range comparison against a string literal. The store only
    /// serves those when the collection's indexing policy carries a string range index.
    pub fn uses_string_range(&self) -> bool {
        match self {
            Predicate::All => false,
            Predicate::Compare { op, value, .. } => op.is_range() && value.is_string(),
            Predicate::And(lhs, rhs) | Predicate::Or(lhs, rhs) => {
                lhs.uses_string_range() || rhs.uses_string_range()
            }
            Predicate::Not(inner) => inner.uses_string_range(),
        }
    }
}

/// Resolves a `.`-separated path against a document. Segments index into nested objects;
/// numeric segments index into arrays.
fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn eval_compare(op: Comparison, actual: &Value, literal: &Value) -> bool {
    // Arrays and objects only support (in)equality, structurally.
    match (actual, literal) {
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => {
            return match op {
                Comparison::Eq => actual == literal,
                Comparison::Ne => actual != literal,
                _ => false,
            };
        }
        _ => {}
    }

    match ordering(actual, literal) {
        Some(ordering) => match op {
            Comparison::Eq => ordering == Ordering::Equal,
            Comparison::Ne => ordering != Ordering::Equal,
            Comparison::Lt => ordering == Ordering::Less,
            Comparison::Le => ordering != Ordering::Greater,
            Comparison::Gt => ordering == Ordering::Greater,
            Comparison::Ge => ordering != Ordering::Less,
        },
        // Values of different types never satisfy a comparison.
        None => false,
    }
}

/// Orders two scalar values of the same type. Numbers compare numerically regardless of
/// integer/float representation; mixed types are unordered.
fn ordering(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}
