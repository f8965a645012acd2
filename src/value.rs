//! Dynamic values that patterns are matched against.
//!
//! Numbers compare across `Bool`, `Int` and `Float` (`true == 1 == 1.0`), and a
//! NaN float equals itself so every value matches itself as a literal.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;
use std::sync::Arc;

use itertools::Itertools;

/// The type of a [`Value`], also usable as a value and as a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Top type: every kind is a subtype of `Object`.
    Object,
    None,
    Bool,
    Int,
    Float,
    Str,
    Bytes,
    List,
    Tuple,
    /// A named tuple type.
    Record(Arc<str>),
    Type,
}

impl Kind {
    pub fn record(name: &str) -> Self {
        Kind::Record(Arc::from(name))
    }

    /// Reflexive subtype test. `Bool <: Int` and every record is a tuple.
    pub fn is_subtype_of(&self, other: &Kind) -> bool {
        match (self, other) {
            (_, Kind::Object) => true,
            (Kind::Bool, Kind::Int) => true,
            (Kind::Record(_), Kind::Tuple) => true,
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Object => write!(f, "object"),
            Kind::None => write!(f, "none"),
            Kind::Bool => write!(f, "bool"),
            Kind::Int => write!(f, "int"),
            Kind::Float => write!(f, "float"),
            Kind::Str => write!(f, "str"),
            Kind::Bytes => write!(f, "bytes"),
            Kind::List => write!(f, "list"),
            Kind::Tuple => write!(f, "tuple"),
            Kind::Record(name) => write!(f, "{name}"),
            Kind::Type => write!(f, "type"),
        }
    }
}

/// A named tuple: positional fields plus a type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    pub name: Arc<str>,
    pub fields: Vec<Value>,
}

#[derive(Debug, Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Record(Record),
    Type(Kind),
}

impl Value {
    pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn tuple<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Value::Tuple(items.into_iter().map(Into::into).collect())
    }

    pub fn record<T: Into<Value>>(name: &str, fields: impl IntoIterator<Item = T>) -> Self {
        Value::Record(Record {
            name: Arc::from(name),
            fields: fields.into_iter().map(Into::into).collect(),
        })
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::None => Kind::None,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Str(_) => Kind::Str,
            Value::Bytes(_) => Kind::Bytes,
            Value::List(_) => Kind::List,
            Value::Tuple(_) => Kind::Tuple,
            Value::Record(r) => Kind::Record(Arc::clone(&r.name)),
            Value::Type(_) => Kind::Type,
        }
    }

    pub fn is_instance_of(&self, kind: &Kind) -> bool {
        self.kind().is_subtype_of(kind)
    }

    /// Scalars compared by plain equality: none, booleans, numbers, strings
    /// and byte strings.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Value::None
                | Value::Bool(_)
                | Value::Int(_)
                | Value::Float(_)
                | Value::Str(_)
                | Value::Bytes(_)
        )
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(x) => *x != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::List(items) | Value::Tuple(items) => !items.is_empty(),
            Value::Record(r) => !r.fields.is_empty(),
            Value::Type(_) => true,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Positional items of a container value (list, tuple or record).
    pub fn items(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Tuple(items) => Some(items),
            Value::Record(r) => Some(&r.fields),
            _ => None,
        }
    }

    /// A container of the same type (and record name) holding `items`.
    /// Non-container values become a list.
    pub fn with_items(&self, items: Vec<Value>) -> Value {
        match self {
            Value::Tuple(_) => Value::Tuple(items),
            Value::Record(r) => Value::Record(Record {
                name: Arc::clone(&r.name),
                fields: items,
            }),
            _ => Value::List(items),
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(
            self,
            Value::Str(_) | Value::Bytes(_) | Value::List(_) | Value::Tuple(_) | Value::Record(_)
        )
    }

    /// An ordered element view of a sequence value, or `None` for scalars.
    pub fn sequence(&self) -> Option<Sequence> {
        let (kind, items) = match self {
            Value::Str(s) => (SeqKind::Str, s.chars().map(Value::from).collect()),
            Value::Bytes(b) => (SeqKind::Bytes, b.iter().map(|&x| Value::Int(x.into())).collect()),
            Value::List(items) => (SeqKind::List, items.clone()),
            Value::Tuple(items) => (SeqKind::Tuple, items.clone()),
            Value::Record(r) => (SeqKind::Tuple, r.fields.clone()),
            _ => return None,
        };
        Some(Sequence { kind, items })
    }

    fn number(&self) -> Option<Number> {
        match self {
            Value::Bool(b) => Some(Number::Int(i64::from(*b))),
            Value::Int(i) => Some(Number::Int(*i)),
            Value::Float(x) => Some(Number::Float(*x)),
            _ => None,
        }
    }
}

#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Number::Int(i), Number::Float(x)) | (Number::Float(x), Number::Int(i)) => {
                i as f64 == x && x as i64 == i
            }
        }
    }
}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match *self {
            Number::Int(i) => i.hash(state),
            Number::Float(x) if x.is_nan() => u64::MAX.hash(state),
            Number::Float(x) if x.fract() == 0.0 && x >= i64::MIN as f64 && x < i64::MAX as f64 => {
                (x as i64).hash(state)
            }
            Number::Float(x) => x.to_bits().hash(state),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            (a, b) => match (a.number(), b.number()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if let Some(n) = self.number() {
            0u8.hash(state);
            n.hash(state);
            return;
        }
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Str(s) => s.hash(state),
            Value::Bytes(b) => b.hash(state),
            Value::List(items) | Value::Tuple(items) => items.hash(state),
            Value::Record(r) => r.hash(state),
            Value::Type(k) => k.hash(state),
            Value::None | Value::Bool(_) | Value::Int(_) | Value::Float(_) => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "none"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "b{:?}", String::from_utf8_lossy(b)),
            Value::List(items) => write!(f, "[{}]", items.iter().join(", ")),
            Value::Tuple(items) if items.len() == 1 => write!(f, "({},)", items[0]),
            Value::Tuple(items) => write!(f, "({})", items.iter().join(", ")),
            Value::Record(r) => write!(f, "{}({})", r.name, r.fields.iter().join(", ")),
            Value::Type(k) => write!(f, "<{k}>"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i.into())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Str(c.to_string())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Kind> for Value {
    fn from(k: Kind) -> Self {
        Value::Type(k)
    }
}

/// Container type of a [`Sequence`], used to rebuild slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqKind {
    Str,
    Bytes,
    List,
    Tuple,
}

/// The elements of a sequence value. Strings yield one-character strings,
/// byte strings yield integers.
#[derive(Debug, Clone)]
pub struct Sequence {
    kind: SeqKind,
    items: Vec<Value>,
}

impl Sequence {
    pub fn kind(&self) -> SeqKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Rebuild `items[range]` as a value of the original container type.
    /// Records slice to plain tuples.
    pub fn slice(&self, range: Range<usize>) -> Value {
        let items = &self.items[range];
        match self.kind {
            SeqKind::Str => Value::Str(items.iter().filter_map(Value::as_str).collect()),
            SeqKind::Bytes => Value::Bytes(
                items
                    .iter()
                    .filter_map(Value::as_int)
                    .filter_map(|i| u8::try_from(i).ok())
                    .collect(),
            ),
            SeqKind::List => Value::List(items.to_vec()),
            SeqKind::Tuple => Value::Tuple(items.to_vec()),
        }
    }
}
