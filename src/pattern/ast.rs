//! Pattern nodes and the flat pattern sequence.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use itertools::Itertools;
use regex::Regex;

use crate::error::{MatchError, PatternError, PredicateError};
use crate::matcher::Matcher;
use crate::value::{Kind, Value};

use super::ops::IntoPattern;

/// Sentinel `max` of an unbounded [`Repeat`].
pub const INFINITY: usize = usize::MAX;

/// One node of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    /// Matches any single value.
    Anyone,
    /// Exact match by equality.
    Literal(Value),
    /// Instance-of (or subtype-of, for type values) test.
    Type(Kind),
    /// Element-wise match of a list, tuple or record of the same length.
    Seq { shape: Shape, items: Vec<Node> },
    /// Binds the matched value under a name.
    Name(String),
    Like(Like),
    Repeat(Repeat),
    Group(Group),
    Either(Either),
    Exclude(Exclude),
    Pattern(Pattern),
    Custom(Custom),
}

impl Node {
    pub fn list<T: Into<Node>>(items: impl IntoIterator<Item = T>) -> Self {
        Node::Seq {
            shape: Shape::List,
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn tuple<T: Into<Node>>(items: impl IntoIterator<Item = T>) -> Self {
        Node::Seq {
            shape: Shape::Tuple,
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn record<T: Into<Node>>(name: &str, items: impl IntoIterator<Item = T>) -> Self {
        Node::Seq {
            shape: Shape::Record(Arc::from(name)),
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Pattern-algebra nodes, matched by the backtracking search.
    pub fn is_algebra(&self) -> bool {
        matches!(
            self,
            Node::Pattern(_) | Node::Repeat(_) | Node::Group(_) | Node::Either(_) | Node::Exclude(_)
        )
    }
}

/// Container shape of a [`Node::Seq`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Shape {
    List,
    /// Admits plain tuples and records alike.
    Tuple,
    Record(Arc<str>),
}

impl Shape {
    pub fn admits(&self, value: &Value) -> bool {
        match (self, value) {
            (Shape::List, Value::List(_)) => true,
            (Shape::Tuple, Value::Tuple(_) | Value::Record(_)) => true,
            (Shape::Record(name), Value::Record(r)) => *name == r.name,
            _ => false,
        }
    }
}

/// A flat ordered sequence of nodes, matched positionally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pattern {
    nodes: Vec<Node>,
}

impl Pattern {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Coerce anything sequence-like into a pattern.
    pub fn of(items: impl IntoPattern) -> Self {
        items.into_pattern()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn extend(&mut self, other: Pattern) {
        self.nodes.extend(other.nodes);
    }
}

impl<T: Into<Node>> FromIterator<T> for Pattern {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for Pattern {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a> IntoIterator for &'a Pattern {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

/// Repetition of `inner` between `min` and `max` times.
///
/// Greedy repetition tries one more iteration before stopping; lazy
/// repetition tries stopping first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repeat {
    pub inner: Pattern,
    pub min: usize,
    pub max: usize,
    pub greedy: bool,
}

impl Repeat {
    pub fn new(
        inner: impl IntoPattern,
        min: usize,
        max: usize,
        greedy: bool,
    ) -> Result<Self, PatternError> {
        if min > max {
            return Err(PatternError::InvalidRange { min, max });
        }
        Ok(Self {
            inner: inner.into_pattern(),
            min,
            max,
            greedy,
        })
    }

    pub fn lazy(self) -> Self {
        Self {
            greedy: false,
            ..self
        }
    }
}

/// A sub-pattern whose consumed slice is captured under `name`, if present.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Group {
    pub inner: Pattern,
    pub name: Option<String>,
}

impl Group {
    pub fn of(inner: impl IntoPattern) -> Self {
        Self {
            inner: inner.into_pattern(),
            name: None,
        }
    }

    pub fn named(inner: impl IntoPattern, name: impl Into<String>) -> Self {
        Self {
            inner: inner.into_pattern(),
            name: Some(name.into()),
        }
    }
}

/// Alternation: options are tried in order and every option is explored
/// before the node fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Either {
    pub options: Vec<Pattern>,
}

impl Either {
    pub fn of<P: IntoPattern>(options: impl IntoIterator<Item = P>) -> Self {
        Self {
            options: options.into_iter().map(IntoPattern::into_pattern).collect(),
        }
    }
}

/// Matches one element that none of the options matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Exclude {
    pub options: Vec<Pattern>,
}

impl Exclude {
    pub fn of<P: IntoPattern>(options: impl IntoIterator<Item = P>) -> Self {
        Self {
            options: options.into_iter().map(IntoPattern::into_pattern).collect(),
        }
    }
}

pub type PredicateFn = dyn Fn(&Value) -> Result<Value, PredicateError> + Send + Sync;

/// The test a [`Like`] node applies.
#[derive(Clone)]
pub enum Rule {
    /// A callable; falsy results and expected errors are mismatches.
    Func(Arc<PredicateFn>),
    /// A regular expression that must match at the start of a string value.
    Regex(Regex),
}

impl Rule {
    fn identity(&self) -> RuleId<'_> {
        match self {
            Rule::Func(f) => RuleId::Func(Arc::as_ptr(f).cast::<()>() as usize),
            Rule::Regex(re) => RuleId::Regex(re.as_str()),
        }
    }
}

#[derive(PartialEq, Eq, Hash)]
enum RuleId<'a> {
    Func(usize),
    Regex(&'a str),
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Rule {}

impl Hash for Rule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Func(_) => write!(f, "Func(..)"),
            Rule::Regex(re) => f.debug_tuple("Regex").field(&re.as_str()).finish(),
        }
    }
}

/// Predicate node: applies a [`Rule`] to the value and optionally binds the
/// rule's result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Like {
    pub rule: Rule,
    pub bind_as: Option<String>,
}

impl Like {
    pub fn bind_as(self, name: impl Into<String>) -> Self {
        Self {
            bind_as: Some(name.into()),
            ..self
        }
    }

    /// Apply the rule. Only a [`PredicateError::Other`] escapes as a fatal
    /// error; everything else that fails is a mismatch.
    pub fn evaluate(&self, value: &Value) -> Result<Value, MatchError> {
        match &self.rule {
            Rule::Regex(re) => {
                let text = value.as_str().ok_or(MatchError::Mismatch)?;
                re.find(text)
                    .filter(|m| m.start() == 0)
                    .map(|m| Value::from(m.as_str()))
                    .ok_or(MatchError::Mismatch)
            }
            Rule::Func(func) => {
                let result = func(value)?;
                if result.is_truthy() {
                    Ok(result)
                } else {
                    Err(MatchError::Mismatch)
                }
            }
        }
    }
}

/// A value-defined match routine, dispatched by the `custom` case.
pub trait CustomMatch: Send + Sync {
    /// Whether this routine wants to handle `value` at all. Must be pure.
    fn applies(&self, _value: &Value) -> bool {
        true
    }

    fn apply(&self, matcher: &mut Matcher, value: &Value) -> Result<Value, MatchError>;

    fn describe(&self) -> String {
        "custom".to_owned()
    }
}

/// Shared handle to a [`CustomMatch`]; compares by identity.
#[derive(Clone)]
pub struct Custom(pub Arc<dyn CustomMatch>);

impl Custom {
    pub fn new(routine: impl CustomMatch + 'static) -> Self {
        Self(Arc::new(routine))
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.0).cast::<()>() as usize
    }
}

impl PartialEq for Custom {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for Custom {}

impl Hash for Custom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl fmt::Debug for Custom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Custom").field(&self.0.describe()).finish()
    }
}

// ─── Display ────────────────────────────────────────────────────────────────

/// Tuple-style rendering of a pattern's members: `(a, b)`, `(a,)` or `()`.
struct Members<'a>(&'a Pattern);

impl fmt::Display for Members<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.nodes() {
            [single] => write!(f, "({single},)"),
            nodes => write!(f, "({})", nodes.iter().join(", ")),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({})", self.nodes.iter().join(", "))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Anyone => write!(f, "anyone"),
            Node::Literal(v) => write!(f, "{v}"),
            Node::Type(k) => write!(f, "<{k}>"),
            Node::Seq { shape, items } => {
                let items = items.iter().join(", ");
                match shape {
                    Shape::List => write!(f, "[{items}]"),
                    Shape::Tuple => write!(f, "({items})"),
                    Shape::Record(name) => write!(f, "{name}({items})"),
                }
            }
            Node::Name(name) => write!(f, "Name({name})"),
            Node::Like(like) => {
                match &like.rule {
                    Rule::Func(_) => write!(f, "like(<fn>")?,
                    Rule::Regex(re) => write!(f, "like({:?}", re.as_str())?,
                }
                match &like.bind_as {
                    Some(name) => write!(f, ", {name})"),
                    None => write!(f, ")"),
                }
            }
            Node::Repeat(r) => {
                write!(f, "Repeat(pattern={}, min={}, ", Members(&r.inner), r.min)?;
                if r.max == INFINITY {
                    write!(f, "max=inf")?;
                } else {
                    write!(f, "max={}", r.max)?;
                }
                write!(f, ", greedy={})", r.greedy)
            }
            Node::Group(g) => write!(
                f,
                "Group(pattern={}, name={})",
                Members(&g.inner),
                g.name.as_deref().unwrap_or("")
            ),
            Node::Either(e) => write!(f, "Either({})", e.options.iter().map(Members).join(", ")),
            Node::Exclude(x) => write!(f, "Exclude({})", x.options.iter().map(Members).join(", ")),
            Node::Pattern(p) => write!(f, "{p}"),
            Node::Custom(c) => write!(f, "{}", c.0.describe()),
        }
    }
}

// ─── Conversions ────────────────────────────────────────────────────────────

impl From<Value> for Node {
    /// Containers become element-wise [`Node::Seq`] patterns, type values
    /// become type checks, scalars become literals.
    fn from(value: Value) -> Self {
        match value {
            Value::List(items) => Node::list(items),
            Value::Tuple(items) => Node::tuple(items),
            Value::Record(r) => Node::Seq {
                shape: Shape::Record(r.name),
                items: r.fields.into_iter().map(Node::from).collect(),
            },
            Value::Type(kind) => Node::Type(kind),
            scalar => Node::Literal(scalar),
        }
    }
}

macro_rules! node_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Node {
                fn from(v: $ty) -> Self {
                    Node::from(Value::from(v))
                }
            }
        )*
    };
}

node_from_value!(bool, i32, i64, f64, char, &str, String);

impl From<Kind> for Node {
    fn from(kind: Kind) -> Self {
        Node::Type(kind)
    }
}

impl From<Pattern> for Node {
    fn from(p: Pattern) -> Self {
        Node::Pattern(p)
    }
}

impl From<Repeat> for Node {
    fn from(r: Repeat) -> Self {
        Node::Repeat(r)
    }
}

impl From<Group> for Node {
    fn from(g: Group) -> Self {
        Node::Group(g)
    }
}

impl From<Either> for Node {
    fn from(e: Either) -> Self {
        Node::Either(e)
    }
}

impl From<Exclude> for Node {
    fn from(x: Exclude) -> Self {
        Node::Exclude(x)
    }
}

impl From<Like> for Node {
    fn from(like: Like) -> Self {
        Node::Like(like)
    }
}

impl From<Custom> for Node {
    fn from(c: Custom) -> Self {
        Node::Custom(c)
    }
}
