//! Pattern-building operators and templates.
//!
//! `a + b` concatenates into a flat [`Pattern`]; `x * template` lifts `x`
//! into a repetition, group, alternation or exclusion:
//!
//! ```
//! use structmatch::{Pattern, repeat};
//!
//! let b_s = "b" * repeat();
//! let pattern = "a" + b_s + "c";
//! assert_eq!(pattern.len(), 3);
//! assert_eq!(Pattern::default() + "abc", Pattern::of("abc"));
//! ```

use std::ops::{Add, Mul};
use std::sync::Arc;

use regex::Regex;

use crate::error::{PatternError, PredicateError};
use crate::value::{Kind, Value};

use super::ast::{Custom, Either, Exclude, Group, INFINITY, Like, Node, Pattern, Repeat, Rule};

/// Coercion into a flat pattern sequence.
///
/// Sequences (strings, lists, tuples, patterns) contribute one node per
/// element; anything else becomes a one-element pattern.
pub trait IntoPattern {
    fn into_pattern(self) -> Pattern;
}

impl IntoPattern for Pattern {
    fn into_pattern(self) -> Pattern {
        self
    }
}

impl IntoPattern for Node {
    fn into_pattern(self) -> Pattern {
        match self {
            Node::Pattern(p) => p,
            Node::Seq { items, .. } => Pattern::new(items),
            Node::Literal(value) => match value.sequence() {
                Some(seq) => seq.items().iter().cloned().collect(),
                None => Pattern::new(vec![Node::Literal(value)]),
            },
            other => Pattern::new(vec![other]),
        }
    }
}

impl IntoPattern for () {
    fn into_pattern(self) -> Pattern {
        Pattern::default()
    }
}

impl<T: Into<Node>> IntoPattern for Vec<T> {
    fn into_pattern(self) -> Pattern {
        self.into_iter().collect()
    }
}

impl<T: Into<Node>, const N: usize> IntoPattern for [T; N] {
    fn into_pattern(self) -> Pattern {
        self.into_iter().collect()
    }
}

macro_rules! into_pattern_via_node {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoPattern for $ty {
                fn into_pattern(self) -> Pattern {
                    Node::from(self).into_pattern()
                }
            }
        )*
    };
}

into_pattern_via_node!(
    &str, String, char, bool, i32, i64, f64, Value, Kind, Like, Repeat, Group, Either, Exclude,
    Custom,
);

// ─── Lift ───────────────────────────────────────────────────────────────────

/// A template that wraps a left operand as its body.
pub trait Lift {
    fn lift(self, operand: Pattern) -> Node;
}

impl Lift for Repeat {
    fn lift(self, operand: Pattern) -> Node {
        Node::Repeat(Repeat {
            inner: operand,
            ..self
        })
    }
}

impl Lift for Group {
    fn lift(self, operand: Pattern) -> Node {
        Node::Group(Group {
            inner: operand,
            ..self
        })
    }
}

impl Lift for Either {
    /// Each element of the operand becomes one option.
    fn lift(self, operand: Pattern) -> Node {
        Node::Either(Either::of(operand))
    }
}

impl Lift for Exclude {
    fn lift(self, operand: Pattern) -> Node {
        Node::Exclude(Exclude::of(operand))
    }
}

macro_rules! impl_lift {
    ($lhs:ty => $($template:ty),*) => {
        $(
            impl Mul<$template> for $lhs {
                type Output = Node;

                fn mul(self, template: $template) -> Node {
                    template.lift(self.into_pattern())
                }
            }
        )*
    };
}

macro_rules! lift_for {
    ($($lhs:ty),* $(,)?) => {
        $( impl_lift!($lhs => Repeat, Group, Either, Exclude); )*
    };
}

lift_for!(
    Node, Pattern, Like, Repeat, Group, Either, Exclude, Custom, Value, Kind, &str, String, char,
    bool, i32, i64,
);

macro_rules! lift_for_vec {
    ($($template:ty),*) => {
        $(
            impl<T: Into<Node>> Mul<$template> for Vec<T> {
                type Output = Node;

                fn mul(self, template: $template) -> Node {
                    template.lift(self.into_pattern())
                }
            }
        )*
    };
}

lift_for_vec!(Repeat, Group, Either, Exclude);

// ─── Concatenation ──────────────────────────────────────────────────────────

fn concat(left: impl IntoPattern, right: impl IntoPattern) -> Pattern {
    let mut pattern = left.into_pattern();
    pattern.extend(right.into_pattern());
    pattern
}

macro_rules! concat_for {
    ($($lhs:ty),* $(,)?) => {
        $(
            impl<R: IntoPattern> Add<R> for $lhs {
                type Output = Pattern;

                fn add(self, rhs: R) -> Pattern {
                    concat(self, rhs)
                }
            }
        )*
    };
}

concat_for!(Pattern, Node, Like, Repeat, Group, Either, Exclude, Custom);

macro_rules! concat_onto {
    ($($lhs:ty),* $(,)?) => {
        $(
            impl Add<Pattern> for $lhs {
                type Output = Pattern;

                fn add(self, rhs: Pattern) -> Pattern {
                    concat(self, rhs)
                }
            }

            impl Add<Node> for $lhs {
                type Output = Pattern;

                fn add(self, rhs: Node) -> Pattern {
                    concat(self, rhs)
                }
            }
        )*
    };
}

concat_onto!(&str, String, char, bool, i32, i64, Value, Kind);

impl<T: Into<Node>> Add<Pattern> for Vec<T> {
    type Output = Pattern;

    fn add(self, rhs: Pattern) -> Pattern {
        concat(self, rhs)
    }
}

impl<T: Into<Node>> Add<Node> for Vec<T> {
    type Output = Pattern;

    fn add(self, rhs: Node) -> Pattern {
        concat(self, rhs)
    }
}

// ─── Templates ──────────────────────────────────────────────────────────────

/// Wildcard matching any single value.
pub fn anyone() -> Node {
    Node::Anyone
}

/// Binder: stores the matched value under `id`.
pub fn name(id: impl Into<String>) -> Node {
    Node::Name(id.into())
}

/// Predicate node from a callable. The callable's result must be truthy.
pub fn like<F, R>(func: F) -> Like
where
    F: Fn(&Value) -> Result<R, PredicateError> + Send + Sync + 'static,
    R: Into<Value>,
{
    Like {
        rule: Rule::Func(Arc::new(
            move |value: &Value| -> Result<Value, PredicateError> { func(value).map(Into::into) },
        )),
        bind_as: None,
    }
}

/// Predicate node from a regular expression matched at the start of a
/// string value.
pub fn like_regex(text: &str) -> Result<Like, PatternError> {
    let re = Regex::new(text).map_err(|err| PatternError::InvalidRegex(err.to_string()))?;
    Ok(Like {
        rule: Rule::Regex(re),
        bind_as: None,
    })
}

/// Greedy `0..=inf` repetition.
pub fn repeat() -> Repeat {
    Repeat {
        inner: Pattern::default(),
        min: 0,
        max: INFINITY,
        greedy: true,
    }
}

/// Greedy `min..=inf` repetition.
pub fn repeat_min(min: usize) -> Repeat {
    Repeat { min, ..repeat() }
}

pub fn repeat_range(min: usize, max: usize) -> Result<Repeat, PatternError> {
    Repeat::new((), min, max, true)
}

/// Greedy `0..=1` repetition.
pub fn maybe() -> Repeat {
    Repeat { max: 1, ..repeat() }
}

pub fn group() -> Group {
    Group::of(())
}

pub fn group_named(name: impl Into<String>) -> Group {
    Group::named((), name)
}

pub fn either() -> Either {
    Either::default()
}

pub fn exclude() -> Exclude {
    Exclude::default()
}

/// Any number of values, greedily.
pub fn anything() -> Node {
    anyone() * repeat()
}

/// At least one value, greedily.
pub fn something() -> Node {
    anyone() * repeat_min(1)
}

/// Any number of values, as few as possible.
pub fn padding() -> Node {
    anyone() * repeat().lazy()
}
