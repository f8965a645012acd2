//! Structural pattern matching over dynamic values.
//!
//! Patterns are ordinary values: literals, types, binders, predicates and a
//! regex-like algebra (repetition, groups, alternation, exclusion) over
//! ordered sequences. A [`Matcher`] dispatches each `(value, pattern)` pair
//! through an ordered registry of cases and records the names captured by
//! every successful match.
//!
//! # Example
//!
//! ```rust
//! use structmatch::{Matcher, Node, Value, anyone, group_named, name, repeat};
//!
//! let mut matcher = Matcher::new();
//!
//! let pattern = "a" + anyone() * repeat() * group_named("middle") + "c";
//! assert!(matcher.matches("abbbc", pattern).unwrap());
//! assert_eq!(matcher.lookup("middle").unwrap(), &Value::from("bbb"));
//!
//! let point = Node::tuple([name("x"), name("y")]);
//! assert!(matcher.matches(Value::tuple([3, 4]), point).unwrap());
//! assert_eq!(matcher.lookup("y").unwrap(), &Value::Int(4));
//! ```

pub mod bound;
pub mod captures;
pub mod cases;
mod error;
mod matcher;
pub mod pattern;
mod value;

pub use bound::{Bindings, BoundHistory, Checkpoint};
pub use captures::{Captures, Scope};
pub use cases::{Case, Registry, RegistryBuilder, STANDARD_ORDER};
pub use error::{LookupError, MatchError, PatternError, PredicateError, RegistryError};
pub use matcher::{DEFAULT_MAX_DEPTH, Matcher};
pub use pattern::{
    Custom, CustomMatch, Either, Exclude, Group, INFINITY, IntoPattern, Like, Node, Pattern,
    Repeat, Shape, anyone, anything, either, exclude, group, group_named, like, like_regex, maybe,
    name, padding, repeat, repeat_min, repeat_range, something,
};
pub use value::{Kind, Record, SeqKind, Sequence, Value};
