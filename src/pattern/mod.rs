//! Pattern algebra over ordered sequences.
//!
//! Patterns are built from values and a handful of templates:
//!
//! | Building block          | Meaning                                        |
//! |-------------------------|------------------------------------------------|
//! | `anyone()`              | Any single element                             |
//! | literal value           | An element equal to the value                  |
//! | `Kind::Int`             | An element of that type                        |
//! | `name("x")`             | Any element, bound to `x`                      |
//! | `like(f)`               | An element for which `f` is truthy             |
//! | `a + b`                 | `a` followed by `b`                            |
//! | `x * repeat()`          | Zero or more `x`, greedily                     |
//! | `x * repeat_min(n)`     | At least `n` of `x`                            |
//! | `x * repeat_range(n,m)` | Between `n` and `m` of `x`                     |
//! | `x * maybe()`           | Zero or one `x`                                |
//! | `r.lazy()`              | The repetition `r`, as few as possible         |
//! | `x * group_named("g")`  | `x`, capturing the consumed slice as `g`       |
//! | `xs * either()`         | The first element of `xs` that leads to a match |
//! | `xs * exclude()`        | One element matching none of `xs`              |
//!
//! Strings used as patterns split into one literal per character.
//! Matching an algebra node against a sequence succeeds when some prefix of
//! the sequence matches; the prefix is the match result.

pub mod ast;
pub mod ops;
pub(crate) mod search;

#[cfg(test)]
mod tests;

pub use ast::{
    Custom, CustomMatch, Either, Exclude, Group, INFINITY, Like, Node, Pattern, PredicateFn,
    Repeat, Rule, Shape,
};
pub use ops::{
    IntoPattern, Lift, anyone, anything, either, exclude, group, group_named, like, like_regex,
    maybe, name, padding, repeat, repeat_min, repeat_range, something,
};
