//! Error types for pattern construction, matching and lookup.

use thiserror::Error;

/// The outcome of a failed (sub)match.
///
/// `Mismatch` and `Conflict` are ordinary "does not match here" signals and are
/// recovered at every choice point of the search. `Predicate` is fatal: a
/// caller-supplied predicate failed in a way that is not a pattern outcome.
/// `DepthExceeded` is fatal too: the search nested deeper than the matcher's
/// limit allows.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("value does not match pattern")]
    Mismatch,
    #[error("name `{name}` is already bound to a different value")]
    Conflict { name: String },
    #[error("predicate failed: {0}")]
    Predicate(anyhow::Error),
    #[error("search depth limit of {limit} exceeded")]
    DepthExceeded { limit: usize },
}

impl MatchError {
    /// True for the recoverable kinds (`Mismatch` and `Conflict`).
    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch | Self::Conflict { .. })
    }
}

/// Errors raised by predicate functions wrapped with [`like`](crate::like).
///
/// Every variant except `Other` is an expected failure and counts as a plain
/// mismatch. `Other` escalates to [`MatchError::Predicate`].
#[derive(Debug, Error)]
pub enum PredicateError {
    #[error("attribute not found: {0}")]
    AttributeNotFound(String),
    #[error("lookup failed: {0}")]
    Lookup(String),
    #[error("not implemented: {0}")]
    NotImplemented(String),
    #[error("type error: {0}")]
    Type(String),
    #[error("value error: {0}")]
    Value(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PredicateError {
    pub fn is_expected(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<PredicateError> for MatchError {
    fn from(err: PredicateError) -> Self {
        match err {
            PredicateError::Other(inner) => MatchError::Predicate(inner),
            _ => MatchError::Mismatch,
        }
    }
}

/// Raised by bound-name lookup when the newest committed match never
/// captured the requested name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no such name: {0}")]
    NoSuchName(String),
}

/// Errors building pattern nodes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("invalid repetition range: min {min} exceeds max {max}")]
    InvalidRange { min: usize, max: usize },
    #[error("invalid regular expression: {0}")]
    InvalidRegex(String),
}

/// Errors assembling a case registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown case label: {0}")]
    UnknownCase(String),
}
