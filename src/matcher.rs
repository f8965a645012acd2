//! The matching engine: case dispatch, capture state and the bound history.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::bound::{Bindings, BoundHistory};
use crate::captures::Captures;
use crate::cases::Registry;
use crate::error::{LookupError, MatchError};
use crate::pattern::Node;
use crate::value::Value;

/// Default nesting limit of the backtracking search. Each element consumed
/// by a repetition costs about two levels.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// One matching session.
///
/// The registry is immutable and may be shared between matchers; the capture
/// stack and the bound history belong to this instance alone.
#[derive(Debug)]
pub struct Matcher {
    registry: Arc<Registry>,
    captures: Captures,
    bound: BoundHistory,
    depth: usize,
    max_depth: usize,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher {
    /// A matcher using the standard cases.
    pub fn new() -> Self {
        Self::with_registry(Registry::standard())
    }

    pub fn with_registry(registry: impl Into<Arc<Registry>>) -> Self {
        Self {
            registry: registry.into(),
            captures: Captures::new(),
            bound: BoundHistory::new(),
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit how deeply the backtracking search may nest. A search that
    /// would go deeper fails with [`MatchError::DepthExceeded`].
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// A matcher with the same registry and depth limit, and empty state.
    pub fn fork(&self) -> Self {
        Self::with_registry(Arc::clone(&self.registry)).with_max_depth(self.max_depth)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn captures(&self) -> &Captures {
        &self.captures
    }

    /// Capture stack, for custom cases that bind names.
    pub fn captures_mut(&mut self) -> &mut Captures {
        &mut self.captures
    }

    pub fn bound(&self) -> &BoundHistory {
        &self.bound
    }

    pub fn bound_mut(&mut self) -> &mut BoundHistory {
        &mut self.bound
    }

    /// Look `name` up in the newest committed match.
    pub fn lookup(&self, name: &str) -> Result<&Value, LookupError> {
        self.bound.lookup(name)
    }

    /// Match `value` against `pattern`.
    ///
    /// On success the captures are committed to the bound history. On a
    /// mismatch nothing is recorded and `Ok(false)` is returned; `Err` is
    /// reserved for fatal predicate failures and an exceeded depth limit.
    pub fn matches(
        &mut self,
        value: impl Into<Value>,
        pattern: impl Into<Node>,
    ) -> Result<bool, MatchError> {
        self.matched_prefix(value, pattern).map(|m| m.is_some())
    }

    /// Like [`matches`](Self::matches), returning the value produced by the
    /// winning case. For pattern-algebra nodes this is the matched prefix of
    /// the sequence.
    pub fn matched_prefix(
        &mut self,
        value: impl Into<Value>,
        pattern: impl Into<Node>,
    ) -> Result<Option<Value>, MatchError> {
        let value = value.into();
        let pattern = pattern.into();
        let depth = self.captures.depth();
        self.captures.push();
        match self.visit(&value, &pattern) {
            Ok(result) => {
                let bindings = Bindings::from(self.captures.pull());
                self.captures.truncate(depth);
                debug!(%value, %pattern, names = ?bindings.names(), "match succeeded");
                self.bound.push(bindings);
                Ok(Some(result))
            }
            Err(err) if err.is_mismatch() => {
                self.captures.truncate(depth);
                debug!(%value, %pattern, "no match");
                Ok(None)
            }
            Err(err) => {
                self.captures.truncate(depth);
                debug!(%value, %pattern, error = %err, "match aborted");
                Err(err)
            }
        }
    }

    /// Dispatch `(value, pattern)` to the first case whose probe accepts it.
    ///
    /// Cases that bind names write into the innermost capture scope, so
    /// outside of [`matched_prefix`](Self::matched_prefix) the caller must
    /// have pushed one.
    pub fn visit(&mut self, value: &Value, pattern: &Node) -> Result<Value, MatchError> {
        let registry = Arc::clone(&self.registry);
        let case = registry
            .iter()
            .find(|case| case.probe(self, value, pattern))
            .ok_or(MatchError::Mismatch)?;
        trace!(case = case.label(), %value, %pattern, "dispatch");
        case.apply(self, value, pattern)
    }

    pub(crate) fn descend(&mut self) -> Result<(), MatchError> {
        if self.depth >= self.max_depth {
            trace!(limit = self.max_depth, "search depth limit reached");
            return Err(MatchError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
