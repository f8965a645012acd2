//! Capture environment: a stack of name scopes made and retracted during
//! backtracking.
//!
//! Lookups fall through from the innermost scope outwards; writes land in the
//! innermost scope. Every `push` is paired with exactly one `undo` or
//! `commit`, in LIFO order.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::MatchError;
use crate::value::Value;

/// One layer of bindings.
pub type Scope = FxHashMap<String, Value>;

#[derive(Debug, Default)]
pub struct Captures {
    scopes: Vec<Scope>,
}

impl Captures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn push(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Resolve `name` through every open scope, innermost first.
    pub fn resolve(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Bind `name` with reconciliation: re-binding to an equal value is a
    /// no-op, re-binding to a different value is a [`MatchError::Conflict`].
    pub fn store(&mut self, name: &str, value: Value) -> Result<(), MatchError> {
        match self.resolve(name) {
            Some(bound) if *bound == value => Ok(()),
            Some(bound) => {
                trace!(binding = name, %bound, %value, "binding conflict");
                Err(MatchError::Conflict {
                    name: name.to_owned(),
                })
            }
            None => {
                self.innermost().insert(name.to_owned(), value);
                Ok(())
            }
        }
    }

    /// Bind `name` in the innermost scope, hiding any outer binding until the
    /// scope is undone.
    pub fn shadow(&mut self, name: &str, value: Value) {
        self.innermost().insert(name.to_owned(), value);
    }

    /// Discard the innermost scope.
    pub fn undo(&mut self) {
        self.scopes.pop();
    }

    /// Merge the innermost scope into its parent (newer entries win) and pop it.
    pub fn commit(&mut self) {
        if let Some(scope) = self.scopes.pop() {
            self.innermost().extend(scope);
        }
    }

    /// Pop the innermost scope and hand it to the caller.
    pub fn pull(&mut self) -> Scope {
        self.scopes.pop().unwrap_or_default()
    }

    /// Everything visible from scopes at `depth` and deeper, merged outer to
    /// inner.
    pub fn flatten(&self, depth: usize) -> Scope {
        let mut merged = Scope::default();
        for scope in self.scopes.iter().skip(depth) {
            merged.extend(scope.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        merged
    }

    /// Drop every scope above `depth`.
    pub fn truncate(&mut self, depth: usize) {
        self.scopes.truncate(depth);
    }

    fn innermost(&mut self) -> &mut Scope {
        debug_assert!(!self.scopes.is_empty(), "binding outside any capture scope");
        if self.scopes.is_empty() {
            self.push();
        }
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }
}
