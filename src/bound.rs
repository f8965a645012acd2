//! Bound history: the committed captures of successful top-level matches.

use std::ops::Index;

use itertools::Itertools;

use crate::captures::Scope;
use crate::error::LookupError;
use crate::value::Value;

/// The captures committed by one successful match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    names: Scope,
}

impl Bindings {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.names.get(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Captured names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.names.keys().map(String::as_str).sorted().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<Scope> for Bindings {
    fn from(names: Scope) -> Self {
        Self { names }
    }
}

impl Index<&str> for Bindings {
    type Output = Value;

    fn index(&self, name: &str) -> &Value {
        &self.names[name]
    }
}

/// A saved history length, see [`BoundHistory::rewind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

/// Append-only stack of committed [`Bindings`], newest last.
#[derive(Debug, Default)]
pub struct BoundHistory {
    entries: Vec<Bindings>,
}

impl BoundHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, bindings: Bindings) {
        self.entries.push(bindings);
    }

    /// Resolve `name` against the newest entry only.
    pub fn lookup(&self, name: &str) -> Result<&Value, LookupError> {
        self.last()
            .and_then(|bindings| bindings.get(name))
            .ok_or_else(|| LookupError::NoSuchName(name.to_owned()))
    }

    pub fn last(&self) -> Option<&Bindings> {
        self.entries.last()
    }

    pub fn get(&self, index: usize) -> Option<&Bindings> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bindings> {
        self.entries.iter()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.entries.len())
    }

    /// Drop every entry committed after `checkpoint`.
    pub fn rewind(&mut self, checkpoint: Checkpoint) {
        self.entries.truncate(checkpoint.0);
    }
}
