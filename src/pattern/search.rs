//! Backtracking search of a flat pattern against an ordered sequence.
//!
//! The search is written in continuation-passing style. Every frame is handed
//! a continuation `k(matcher, end)` for "the rest of the pattern matched up to
//! here"; a frame calls `k` once per candidate end offset, in preference
//! order. A continuation answering [`ControlFlow::Break`] means the top-level
//! consumer accepted and the whole search unwinds; `Continue` asks for the
//! next candidate.
//!
//! Frames that open a capture scope close it again before returning, so the
//! capture stack on exit is always the stack on entry.

use std::ops::ControlFlow;

use tracing::trace;

use crate::captures::Scope;
use crate::error::MatchError;
use crate::matcher::Matcher;
use crate::value::Sequence;

use super::ast::{Either, Exclude, Group, Node, Repeat};

type Flow = Result<ControlFlow<()>, MatchError>;

type Cont<'k> = dyn FnMut(&mut Matcher, usize) -> Flow + 'k;

const NEXT: Flow = Ok(ControlFlow::Continue(()));
const ACCEPT: Flow = Ok(ControlFlow::Break(()));

/// Return early once a branch has been accepted.
macro_rules! branch {
    ($flow:expr) => {
        if $flow?.is_break() {
            return ACCEPT;
        }
    };
}

/// The first (leftmost, by preference order) prefix match.
#[derive(Debug)]
pub(crate) struct Found {
    /// Number of elements consumed.
    pub end: usize,
    /// Captures made by the search, innermost binding per name.
    pub captures: Scope,
}

/// Match `pattern` against a prefix of `seq`.
///
/// Returns `Ok(None)` when no prefix matches. Errors other than mismatches
/// raised while visiting elements abort the search.
pub(crate) fn first_match(
    matcher: &mut Matcher,
    pattern: &[Node],
    seq: &Sequence,
) -> Result<Option<Found>, MatchError> {
    let base = matcher.captures().depth();
    let mut found = None;
    let mut accept = |m: &mut Matcher, end: usize| -> Flow {
        found = Some(Found {
            end,
            captures: m.captures().flatten(base),
        });
        ACCEPT
    };
    let flow = Search { seq }.explore(matcher, pattern, 0, &mut accept);
    matcher.captures_mut().truncate(base);
    flow?;
    if let Some(found) = &found {
        trace!(end = found.end, len = seq.len(), "pattern matched prefix");
    }
    Ok(found)
}

struct Search<'s> {
    seq: &'s Sequence,
}

impl Search<'_> {
    /// Every nested step of the search passes through here, so this is where
    /// the matcher's depth limit is enforced.
    fn explore(&self, m: &mut Matcher, pattern: &[Node], offset: usize, k: &mut Cont<'_>) -> Flow {
        m.descend()?;
        let flow = self.step(m, pattern, offset, k);
        m.ascend();
        flow
    }

    fn step(&self, m: &mut Matcher, pattern: &[Node], offset: usize, k: &mut Cont<'_>) -> Flow {
        let Some((node, rest)) = pattern.split_first() else {
            return k(m, offset);
        };
        match node {
            Node::Repeat(r) => self.repeat(m, r, rest, offset, 0, k),
            Node::Group(g) => self.group(m, g, rest, offset, k),
            Node::Either(e) => self.either(m, e, rest, offset, k),
            Node::Exclude(x) => self.exclude(m, x, rest, offset, k),
            // A nested `Pattern` is one element: it matches a nested sequence.
            element => self.element(m, element, rest, offset, k),
        }
    }

    /// `count` is the number of iterations of `r` completed so far.
    fn repeat(
        &self,
        m: &mut Matcher,
        r: &Repeat,
        rest: &[Node],
        offset: usize,
        count: usize,
        k: &mut Cont<'_>,
    ) -> Flow {
        if r.greedy {
            branch!(self.expand(m, r, rest, offset, count, k));
            self.stop(m, r, rest, offset, count, k)
        } else {
            branch!(self.stop(m, r, rest, offset, count, k));
            self.expand(m, r, rest, offset, count, k)
        }
    }

    /// One more iteration of the repeated pattern.
    fn expand(
        &self,
        m: &mut Matcher,
        r: &Repeat,
        rest: &[Node],
        offset: usize,
        count: usize,
        k: &mut Cont<'_>,
    ) -> Flow {
        if count >= r.max || offset >= self.seq.len() {
            return NEXT;
        }
        self.explore(m, r.inner.nodes(), offset, &mut |m: &mut Matcher, end: usize| {
            // An empty iteration only counts towards the minimum.
            if end == offset && count >= r.min {
                return NEXT;
            }
            self.repeat(m, r, rest, end, count + 1, &mut *k)
        })
    }

    /// Leave the repetition and continue with the rest of the pattern.
    fn stop(
        &self,
        m: &mut Matcher,
        r: &Repeat,
        rest: &[Node],
        offset: usize,
        count: usize,
        k: &mut Cont<'_>,
    ) -> Flow {
        if count < r.min {
            return NEXT;
        }
        self.explore(m, rest, offset, k)
    }

    /// A named group binds the consumed slice in a scope of its own. The
    /// binding shadows earlier captures of the same name, so the last
    /// iteration of a repeated group wins.
    fn group(&self, m: &mut Matcher, g: &Group, rest: &[Node], offset: usize, k: &mut Cont<'_>) -> Flow {
        self.explore(m, g.inner.nodes(), offset, &mut |m: &mut Matcher, end: usize| {
            let Some(name) = &g.name else {
                return self.explore(m, rest, end, &mut *k);
            };
            m.captures_mut().push();
            m.captures_mut().shadow(name, self.seq.slice(offset..end));
            let flow = self.explore(m, rest, end, &mut *k);
            m.captures_mut().undo();
            flow
        })
    }

    fn either(&self, m: &mut Matcher, e: &Either, rest: &[Node], offset: usize, k: &mut Cont<'_>) -> Flow {
        for option in &e.options {
            branch!(self.explore(m, option.nodes(), offset, &mut |m: &mut Matcher, end: usize| {
                self.explore(m, rest, end, &mut *k)
            }));
        }
        NEXT
    }

    /// Consumes one element, provided no option matches at `offset`.
    fn exclude(&self, m: &mut Matcher, x: &Exclude, rest: &[Node], offset: usize, k: &mut Cont<'_>) -> Flow {
        if offset >= self.seq.len() {
            return NEXT;
        }
        for option in &x.options {
            let mut hit = false;
            self.explore(m, option.nodes(), offset, &mut |_: &mut Matcher, _: usize| {
                hit = true;
                ACCEPT
            })?;
            if hit {
                trace!(offset, "excluded option matched");
                return NEXT;
            }
        }
        self.explore(m, rest, offset + 1, k)
    }

    /// A plain element is matched against one value through the registry.
    fn element(&self, m: &mut Matcher, node: &Node, rest: &[Node], offset: usize, k: &mut Cont<'_>) -> Flow {
        let Some(value) = self.seq.get(offset) else {
            return NEXT;
        };
        m.captures_mut().push();
        let flow = match m.visit(value, node) {
            Ok(_) => self.explore(m, rest, offset + 1, k),
            Err(err) if err.is_mismatch() => NEXT,
            Err(err) => Err(err),
        };
        m.captures_mut().undo();
        flow
    }
}
