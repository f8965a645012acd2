//! Case registry: the ordered `(probe, apply)` table that dispatches every
//! pattern kind.
//!
//! `probe` is a pure test deciding whether a case handles a `(value, pattern)`
//! pair; `apply` performs the match and may bind names. The first case whose
//! probe accepts wins.

use std::fmt;
use std::sync::{Arc, LazyLock};

use phf::{Map, phf_map};

use crate::error::{MatchError, RegistryError};
use crate::matcher::Matcher;
use crate::pattern::{Node, search};
use crate::value::Value;

pub type ProbeFn = fn(&Matcher, &Value, &Node) -> bool;
pub type ApplyFn = fn(&mut Matcher, &Value, &Node) -> Result<Value, MatchError>;

type Probe = Arc<dyn Fn(&Matcher, &Value, &Node) -> bool + Send + Sync>;
type Apply = Arc<dyn Fn(&mut Matcher, &Value, &Node) -> Result<Value, MatchError> + Send + Sync>;

/// A labelled `(probe, apply)` pair.
#[derive(Clone)]
pub struct Case {
    label: String,
    probe: Probe,
    apply: Apply,
}

impl Case {
    pub fn new<P, A>(label: impl Into<String>, probe: P, apply: A) -> Self
    where
        P: Fn(&Matcher, &Value, &Node) -> bool + Send + Sync + 'static,
        A: Fn(&mut Matcher, &Value, &Node) -> Result<Value, MatchError> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            probe: Arc::new(probe),
            apply: Arc::new(apply),
        }
    }

    /// The built-in case registered under `label`.
    pub fn builtin(label: &str) -> Result<Self, RegistryError> {
        let builtin = BUILTIN_CASES
            .get(label)
            .ok_or_else(|| RegistryError::UnknownCase(label.to_owned()))?;
        Ok(Self::new(label, builtin.probe, builtin.apply))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn probe(&self, matcher: &Matcher, value: &Value, pattern: &Node) -> bool {
        (self.probe)(matcher, value, pattern)
    }

    pub fn apply(
        &self,
        matcher: &mut Matcher,
        value: &Value,
        pattern: &Node,
    ) -> Result<Value, MatchError> {
        (self.apply)(matcher, value, pattern)
    }
}

impl fmt::Debug for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Case").field(&self.label).finish()
    }
}

/// Ordered, immutable list of cases.
#[derive(Debug, Clone)]
pub struct Registry {
    cases: Vec<Case>,
}

static STANDARD: LazyLock<Arc<Registry>> = LazyLock::new(|| {
    let cases = STANDARD_ORDER
        .iter()
        .filter_map(|label| Case::builtin(label).ok())
        .collect();
    Arc::new(Registry { cases })
});

impl Registry {
    /// The shared default registry, in [`STANDARD_ORDER`].
    pub fn standard() -> Arc<Registry> {
        Arc::clone(&STANDARD)
    }

    /// A registry of built-in cases, in the given order.
    pub fn from_labels<'a>(
        labels: impl IntoIterator<Item = &'a str>,
    ) -> Result<Registry, RegistryError> {
        let cases = labels
            .into_iter()
            .map(Case::builtin)
            .collect::<Result<_, _>>()?;
        Ok(Registry { cases })
    }

    /// Start from an empty list of cases.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder { cases: Vec::new() }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Case> {
        self.cases.iter()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.cases.iter().map(Case::label).collect()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::standard().as_ref().clone()
    }
}

/// Assembles a [`Registry`] by extending the standard list or an empty one.
pub struct RegistryBuilder {
    cases: Vec<Case>,
}

impl RegistryBuilder {
    /// Start from the standard cases.
    pub fn standard() -> Self {
        Self {
            cases: Registry::standard().cases.clone(),
        }
    }

    /// Append a built-in case by label.
    pub fn builtin(self, label: &str) -> Result<Self, RegistryError> {
        Ok(self.push(Case::builtin(label)?))
    }

    pub fn push(mut self, case: Case) -> Self {
        self.cases.push(case);
        self
    }

    pub fn prepend(mut self, case: Case) -> Self {
        self.cases.insert(0, case);
        self
    }

    /// Insert `case` directly before the case labelled `label`.
    pub fn insert_before(mut self, label: &str, case: Case) -> Result<Self, RegistryError> {
        let index = self
            .cases
            .iter()
            .position(|c| c.label() == label)
            .ok_or_else(|| RegistryError::UnknownCase(label.to_owned()))?;
        self.cases.insert(index, case);
        Ok(self)
    }

    pub fn build(self) -> Registry {
        Registry { cases: self.cases }
    }
}

// ─── Built-in cases ─────────────────────────────────────────────────────────

pub struct Builtin {
    pub probe: ProbeFn,
    pub apply: ApplyFn,
}

/// Default dispatch order, most specific first.
pub const STANDARD_ORDER: [&str; 9] = [
    "anyone",
    "custom",
    "types",
    "literals",
    "equality",
    "sequences",
    "patterns",
    "like",
    "names",
];

pub static BUILTIN_CASES: Map<&'static str, Builtin> = phf_map! {
    "anyone" => Builtin { probe: anyone_probe, apply: anyone_apply },
    "custom" => Builtin { probe: custom_probe, apply: custom_apply },
    "types" => Builtin { probe: type_probe, apply: type_apply },
    "literals" => Builtin { probe: literal_probe, apply: equality_apply },
    "equality" => Builtin { probe: equality_probe, apply: equality_apply },
    "sequences" => Builtin { probe: sequence_probe, apply: sequence_apply },
    "patterns" => Builtin { probe: pattern_probe, apply: pattern_apply },
    "like" => Builtin { probe: like_probe, apply: like_apply },
    "names" => Builtin { probe: name_probe, apply: name_apply },
};

fn anyone_probe(_: &Matcher, _: &Value, pattern: &Node) -> bool {
    matches!(pattern, Node::Anyone)
}

fn anyone_apply(_: &mut Matcher, value: &Value, _: &Node) -> Result<Value, MatchError> {
    Ok(value.clone())
}

fn custom_probe(_: &Matcher, value: &Value, pattern: &Node) -> bool {
    matches!(pattern, Node::Custom(custom) if custom.0.applies(value))
}

fn custom_apply(matcher: &mut Matcher, value: &Value, pattern: &Node) -> Result<Value, MatchError> {
    let Node::Custom(custom) = pattern else {
        return Err(MatchError::Mismatch);
    };
    let routine = Arc::clone(&custom.0);
    routine.apply(matcher, value)
}

fn type_probe(_: &Matcher, _: &Value, pattern: &Node) -> bool {
    matches!(pattern, Node::Type(_))
}

/// A type pattern accepts instances of the type and, for type values,
/// subtypes of it.
fn type_apply(_: &mut Matcher, value: &Value, pattern: &Node) -> Result<Value, MatchError> {
    let Node::Type(kind) = pattern else {
        return Err(MatchError::Mismatch);
    };
    let accepted = match value {
        Value::Type(sub) => sub.is_subtype_of(kind) || value.is_instance_of(kind),
        _ => value.is_instance_of(kind),
    };
    if accepted {
        Ok(value.clone())
    } else {
        Err(MatchError::Mismatch)
    }
}

fn literal_probe(_: &Matcher, value: &Value, pattern: &Node) -> bool {
    matches!(pattern, Node::Literal(lit) if lit.is_literal() && value.is_literal())
}

fn equality_probe(_: &Matcher, _: &Value, pattern: &Node) -> bool {
    matches!(pattern, Node::Literal(_))
}

fn equality_apply(_: &mut Matcher, value: &Value, pattern: &Node) -> Result<Value, MatchError> {
    match pattern {
        Node::Literal(lit) if lit == value => Ok(value.clone()),
        _ => Err(MatchError::Mismatch),
    }
}

fn sequence_probe(_: &Matcher, value: &Value, pattern: &Node) -> bool {
    match (pattern, value.items()) {
        (Node::Seq { shape, items }, Some(values)) => {
            shape.admits(value) && items.len() == values.len()
        }
        _ => false,
    }
}

/// Element-wise match; the result is rebuilt with the value's container type.
fn sequence_apply(matcher: &mut Matcher, value: &Value, pattern: &Node) -> Result<Value, MatchError> {
    let (Node::Seq { items, .. }, Some(values)) = (pattern, value.items()) else {
        return Err(MatchError::Mismatch);
    };
    let matched = values
        .iter()
        .zip(items)
        .map(|(v, p)| matcher.visit(v, p))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(value.with_items(matched))
}

fn pattern_probe(_: &Matcher, value: &Value, pattern: &Node) -> bool {
    pattern.is_algebra() && value.is_sequence()
}

/// Prefix search of the pattern algebra over a sequence value. The result is
/// the matched prefix; captures found by the search are committed into the
/// current scope.
fn pattern_apply(matcher: &mut Matcher, value: &Value, pattern: &Node) -> Result<Value, MatchError> {
    let target = value.sequence().ok_or(MatchError::Mismatch)?;
    let nodes = match pattern {
        Node::Pattern(p) => p.nodes(),
        single => std::slice::from_ref(single),
    };
    let found = search::first_match(matcher, nodes, &target)?.ok_or(MatchError::Mismatch)?;
    let captures = matcher.captures_mut();
    captures.push();
    for (name, captured) in found.captures {
        captures.shadow(&name, captured);
    }
    captures.commit();
    Ok(target.slice(0..found.end))
}

fn like_probe(_: &Matcher, _: &Value, pattern: &Node) -> bool {
    matches!(pattern, Node::Like(_))
}

fn like_apply(matcher: &mut Matcher, value: &Value, pattern: &Node) -> Result<Value, MatchError> {
    let Node::Like(like) = pattern else {
        return Err(MatchError::Mismatch);
    };
    let result = like.evaluate(value)?;
    if let Some(name) = &like.bind_as {
        matcher.captures_mut().store(name, result.clone())?;
    }
    Ok(result)
}

fn name_probe(_: &Matcher, _: &Value, pattern: &Node) -> bool {
    matches!(pattern, Node::Name(_))
}

fn name_apply(matcher: &mut Matcher, value: &Value, pattern: &Node) -> Result<Value, MatchError> {
    let Node::Name(name) = pattern else {
        return Err(MatchError::Mismatch);
    };
    matcher.captures_mut().store(name, value.clone())?;
    Ok(value.clone())
}
