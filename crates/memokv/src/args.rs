//! Argument normalization.
//!
//! A [`FuncSpec`] is the one-time-computed parameter descriptor for a
//! memoized function: its identity string plus its declared parameter list in
//! order. Binding actual [`CallArgs`] against it produces the canonical
//! [`ArgumentTuple`] that key derivation consumes, so that semantically
//! equivalent calls (a value passed positionally, by name, or filled in from
//! a default) normalize to the identical tuple.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{MemoError, MemoResult};

/// One declared parameter: a name and an optional default value.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    name: String,
    default: Option<Value>,
}

impl Param {
    /// A parameter with no default; it must be bound on every call.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    /// A parameter with a default substituted when unset.
    pub fn with_default(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
        }
    }

    /// Parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Identity and declared signature of a memoized function.
///
/// The identity string uniquely names the function across its defining scope
/// (module path plus qualified name, including the enclosing type for
/// methods) and must stay stable for the process lifetime — it feeds both the
/// cache key and the version-token key.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncSpec {
    identity: String,
    params: Vec<Param>,
    extra_keywords: bool,
}

impl FuncSpec {
    /// Create a descriptor for a function with no declared parameters.
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            params: Vec::new(),
            extra_keywords: false,
        }
    }

    /// Append a required parameter.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::required(name));
        self
    }

    /// Append a parameter with a default value.
    pub fn param_with_default(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.params.push(Param::with_default(name, default));
        self
    }

    /// Accept keyword arguments beyond the declared parameters. They are
    /// collected into the normalized tuple's keyword mapping, sorted by name.
    pub fn extra_keywords(mut self) -> Self {
        self.extra_keywords = true;
        self
    }

    /// The function identity string.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Bind actual arguments against the declared parameter list.
    ///
    /// Positional values fill parameter slots in declaration order, keyword
    /// values fill the slot they name, and defaults cover whatever remains.
    /// Every declared parameter must resolve; partial binding is rejected
    /// with [`MemoError::MissingArgument`] rather than producing a tuple that
    /// only sometimes matches the full call.
    pub fn bind(&self, args: &CallArgs) -> MemoResult<ArgumentTuple> {
        if args.positional.len() > self.params.len() {
            return Err(MemoError::TooManyPositional {
                given: args.positional.len(),
                declared: self.params.len(),
            });
        }

        let mut slots: Vec<Option<Value>> = vec![None; self.params.len()];
        for (slot, value) in slots.iter_mut().zip(&args.positional) {
            *slot = Some(value.clone());
        }

        let mut extra = BTreeMap::new();
        for (name, value) in &args.keyword {
            match self.params.iter().position(|p| p.name == *name) {
                Some(i) => {
                    if slots[i].is_some() {
                        return Err(MemoError::DuplicateArgument { name: name.clone() });
                    }
                    slots[i] = Some(value.clone());
                }
                None if self.extra_keywords => {
                    extra.insert(name.clone(), value.clone());
                }
                None => {
                    return Err(MemoError::UnknownKeyword { name: name.clone() });
                }
            }
        }

        let mut positional = Vec::with_capacity(self.params.len());
        for (slot, param) in slots.into_iter().zip(&self.params) {
            match slot.or_else(|| param.default.clone()) {
                Some(value) => positional.push(value),
                None => {
                    return Err(MemoError::MissingArgument {
                        name: param.name.clone(),
                    })
                }
            }
        }

        Ok(ArgumentTuple {
            positional,
            keyword: extra,
        })
    }
}

/// Raw actual arguments for one call: ordered positional values plus keyword
/// name/value pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    positional: Vec<Value>,
    keyword: BTreeMap<String, Value>,
}

impl CallArgs {
    /// No arguments at all. For invalidation this spelling means "the whole
    /// function"; see [`crate::engine::Memoizer::delete_memoized`].
    pub fn none() -> Self {
        Self::default()
    }

    /// Append a positional value.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Add a keyword value.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    /// True when there are no positional and no keyword values.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }
}

/// The canonical binding result: every declared parameter resolved in
/// declaration order, plus remaining keyword values sorted by name.
///
/// Equal tuples (same identity, same version) always derive equal cache
/// keys; this is the sole mechanism the memoizer relies on for correctness.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentTuple {
    pub(crate) positional: Vec<Value>,
    pub(crate) keyword: BTreeMap<String, Value>,
}

impl ArgumentTuple {
    /// Declared-parameter values in declaration order.
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// Remaining keyword values, sorted by name.
    pub fn keyword(&self) -> &BTreeMap<String, Value> {
        &self.keyword
    }
}
