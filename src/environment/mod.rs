//! Effective environment derived from a configuration document.
mod redactor;
mod resolver;

pub use redactor::{mask_secret, render, SensitiveKeySet, AUTH_TOKEN_KEY, MASK_CHAR};
pub use resolver::{merge, resolve, ResolvedProfile};

use crate::config::VarMap;

/// Variables handed to the child process, after all layers were applied.
///
/// Immutable once built; layering more variables produces a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveEnvironment {
    vars: VarMap,
}

impl EffectiveEnvironment {
    pub fn new(vars: VarMap) -> Self {
        Self { vars }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Entries in lexicographic key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// New environment with `overrides` layered on top (overrides win).
    pub fn with_overrides<I>(&self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut vars = self.vars.clone();
        vars.extend(overrides);
        Self { vars }
    }

    /// Whether `key` is present with a non-blank value.
    pub fn has_value(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| !value.trim().is_empty())
    }
}
