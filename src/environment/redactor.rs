use std::collections::BTreeSet;

use super::EffectiveEnvironment;

/// Variable carrying the endpoint's authentication token.
pub const AUTH_TOKEN_KEY: &str = "ANTHROPIC_AUTH_TOKEN";
/// Character substituted for hidden parts of a secret.
pub const MASK_CHAR: char = '*';
/// Values up to this many characters are hidden completely.
const FULL_MASK_MAX_LEN: usize = 6;
/// Characters kept verbatim at each end of longer values.
const VISIBLE_EDGE: usize = 3;

/// Variable names whose values are never displayed in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitiveKeySet {
    keys: BTreeSet<String>,
}

impl Default for SensitiveKeySet {
    fn default() -> Self {
        Self::empty().with_key(AUTH_TOKEN_KEY)
    }
}

impl SensitiveKeySet {
    pub fn empty() -> Self {
        Self {
            keys: BTreeSet::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.keys.insert(key.into());
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

/// Display-safe `(key, value)` pairs in lexicographic key order.
pub fn render(env: &EffectiveEnvironment, sensitive: &SensitiveKeySet) -> Vec<(String, String)> {
    env.iter()
        .map(|(key, value)| {
            let shown = if sensitive.contains(key) {
                mask_secret(value)
            } else {
                value.to_string()
            };
            (key.to_string(), shown)
        })
        .collect()
}

/// Mask a secret, keeping its length.
///
/// Up to six characters are replaced entirely; longer values keep the first
/// and last three characters.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let len = chars.len();
    if len <= FULL_MASK_MAX_LEN {
        return MASK_CHAR.to_string().repeat(len);
    }

    let mut masked = String::with_capacity(value.len());
    masked.extend(&chars[..VISIBLE_EDGE]);
    masked.extend(std::iter::repeat(MASK_CHAR).take(len - 2 * VISIBLE_EDGE));
    masked.extend(&chars[len - VISIBLE_EDGE..]);
    masked
}
