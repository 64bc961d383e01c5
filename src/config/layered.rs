//! Parser for the indentation-based layered text format.
//!
//! ```text
//! # shared by every profile
//! common:
//!   API_TIMEOUT_MS: 600000
//! options:
//!   anyrouter:
//!     ANTHROPIC_BASE_URL: https://anyrouter.example
//!     ANTHROPIC_AUTH_TOKEN: "sk-..."  # quoted values may hold `#`
//! ```
//!
//! The parser is an explicit state machine over non-blank, non-comment lines.
//! Column 0 holds section headers, `common` entries are indented once, profile
//! headers are indented once under `options` and their entries deeper.
use std::path::Path;

use crate::lib::errors::ConfigError;

use super::{
    invalid_env_key_message, invalid_profile_name_message, is_valid_env_key,
    is_valid_profile_name, ConfigDocument, Profile, VarMap,
};

/// Where the parser currently is in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Before the first section header.
    Top,
    Common,
    /// Inside `options:` before the first profile header.
    Options,
    /// Inside a profile; holds its index.
    Profile(usize),
}

/// A `key: value` line split at the first colon, value still quoted.
#[derive(Debug, PartialEq, Eq)]
struct Entry<'a> {
    key: &'a str,
    value: &'a str,
}

struct LayeredParser<'p> {
    path: &'p Path,
    state: State,
    common: VarMap,
    profiles: Vec<Profile>,
    seen_common: bool,
    seen_options: bool,
    header_indent: Option<usize>,
}

/// Parse the layered text format.
pub fn parse(text: &str, path: &Path) -> Result<ConfigDocument, ConfigError> {
    let mut parser = LayeredParser::new(path);
    for (index, raw) in text.lines().enumerate() {
        parser.feed(index + 1, raw)?;
    }
    parser.finish()
}

impl<'p> LayeredParser<'p> {
    fn new(path: &'p Path) -> Self {
        Self {
            path,
            state: State::Top,
            common: VarMap::new(),
            profiles: Vec::new(),
            seen_common: false,
            seen_options: false,
            header_indent: None,
        }
    }

    fn feed(&mut self, number: usize, raw: &str) -> Result<(), ConfigError> {
        let content = raw.trim();
        if content.is_empty() || content.starts_with('#') {
            return Ok(());
        }

        let leading = &raw[..raw.len() - raw.trim_start().len()];
        if leading.contains('\t') {
            return Err(self.error(number, "tabs are not allowed in indentation"));
        }
        let indent = leading.len();
        let entry = split_entry(content).map_err(|message| self.error(number, message))?;

        if indent == 0 {
            return self.section_header(number, entry);
        }

        match self.state {
            State::Top => Err(self.error(number, "indented line appears before any section")),
            State::Common => {
                let key = self.checked_key(number, entry.key)?;
                self.common.insert(key, unquote(entry.value).to_string());
                Ok(())
            }
            State::Options | State::Profile(_) => self.options_line(number, indent, entry),
        }
    }

    fn section_header(&mut self, number: usize, entry: Entry<'_>) -> Result<(), ConfigError> {
        if !entry.value.is_empty() {
            return Err(self.error(
                number,
                format!("`{}: ...` appears outside any section", entry.key),
            ));
        }

        match entry.key {
            "common" => {
                if self.seen_common {
                    return Err(self.error(number, "section `common` appears more than once"));
                }
                self.seen_common = true;
                self.state = State::Common;
            }
            "options" => {
                if self.seen_options {
                    return Err(self.error(number, "section `options` appears more than once"));
                }
                self.seen_options = true;
                self.header_indent = None;
                self.state = State::Options;
            }
            other => {
                return Err(self.error(
                    number,
                    format!("unknown section `{other}` (expected `common` or `options`)"),
                ))
            }
        }
        Ok(())
    }

    fn options_line(
        &mut self,
        number: usize,
        indent: usize,
        entry: Entry<'_>,
    ) -> Result<(), ConfigError> {
        let header_indent = *self.header_indent.get_or_insert(indent);

        if indent < header_indent {
            return Err(self.error(number, "inconsistent indentation under `options`"));
        }

        if indent == header_indent {
            if !entry.value.is_empty() {
                return Err(self.error(
                    number,
                    format!("expected a profile header `{}:`, found a value", entry.key),
                ));
            }
            return self.open_profile(number, entry.key);
        }

        let State::Profile(index) = self.state else {
            return Err(self.error(number, "entry appears before any profile header"));
        };
        let key = self.checked_key(number, entry.key)?;
        self.profiles[index]
            .vars
            .insert(key, unquote(entry.value).to_string());
        Ok(())
    }

    fn open_profile(&mut self, number: usize, name: &str) -> Result<(), ConfigError> {
        if !is_valid_profile_name(name) {
            return Err(self.error(number, invalid_profile_name_message(name)));
        }
        if self.profiles.iter().any(|profile| profile.name == name) {
            return Err(self.error(
                number,
                format!("profile `{name}` is defined more than once"),
            ));
        }

        self.profiles.push(Profile {
            name: name.to_string(),
            vars: VarMap::new(),
        });
        self.state = State::Profile(self.profiles.len() - 1);
        Ok(())
    }

    fn checked_key(&self, number: usize, key: &str) -> Result<String, ConfigError> {
        if !is_valid_env_key(key) {
            return Err(self.error(number, invalid_env_key_message(key)));
        }
        Ok(key.to_string())
    }

    fn finish(self) -> Result<ConfigDocument, ConfigError> {
        if !self.seen_options {
            return Err(ConfigError::malformed(self.path, "missing `options` section"));
        }
        ConfigDocument::from_parts(self.common, self.profiles, self.path.to_path_buf())
    }

    fn error(&self, number: usize, message: impl Into<String>) -> ConfigError {
        ConfigError::malformed_at(self.path, number, message)
    }
}

/// Split trimmed line content at the first colon.
fn split_entry(content: &str) -> Result<Entry<'_>, String> {
    let Some((key, value)) = content.split_once(':') else {
        return Err(format!("expected `key: value`, found `{content}`"));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err("missing key before `:`".to_string());
    }
    Ok(Entry {
        key,
        value: strip_inline_comment(value.trim()),
    })
}

/// Drop a trailing `# ...` comment. A `#` starts a comment at the beginning of
/// the value or after whitespace, never inside a quoted value.
fn strip_inline_comment(value: &str) -> &str {
    if let Some(quote) = value.chars().next().filter(|ch| *ch == '"' || *ch == '\'') {
        if let Some(close) = value[1..].find(quote) {
            let end = close + 2;
            let rest = value[end..].trim_start();
            if rest.is_empty() {
                return value;
            }
            if rest.starts_with('#') {
                return &value[..end];
            }
        }
    }

    for (index, ch) in value.char_indices() {
        if ch == '#' && (index == 0 || value[..index].ends_with(char::is_whitespace)) {
            return value[..index].trim_end();
        }
    }
    value
}

/// Strip one pair of matching surrounding quotes.
fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}
