//! TOML encoding of the same two-level document:
//!
//! ```toml
//! [common]
//! API_TIMEOUT_MS = 600000
//!
//! [options.anyrouter]
//! ANTHROPIC_BASE_URL = "https://anyrouter.example"
//! ```
use std::path::Path;

use toml::{Table, Value};

use crate::lib::errors::ConfigError;

use super::{invalid_env_key_message, is_valid_env_key, ConfigDocument, Profile, VarMap};

/// Parse a TOML document. Profile order follows the file.
pub fn parse(text: &str, path: &Path) -> Result<ConfigDocument, ConfigError> {
    let root: Table = text.parse().map_err(|err: toml::de::Error| {
        let line = err
            .span()
            .map(|span| text[..span.start].matches('\n').count() + 1);
        ConfigError::Malformed {
            path: path.to_path_buf(),
            line,
            message: err.message().to_string(),
        }
    })?;

    let mut common = VarMap::new();
    let mut profiles = Vec::new();
    let mut seen_options = false;

    for (section, value) in root {
        match section.as_str() {
            "common" => {
                let table = expect_table(value, "common", path)?;
                common = flatten_vars(table, "common", path)?;
            }
            "options" => {
                seen_options = true;
                for (name, vars) in expect_table(value, "options", path)? {
                    let scope = format!("options.{name}");
                    let table = expect_table(vars, &scope, path)?;
                    let vars = flatten_vars(table, &scope, path)?;
                    profiles.push(Profile { name, vars });
                }
            }
            other => {
                return Err(ConfigError::malformed(
                    path,
                    format!("unknown section `{other}` (expected `common` or `options`)"),
                ))
            }
        }
    }

    if !seen_options {
        return Err(ConfigError::malformed(path, "missing `options` section"));
    }
    ConfigDocument::from_parts(common, profiles, path.to_path_buf())
}

fn expect_table(value: Value, scope: &str, path: &Path) -> Result<Table, ConfigError> {
    match value {
        Value::Table(table) => Ok(table),
        other => Err(ConfigError::malformed(
            path,
            format!("`{scope}` must be a table, found {}", other.type_str()),
        )),
    }
}

fn flatten_vars(table: Table, scope: &str, path: &Path) -> Result<VarMap, ConfigError> {
    table
        .into_iter()
        .map(|(key, value)| {
            if !is_valid_env_key(&key) {
                return Err(ConfigError::malformed(
                    path,
                    format!("in `{scope}`: {}", invalid_env_key_message(&key)),
                ));
            }
            let rendered = match value {
                Value::String(text) => text,
                Value::Integer(number) => number.to_string(),
                Value::Float(number) => number.to_string(),
                Value::Boolean(flag) => flag.to_string(),
                other => {
                    return Err(ConfigError::malformed(
                        path,
                        format!(
                            "`{scope}.{key}` must be a string, number or boolean, found {}",
                            other.type_str()
                        ),
                    ))
                }
            };
            Ok((key, rendered))
        })
        .collect()
}
