//! Template variables and persistent environment declarations.

use std::collections::BTreeMap;

/// Key under which the source configuration's directory is exposed to templates.
pub const DIR_KEY: &str = "dir";

/// Substitutions applied to the service configuration template.
pub type VariableMap = BTreeMap<String, String>;

/// An environment variable declared by a `persistent_env` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistentVar {
    pub name: String,
    pub value: String,
}

impl PersistentVar {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Parse a comma-separated `key=value` list.
///
/// Each token is split at its first `=`, so values may contain `=`.
/// Empty tokens are skipped and later keys overwrite earlier ones.
///
/// # Errors
/// Returns a message if a token has no `=` or its key cannot be used as
/// a `{{key}}` placeholder.
pub fn parse_key_values(input: &str) -> Result<VariableMap, String> {
    let mut values = VariableMap::new();

    for token in input.split(',').filter(|t| !t.is_empty()) {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, got '{token}'"))?;

        if key.is_empty() {
            return Err(format!("missing key in '{token}'"));
        }

        if !is_placeholder_key(key) {
            return Err(format!(
                "invalid key '{key}': use letters, digits and '_', not starting with a digit"
            ));
        }

        values.insert(key.to_string(), value.to_string());
    }

    Ok(values)
}

/// Literals the template engine resolves before looking up a variable.
const RESERVED_KEYS: &[&str] = &["true", "false", "none", "True", "False", "None"];

/// Whether `key` can be referenced as `{{key}}`.
#[must_use]
pub fn is_placeholder_key(key: &str) -> bool {
    let mut chars = key.chars();
    let starts_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');

    starts_ok
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !RESERVED_KEYS.contains(&key)
}
