//! Mustache-style rendering of service configuration templates.
//!
//! `{{key}}` placeholders are substituted with the value escaped for XML.
//! Unknown keys render as an empty string.

use std::borrow::Cow;
use std::path::Path;
use std::sync::OnceLock;

use minijinja::{Environment, Error, ErrorKind, Output, State, UndefinedBehavior, Value};

use crate::domain::{AppError, Result, VariableMap};

static ENV: OnceLock<Environment<'static>> = OnceLock::new();

fn environment() -> &'static Environment<'static> {
    ENV.get_or_init(|| {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_undefined_behavior(UndefinedBehavior::Lenient);
        env.set_formatter(xml_formatter);
        env
    })
}

fn xml_formatter(
    out: &mut Output<'_>,
    _state: &State<'_, '_>,
    value: &Value,
) -> std::result::Result<(), Error> {
    if value.is_undefined() {
        return Ok(());
    }
    let raw = value.to_string();
    out.write_str(&xml_escape(&raw))
        .map_err(|_| Error::new(ErrorKind::WriteFailure, "failed to write rendered value"))
}

/// Escape the five XML special characters.
#[must_use]
pub fn xml_escape(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(raw);
    }

    let mut escaped = String::with_capacity(raw.len() + 16);
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Render `template` against `variables`.
///
/// `source` is only used to label errors.
///
/// # Errors
/// Returns `Template` if the template is malformed.
pub fn render_template(source: &Path, template: &str, variables: &VariableMap) -> Result<String> {
    environment()
        .render_str(template, variables)
        .map_err(|e| AppError::template(source, e))
}
