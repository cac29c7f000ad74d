//! Service configuration deployment.
//!
//! Renders the source template into the service's bin directory and
//! collects the `persistent_env` declarations it contains.

use std::fs;
use std::path::Path;

use crate::domain::{AppError, PersistentVar, Result, VariableMap};
use crate::infrastructure::render_template;

/// Element declaring a machine-wide environment variable.
const PERSISTENT_ENV_TAG: &str = "persistent_env";

/// Rendered configuration and the variables it declares.
#[derive(Debug, Clone)]
pub struct DeployedConfig {
    pub rendered: String,
    pub persistent_vars: Vec<PersistentVar>,
}

/// Render `source` with `variables` and write it to `target`.
///
/// # Errors
/// Returns `Io` if the source cannot be read or the target written,
/// `Template` if rendering fails and `XmlParse` if the rendered document
/// is not well-formed.
pub fn deploy_config(source: &Path, target: &Path, variables: &VariableMap) -> Result<DeployedConfig> {
    let template = fs::read_to_string(source).map_err(|e| {
        AppError::io(format!("Failed to read service config: {}", source.display()), e)
    })?;

    let rendered = render_template(source, &template, variables)?;

    fs::write(target, &rendered).map_err(|e| {
        AppError::io(format!("Failed to write service config: {}", target.display()), e)
    })?;

    tracing::info!(path = %target.display(), "Service config written");

    let persistent_vars = extract_persistent_vars(&rendered)?;

    Ok(DeployedConfig {
        rendered,
        persistent_vars,
    })
}

/// Collect `persistent_env` name/value pairs below the root element, in
/// document order.
///
/// # Errors
/// Returns `XmlParse` if the document is malformed or an element lacks
/// its `name` or `value` attribute.
pub fn extract_persistent_vars(xml: &str) -> Result<Vec<PersistentVar>> {
    let doc = roxmltree::Document::parse(xml).map_err(AppError::xml_parse)?;

    doc.root_element()
        .descendants()
        .skip(1)
        .filter(|node| node.has_tag_name(PERSISTENT_ENV_TAG))
        .map(|node| {
            let attr = |name: &str| {
                node.attribute(name).ok_or_else(|| AppError::XmlParse {
                    message: format!(
                        "<{PERSISTENT_ENV_TAG}> at {} is missing the '{name}' attribute",
                        doc.text_pos_at(node.range().start)
                    ),
                    source: None,
                })
            };
            Ok(PersistentVar::new(attr("name")?, attr("value")?))
        })
        .collect()
}
