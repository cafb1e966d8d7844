//! Conversion of rendered fragments into compose configuration documents.
//!
//! The assembler only renders, parses and orders. Merging the documents is
//! left to the compose-format loader that consumes them, which applies them
//! in list order so later fragments override earlier ones.

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use reward_core::Settings;

use crate::error::{TemplateError, TemplateResult};
use crate::renderer::TemplateRenderer;
use crate::set::TemplateSet;

/// One parsed compose document and the fragment it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposeConfigFile {
    /// Logical name of the source fragment
    pub filename: String,
    /// Top-level compose mapping
    pub config: Mapping,
}

/// Ordered compose documents, ready for a compose-format loader.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComposeConfigDetails {
    pub config_files: Vec<ComposeConfigFile>,
}

impl ComposeConfigDetails {
    pub fn len(&self) -> usize {
        self.config_files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.config_files.is_empty()
    }

    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.config_files.iter().map(|file| file.filename.as_str())
    }

    /// Serialise as a multi-document YAML stream, one document per fragment
    /// in order, each headed by a comment naming its fragment.
    pub fn to_yaml_stream(&self) -> TemplateResult<String> {
        let mut out = String::new();
        for file in &self.config_files {
            out.push_str("---\n");
            out.push_str(&format!("# {}\n", file.filename));
            out.push_str(&serde_yaml::to_string(&file.config)?);
        }
        Ok(out)
    }
}

/// Render every fragment of `set` in order and parse each as a compose
/// document.
///
/// Any render or parse failure aborts the whole assembly; no partial list is
/// returned.
pub fn convert_templates_to_compose_config(
    renderer: &TemplateRenderer,
    set: &TemplateSet,
    settings: &Settings,
) -> TemplateResult<ComposeConfigDetails> {
    debug!("Converting templates to docker compose configurations...");

    let mut config_files = Vec::with_capacity(set.len());
    for name in set.iter() {
        let mut rendered = renderer.render(set, name, settings)?;
        rendered.push('\n');

        let config = parse_compose_document(name, &rendered)?;
        config_files.push(ComposeConfigFile {
            filename: name.to_string(),
            config,
        });
    }

    Ok(ComposeConfigDetails { config_files })
}

/// Parse one rendered fragment. An empty document is an empty mapping.
pub fn parse_compose_document(name: &str, rendered: &str) -> TemplateResult<Mapping> {
    let value: Value =
        serde_yaml::from_str(rendered).map_err(|source| TemplateError::ComposeParse {
            name: name.to_string(),
            source,
        })?;

    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        other => Err(TemplateError::InvalidComposeDocument {
            name: name.to_string(),
            kind: yaml_kind(&other),
        }),
    }
}

fn yaml_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
