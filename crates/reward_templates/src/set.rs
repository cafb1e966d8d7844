//! Ordered, deduplicated collection of parsed template fragments.

use minijinja::value::{Value, ValueKind};
use minijinja::{
    escape_formatter, AutoEscape, Environment, Error, Output, State, Template, UndefinedBehavior,
};
use tracing::trace;

use crate::assets::logical_path;
use crate::error::{TemplateError, TemplateResult};
use crate::functions::FunctionRegistry;

/// Fragments accumulated for one assembly operation.
///
/// Insertion order is render and merge order. A name can only be added once;
/// adding it again is a silent no-op so overlapping candidate lists never
/// register a fragment twice.
#[derive(Debug)]
pub struct TemplateSet {
    env: Environment<'static>,
    order: Vec<String>,
}

impl TemplateSet {
    /// Create an empty set whose fragments can call `functions`.
    pub fn new(functions: &FunctionRegistry) -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_undefined_behavior(UndefinedBehavior::Chainable);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_formatter(format_value);
        functions.install(&mut env);

        Self {
            env,
            order: Vec::new(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = logical_path(name);
        self.order.iter().any(|existing| *existing == name)
    }

    /// Parse `source` and append it under `name`.
    ///
    /// Returns `false` without parsing when the name is already present.
    pub fn insert(&mut self, name: &str, source: impl Into<String>) -> TemplateResult<bool> {
        let name = logical_path(name);
        if self.contains(&name) {
            trace!("Template already defined: {}. Skipping.", name);
            return Ok(false);
        }

        self.env
            .add_template_owned(name.clone(), source.into())
            .map_err(|source| TemplateError::Parse {
                name: name.clone(),
                source,
            })?;
        self.order.push(name);

        Ok(true)
    }

    /// Fragment names in insertion order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub(crate) fn template(&self, name: &str) -> TemplateResult<Template<'_, '_>> {
        if !self.contains(name) {
            return Err(TemplateError::UnknownTemplate(name.to_string()));
        }
        self.env
            .get_template(&logical_path(name))
            .map_err(|_| TemplateError::UnknownTemplate(name.to_string()))
    }
}

/// Output formatter: booleans print as `true`/`false` so they read back as
/// YAML booleans. Every other value uses the default formatting.
pub(crate) fn format_value(out: &mut Output, state: &State, value: &Value) -> Result<(), Error> {
    if value.kind() == ValueKind::Bool {
        out.write_str(if value.is_true() { "true" } else { "false" })?;
        return Ok(());
    }
    escape_formatter(out, state, value)
}
