//! Rendering fragments against the settings context.

use std::sync::Arc;

use minijinja::Value;
use tracing::trace;

use reward_core::Settings;

use crate::error::{TemplateError, TemplateResult};
use crate::functions::FunctionRegistry;
use crate::set::TemplateSet;

/// Renders fragments of a [`TemplateSet`] with a fixed function table.
///
/// The function table is built once and shared; every set created through
/// [`TemplateRenderer::new_set`] gets the same functions.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    functions: Arc<FunctionRegistry>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Create a renderer with the standard function table.
    pub fn new() -> Self {
        Self::with_functions(Arc::new(FunctionRegistry::new()))
    }

    pub fn with_functions(functions: Arc<FunctionRegistry>) -> Self {
        Self { functions }
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Create an empty template set wired to this renderer's functions.
    pub fn new_set(&self) -> TemplateSet {
        TemplateSet::new(&self.functions)
    }

    /// Render one fragment of `set` with the current `settings`.
    pub fn render(&self, set: &TemplateSet, name: &str, settings: &Settings) -> TemplateResult<String> {
        trace!("Rendering template {}", name);

        let template = set.template(name)?;
        template
            .render(Value::from_serialize(settings))
            .map_err(|source| TemplateError::Render {
                name: name.to_string(),
                source,
            })
    }

    /// Render every fragment in order and concatenate the output.
    pub fn render_all(&self, set: &TemplateSet, settings: &Settings) -> TemplateResult<String> {
        let mut output = String::new();
        for name in set.iter() {
            output.push_str(&self.render(set, name, settings)?);
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_reads_settings() {
        let renderer = TemplateRenderer::new();
        let mut set = renderer.new_set();
        set.insert("svc.yml", "image: {{ db.image }}:{{ db.version | default('10.6') }}\n")
            .unwrap();

        let mut settings = Settings::new();
        settings.set("db.image", "mariadb").unwrap();

        let output = renderer.render(&set, "svc.yml", &settings).unwrap();
        assert_eq!(output, "image: mariadb:10.6\n");
    }

    #[test]
    fn test_render_sees_latest_settings() {
        let renderer = TemplateRenderer::new();
        let mut set = renderer.new_set();
        set.insert("prefix.txt", "{{ wordpress_table_prefix }}").unwrap();

        let mut settings = Settings::new();
        settings.set("wordpress_table_prefix", "wp_").unwrap();
        assert_eq!(renderer.render(&set, "prefix.txt", &settings).unwrap(), "wp_");

        settings.set("wordpress_table_prefix", "shop_").unwrap();
        assert_eq!(renderer.render(&set, "prefix.txt", &settings).unwrap(), "shop_");
    }

    #[test]
    fn test_missing_nested_keys_render_empty() {
        let renderer = TemplateRenderer::new();
        let mut set = renderer.new_set();
        set.insert("a.yml", "[{{ missing.there.at_all }}]").unwrap();

        let output = renderer.render(&set, "a.yml", &Settings::new()).unwrap();
        assert_eq!(output, "[]");
    }

    #[test]
    fn test_unknown_function_is_render_error() {
        let renderer = TemplateRenderer::new();
        let mut set = renderer.new_set();
        set.insert("bad.yml", "{{ nosuchfn() }}").unwrap();

        match renderer.render(&set, "bad.yml", &Settings::new()) {
            Err(TemplateError::Render { name, .. }) => assert_eq!(name, "bad.yml"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_fragment() {
        let renderer = TemplateRenderer::new();
        let set = renderer.new_set();

        assert!(matches!(
            renderer.render(&set, "missing.yml", &Settings::new()),
            Err(TemplateError::UnknownTemplate(_))
        ));
    }

    #[test]
    fn test_render_all_concatenates_in_order() {
        let renderer = TemplateRenderer::new();
        let mut set = renderer.new_set();
        set.insert("one", "1\n").unwrap();
        set.insert("two", "2\n").unwrap();

        let output = renderer.render_all(&set, &Settings::new()).unwrap();
        assert_eq!(output, "1\n2\n");
    }
}
