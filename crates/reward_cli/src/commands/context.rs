//! Settings and paths shared by every command.

use anyhow::{Context, Result};

use reward_core::{default_config_file, AppPaths, HostOs, Settings};
use reward_templates::{setting_enabled, TemplateRenderer, TemplateResolver};

use super::GlobalArgs;

/// Everything a command needs to resolve and render templates.
pub struct CommandContext {
    pub paths: AppPaths,
    pub settings: Settings,
    pub host_os: HostOs,
}

impl CommandContext {
    /// Build the context from the process environment and global flags.
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let paths = AppPaths::detect(global.app_name.as_str(), global.app_home.clone())
            .context("Failed to resolve application directories")?;

        Self::build(global, paths, std::env::vars())
    }

    fn build<I>(global: &GlobalArgs, paths: AppPaths, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = match &global.config {
            Some(path) => path.clone(),
            None => default_config_file(&paths.app_name)?,
        };

        let mut builder = Settings::builder()
            .defaults(&paths)?
            .file(&config)
            .env(&paths.app_name, vars);
        for expr in &global.overrides {
            builder = builder
                .apply_override(expr)
                .with_context(|| format!("Invalid --set override: {}", expr))?;
        }
        let settings = builder
            .build()
            .with_context(|| format!("Failed to load settings from {:?}", config))?;

        let host_os = global
            .os
            .as_deref()
            .map(HostOs::from)
            .unwrap_or_else(HostOs::current);

        Ok(Self {
            paths,
            settings,
            host_os,
        })
    }

    pub fn resolver(&self) -> TemplateResolver {
        TemplateResolver::new(&self.paths)
    }

    pub fn renderer(&self) -> TemplateRenderer {
        TemplateRenderer::new()
    }

    /// Settings key of an application-scoped flag, e.g. `reward_php_fpm`.
    pub fn app_key(&self, name: &str) -> String {
        format!("{}_{}", self.paths.app_name, name.replace('-', "_"))
    }

    /// Whether the optional service `name` is switched on.
    pub fn service_enabled(&self, name: &str, default: bool) -> bool {
        setting_enabled(&self.settings, &self.app_key(name), default)
    }
}
