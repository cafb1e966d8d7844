//! Configuration files rendered straight to disk.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use reward_core::fs::{create_dir_and_write_to_file, file_exists};
use reward_core::{AppPaths, HostOs, Settings};

use crate::error::TemplateResult;
use crate::renderer::TemplateRenderer;
use crate::resolver::TemplateResolver;
use crate::selector::EnvironmentSelector;
use crate::traefik::{discover_certificates, DynamicConfig};

/// Partial name of the sync-tool templates.
pub const MUTAGEN_PARTIAL: &str = "mutagen";

/// Embedded template of the reverse-proxy static configuration.
pub const TRAEFIK_TEMPLATE: &str = "templates/traefik/traefik.yml";

pub const MUTAGEN_FILE_MODE: u32 = 0o640;
pub const TRAEFIK_FILE_MODE: u32 = 0o644;

/// Writes the sync-tool and reverse-proxy configuration files.
#[derive(Debug, Clone)]
pub struct ConfigGenerator {
    paths: AppPaths,
    resolver: TemplateResolver,
    renderer: TemplateRenderer,
    host_os: HostOs,
}

impl ConfigGenerator {
    pub fn new(paths: &AppPaths, renderer: TemplateRenderer) -> Self {
        Self {
            paths: paths.clone(),
            resolver: TemplateResolver::new(paths),
            renderer,
            host_os: HostOs::current(),
        }
    }

    /// Use `host_os` when picking OS-specific templates.
    pub fn with_os(mut self, host_os: HostOs) -> Self {
        self.host_os = host_os;
        self
    }

    /// Write the sync configuration for `env_type` to `path` unless the file
    /// already exists.
    ///
    /// Returns whether the file was written.
    pub fn generate_mutagen_config(
        &self,
        path: &Path,
        env_type: &str,
        settings: &Settings,
    ) -> TemplateResult<bool> {
        if file_exists(path) {
            debug!("Mutagen sync file already exists, skipping: {:?}", path);
            return Ok(false);
        }

        let mut set = self.renderer.new_set();
        EnvironmentSelector::for_os(&self.resolver, self.host_os.clone()).append_sync_templates(
            &mut set,
            MUTAGEN_PARTIAL,
            env_type,
        )?;

        let rendered = self.renderer.render_all(&set, settings)?;
        create_dir_and_write_to_file(rendered.as_bytes(), path, MUTAGEN_FILE_MODE)?;

        info!("Generated mutagen sync configuration {:?}", path);
        Ok(true)
    }

    /// Render the static reverse-proxy configuration, replacing any existing
    /// file.
    pub fn generate_traefik_config(&self, settings: &Settings) -> TemplateResult<PathBuf> {
        let mut set = self.renderer.new_set();
        self.resolver
            .append_from_paths_static(&mut set, &[TRAEFIK_TEMPLATE])?;

        let rendered = self.renderer.render_all(&set, settings)?;
        let target = self.paths.traefik_dir().join("traefik.yml");
        create_dir_and_write_to_file(rendered.as_bytes(), &target, TRAEFIK_FILE_MODE)?;

        info!("Generated traefik configuration {:?}", target);
        Ok(target)
    }

    /// Write the dynamic TLS configuration listing every certificate found
    /// under the application's certificate directory.
    pub fn generate_traefik_dynamic_config(&self, service_domain: &str) -> TemplateResult<PathBuf> {
        let names = discover_certificates(&self.paths.certs_dir())?;
        let yaml = DynamicConfig::new(service_domain, &names).to_yaml()?;

        let target = self.paths.traefik_dir().join("dynamic.yml");
        create_dir_and_write_to_file(yaml.as_bytes(), &target, TRAEFIK_FILE_MODE)?;

        info!(
            "Generated traefik dynamic configuration {:?} ({} certificates)",
            target,
            names.len()
        );
        Ok(target)
    }
}
