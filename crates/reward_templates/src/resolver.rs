//! Layered template lookup.
//!
//! A logical template path (e.g. `templates/traefik/traefik.yml`) is looked
//! up in three layers, first match wins:
//!
//! 1. the project directory, `<cwd>/.<app_name>/<path>`
//! 2. the user's application home, `<app_home_dir>/<path>`
//! 3. the bundle embedded in the binary
//!
//! Absence is reported as `None`. Only unreadable files and template syntax
//! errors are failures.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};
use walkdir::WalkDir;

use reward_core::AppPaths;

use crate::assets::{logical_path, EmbeddedAssets};
use crate::error::{TemplateError, TemplateResult};
use crate::set::TemplateSet;

/// Where a template was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    ProjectLocal,
    UserHome,
    Embedded,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectLocal => "project",
            Self::UserHome => "home",
            Self::Embedded => "embedded",
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A template located in one layer.
#[derive(Debug, Clone)]
pub struct ResolvedTemplate {
    /// Logical, forward-slash name
    pub name: String,
    /// Raw template source
    pub content: String,
    /// Layer the content came from
    pub layer: Layer,
}

/// Locates template sources across the override directories and the
/// embedded bundle.
#[derive(Debug, Clone)]
pub struct TemplateResolver {
    project_dir: PathBuf,
    home_dir: PathBuf,
    assets: &'static EmbeddedAssets,
}

impl TemplateResolver {
    /// Resolver over the standard layout for `paths` and the built-in bundle.
    pub fn new(paths: &AppPaths) -> Self {
        Self::with_dirs(paths.project_dir(), paths.app_home_dir())
    }

    /// Resolver over explicit override roots and the built-in bundle.
    pub fn with_dirs(project_dir: impl Into<PathBuf>, home_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            home_dir: home_dir.into(),
            assets: EmbeddedAssets::builtin(),
        }
    }

    /// Replace the embedded bundle.
    pub fn with_assets(mut self, assets: &'static EmbeddedAssets) -> Self {
        self.assets = assets;
        self
    }

    pub fn assets(&self) -> &'static EmbeddedAssets {
        self.assets
    }

    /// Look up `path` in the project and home override directories.
    pub fn lookup_local(&self, path: &str) -> TemplateResult<Option<ResolvedTemplate>> {
        let name = logical_path(path);

        for (layer, root) in self.local_roots() {
            let file = override_file(root, &name);
            if !file.is_file() {
                trace!("Template not found in {} layer: {}", layer, name);
                continue;
            }

            debug!("Template {} found in {} layer at {:?}", name, layer, file);
            let content = fs::read_to_string(&file).map_err(|e| TemplateError::io(&file, e))?;
            return Ok(Some(ResolvedTemplate {
                name,
                content,
                layer,
            }));
        }

        Ok(None)
    }

    /// Look up `path` in the embedded bundle.
    pub fn lookup_embedded(&self, path: &str) -> Option<ResolvedTemplate> {
        let name = logical_path(path);
        match self.assets.get(&name) {
            Some(content) => Some(ResolvedTemplate {
                name,
                content: content.to_string(),
                layer: Layer::Embedded,
            }),
            None => {
                trace!("Template not found in embedded layer: {}", name);
                None
            }
        }
    }

    /// Look up `path` in all three layers.
    pub fn lookup(&self, path: &str) -> TemplateResult<Option<ResolvedTemplate>> {
        match self.lookup_local(path)? {
            Some(found) => Ok(Some(found)),
            None => Ok(self.lookup_embedded(path)),
        }
    }

    /// Append templates for `paths` found in the override directories.
    ///
    /// Paths already in the set and paths without an override are skipped.
    pub fn append_from_paths<S: AsRef<str>>(
        &self,
        set: &mut TemplateSet,
        paths: &[S],
    ) -> TemplateResult<()> {
        for path in paths {
            let path = path.as_ref();
            if set.contains(path) {
                trace!("Template already defined: {}. Skipping.", path);
                continue;
            }
            if let Some(found) = self.lookup_local(path)? {
                set.insert(&found.name, found.content)?;
            }
        }
        Ok(())
    }

    /// Append templates for `paths` from the embedded bundle.
    ///
    /// Paths already in the set and paths missing from the bundle are skipped.
    pub fn append_from_paths_static<S: AsRef<str>>(
        &self,
        set: &mut TemplateSet,
        paths: &[S],
    ) -> TemplateResult<()> {
        for path in paths {
            let path = path.as_ref();
            if set.contains(path) {
                trace!("Template already defined: {}. Skipping.", path);
                continue;
            }
            if let Some(found) = self.lookup_embedded(path) {
                set.insert(&found.name, found.content)?;
            }
        }
        Ok(())
    }

    /// Every known logical path with the layer that wins for it, sorted by
    /// path.
    pub fn list(&self) -> Vec<(String, Layer)> {
        let mut winners: BTreeMap<String, Layer> = self
            .assets
            .paths()
            .map(|path| (path.to_string(), Layer::Embedded))
            .collect();

        for (layer, root) in self.local_roots() {
            for name in walk_templates(root) {
                let entry = winners.entry(name).or_insert(layer);
                if layer < *entry {
                    *entry = layer;
                }
            }
        }

        winners.into_iter().collect()
    }

    fn local_roots(&self) -> [(Layer, &Path); 2] {
        [
            (Layer::ProjectLocal, self.project_dir.as_path()),
            (Layer::UserHome, self.home_dir.as_path()),
        ]
    }
}

/// Host path for a logical name under `root`.
fn override_file(root: &Path, name: &str) -> PathBuf {
    name.split('/')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_path_buf(), |path, segment| path.join(segment))
}

/// Logical names of all files under `<root>/templates`.
fn walk_templates(root: &Path) -> Vec<String> {
    let templates = root.join("templates");
    if !templates.is_dir() {
        return Vec::new();
    }

    WalkDir::new(&templates)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(root).ok()?;
            let segments: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            Some(segments.join("/"))
        })
        .collect()
}
