//! Settings context shared by the bootstrap flow and the template renderer.
//!
//! Settings are a nested mapping of case-insensitive keys, layered with
//! [`SettingsBuilder`] from lowest to highest precedence:
//!
//! 1. built-in defaults ([`SettingsBuilder::defaults`])
//! 2. a YAML config file ([`SettingsBuilder::file`])
//! 3. prefixed environment variables ([`SettingsBuilder::env`])
//! 4. explicit overrides ([`SettingsBuilder::apply_override`])
//!
//! Renderers borrow the built settings immutably, so every render sees the
//! values as they are at call time. Code that needs to inject a value between
//! two renders calls [`Settings::set`] on the owned instance.

use std::path::Path;

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File, FileFormat};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::{CoreError, CoreResult};
use crate::paths::AppPaths;

/// Layered, nested key/value settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Settings {
    root: Map<String, Value>,
}

impl Settings {
    /// Create empty settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::new()
    }

    /// Settings holding only the defaults for `paths`.
    pub fn with_defaults(paths: &AppPaths) -> Self {
        let mut settings = Self::new();
        for (key, value) in default_entries(paths) {
            settings.root.insert(key, Value::from(value));
        }
        settings
    }

    /// Set a value. Dotted keys address nested mappings, creating them as
    /// needed.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> CoreResult<()> {
        let segments = split_key(key)?;
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| CoreError::InvalidKey(key.to_string()))?;

        let mut current = &mut self.root;
        for segment in parents {
            let entry = current
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = match entry {
                Value::Object(map) => map,
                _ => unreachable!("entry was just replaced with a mapping"),
            };
        }

        current.insert(last.clone(), value.into());
        Ok(())
    }

    /// Look up a value by (dotted) key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let segments = split_key(key).ok()?;
        let (first, rest) = segments.split_first()?;

        let mut current = self.root.get(first)?;
        for segment in rest {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The full settings tree.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }
}

/// Collects the settings layers and builds a [`Settings`].
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    inner: ConfigBuilder<DefaultState>,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the application name and home directory.
    pub fn defaults(mut self, paths: &AppPaths) -> CoreResult<Self> {
        for (key, value) in default_entries(paths) {
            self.inner = self.inner.set_default(key, value)?;
        }
        Ok(self)
    }

    /// Add a YAML settings file. A missing file is skipped.
    pub fn file(mut self, path: &Path) -> Self {
        if path.is_file() {
            debug!("Loading settings from {:?}", path);
        } else {
            trace!("Settings file not found: {:?}", path);
        }
        self.inner = self
            .inner
            .add_source(File::from(path).format(FileFormat::Yaml).required(false));
        self
    }

    /// Add variables starting with `<PREFIX>_` from `vars`.
    ///
    /// The whole variable name, lower-cased, becomes the key, so
    /// `REWARD_ENV_NAME=shop` is readable as `reward_env_name`. Values stay
    /// strings.
    pub fn env<I>(mut self, prefix: &str, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let source = Environment::with_prefix(&prefix.to_uppercase())
            .keep_prefix(true)
            .source(Some(vars.into_iter().collect()));
        self.inner = self.inner.add_source(source);
        self
    }

    /// Apply a `key=value` override. `true` and `false` become booleans;
    /// every other value is kept verbatim as a string, so `8.10` stays
    /// `"8.10"`.
    pub fn apply_override(mut self, expr: &str) -> CoreResult<Self> {
        let (key, raw) = expr
            .split_once('=')
            .ok_or_else(|| CoreError::InvalidOverride(expr.to_string()))?;
        let key = normalize_key(key)?;

        self.inner = match raw.trim() {
            flag if flag.eq_ignore_ascii_case("true") => self.inner.set_override(key, true)?,
            flag if flag.eq_ignore_ascii_case("false") => self.inner.set_override(key, false)?,
            _ => self.inner.set_override(key, raw)?,
        };
        Ok(self)
    }

    pub fn build(self) -> CoreResult<Settings> {
        let root: Map<String, Value> = self.inner.build()?.try_deserialize()?;
        Ok(Settings {
            root: lowercase_keys(root),
        })
    }
}

fn default_entries(paths: &AppPaths) -> [(String, String); 2] {
    [
        ("app_name".to_string(), paths.app_name.clone()),
        (
            paths.home_dir_key(),
            paths.app_home_dir.to_string_lossy().into_owned(),
        ),
    ]
}

fn split_key(key: &str) -> CoreResult<Vec<String>> {
    let segments: Vec<String> = key.split('.').map(|s| s.trim().to_lowercase()).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(CoreError::InvalidKey(key.to_string()));
    }
    Ok(segments)
}

fn normalize_key(key: &str) -> CoreResult<String> {
    Ok(split_key(key)?.join("."))
}

/// File sources keep the key case they were written with.
fn lowercase_keys(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Object(nested) => Value::Object(lowercase_keys(nested)),
                other => other,
            };
            (key.to_lowercase(), value)
        })
        .collect()
}
