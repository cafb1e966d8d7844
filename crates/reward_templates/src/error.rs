//! Error types for templates.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur during template operations.
///
/// A template that cannot be found is not an error; lookups return `None`.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("cannot parse template {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("cannot execute template {name}: {source}")]
    Render {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("template {0} is not part of the template set")]
    UnknownTemplate(String),

    #[error("parsing template {name} as compose configuration: {source}")]
    ComposeParse {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("template {name} rendered a {kind} instead of a compose mapping")]
    InvalidComposeDocument { name: String, kind: &'static str },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Core(#[from] reward_core::CoreError),
}

impl TemplateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
