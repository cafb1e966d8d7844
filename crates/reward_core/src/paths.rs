//! Application paths and host platform detection.

use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Default application name, used for directory and settings key prefixes.
pub const DEFAULT_APP_NAME: &str = "reward";

/// Host operating system, named the way template file suffixes name it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOs {
    Linux,
    Darwin,
    Windows,
    Other(String),
}

impl HostOs {
    /// Detect the OS this binary is running on.
    pub fn current() -> Self {
        Self::from(std::env::consts::OS)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Windows => "windows",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for HostOs {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "linux" => Self::Linux,
            "darwin" | "macos" => Self::Darwin,
            "windows" => Self::Windows,
            other => Self::Other(other.to_string()),
        }
    }
}

impl FromStr for HostOs {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl std::fmt::Display for HostOs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Directories the engine reads overrides from and writes generated files to.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Application name (e.g. "reward")
    pub app_name: String,
    /// Project directory, usually the process working directory
    pub cwd: PathBuf,
    /// Per-user application home (e.g. ~/.reward)
    pub app_home_dir: PathBuf,
}

impl AppPaths {
    pub fn new(
        app_name: impl Into<String>,
        cwd: impl Into<PathBuf>,
        app_home_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            cwd: cwd.into(),
            app_home_dir: app_home_dir.into(),
        }
    }

    /// Build paths from the process working directory, falling back to
    /// `$HOME/.<app_name>` when no home directory is given.
    pub fn detect(app_name: impl Into<String>, app_home_dir: Option<PathBuf>) -> CoreResult<Self> {
        let app_name = app_name.into();
        let cwd = std::env::current_dir().map_err(|e| CoreError::io(".", e))?;
        let app_home_dir = match app_home_dir {
            Some(dir) => dir,
            None => default_app_home(&app_name)?,
        };

        Ok(Self::new(app_name, cwd, app_home_dir))
    }

    /// Project-local override root: `<cwd>/.<app_name>`.
    pub fn project_dir(&self) -> PathBuf {
        self.cwd.join(format!(".{}", self.app_name))
    }

    pub fn app_home_dir(&self) -> &Path {
        &self.app_home_dir
    }

    /// Settings key under which the application home is published.
    pub fn home_dir_key(&self) -> String {
        format!("{}_home_dir", self.app_name)
    }

    /// Directory the reverse proxy configuration is written to.
    pub fn traefik_dir(&self) -> PathBuf {
        self.app_home_dir.join("etc").join("traefik")
    }

    /// Directory holding issued certificates.
    pub fn certs_dir(&self) -> PathBuf {
        self.app_home_dir.join("ssl").join("certs")
    }
}

/// `$HOME/.<app_name>`
pub fn default_app_home(app_name: &str) -> CoreResult<PathBuf> {
    let home = dirs::home_dir().ok_or(CoreError::NoHomeDir)?;
    Ok(home.join(format!(".{}", app_name)))
}

/// `$HOME/.<app_name>.yml`
pub fn default_config_file(app_name: &str) -> CoreResult<PathBuf> {
    let home = dirs::home_dir().ok_or(CoreError::NoHomeDir)?;
    Ok(home.join(format!(".{}.yml", app_name)))
}
