//! CLI command definitions.
//!
//! Each subcommand is a thin wrapper over the template engine: it builds the
//! settings context, drives the resolver and prints or writes the result.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use reward_core::DEFAULT_APP_NAME;

pub mod context;
pub mod env;
pub mod svc;
pub mod sync;
pub mod templates;

/// reward - local development environment bootstrapper
#[derive(Parser)]
#[command(name = "reward")]
#[command(version, about = "reward - local development environment bootstrapper")]
#[command(long_about = r#"
reward renders docker-compose and service configuration from layered
templates. Every template can be overridden per project in
./.reward/templates/ or per user in ~/.reward/templates/.

COMMANDS:
  env render      → Assemble the compose configuration of an environment
  svc render      → Assemble the compose configuration of the global services
  svc traefik     → Write the reverse proxy configuration
  sync config     → Write the file sync configuration of an environment
  templates list  → Show every template and the layer it is loaded from

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  4 - Template error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Application name, used for directory names and settings prefixes
    #[arg(long, global = true, env = "REWARD_APP_NAME", default_value = DEFAULT_APP_NAME)]
    pub app_name: String,

    /// Application home directory [default: ~/.<app-name>]
    #[arg(long, global = true, env = "REWARD_HOME_DIR")]
    pub app_home: Option<PathBuf>,

    /// Settings file [default: ~/.<app-name>.yml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override a setting (repeatable)
    #[arg(long = "set", global = true, value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    /// Host OS used to pick OS-specific templates [default: detected]
    #[arg(long, global = true)]
    pub os: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Project environment configuration
    Env(env::EnvArgs),

    /// Global services configuration
    Svc(svc::SvcArgs),

    /// File sync configuration
    Sync(sync::SyncArgs),

    /// Inspect the template layers
    Templates(templates::TemplatesArgs),
}
