//! Sync command - File sync configuration of a project environment.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use reward_templates::ConfigGenerator;

use super::context::CommandContext;
use super::GlobalArgs;

#[derive(Args)]
pub struct SyncArgs {
    #[command(subcommand)]
    command: SyncCommand,
}

#[derive(Subcommand)]
enum SyncCommand {
    /// Write the sync configuration unless the file already exists
    Config(ConfigArgs),
}

#[derive(Args)]
struct ConfigArgs {
    /// Environment type (e.g. magento2, wordpress)
    #[arg(short, long)]
    env_type: String,

    /// Target file [default: ./.<app-name>/mutagen.yml]
    #[arg(long)]
    path: Option<PathBuf>,
}

pub fn execute(args: SyncArgs, global: &GlobalArgs) -> Result<()> {
    match args.command {
        SyncCommand::Config(args) => config(args, global),
    }
}

fn config(args: ConfigArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = CommandContext::load(global)?;
    let path = args
        .path
        .unwrap_or_else(|| ctx.paths.project_dir().join("mutagen.yml"));

    let written = ConfigGenerator::new(&ctx.paths, ctx.renderer())
        .with_os(ctx.host_os.clone())
        .generate_mutagen_config(&path, &args.env_type, &ctx.settings)
        .context("Failed to generate mutagen configuration")?;

    if written {
        println!("Wrote {}", path.display());
    } else {
        println!("Kept existing {}", path.display());
    }
    Ok(())
}
