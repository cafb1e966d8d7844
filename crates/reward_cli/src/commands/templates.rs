//! Templates command - Inspect the template layers.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::context::CommandContext;
use super::GlobalArgs;

#[derive(Args)]
pub struct TemplatesArgs {
    #[command(subcommand)]
    command: TemplatesCommand,
}

#[derive(Subcommand)]
enum TemplatesCommand {
    /// List every template with the layer it is loaded from
    List(ListArgs),
}

#[derive(Args)]
struct ListArgs {
    /// Only show templates overridden locally
    #[arg(long)]
    overridden: bool,
}

pub fn execute(args: TemplatesArgs, global: &GlobalArgs) -> Result<()> {
    match args.command {
        TemplatesCommand::List(args) => list(args, global),
    }
}

fn list(args: ListArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = CommandContext::load(global)?;

    for (name, layer) in ctx.resolver().list() {
        if args.overridden && layer == reward_templates::Layer::Embedded {
            continue;
        }
        println!("{:<9} {}", layer.as_str(), name);
    }
    Ok(())
}
