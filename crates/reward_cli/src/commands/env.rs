//! Env command - Assemble the compose configuration of a project environment.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tracing::{debug, info};

use reward_templates::{convert_templates_to_compose_config, EnvironmentSelector};

use super::context::CommandContext;
use super::GlobalArgs;

/// Partial shared by every environment.
const NETWORKS_PARTIAL: &str = "networks";

/// Optional service partials and whether each is on when unset.
const OPTIONAL_SERVICES: &[(&str, bool)] = &[
    ("php-fpm", true),
    ("nginx", true),
    ("db", true),
    ("redis", false),
];

#[derive(Args)]
pub struct EnvArgs {
    #[command(subcommand)]
    command: EnvCommand,
}

#[derive(Subcommand)]
enum EnvCommand {
    /// Print the assembled compose configuration as a YAML stream
    Render(RenderArgs),
}

#[derive(Args)]
struct RenderArgs {
    /// Environment type (e.g. magento2, wordpress, local)
    #[arg(short, long)]
    env_type: String,

    /// Additional partial to include (repeatable)
    #[arg(short, long = "partial")]
    partials: Vec<String>,
}

pub fn execute(args: EnvArgs, global: &GlobalArgs) -> Result<()> {
    match args.command {
        EnvCommand::Render(args) => render(args, global),
    }
}

fn render(args: RenderArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = CommandContext::load(global)?;
    info!("Assembling {} environment", args.env_type);

    let partials = environment_partials(&ctx, &args.env_type, &args.partials);
    debug!("Partials: {:?}", partials);

    let renderer = ctx.renderer();
    let resolver = ctx.resolver();
    let selector = EnvironmentSelector::for_os(&resolver, ctx.host_os.clone());

    let mut set = renderer.new_set();
    for partial in &partials {
        selector
            .append_environment_templates(&mut set, partial, &args.env_type)
            .with_context(|| format!("Failed to load templates for partial {}", partial))?;
    }

    let details = convert_templates_to_compose_config(&renderer, &set, &ctx.settings)
        .context("Failed to assemble environment configuration")?;
    if details.is_empty() {
        anyhow::bail!("No templates found for environment type {}", args.env_type);
    }

    print!("{}", details.to_yaml_stream()?);
    Ok(())
}

/// Partials in merge order: networks, the environment type, enabled
/// optional services, then extra partials.
fn environment_partials(ctx: &CommandContext, env_type: &str, extra: &[String]) -> Vec<String> {
    let mut partials = vec![NETWORKS_PARTIAL.to_string(), env_type.to_string()];

    partials.extend(
        OPTIONAL_SERVICES
            .iter()
            .filter(|(name, default)| ctx.service_enabled(name, *default))
            .map(|(name, _)| name.to_string()),
    );
    partials.extend(extra.iter().cloned());
    partials
}
