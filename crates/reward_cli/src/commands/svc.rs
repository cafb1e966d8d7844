//! Svc command - Global services stack and reverse proxy configuration.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tracing::info;

use reward_templates::{convert_templates_to_compose_config, ConfigGenerator, EnvironmentSelector};

use super::context::CommandContext;
use super::GlobalArgs;

#[derive(Args)]
pub struct SvcArgs {
    #[command(subcommand)]
    command: SvcCommand,
}

#[derive(Subcommand)]
enum SvcCommand {
    /// Print the compose configuration of the global services
    Render,

    /// Write the reverse proxy static and dynamic configuration
    Traefik(TraefikArgs),
}

#[derive(Args)]
struct TraefikArgs {
    /// Domain of the default certificate [default: <app-name>.test]
    #[arg(long)]
    domain: Option<String>,
}

pub fn execute(args: SvcArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = CommandContext::load(global)?;

    match args.command {
        SvcCommand::Render => render(&ctx),
        SvcCommand::Traefik(args) => traefik(&ctx, args),
    }
}

fn render(ctx: &CommandContext) -> Result<()> {
    let renderer = ctx.renderer();
    let resolver = ctx.resolver();

    let mut set = renderer.new_set();
    EnvironmentSelector::for_os(&resolver, ctx.host_os.clone())
        .append_common_services(&mut set)
        .context("Failed to load common services template")?;

    let details = convert_templates_to_compose_config(&renderer, &set, &ctx.settings)
        .context("Failed to assemble common services configuration")?;

    print!("{}", details.to_yaml_stream()?);
    Ok(())
}

fn traefik(ctx: &CommandContext, args: TraefikArgs) -> Result<()> {
    let domain = args
        .domain
        .or_else(|| {
            ctx.settings
                .get_str(&ctx.app_key("service_domain"))
                .map(String::from)
        })
        .unwrap_or_else(|| format!("{}.test", ctx.paths.app_name));
    info!("Writing traefik configuration for {}", domain);

    let generator = ConfigGenerator::new(&ctx.paths, ctx.renderer()).with_os(ctx.host_os.clone());

    let static_config = generator
        .generate_traefik_config(&ctx.settings)
        .context("Failed to generate traefik configuration")?;
    let dynamic_config = generator
        .generate_traefik_dynamic_config(&domain)
        .context("Failed to generate traefik dynamic configuration")?;

    println!("{}", static_config.display());
    println!("{}", dynamic_config.display());
    Ok(())
}
