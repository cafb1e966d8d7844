//! Candidate template selection per environment type and host OS.

use tracing::debug;

use reward_core::HostOs;

use crate::error::TemplateResult;
use crate::resolver::TemplateResolver;
use crate::set::TemplateSet;

/// Root of the environment compose templates.
pub const ENVIRONMENTS_DIR: &str = "templates/docker-compose/environments";

/// Directory of fragments shared by every environment type.
pub const INCLUDES_DIR: &str = "includes";

/// Compose file of the global services stack.
pub const COMMON_SERVICES_TEMPLATE: &str =
    "templates/docker-compose/common-services/docker-compose.yml";

/// Candidate paths for `partial`, generic before specific:
///
/// ```text
/// includes/<partial>.base.yml
/// includes/<partial>.<os>.yml
/// <env_type>/<partial>.base.yml
/// <env_type>/<partial>.<os>.yml
/// ```
pub fn environment_candidates(partial: &str, env_type: &str, os: &HostOs) -> Vec<String> {
    [INCLUDES_DIR, env_type]
        .iter()
        .flat_map(|dir| {
            [
                format!("{}/{}/{}.base.yml", ENVIRONMENTS_DIR, dir, partial),
                format!("{}/{}/{}.{}.yml", ENVIRONMENTS_DIR, dir, partial, os),
            ]
        })
        .collect()
}

/// Candidate paths for the sync-tool configuration of `env_type`:
/// `<env_type>/<env_type>.<partial>.yml`, then the OS-specific variant.
pub fn sync_candidates(partial: &str, env_type: &str, os: &HostOs) -> Vec<String> {
    vec![
        format!("{}/{}/{}.{}.yml", ENVIRONMENTS_DIR, env_type, env_type, partial),
        format!(
            "{}/{}/{}.{}.{}.yml",
            ENVIRONMENTS_DIR, env_type, env_type, partial, os
        ),
    ]
}

/// Drives the resolver to fill a [`TemplateSet`] for an environment.
#[derive(Debug, Clone)]
pub struct EnvironmentSelector<'a> {
    resolver: &'a TemplateResolver,
    host_os: HostOs,
}

impl<'a> EnvironmentSelector<'a> {
    /// Selector for the current host OS.
    pub fn new(resolver: &'a TemplateResolver) -> Self {
        Self::for_os(resolver, HostOs::current())
    }

    pub fn for_os(resolver: &'a TemplateResolver, host_os: HostOs) -> Self {
        Self { resolver, host_os }
    }

    pub fn host_os(&self) -> &HostOs {
        &self.host_os
    }

    /// Append every template for `partial` in `env_type`.
    ///
    /// All candidates are first tried against the local overrides, then
    /// against the embedded bundle. Locally overridden fragments therefore
    /// come before embedded ones, and a candidate found locally is skipped
    /// in the embedded pass.
    pub fn append_environment_templates(
        &self,
        set: &mut TemplateSet,
        partial: &str,
        env_type: &str,
    ) -> TemplateResult<()> {
        let candidates = environment_candidates(partial, env_type, &self.host_os);
        debug!(
            "Appending {} templates for environment type {}",
            partial, env_type
        );

        self.resolver.append_from_paths(set, &candidates)?;
        self.resolver.append_from_paths_static(set, &candidates)
    }

    /// Append the sync-tool templates for `env_type` from the embedded bundle.
    pub fn append_sync_templates(
        &self,
        set: &mut TemplateSet,
        partial: &str,
        env_type: &str,
    ) -> TemplateResult<()> {
        let candidates = sync_candidates(partial, env_type, &self.host_os);
        self.resolver.append_from_paths_static(set, &candidates)
    }

    /// Append the embedded common-services compose template.
    pub fn append_common_services(&self, set: &mut TemplateSet) -> TemplateResult<()> {
        self.resolver
            .append_from_paths_static(set, &[COMMON_SERVICES_TEMPLATE])
    }
}
