//! # reward_templates
//!
//! Template resolution and compose assembly for reward.
//!
//! Compose files are assembled from small template fragments. Each fragment
//! is looked up in the project directory, the user's application home and
//! the bundle embedded in the binary, in that order. Fragments are collected
//! into an ordered [`TemplateSet`], rendered against the [`Settings`]
//! context, and parsed into compose documents that a compose-format loader
//! merges in order.
//!
//! ## Example
//!
//! ```rust,no_run
//! use reward_core::{AppPaths, Settings};
//! use reward_templates::{
//!     convert_templates_to_compose_config, EnvironmentSelector, TemplateRenderer,
//!     TemplateResolver,
//! };
//!
//! let paths = AppPaths::detect("reward", None).unwrap();
//! let settings = Settings::with_defaults(&paths);
//!
//! let renderer = TemplateRenderer::new();
//! let resolver = TemplateResolver::new(&paths);
//! let selector = EnvironmentSelector::new(&resolver);
//!
//! let mut set = renderer.new_set();
//! selector.append_environment_templates(&mut set, "networks", "magento2").unwrap();
//! selector.append_environment_templates(&mut set, "php-fpm", "magento2").unwrap();
//!
//! let details = convert_templates_to_compose_config(&renderer, &set, &settings).unwrap();
//! println!("{}", details.to_yaml_stream().unwrap());
//! ```
//!
//! [`Settings`]: reward_core::Settings

pub mod assets;
pub mod compose;
pub mod error;
pub mod functions;
pub mod generators;
pub mod renderer;
pub mod resolver;
pub mod selector;
pub mod set;
pub mod traefik;

pub use assets::{logical_path, EmbeddedAssets};
pub use compose::{
    convert_templates_to_compose_config, parse_compose_document, ComposeConfigDetails,
    ComposeConfigFile,
};
pub use error::{TemplateError, TemplateResult};
pub use functions::{
    is_enabled, parse_kv, setting_enabled, FunctionRegistry, FunctionRegistryBuilder,
};
pub use generators::ConfigGenerator;
pub use renderer::TemplateRenderer;
pub use resolver::{Layer, ResolvedTemplate, TemplateResolver};
pub use selector::{environment_candidates, sync_candidates, EnvironmentSelector};
pub use set::TemplateSet;
pub use traefik::{discover_certificates, CertificateRef, DynamicConfig};
