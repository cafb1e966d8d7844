//! # reward_core
//!
//! Shared building blocks for reward: the layered [`Settings`] context that
//! templates render against, the [`AppPaths`] that locate override
//! directories and generated files, and small filesystem helpers.

pub mod error;
pub mod fs;
pub mod paths;
pub mod settings;

pub use error::{CoreError, CoreResult};
pub use paths::{default_app_home, default_config_file, AppPaths, HostOs, DEFAULT_APP_NAME};
pub use settings::{Settings, SettingsBuilder};
