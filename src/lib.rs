pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::toml_config::TomlConfig;

pub use adapters::{LogNotifier, SiteFactoryClient, SiteFactoryConnector};
pub use app::{BackupOrchestrator, DomainAssignmentExecutor, StagingOrchestrator};
pub use crate::core::{domain_names, planner, user_filter};
pub use utils::error::{MigrateError, Result};
