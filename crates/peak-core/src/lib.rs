//! Shared configuration and input models for the `peak` checkout runner.
//!
//! Everything here is loaded once before dispatch and treated as read-only
//! afterwards: the environment-driven [`AppConfig`], the site lookup table
//! ([`SitesFile`]) and the task rows ([`Task`]).

pub mod app_config;
pub mod config;
pub mod error;
pub mod sites;
pub mod tasks;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use sites::{load_sites, SiteConfig, SitesFile};
pub use tasks::{load_tasks, parse_tasks, Task, TaskFile, RANDOM_SIZE};
