use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub tasks_path: PathBuf,
    pub sites_path: PathBuf,
    /// Discord-compatible webhook that receives one message per checkout.
    /// Notifications are skipped when unset.
    pub webhook_url: Option<String>,
    /// Per-request timeout. `0` leaves requests bounded only by the
    /// transport, so a hung storefront stalls just the task waiting on it.
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// `None` runs every task row at once.
    pub max_concurrent_tasks: Option<usize>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("tasks_path", &self.tasks_path)
            .field("sites_path", &self.sites_path)
            .field(
                "webhook_url",
                &self.webhook_url.as_ref().map(|_| "[redacted]"),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_concurrent_tasks", &self.max_concurrent_tasks)
            .finish()
    }
}
