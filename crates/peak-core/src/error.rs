use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sites file {path}: {source}")]
    SitesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sites file: {0}")]
    SitesFileParse(#[source] serde_yaml::Error),

    #[error("failed to read tasks file {path}: {source}")]
    TasksFileRead {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// A task row failed validation. `row` is 1-based, matching how the
    /// rest of the tool numbers tasks in logs.
    #[error("task {row}: {field} {reason}")]
    InvalidTask {
        row: usize,
        field: String,
        reason: String,
    },

    #[error("config validation error: {0}")]
    Validation(String),
}
