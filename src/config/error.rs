use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but is not valid YAML for the settings schema.
    #[error("unable to parse osc config {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// No context was selected, or the selected one is not in kubeconfig.
    #[error("{}", invalid_context(.0))]
    InvalidContext(Option<String>),

    #[error("no active cluster. unable to set active namespace")]
    NoActiveCluster,

    /// The live cluster state could not answer; reconciliation steps that
    /// depend on it are skipped.
    #[error("live state query failed: {0}")]
    LiveStateQuery(String),

    #[error("I/O error {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to serialize osc config")]
    Serialize(#[source] serde_yaml::Error),
}

fn invalid_context(name: &Option<String>) -> String {
    match name {
        Some(name) => format!("the specified context {name:?} does not exist in kubeconfig"),
        None => "invalid kubeconfig context detected".to_string(),
    }
}
