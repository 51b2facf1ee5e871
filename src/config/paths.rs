use super::error::{ConfigError, Result};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "OSCCONFIG";
const CONFIG_DIR_NAME: &str = ".osc";
const CONFIG_FILE_NAME: &str = "config.yml";

/// Filesystem locations used by osc, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    pub log_file: PathBuf,
    pub dump_dir: PathBuf,
    pub bench_dir: PathBuf,
}

impl Paths {
    pub fn discover() -> Self {
        let config_dir = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .filter(|dir| !dir.as_os_str().is_empty())
            .or_else(|| dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME)))
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR_NAME));
        Self::new(config_dir, std::env::temp_dir(), &current_user())
    }

    pub fn new(config_dir: PathBuf, tmp_dir: PathBuf, user: &str) -> Self {
        Self {
            config_file: config_dir.join(CONFIG_FILE_NAME),
            log_file: tmp_dir.join(format!("osc-{user}.log")),
            dump_dir: tmp_dir.join(format!("osc-screens-{user}")),
            bench_dir: tmp_dir.join(format!("osc-bench-{user}")),
            config_dir,
        }
    }

    pub fn cluster_dump_dir(&self, cluster: &str) -> PathBuf {
        self.dump_dir.join(sanitize(cluster))
    }

    pub fn cluster_bench_dir(&self, cluster: &str) -> PathBuf {
        self.bench_dir.join(sanitize(cluster))
    }
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
        operation: "creating directory",
        path: dir.to_path_buf(),
        source,
    })
}

fn current_user() -> String {
    ["USER", "USERNAME", "LOGNAME"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "osc".to_string())
}

/// Cluster names may carry URL or ARN characters that are not valid in a path segment.
fn sanitize(name: &str) -> String {
    let cleaned = name
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' => '-',
            other => other,
        })
        .collect::<String>();
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}
