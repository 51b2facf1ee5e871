mod cluster;
mod error;
mod live;
mod logger;
mod paths;
mod settings;
mod threshold;

pub use cluster::{ALL_NAMESPACES, DEFAULT_NAMESPACE, is_all_namespaces};
pub use error::{ConfigError, Result};
pub use live::{ClusterState, KubeSettings};
pub use logger::Logger;
pub use paths::{Paths, ensure_dir};
pub use settings::Settings;

use cluster::DEFAULT_VIEW;
use kube::config::Kubeconfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

/// Kubernetes selection flags given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Flags {
    pub context: Option<String>,
    pub cluster: Option<String>,
    pub namespace: Option<String>,
}

fn flag(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    osc: Option<Settings>,
}

#[derive(Serialize)]
struct ConfigFileRef<'a> {
    osc: &'a Settings,
}

/// The settings store: persisted settings plus the operations reconciling
/// them with kubeconfig and the live cluster.
#[derive(Debug, Clone)]
pub struct Config {
    settings: Settings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settings: Settings::new(),
        }
    }
}

impl Config {
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Replaces the settings with the file content. A missing file leaves defaults.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        self.settings = Settings::new();
        if !path.exists() {
            debug!(path = %path.display(), "no osc config found, using defaults");
            return Ok(());
        }

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            operation: "reading",
            path: path.to_path_buf(),
            source,
        })?;
        let parsed: ConfigFile = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(mut settings) = parsed.osc {
            if settings.logger.is_none() {
                settings.logger = Some(Default::default());
            }
            self.settings = settings;
        }
        info!(path = %path.display(), "loaded osc config");
        Ok(())
    }

    /// Resolves context, cluster and namespace from kubeconfig and the flags.
    pub fn refine(&mut self, flags: &Flags, kubeconfig: &Kubeconfig) -> Result<()> {
        let context = flag(&flags.context)
            .map(str::to_string)
            .or_else(|| kubeconfig.current_context.clone())
            .unwrap_or_default();
        if context.is_empty() {
            return Err(ConfigError::InvalidContext(None));
        }
        if !kubeconfig
            .contexts
            .iter()
            .any(|named| named.name == context)
        {
            return Err(ConfigError::InvalidContext(Some(context)));
        }

        let state = ClusterState::from_kubeconfig(kubeconfig, Some(&context));
        self.settings.current_context = context;
        self.settings.current_cluster = state.current_cluster_name().unwrap_or_default();
        if let Ok(namespace) = state.current_namespace_name()
            && !namespace.is_empty()
        {
            self.set_active_namespace(&namespace)?;
        }

        if let Some(cluster) = flag(&flags.cluster) {
            self.settings.current_cluster = cluster.to_string();
        }
        if let Some(namespace) = flag(&flags.namespace) {
            self.set_active_namespace(namespace)?;
        }
        Ok(())
    }

    pub fn validate(&mut self, live: &dyn KubeSettings) {
        self.settings.validate(live);
    }

    /// Validates, then writes the settings to `path`.
    pub fn save(&mut self, live: &dyn KubeSettings, path: &Path) -> Result<()> {
        self.validate(live);
        self.save_file(path)
    }

    pub fn save_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            ensure_dir(parent)?;
        }
        let raw = serde_yaml::to_string(&ConfigFileRef {
            osc: &self.settings,
        })
        .map_err(ConfigError::Serialize)?;
        fs::write(path, raw).map_err(|source| ConfigError::Io {
            operation: "writing",
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "saved osc config");
        Ok(())
    }

    pub fn reset(&mut self) {
        self.settings.current_context.clear();
        self.settings.current_cluster.clear();
    }

    pub fn current_context(&self) -> &str {
        &self.settings.current_context
    }

    pub fn current_cluster(&self) -> &str {
        &self.settings.current_cluster
    }

    pub fn is_read_only(&self) -> bool {
        self.settings.is_read_only()
    }

    pub fn active_namespace(&self) -> String {
        self.settings
            .current_cluster_entry()
            .map(|cluster| cluster.namespace.active.clone())
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string())
    }

    pub fn set_active_namespace(&mut self, namespace: &str) -> Result<()> {
        if self.settings.current_cluster.is_empty() {
            let err = ConfigError::NoActiveCluster;
            error!("{err}");
            return Err(err);
        }
        self.settings
            .active_cluster()
            .namespace
            .set_active(namespace);
        Ok(())
    }

    pub fn fav_namespaces(&self) -> Vec<String> {
        self.settings
            .current_cluster_entry()
            .map(|cluster| cluster.namespace.favorites.clone())
            .unwrap_or_default()
    }

    /// The command shown at startup: the manual override, else the cluster's last one.
    pub fn active_view(&self) -> String {
        if let Some(command) = self.settings.command_override() {
            return command.to_string();
        }
        self.settings
            .current_cluster_entry()
            .map(|cluster| cluster.view.active.clone())
            .filter(|active| !active.is_empty())
            .unwrap_or_else(|| DEFAULT_VIEW.to_string())
    }

    pub fn set_active_view(&mut self, command: &str) {
        if self.settings.current_cluster.is_empty() {
            return;
        }
        let command = command.trim();
        if !command.is_empty() {
            self.settings.active_cluster().view.active = command.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, ConfigError, Flags, Settings};
    use crate::config::live::testing::FakeLive;
    use kube::config::Kubeconfig;
    use std::fs;

    const OSC_CONFIG: &str = r#"
osc:
  refreshRate: 2
  logger:
    tail: 200
    buffer: 2000
  currentContext: minikube
  currentCluster: minikube
  clusters:
    minikube:
      namespace:
        active: kube-system
        favorites:
        - default
        - kube-public
        - istio-system
        - all
        - kube-system
      view:
        active: ctx
    fred:
      namespace:
        active: default
        favorites:
        - default
        - kube-public
        - kube-system
      view:
        active: po
"#;

    const KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
current-context: minikube
clusters:
  - name: minikube
    cluster:
      server: https://minikube:8443
  - name: fred
    cluster:
      server: https://fred:8443
contexts:
  - name: minikube
    context:
      cluster: minikube
      user: admin
  - name: fred
    context:
      cluster: fred
      user: admin
      namespace: kube-public
  - name: bare
    context:
      cluster: ""
      user: admin
      namespace: blee
users:
  - name: admin
    user:
      token: abc
"#;

    fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    fn kubeconfig() -> Kubeconfig {
        Kubeconfig::from_yaml(KUBECONFIG).unwrap()
    }

    #[test]
    fn load_reads_cluster_state() {
        let (_dir, path) = write_config(OSC_CONFIG);
        let mut config = Config::default();
        config.load(&path).unwrap();

        assert_eq!(config.settings().refresh_rate, 2);
        assert_eq!(config.settings().logger().tail_count, 200);
        assert_eq!(config.current_cluster(), "minikube");
        assert_eq!(config.active_namespace(), "kube-system");
        assert_eq!(config.fav_namespaces().len(), 5);
        assert_eq!(config.active_view(), "ctx");
    }

    #[test]
    fn load_missing_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.load(&dir.path().join("nope.yml")).unwrap();
        assert_eq!(config.settings(), &Settings::new());
    }

    #[test]
    fn load_malformed_file_keeps_defaults() {
        let (_dir, path) = write_config("osc:\n  refreshRate: [oops\n");
        let mut config = Config::default();
        config.settings_mut().refresh_rate = 42;

        let err = config.load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(config.settings(), &Settings::new());
    }

    #[test]
    fn load_without_logger_gets_default_logger() {
        let (_dir, path) = write_config("osc:\n  refreshRate: 5\n");
        let mut config = Config::default();
        config.load(&path).unwrap();
        assert_eq!(config.settings().refresh_rate, 5);
        assert!(config.settings().logger.is_some());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yml");
        let mut config = Config::default();
        config.settings_mut().current_context = "ctx1".to_string();
        config.settings_mut().current_cluster = "c1".to_string();
        config.set_active_namespace("kube-system").unwrap();
        config.set_active_view("dp");
        config.save_file(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("osc:"));

        let mut reloaded = Config::default();
        reloaded.load(&path).unwrap();
        assert_eq!(reloaded.settings(), config.settings());
    }

    #[test]
    fn save_validates_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        let mut config = Config::default();
        config.settings_mut().refresh_rate = 0;
        config.save(&FakeLive::new("ctx1", "c1"), &path).unwrap();

        let mut reloaded = Config::default();
        reloaded.load(&path).unwrap();
        assert_eq!(reloaded.settings().refresh_rate, 2);
        assert_eq!(reloaded.current_context(), "ctx1");
        assert_eq!(reloaded.current_cluster(), "c1");
    }

    #[test]
    fn refine_uses_kubeconfig_current_context() {
        let mut config = Config::default();
        config.refine(&Flags::default(), &kubeconfig()).unwrap();
        assert_eq!(config.current_context(), "minikube");
        assert_eq!(config.current_cluster(), "minikube");
        assert_eq!(config.active_namespace(), "default");
    }

    #[test]
    fn refine_applies_context_namespace() {
        let flags = Flags {
            context: Some("fred".to_string()),
            ..Flags::default()
        };
        let mut config = Config::default();
        config.refine(&flags, &kubeconfig()).unwrap();
        assert_eq!(config.current_cluster(), "fred");
        assert_eq!(config.active_namespace(), "kube-public");
    }

    #[test]
    fn refine_flags_win_over_kubeconfig() {
        let flags = Flags {
            context: Some("fred".to_string()),
            cluster: Some("blee".to_string()),
            namespace: Some("zorg".to_string()),
        };
        let mut config = Config::default();
        config.refine(&flags, &kubeconfig()).unwrap();
        assert_eq!(config.current_context(), "fred");
        assert_eq!(config.current_cluster(), "blee");
        assert_eq!(config.active_namespace(), "zorg");
        assert_eq!(config.fav_namespaces(), vec!["zorg", "default"]);
    }

    #[test]
    fn refine_rejects_unknown_context() {
        let flags = Flags {
            context: Some("nope".to_string()),
            ..Flags::default()
        };
        let mut config = Config::default();
        let err = config.refine(&flags, &kubeconfig()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidContext(Some(ref name)) if name == "nope"));
        assert_eq!(
            err.to_string(),
            "the specified context \"nope\" does not exist in kubeconfig"
        );
    }

    #[test]
    fn refine_rejects_empty_context() {
        let mut kubeconfig = kubeconfig();
        kubeconfig.current_context = None;
        let mut config = Config::default();
        let err = config.refine(&Flags::default(), &kubeconfig).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidContext(None)));
    }

    #[test]
    fn set_active_namespace_needs_a_cluster() {
        let flags = Flags {
            context: Some("bare".to_string()),
            ..Flags::default()
        };
        let mut config = Config::default();
        let err = config.refine(&flags, &kubeconfig()).unwrap_err();
        assert!(matches!(err, ConfigError::NoActiveCluster));
        assert_eq!(config.active_namespace(), "default");
    }

    #[test]
    fn validate_adopts_live_context_and_cluster() {
        let mut config = Config::default();
        config.validate(&FakeLive::new("ctx1", "c1"));
        assert_eq!(config.current_context(), "ctx1");
        assert_eq!(config.current_cluster(), "c1");
        assert_eq!(config.settings().clusters.len(), 1);
    }

    #[test]
    fn loaded_config_without_context_adopts_live_selection() {
        let (_dir, path) = write_config(
            r#"
osc:
  refreshRate: 2
  clusters:
    stale:
      namespace:
        active: kube-system
        favorites:
        - kube-system
      view:
        active: dp
"#,
        );
        let mut config = Config::default();
        config.load(&path).unwrap();
        assert_eq!(config.current_context(), "");

        config.validate(&FakeLive::new("ctx1", "c1"));
        assert_eq!(config.current_context(), "ctx1");
        assert_eq!(config.current_cluster(), "c1");
        assert_eq!(config.settings().clusters.len(), 1);
        assert!(config.settings().clusters.contains_key("c1"));
        assert_eq!(config.active_namespace(), "default");
    }

    #[test]
    fn command_override_wins_for_active_view() {
        let (_dir, path) = write_config(OSC_CONFIG);
        let mut config = Config::default();
        config.load(&path).unwrap();
        config.settings_mut().override_command("dp");
        assert_eq!(config.active_view(), "dp");
    }

    #[test]
    fn reset_clears_selection() {
        let (_dir, path) = write_config(OSC_CONFIG);
        let mut config = Config::default();
        config.load(&path).unwrap();
        config.reset();
        assert_eq!(config.current_context(), "");
        assert_eq!(config.current_cluster(), "");
        assert_eq!(config.active_namespace(), "default");
    }
}
