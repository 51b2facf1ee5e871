use super::error::{ConfigError, Result};
use kube::config::Kubeconfig;

/// Answers what currently exists on the Kubernetes side.
pub trait KubeSettings {
    fn current_context_name(&self) -> Result<String>;
    fn current_cluster_name(&self) -> Result<String>;
    fn current_namespace_name(&self) -> Result<String>;
    fn cluster_names(&self) -> Result<Vec<String>>;
    fn namespace_names(&self) -> Result<Vec<String>>;
}

/// Snapshot of the kubeconfig plus the namespaces the API server reported.
///
/// Namespaces are `None` when the server could not be reached; every query
/// depending on them then fails and reconciliation skips the step.
#[derive(Debug, Clone, Default)]
pub struct ClusterState {
    context: Option<String>,
    cluster: Option<String>,
    namespace: Option<String>,
    clusters: Vec<String>,
    namespaces: Option<Vec<String>>,
}

impl ClusterState {
    /// `context` selects the kubeconfig context; `None` uses the kubeconfig's current one.
    pub fn from_kubeconfig(kubeconfig: &Kubeconfig, context: Option<&str>) -> Self {
        let context = context
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .or_else(|| kubeconfig.current_context.clone())
            .filter(|name| !name.is_empty());
        let entry = context.as_deref().and_then(|name| {
            kubeconfig
                .contexts
                .iter()
                .find(|named| named.name == name)
                .and_then(|named| named.context.as_ref())
        });

        Self {
            cluster: entry
                .map(|ctx| ctx.cluster.clone())
                .filter(|name| !name.is_empty()),
            namespace: entry.and_then(|ctx| ctx.namespace.clone()),
            clusters: kubeconfig
                .clusters
                .iter()
                .map(|named| named.name.clone())
                .collect(),
            context,
            namespaces: None,
        }
    }

    pub fn with_namespaces(mut self, namespaces: Vec<String>) -> Self {
        self.namespaces = Some(namespaces);
        self
    }
}

impl KubeSettings for ClusterState {
    fn current_context_name(&self) -> Result<String> {
        self.context
            .clone()
            .ok_or_else(|| ConfigError::LiveStateQuery("no current context".to_string()))
    }

    fn current_cluster_name(&self) -> Result<String> {
        self.cluster
            .clone()
            .ok_or_else(|| ConfigError::LiveStateQuery("no current cluster".to_string()))
    }

    fn current_namespace_name(&self) -> Result<String> {
        self.namespace
            .clone()
            .ok_or_else(|| ConfigError::LiveStateQuery("no namespace set on context".to_string()))
    }

    fn cluster_names(&self) -> Result<Vec<String>> {
        Ok(self.clusters.clone())
    }

    fn namespace_names(&self) -> Result<Vec<String>> {
        self.namespaces
            .clone()
            .ok_or_else(|| ConfigError::LiveStateQuery("namespaces unavailable".to_string()))
    }
}


#[cfg(test)]
mod tests {
    use super::{ClusterState, KubeSettings};
    use kube::config::Kubeconfig;

    const KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
current-context: ctx1
clusters:
  - name: c1
    cluster:
      server: https://c1.example.com
  - name: c2
    cluster:
      server: https://c2.example.com
contexts:
  - name: ctx1
    context:
      cluster: c1
      user: u1
      namespace: fred
  - name: ctx2
    context:
      cluster: c2
      user: u1
users:
  - name: u1
    user:
      token: abc
"#;

    #[test]
    fn snapshot_follows_current_context() {
        let kubeconfig = Kubeconfig::from_yaml(KUBECONFIG).unwrap();
        let state = ClusterState::from_kubeconfig(&kubeconfig, None);
        assert_eq!(state.current_context_name().unwrap(), "ctx1");
        assert_eq!(state.current_cluster_name().unwrap(), "c1");
        assert_eq!(state.current_namespace_name().unwrap(), "fred");
        assert_eq!(state.cluster_names().unwrap(), vec!["c1", "c2"]);
        assert!(state.namespace_names().is_err());
    }

    #[test]
    fn snapshot_honors_context_override() {
        let kubeconfig = Kubeconfig::from_yaml(KUBECONFIG).unwrap();
        let state = ClusterState::from_kubeconfig(&kubeconfig, Some("ctx2"))
            .with_namespaces(vec!["default".to_string()]);
        assert_eq!(state.current_cluster_name().unwrap(), "c2");
        assert!(state.current_namespace_name().is_err());
        assert_eq!(state.namespace_names().unwrap(), vec!["default"]);
    }
}
