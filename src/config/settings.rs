use super::cluster::Cluster;
use super::live::KubeSettings;
use super::logger::Logger;
use super::threshold::Threshold;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

pub const DEFAULT_REFRESH_RATE: i32 = 2;
pub const DEFAULT_MAX_CONN_RETRY: i32 = 5;

/// Tri-state manual override coming from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Toggle {
    #[default]
    Unset,
    On,
    Off,
}

impl Toggle {
    fn resolve(self, persisted: bool) -> bool {
        match self {
            Self::Unset => persisted,
            Self::On => true,
            Self::Off => false,
        }
    }
}

/// Runtime-only overrides. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    refresh_rate: Option<i32>,
    headless: Toggle,
    crumbsless: Toggle,
    read_only: Toggle,
    command: Option<String>,
}

/// Root of the persisted configuration, stored under the `osc` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub refresh_rate: i32,
    #[serde(default)]
    pub max_conn_retry: i32,
    #[serde(default)]
    pub enable_mouse: bool,
    #[serde(default)]
    pub headless: bool,
    #[serde(default)]
    pub crumbsless: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub no_icons: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logger: Option<Logger>,
    #[serde(default)]
    pub current_context: String,
    #[serde(default)]
    pub current_cluster: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub clusters: BTreeMap<String, Cluster>,
    #[serde(default)]
    pub thresholds: Threshold,
    #[serde(skip)]
    overrides: Overrides,
}

impl Settings {
    pub fn new() -> Self {
        Self {
            refresh_rate: DEFAULT_REFRESH_RATE,
            max_conn_retry: DEFAULT_MAX_CONN_RETRY,
            logger: Some(Logger::default()),
            thresholds: Threshold::new(),
            ..Self::default()
        }
    }

    pub fn override_refresh_rate(&mut self, rate: i32) {
        self.overrides.refresh_rate = (rate != 0).then_some(rate);
    }

    pub fn override_headless(&mut self, headless: bool) {
        if headless {
            self.overrides.headless = Toggle::On;
        }
    }

    pub fn override_crumbsless(&mut self, crumbsless: bool) {
        if crumbsless {
            self.overrides.crumbsless = Toggle::On;
        }
    }

    pub fn override_read_only(&mut self, read_only: bool) {
        if read_only {
            self.overrides.read_only = Toggle::On;
        }
    }

    pub fn override_write(&mut self, write: bool) {
        if write {
            self.overrides.read_only = Toggle::Off;
        }
    }

    pub fn override_command(&mut self, command: &str) {
        let command = command.trim();
        self.overrides.command = (!command.is_empty()).then(|| command.to_string());
    }

    pub fn refresh_rate(&self) -> i32 {
        self.overrides.refresh_rate.unwrap_or(self.refresh_rate)
    }

    pub fn is_headless(&self) -> bool {
        self.headless || self.overrides.headless == Toggle::On
    }

    pub fn is_crumbsless(&self) -> bool {
        self.crumbsless || self.overrides.crumbsless == Toggle::On
    }

    pub fn is_read_only(&self) -> bool {
        self.overrides.read_only.resolve(self.read_only)
    }

    pub fn command_override(&self) -> Option<&str> {
        self.overrides.command.as_deref()
    }

    pub fn logger(&self) -> Logger {
        self.logger.clone().unwrap_or_default()
    }

    /// Returns the entry of the current cluster, creating it if needed.
    pub fn active_cluster(&mut self) -> &mut Cluster {
        self.clusters
            .entry(self.current_cluster.clone())
            .or_insert_with(Cluster::new)
    }

    /// Read-only lookup of the current cluster entry.
    pub fn current_cluster_entry(&self) -> Option<&Cluster> {
        if self.current_cluster.is_empty() {
            return None;
        }
        self.clusters.get(&self.current_cluster)
    }

    /// Reconciles the settings against the live cluster state.
    pub fn validate(&mut self, live: &dyn KubeSettings) {
        if self.refresh_rate <= 0 {
            self.refresh_rate = DEFAULT_REFRESH_RATE;
        }
        if self.max_conn_retry <= 0 {
            self.max_conn_retry = DEFAULT_MAX_CONN_RETRY;
        }

        match live.cluster_names() {
            Ok(names) => self.prune_clusters(&names),
            Err(error) => debug!("skipping cluster pruning: {error}"),
        }

        self.logger.get_or_insert_with(Logger::default).validate();
        self.thresholds.validate();

        if self.current_context.is_empty()
            && let Ok(context) = live.current_context_name()
        {
            self.current_context = context;
            self.current_cluster.clear();
        }
        if self.current_cluster.is_empty()
            && let Ok(cluster) = live.current_cluster_name()
        {
            self.current_cluster = cluster;
        }

        let namespaces = live.namespace_names();
        let current = self.current_cluster.clone();
        let cluster = self.active_cluster();
        cluster.validate();
        match namespaces {
            Ok(namespaces) => cluster.validate_namespaces(&namespaces),
            Err(error) => debug!(cluster = %current, "skipping namespace validation: {error}"),
        }
        for cluster in self.clusters.values_mut() {
            cluster.validate();
        }
    }

    fn prune_clusters(&mut self, live: &[String]) {
        let stale = self
            .clusters
            .keys()
            .filter(|name| !live.iter().any(|live_name| live_name == *name))
            .cloned()
            .collect::<Vec<_>>();
        for name in stale {
            debug!(cluster = %name, "pruning stale cluster");
            if name == self.current_cluster {
                self.current_cluster.clear();
            }
            self.clusters.remove(&name);
        }
    }
}
