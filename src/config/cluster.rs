use serde::{Deserialize, Serialize};

pub const DEFAULT_NAMESPACE: &str = "default";
pub const ALL_NAMESPACES: &str = "all";
pub const DEFAULT_VIEW: &str = "po";
/// Upper bound on remembered favorite namespaces.
pub const MAX_FAVORITES: usize = 9;

/// Namespace selection state of a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    #[serde(default)]
    pub active: String,
    #[serde(default)]
    pub favorites: Vec<String>,
}

impl Default for Namespace {
    fn default() -> Self {
        Self {
            active: DEFAULT_NAMESPACE.to_string(),
            favorites: vec![DEFAULT_NAMESPACE.to_string()],
        }
    }
}

impl Namespace {
    pub fn set_active(&mut self, namespace: &str) {
        self.active = namespace.to_string();
        self.add_favorite(namespace);
    }

    /// Drops state that no longer matches the live namespace list.
    pub fn validate(&mut self, live: &[String]) {
        if !is_all_namespaces(&self.active) && !live.iter().any(|ns| ns == &self.active) {
            tracing::debug!(namespace = %self.active, "active namespace is gone, using default");
            self.set_active(DEFAULT_NAMESPACE);
        }
        self.favorites
            .retain(|fav| is_all_namespaces(fav) || live.iter().any(|ns| ns == fav));
    }

    pub fn remove_favorite(&mut self, namespace: &str) {
        self.favorites.retain(|fav| fav != namespace);
    }

    fn add_favorite(&mut self, namespace: &str) {
        if namespace.is_empty() {
            return;
        }
        self.remove_favorite(namespace);
        self.favorites.insert(0, namespace.to_string());
        self.favorites.truncate(MAX_FAVORITES);
    }
}

pub fn is_all_namespaces(namespace: &str) -> bool {
    namespace.is_empty() || namespace == ALL_NAMESPACES
}

/// Last command run against a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    #[serde(default)]
    pub active: String,
}

impl Default for View {
    fn default() -> Self {
        Self {
            active: DEFAULT_VIEW.to_string(),
        }
    }
}

impl View {
    pub fn validate(&mut self) {
        if self.active.trim().is_empty() {
            self.active = DEFAULT_VIEW.to_string();
        }
    }
}

/// Per-cluster persisted state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    #[serde(default)]
    pub namespace: Namespace,
    #[serde(default)]
    pub view: View,
}

impl Cluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Structural checks only; the namespace list is consulted separately.
    pub fn validate(&mut self) {
        if self.namespace.active.is_empty() {
            self.namespace.active = DEFAULT_NAMESPACE.to_string();
        }
        if self.namespace.favorites.len() > MAX_FAVORITES {
            self.namespace.favorites.truncate(MAX_FAVORITES);
        }
        self.view.validate();
    }

    pub fn validate_namespaces(&mut self, live: &[String]) {
        self.namespace.validate(live);
    }
}
