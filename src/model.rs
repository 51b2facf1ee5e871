use chrono::{DateTime, Local};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Group/version/resource identifier such as `apps/v1/deployments` or `v1/pods`.
///
/// Local pseudo resources (`screendumps`, `benchmarks`, `policy`, `rbac`, `portforwards`)
/// carry only a resource part.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Gvr(String);

impl Gvr {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn parts(&self) -> (&str, &str, &str) {
        let tokens = self.0.split('/').collect::<Vec<_>>();
        match tokens.as_slice() {
            [group, version, resource] => (*group, *version, *resource),
            [version, resource] => ("", *version, *resource),
            _ => ("", "", self.0.as_str()),
        }
    }

    pub fn group(&self) -> &str {
        self.parts().0
    }

    pub fn version(&self) -> &str {
        self.parts().1
    }

    pub fn resource(&self) -> &str {
        self.parts().2
    }
}

impl Display for Gvr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ResourceKind {
    Pods,
    Deployments,
    StatefulSets,
    DaemonSets,
    ReplicaSets,
    Jobs,
    CronJobs,
    Services,
    Ingresses,
    ConfigMaps,
    Secrets,
    PersistentVolumeClaims,
    PersistentVolumes,
    ServiceAccounts,
    Roles,
    RoleBindings,
    ClusterRoles,
    ClusterRoleBindings,
    Nodes,
    Events,
    Namespaces,
    ScreenDumps,
    Benchmarks,
    Policy,
    Rbac,
    PortForwards,
}

impl ResourceKind {
    pub const ALL: [Self; 26] = [
        Self::Pods,
        Self::Deployments,
        Self::StatefulSets,
        Self::DaemonSets,
        Self::ReplicaSets,
        Self::Jobs,
        Self::CronJobs,
        Self::Services,
        Self::Ingresses,
        Self::ConfigMaps,
        Self::Secrets,
        Self::PersistentVolumeClaims,
        Self::PersistentVolumes,
        Self::ServiceAccounts,
        Self::Roles,
        Self::RoleBindings,
        Self::ClusterRoles,
        Self::ClusterRoleBindings,
        Self::Nodes,
        Self::Events,
        Self::Namespaces,
        Self::ScreenDumps,
        Self::Benchmarks,
        Self::Policy,
        Self::Rbac,
        Self::PortForwards,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Pods => "Pods",
            Self::Deployments => "Deployments",
            Self::StatefulSets => "StatefulSets",
            Self::DaemonSets => "DaemonSets",
            Self::ReplicaSets => "ReplicaSets",
            Self::Jobs => "Jobs",
            Self::CronJobs => "CronJobs",
            Self::Services => "Services",
            Self::Ingresses => "Ingresses",
            Self::ConfigMaps => "ConfigMaps",
            Self::Secrets => "Secrets",
            Self::PersistentVolumeClaims => "PVC",
            Self::PersistentVolumes => "PersistentVolumes",
            Self::ServiceAccounts => "ServiceAccounts",
            Self::Roles => "Roles",
            Self::RoleBindings => "RoleBindings",
            Self::ClusterRoles => "ClusterRoles",
            Self::ClusterRoleBindings => "ClusterRoleBindings",
            Self::Nodes => "Nodes",
            Self::Events => "Events",
            Self::Namespaces => "Namespaces",
            Self::ScreenDumps => "ScreenDumps",
            Self::Benchmarks => "Benchmarks",
            Self::Policy => "Policy",
            Self::Rbac => "Rbac",
            Self::PortForwards => "PortForwards",
        }
    }

    pub fn gvr(self) -> Gvr {
        Gvr::new(match self {
            Self::Pods => "v1/pods",
            Self::Deployments => "apps/v1/deployments",
            Self::StatefulSets => "apps/v1/statefulsets",
            Self::DaemonSets => "apps/v1/daemonsets",
            Self::ReplicaSets => "apps/v1/replicasets",
            Self::Jobs => "batch/v1/jobs",
            Self::CronJobs => "batch/v1/cronjobs",
            Self::Services => "v1/services",
            Self::Ingresses => "networking.k8s.io/v1/ingresses",
            Self::ConfigMaps => "v1/configmaps",
            Self::Secrets => "v1/secrets",
            Self::PersistentVolumeClaims => "v1/persistentvolumeclaims",
            Self::PersistentVolumes => "v1/persistentvolumes",
            Self::ServiceAccounts => "v1/serviceaccounts",
            Self::Roles => "rbac.authorization.k8s.io/v1/roles",
            Self::RoleBindings => "rbac.authorization.k8s.io/v1/rolebindings",
            Self::ClusterRoles => "rbac.authorization.k8s.io/v1/clusterroles",
            Self::ClusterRoleBindings => "rbac.authorization.k8s.io/v1/clusterrolebindings",
            Self::Nodes => "v1/nodes",
            Self::Events => "v1/events",
            Self::Namespaces => "v1/namespaces",
            Self::ScreenDumps => "screendumps",
            Self::Benchmarks => "benchmarks",
            Self::Policy => "policy",
            Self::Rbac => "rbac",
            Self::PortForwards => "portforwards",
        })
    }

    pub fn from_gvr(gvr: &Gvr) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| &kind.gvr() == gvr)
    }

    /// Kubernetes kind name, used for API discovery and kubectl targets.
    pub fn kind(self) -> &'static str {
        match self {
            Self::Pods => "Pod",
            Self::Deployments => "Deployment",
            Self::StatefulSets => "StatefulSet",
            Self::DaemonSets => "DaemonSet",
            Self::ReplicaSets => "ReplicaSet",
            Self::Jobs => "Job",
            Self::CronJobs => "CronJob",
            Self::Services => "Service",
            Self::Ingresses => "Ingress",
            Self::ConfigMaps => "ConfigMap",
            Self::Secrets => "Secret",
            Self::PersistentVolumeClaims => "PersistentVolumeClaim",
            Self::PersistentVolumes => "PersistentVolume",
            Self::ServiceAccounts => "ServiceAccount",
            Self::Roles => "Role",
            Self::RoleBindings => "RoleBinding",
            Self::ClusterRoles => "ClusterRole",
            Self::ClusterRoleBindings => "ClusterRoleBinding",
            Self::Nodes => "Node",
            Self::Events => "Event",
            Self::Namespaces => "Namespace",
            Self::ScreenDumps => "ScreenDump",
            Self::Benchmarks => "Benchmark",
            Self::Policy => "Policy",
            Self::Rbac => "Rbac",
            Self::PortForwards => "PortForward",
        }
    }

    pub fn namespaced(self) -> bool {
        !matches!(
            self,
            Self::PersistentVolumes
                | Self::ClusterRoles
                | Self::ClusterRoleBindings
                | Self::Nodes
                | Self::Namespaces
                | Self::ScreenDumps
                | Self::Benchmarks
                | Self::Policy
                | Self::Rbac
                | Self::PortForwards
        )
    }

    /// Backed by local files rather than the API server.
    pub fn is_local(self) -> bool {
        matches!(self, Self::ScreenDumps | Self::Benchmarks)
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "po" | "pod" | "pods" => Some(Self::Pods),
            "dp" | "deploy" | "deployment" | "deployments" => Some(Self::Deployments),
            "sts" | "statefulset" | "statefulsets" => Some(Self::StatefulSets),
            "ds" | "daemonset" | "daemonsets" => Some(Self::DaemonSets),
            "rs" | "replicaset" | "replicasets" => Some(Self::ReplicaSets),
            "job" | "jobs" => Some(Self::Jobs),
            "cj" | "cronjob" | "cronjobs" => Some(Self::CronJobs),
            "svc" | "service" | "services" => Some(Self::Services),
            "ing" | "ingress" | "ingresses" => Some(Self::Ingresses),
            "cm" | "configmap" | "configmaps" => Some(Self::ConfigMaps),
            "sec" | "secret" | "secrets" => Some(Self::Secrets),
            "pvc" | "persistentvolumeclaim" | "persistentvolumeclaims" => {
                Some(Self::PersistentVolumeClaims)
            }
            "pv" | "persistentvolume" | "persistentvolumes" => Some(Self::PersistentVolumes),
            "sa" | "serviceaccount" | "serviceaccounts" => Some(Self::ServiceAccounts),
            "ro" | "role" | "roles" => Some(Self::Roles),
            "rb" | "rolebinding" | "rolebindings" => Some(Self::RoleBindings),
            "cr" | "clusterrole" | "clusterroles" => Some(Self::ClusterRoles),
            "crb" | "clusterrolebinding" | "clusterrolebindings" => {
                Some(Self::ClusterRoleBindings)
            }
            "no" | "node" | "nodes" => Some(Self::Nodes),
            "ev" | "event" | "events" => Some(Self::Events),
            "ns" | "namespace" | "namespaces" => Some(Self::Namespaces),
            "sd" | "screendump" | "screendumps" => Some(Self::ScreenDumps),
            "be" | "bench" | "benchmark" | "benchmarks" => Some(Self::Benchmarks),
            "pf" | "portforward" | "portforwards" => Some(Self::PortForwards),
            _ => None,
        }
    }

    pub fn short_token(self) -> &'static str {
        match self {
            Self::Pods => "po",
            Self::Deployments => "dp",
            Self::StatefulSets => "sts",
            Self::DaemonSets => "ds",
            Self::ReplicaSets => "rs",
            Self::Jobs => "job",
            Self::CronJobs => "cj",
            Self::Services => "svc",
            Self::Ingresses => "ing",
            Self::ConfigMaps => "cm",
            Self::Secrets => "sec",
            Self::PersistentVolumeClaims => "pvc",
            Self::PersistentVolumes => "pv",
            Self::ServiceAccounts => "sa",
            Self::Roles => "ro",
            Self::RoleBindings => "rb",
            Self::ClusterRoles => "cr",
            Self::ClusterRoleBindings => "crb",
            Self::Nodes => "no",
            Self::Events => "ev",
            Self::Namespaces => "ns",
            Self::ScreenDumps => "sd",
            Self::Benchmarks => "be",
            Self::Policy => "pol",
            Self::Rbac => "rbac",
            Self::PortForwards => "pf",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowData {
    pub name: String,
    pub namespace: Option<String>,
    pub columns: Vec<String>,
    /// Age in seconds, used to sort the AGE column.
    pub age_seconds: Option<i64>,
    /// Label selector of the pods this row controls.
    pub selector: Option<String>,
}

impl RowData {
    /// `namespace/name` for namespaced rows, `name` otherwise.
    pub fn path(&self) -> String {
        match &self.namespace {
            Some(namespace) if !namespace.is_empty() => format!("{namespace}/{}", self.name),
            _ => self.name.clone(),
        }
    }

    pub fn matches_filter(&self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return true;
        }

        let query_lower = query.to_ascii_lowercase();

        if self.name.to_ascii_lowercase().contains(&query_lower) {
            return true;
        }

        if let Some(namespace) = &self.namespace
            && namespace.to_ascii_lowercase().contains(&query_lower)
        {
            return true;
        }

        self.columns
            .iter()
            .any(|column| column.to_ascii_lowercase().contains(&query_lower))
    }
}

/// Splits `namespace/name` back into its parts.
pub fn split_path(path: &str) -> (Option<&str>, &str) {
    match path.split_once('/') {
        Some((namespace, name)) => (Some(namespace), name),
        None => (None, path),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub ascending: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<RowData>,
    pub selected: usize,
    pub last_refreshed: Option<DateTime<Local>>,
    pub error: Option<String>,
    pub filter: String,
    pub sort: Option<SortSpec>,
    pub marked: BTreeSet<String>,
}

impl TableData {
    pub fn set_rows(
        &mut self,
        headers: Vec<String>,
        rows: Vec<RowData>,
        refreshed_at: DateTime<Local>,
    ) {
        let selected_path = self.selected_path();
        self.headers = headers;
        self.rows = rows;
        self.last_refreshed = Some(refreshed_at);
        self.error = None;
        self.apply_sort();
        self.marked
            .retain(|path| self.rows.iter().any(|row| &row.path() == path));

        let visible = self.visible_rows();
        self.selected = selected_path
            .and_then(|path| visible.iter().position(|row| row.path() == path))
            .unwrap_or_else(|| self.selected.min(visible.len().saturating_sub(1)));
    }

    pub fn set_error(&mut self, error: impl Into<String>, refreshed_at: DateTime<Local>) {
        self.rows.clear();
        self.error = Some(error.into());
        self.last_refreshed = Some(refreshed_at);
        self.selected = 0;
    }

    pub fn visible_rows(&self) -> Vec<&RowData> {
        self.rows
            .iter()
            .filter(|row| row.matches_filter(&self.filter))
            .collect()
    }

    pub fn selected_row(&self) -> Option<&RowData> {
        self.visible_rows().get(self.selected).copied()
    }

    pub fn selected_path(&self) -> Option<String> {
        self.selected_row().map(RowData::path)
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
        self.selected = 0;
    }

    pub fn move_selection(&mut self, motion: Motion) {
        let last = self.visible_rows().len().saturating_sub(1);
        self.selected = match motion {
            Motion::Up => self.selected.saturating_sub(1),
            Motion::Down => (self.selected + 1).min(last),
            Motion::PageUp => self.selected.saturating_sub(PAGE_SIZE),
            Motion::PageDown => (self.selected + PAGE_SIZE).min(last),
            Motion::Top => 0,
            Motion::Bottom => last,
        };
    }

    /// Sorts on `column`. Sorting twice on the same column flips the direction.
    pub fn sort_by(&mut self, column: &str, ascending: bool) {
        let ascending = match &self.sort {
            Some(current) if current.column == column => !current.ascending,
            _ => ascending,
        };
        self.sort = Some(SortSpec {
            column: column.to_string(),
            ascending,
        });
        self.apply_sort();
    }

    pub fn toggle_mark(&mut self) {
        let Some(path) = self.selected_path() else {
            return;
        };
        if !self.marked.remove(&path) {
            self.marked.insert(path);
        }
    }

    pub fn clear_marks(&mut self) {
        self.marked.clear();
    }

    fn apply_sort(&mut self) {
        let Some(spec) = self.sort.clone() else {
            return;
        };
        let index = self
            .headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(&spec.column));
        self.rows.sort_by(|left, right| {
            let ordering = match (spec.column.as_str(), index) {
                ("AGE", _) => left.age_seconds.cmp(&right.age_seconds),
                ("NAME", None) => left.name.cmp(&right.name),
                (_, Some(index)) => compare_cells(
                    left.columns.get(index).map(String::as_str).unwrap_or(""),
                    right.columns.get(index).map(String::as_str).unwrap_or(""),
                ),
                (_, None) => Ordering::Equal,
            };
            let ordering = ordering.then_with(|| left.path().cmp(&right.path()));
            if spec.ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
    }
}

/// Numeric-aware cell comparison. `1/3` style ready counts compare on the first number.
fn compare_cells(left: &str, right: &str) -> Ordering {
    let leading = |value: &str| {
        value
            .split('/')
            .next()
            .and_then(|head| head.trim().parse::<f64>().ok())
    };
    match (leading(left), leading(right)) {
        (Some(left), Some(right)) => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
        _ => left.cmp(right),
    }
}

#[cfg(test)]
mod tests {
    use super::{Gvr, Motion, ResourceKind, RowData, TableData, split_path};
    use chrono::Local;

    fn row(namespace: &str, name: &str, columns: &[&str], age: i64) -> RowData {
        RowData {
            name: name.to_string(),
            namespace: Some(namespace.to_string()),
            columns: columns.iter().map(|value| value.to_string()).collect(),
            age_seconds: Some(age),
            selector: None,
        }
    }

    fn headers(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn resource_aliases_map_to_expected_kinds() {
        assert_eq!(ResourceKind::from_token("dp"), Some(ResourceKind::Deployments));
        assert_eq!(ResourceKind::from_token("STS"), Some(ResourceKind::StatefulSets));
        assert_eq!(ResourceKind::from_token("sd"), Some(ResourceKind::ScreenDumps));
        assert_eq!(ResourceKind::from_token("be"), Some(ResourceKind::Benchmarks));
        assert_eq!(ResourceKind::from_token("pf"), Some(ResourceKind::PortForwards));
        assert_eq!(ResourceKind::from_token("rbac"), None);
        assert_eq!(
            ResourceKind::from_token("clusterrolebindings"),
            Some(ResourceKind::ClusterRoleBindings)
        );
        assert_eq!(ResourceKind::from_token("blee"), None);
    }

    #[test]
    fn every_kind_round_trips_through_its_gvr() {
        for kind in ResourceKind::ALL {
            assert_eq!(ResourceKind::from_gvr(&kind.gvr()), Some(kind));
        }
    }

    #[test]
    fn gvr_parts() {
        let gvr = Gvr::new("apps/v1/deployments");
        assert_eq!(gvr.group(), "apps");
        assert_eq!(gvr.version(), "v1");
        assert_eq!(gvr.resource(), "deployments");

        let core = Gvr::new("v1/pods");
        assert_eq!(core.group(), "");

        let local = Gvr::new("screendumps");
        assert_eq!(local.resource(), "screendumps");
        assert_eq!(local.version(), "");
    }

    #[test]
    fn row_paths() {
        let namespaced = row("kube-system", "coredns", &[], 0);
        assert_eq!(namespaced.path(), "kube-system/coredns");
        assert_eq!(split_path("kube-system/coredns"), (Some("kube-system"), "coredns"));
        assert_eq!(split_path("node-1"), (None, "node-1"));
    }

    #[test]
    fn sorting_twice_flips_direction() {
        let mut table = TableData::default();
        table.set_rows(
            headers(&["NAME", "READY", "AGE"]),
            vec![
                row("ns", "b", &["b", "10/10", "1m"], 60),
                row("ns", "a", &["a", "2/3", "2h"], 7_200),
                row("ns", "c", &["c", "9/9", "5s"], 5),
            ],
            Local::now(),
        );

        table.sort_by("READY", true);
        let names = table.rows.iter().map(|row| row.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["a", "c", "b"]);

        table.sort_by("READY", true);
        let names = table.rows.iter().map(|row| row.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["b", "c", "a"]);

        table.sort_by("AGE", true);
        let names = table.rows.iter().map(|row| row.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[test]
    fn selection_follows_row_across_refresh() {
        let mut table = TableData::default();
        let rows = vec![row("ns", "a", &["a"], 1), row("ns", "b", &["b"], 2)];
        table.set_rows(headers(&["NAME"]), rows, Local::now());
        table.move_selection(Motion::Down);
        assert_eq!(table.selected_path().as_deref(), Some("ns/b"));

        let rows = vec![
            row("ns", "0", &["0"], 1),
            row("ns", "a", &["a"], 1),
            row("ns", "b", &["b"], 2),
        ];
        table.set_rows(headers(&["NAME"]), rows, Local::now());
        assert_eq!(table.selected_path().as_deref(), Some("ns/b"));
    }

    #[test]
    fn filter_and_marks() {
        let mut table = TableData::default();
        let rows = vec![row("ns", "api", &["api"], 1), row("ns", "web", &["web"], 2)];
        table.set_rows(headers(&["NAME"]), rows, Local::now());
        table.set_filter("we");
        assert_eq!(table.visible_rows().len(), 1);
        table.toggle_mark();
        assert!(table.marked.contains("ns/web"));
        table.toggle_mark();
        assert!(table.marked.is_empty());
        table.toggle_mark();
        table.clear_marks();
        assert!(table.marked.is_empty());
    }
}
