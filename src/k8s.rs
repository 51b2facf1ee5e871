use anyhow::{Context, Result};
use chrono::Utc;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{Namespace, Node, Pod, Service, ServiceAccount};
use k8s_openapi::api::rbac::v1::{
    ClusterRole, ClusterRoleBinding, PolicyRule, Role, RoleBinding, Subject,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::api::{DeleteParams, ListParams, LogParams, Patch, PatchParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::core::{ApiResource, DynamicObject, GroupVersionKind, NamespaceResourceScope};
use kube::{Api, Client, Config, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::SystemTime;
use tokio::process::Command as TokioCommand;
use tracing::{debug, info};

const PAGE_SIZE: u32 = 500;

use crate::config::Logger;
use crate::model::{Gvr, ResourceKind, RowData, split_path};
use crate::view::{DetailSource, FetchContext, SERVICE_ACCOUNT, Target};

/// Headers plus rows of one fetch, merged into the viewer's table on the UI loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub headers: Vec<String>,
    pub rows: Vec<RowData>,
}

impl Listing {
    fn new(headers: &[&str], rows: Vec<RowData>) -> Self {
        Self {
            headers: headers.iter().map(|header| header.to_string()).collect(),
            rows,
        }
    }
}

/// Cluster access for one kubeconfig context.
#[derive(Clone)]
pub struct Gateway {
    client: Client,
    context: String,
    logger: Logger,
}

impl Gateway {
    pub async fn from_kube_selection(
        kubeconfig: Kubeconfig,
        context: &str,
        cluster: Option<&str>,
        logger: Logger,
    ) -> Result<Self> {
        let options = KubeConfigOptions {
            context: Some(context.to_string()),
            cluster: cluster
                .filter(|cluster| !cluster.is_empty())
                .map(str::to_string),
            user: None,
        };
        let config = Config::from_custom_kubeconfig(kubeconfig, &options)
            .await
            .context("failed to infer Kubernetes configuration")?;
        let client = Client::try_from(config).context("failed to initialize Kubernetes client")?;
        info!(context, "connected gateway");

        Ok(Self {
            client,
            context: context.to_string(),
            logger,
        })
    }

    pub async fn namespace_names(&self) -> Result<Vec<String>> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let list = list_all(&api, &ListParams::default().limit(PAGE_SIZE))
            .await
            .context("failed to list namespaces")?;
        Ok(list.into_iter().map(|namespace| namespace.name_any()).collect())
    }

    pub async fn fetch(&self, ctx: &FetchContext) -> Result<Listing> {
        debug!(gvr = %ctx.gvr, namespace = ?ctx.namespace, "fetching");
        let namespace = ctx.namespace.as_deref();
        let params = list_params(ctx);
        match ResourceKind::from_gvr(&ctx.gvr) {
            Some(ResourceKind::ScreenDumps | ResourceKind::Benchmarks) => {
                let dir = ctx.dir.as_deref().context("no directory to list")?;
                list_dir(dir)
            }
            Some(ResourceKind::Policy) => {
                let kind = ctx
                    .subject_kind
                    .as_deref()
                    .context("policy subject kind is required")?;
                let name = ctx
                    .subject_name
                    .as_deref()
                    .context("policy subject name is required")?;
                self.fetch_policy(kind, name).await
            }
            Some(ResourceKind::Rbac) => self.fetch_rbac(ctx).await,
            Some(ResourceKind::PortForwards) => {
                anyhow::bail!("port-forwards are listed from the running session")
            }
            Some(ResourceKind::Pods) => self.fetch_pods(namespace, &params).await,
            Some(ResourceKind::Deployments) => self.fetch_deployments(namespace, &params).await,
            Some(ResourceKind::StatefulSets) => self.fetch_statefulsets(namespace, &params).await,
            Some(ResourceKind::DaemonSets) => self.fetch_daemonsets(namespace, &params).await,
            Some(ResourceKind::Services) => self.fetch_services(namespace, &params).await,
            Some(ResourceKind::ServiceAccounts) => {
                self.fetch_service_accounts(namespace, &params).await
            }
            Some(ResourceKind::Nodes) => self.fetch_nodes(&params).await,
            Some(ResourceKind::Namespaces) => self.fetch_namespaces(&params).await,
            _ => self.fetch_dynamic(&ctx.gvr, namespace, &params).await,
        }
    }

    pub async fn fetch_detail(&self, source: &DetailSource) -> Result<String> {
        match source {
            DetailSource::Yaml(target) => self.fetch_yaml(target).await,
            DetailSource::Describe(target) => self.describe(target).await,
            DetailSource::Logs { target, previous } => self.fetch_logs(target, *previous).await,
            DetailSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display())),
        }
    }

    pub async fn scale(&self, target: &Target, replicas: i32) -> Result<()> {
        let patch = serde_json::json!({ "spec": { "replicas": replicas } });
        self.patch(target, &Patch::Merge(&patch)).await
    }

    pub async fn restart(&self, target: &Target) -> Result<()> {
        let patch = serde_json::json!({
            "spec": {
                "template": {
                    "metadata": {
                        "annotations": {
                            "kubectl.kubernetes.io/restartedAt": Utc::now().to_rfc3339()
                        }
                    }
                }
            }
        });
        self.patch(target, &Patch::Merge(&patch)).await
    }

    pub async fn set_image(&self, target: &Target, container: &str, image: &str) -> Result<()> {
        let containers = serde_json::json!([{ "name": container, "image": image }]);
        let patch = if ResourceKind::from_gvr(&target.gvr) == Some(ResourceKind::Pods) {
            serde_json::json!({ "spec": { "containers": containers } })
        } else {
            serde_json::json!({ "spec": { "template": { "spec": { "containers": containers } } } })
        };
        self.patch(target, &Patch::Strategic(&patch)).await
    }

    /// Deletes a cluster object, or the file behind a local row when `dir` is given.
    pub async fn delete(&self, target: &Target, dir: Option<&Path>) -> Result<()> {
        if let Some(dir) = dir {
            let path = dir.join(&target.path);
            return tokio::fs::remove_file(&path)
                .await
                .with_context(|| format!("failed to remove {}", path.display()));
        }
        let (namespace, name) = split_path(&target.path);
        let api = self.dynamic_api(&target.gvr, namespace);
        let _ = api
            .delete(name, &DeleteParams::default())
            .await
            .with_context(|| format!("failed to delete {} {}", target.gvr, target.path))?;
        Ok(())
    }

    pub fn port_forward(
        &self,
        target: &Target,
        local_port: u16,
        remote_port: u16,
    ) -> Result<(u32, tokio::process::Child)> {
        let (namespace, name) = split_path(&target.path);
        let namespace = namespace.context("namespace is required for port-forward")?;
        let kind = match ResourceKind::from_gvr(&target.gvr) {
            Some(ResourceKind::Pods) => "pod",
            Some(ResourceKind::Services) => "service",
            Some(ResourceKind::Deployments) => "deployment",
            Some(ResourceKind::StatefulSets) => "statefulset",
            Some(ResourceKind::DaemonSets) => "daemonset",
            _ => anyhow::bail!("port-forward is not supported for {}", target.gvr),
        };

        let child = TokioCommand::new("kubectl")
            .arg("port-forward")
            .arg("--context")
            .arg(&self.context)
            .arg("-n")
            .arg(namespace)
            .arg(format!("{kind}/{name}"))
            .arg(format!("{local_port}:{remote_port}"))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn port-forward for {namespace}/{name}"))?;

        let pid = child
            .id()
            .context("failed to determine process id for kubectl port-forward")?;
        Ok((pid, child))
    }

    async fn patch(&self, target: &Target, patch: &Patch<&Value>) -> Result<()> {
        let (namespace, name) = split_path(&target.path);
        let api = self.dynamic_api(&target.gvr, namespace);
        let _ = api
            .patch(name, &PatchParams::default(), patch)
            .await
            .with_context(|| format!("failed to patch {} {}", target.gvr, target.path))?;
        Ok(())
    }

    fn typed_api<K>(&self, namespace: Option<&str>) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        match namespace {
            Some(namespace) => Api::namespaced(self.client.clone(), namespace),
            None => Api::all(self.client.clone()),
        }
    }

    fn dynamic_api(&self, gvr: &Gvr, namespace: Option<&str>) -> Api<DynamicObject> {
        let resource = api_resource(gvr);
        match namespace {
            Some(namespace) => Api::namespaced_with(self.client.clone(), namespace, &resource),
            None => Api::all_with(self.client.clone(), &resource),
        }
    }

    async fn fetch_yaml(&self, target: &Target) -> Result<String> {
        let (namespace, name) = split_path(&target.path);
        let mut object = self
            .dynamic_api(&target.gvr, namespace)
            .get(name)
            .await
            .with_context(|| format!("failed to load {} {}", target.gvr, target.path))?;
        object.metadata.managed_fields = None;
        serde_yaml::to_string(&object).context("failed to render YAML")
    }

    async fn describe(&self, target: &Target) -> Result<String> {
        let (namespace, name) = split_path(&target.path);
        let resource = match target.gvr.group() {
            "" => target.gvr.resource().to_string(),
            group => format!("{}.{group}", target.gvr.resource()),
        };
        let mut cmd = TokioCommand::new("kubectl");
        cmd.arg("describe")
            .arg("--context")
            .arg(&self.context)
            .arg(&resource)
            .arg(name);
        if let Some(namespace) = namespace {
            cmd.arg("-n").arg(namespace);
        }
        let output = cmd
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("failed to execute kubectl describe for {}", target.path))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(anyhow::anyhow!(
                "kubectl describe exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ))
        }
    }

    async fn fetch_logs(&self, target: &Target, previous: bool) -> Result<String> {
        let (namespace, pod_name) = self.resolve_log_pod(target).await?;
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), &namespace);
        let params = LogParams {
            previous,
            tail_lines: Some(self.logger.tail_count),
            since_seconds: (self.logger.since_seconds > 0).then_some(self.logger.since_seconds),
            timestamps: true,
            ..LogParams::default()
        };

        let logs = pods
            .logs(&pod_name, &params)
            .await
            .with_context(|| format!("failed to load logs for {namespace}/{pod_name}"))?;
        Ok(keep_last_lines(&logs, self.logger.buffer_size))
    }

    /// Pod behind a log target: the pod itself, or the first pod its selector matches.
    async fn resolve_log_pod(&self, target: &Target) -> Result<(String, String)> {
        let (namespace, name) = split_path(&target.path);
        let namespace = namespace.context("namespace is required for logs")?;
        if ResourceKind::from_gvr(&target.gvr) == Some(ResourceKind::Pods) {
            return Ok((namespace.to_string(), name.to_string()));
        }

        let object = self
            .dynamic_api(&target.gvr, Some(namespace))
            .get(name)
            .await
            .with_context(|| format!("failed to load {} {}", target.gvr, target.path))?;
        let selector = object_selector(&object.data)
            .with_context(|| format!("{} has no pod selector", target.path))?;
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let mut list = pods
            .list(&ListParams::default().labels(&selector))
            .await
            .with_context(|| format!("failed to list pods for {}", target.path))?
            .items;
        list.sort_by_key(|pod| (!pod_is_running(pod), pod.name_any()));
        let pod = list
            .first()
            .with_context(|| format!("no pods match {selector}"))?;
        Ok((namespace.to_string(), pod.name_any()))
    }

    async fn fetch_pods(&self, namespace: Option<&str>, params: &ListParams) -> Result<Listing> {
        let list = list_all(&self.typed_api::<Pod>(namespace), params).await?;
        let rows = list
            .into_iter()
            .map(|pod| {
                let status = pod_status(&pod);
                let node = pod
                    .spec
                    .as_ref()
                    .and_then(|spec| spec.node_name.clone())
                    .unwrap_or_else(|| "-".to_string());
                let (ready, total, restarts) =
                    pod.status.as_ref().map(pod_readiness).unwrap_or((0, 0, 0));
                row(
                    &pod,
                    vec![format!("{ready}/{total}"), status, restarts.to_string(), node],
                    None,
                )
            })
            .collect();

        Ok(Listing::new(
            &["NAMESPACE", "NAME", "READY", "STATUS", "RESTARTS", "NODE", "AGE"],
            rows,
        ))
    }

    async fn fetch_deployments(
        &self,
        namespace: Option<&str>,
        params: &ListParams,
    ) -> Result<Listing> {
        let list = list_all(&self.typed_api::<Deployment>(namespace), params).await?;
        let rows = list
            .into_iter()
            .map(|deployment| {
                let desired = deployment
                    .spec
                    .as_ref()
                    .and_then(|spec| spec.replicas)
                    .unwrap_or(1);
                let status = deployment.status.as_ref();
                let ready = status.and_then(|status| status.ready_replicas).unwrap_or(0);
                let updated = status.and_then(|status| status.updated_replicas).unwrap_or(0);
                let available = status
                    .and_then(|status| status.available_replicas)
                    .unwrap_or(0);
                let selector = deployment
                    .spec
                    .as_ref()
                    .and_then(|spec| spec.selector.match_labels.as_ref())
                    .map(selector_query);
                row(
                    &deployment,
                    vec![
                        format!("{ready}/{desired}"),
                        updated.to_string(),
                        available.to_string(),
                    ],
                    selector,
                )
            })
            .collect();

        Ok(Listing::new(
            &["NAMESPACE", "NAME", "READY", "UP-TO-DATE", "AVAILABLE", "AGE"],
            rows,
        ))
    }

    async fn fetch_statefulsets(
        &self,
        namespace: Option<&str>,
        params: &ListParams,
    ) -> Result<Listing> {
        let list = list_all(&self.typed_api::<StatefulSet>(namespace), params).await?;
        let rows = list
            .into_iter()
            .map(|statefulset| {
                let desired = statefulset
                    .spec
                    .as_ref()
                    .and_then(|spec| spec.replicas)
                    .unwrap_or(1);
                let status = statefulset.status.as_ref();
                let ready = status.and_then(|status| status.ready_replicas).unwrap_or(0);
                let updated = status.and_then(|status| status.updated_replicas).unwrap_or(0);
                let available = status
                    .and_then(|status| status.available_replicas)
                    .unwrap_or(0);
                let selector = statefulset
                    .spec
                    .as_ref()
                    .and_then(|spec| spec.selector.match_labels.as_ref())
                    .map(selector_query);
                row(
                    &statefulset,
                    vec![
                        format!("{ready}/{desired}"),
                        updated.to_string(),
                        available.to_string(),
                    ],
                    selector,
                )
            })
            .collect();

        Ok(Listing::new(
            &["NAMESPACE", "NAME", "READY", "UP-TO-DATE", "AVAILABLE", "AGE"],
            rows,
        ))
    }

    async fn fetch_daemonsets(
        &self,
        namespace: Option<&str>,
        params: &ListParams,
    ) -> Result<Listing> {
        let list = list_all(&self.typed_api::<DaemonSet>(namespace), params).await?;
        let rows = list
            .into_iter()
            .map(|daemonset| {
                let status = daemonset.status.as_ref();
                let desired = status
                    .map(|status| status.desired_number_scheduled)
                    .unwrap_or(0);
                let ready = status.map(|status| status.number_ready).unwrap_or(0);
                let updated = status
                    .and_then(|status| status.updated_number_scheduled)
                    .unwrap_or(0);
                let available = status
                    .and_then(|status| status.number_available)
                    .unwrap_or(0);
                let selector = daemonset
                    .spec
                    .as_ref()
                    .and_then(|spec| spec.selector.match_labels.as_ref())
                    .map(selector_query);
                row(
                    &daemonset,
                    vec![
                        desired.to_string(),
                        format!("{ready}/{desired}"),
                        updated.to_string(),
                        available.to_string(),
                    ],
                    selector,
                )
            })
            .collect();

        Ok(Listing::new(
            &["NAMESPACE", "NAME", "DESIRED", "READY", "UP-TO-DATE", "AVAILABLE", "AGE"],
            rows,
        ))
    }

    async fn fetch_services(
        &self,
        namespace: Option<&str>,
        params: &ListParams,
    ) -> Result<Listing> {
        let list = list_all(&self.typed_api::<Service>(namespace), params).await?;
        let rows = list
            .into_iter()
            .map(|service| {
                let spec = service.spec.as_ref();
                let service_type = spec
                    .and_then(|spec| spec.type_.clone())
                    .unwrap_or_else(|| "ClusterIP".to_string());
                let cluster_ip = spec
                    .and_then(|spec| spec.cluster_ip.clone())
                    .unwrap_or_else(|| "-".to_string());
                let ports = spec
                    .and_then(|spec| spec.ports.clone())
                    .unwrap_or_default()
                    .into_iter()
                    .map(|port| {
                        let protocol = port.protocol.unwrap_or_else(|| "TCP".to_string());
                        format!("{}/{}", port.port, protocol)
                    })
                    .collect::<Vec<_>>()
                    .join(",");
                let selector = spec
                    .and_then(|spec| spec.selector.as_ref())
                    .filter(|selector| !selector.is_empty())
                    .map(selector_query);
                row(
                    &service,
                    vec![
                        service_type,
                        cluster_ip,
                        if ports.is_empty() { "-".to_string() } else { ports },
                    ],
                    selector,
                )
            })
            .collect();

        Ok(Listing::new(
            &["NAMESPACE", "NAME", "TYPE", "CLUSTER-IP", "PORTS", "AGE"],
            rows,
        ))
    }

    async fn fetch_service_accounts(
        &self,
        namespace: Option<&str>,
        params: &ListParams,
    ) -> Result<Listing> {
        let list = list_all(&self.typed_api::<ServiceAccount>(namespace), params).await?;
        let rows = list
            .into_iter()
            .map(|account| {
                let secrets = account.secrets.as_ref().map(Vec::len).unwrap_or(0);
                row(&account, vec![secrets.to_string()], None)
            })
            .collect();

        Ok(Listing::new(&["NAMESPACE", "NAME", "SECRETS", "AGE"], rows))
    }

    async fn fetch_nodes(&self, params: &ListParams) -> Result<Listing> {
        let nodes: Api<Node> = Api::all(self.client.clone());
        let list = list_all(&nodes, params).await?;
        let rows = list
            .into_iter()
            .map(|node| {
                let ready = node
                    .status
                    .as_ref()
                    .and_then(|status| status.conditions.as_ref())
                    .and_then(|conditions| {
                        conditions
                            .iter()
                            .find(|condition| condition.type_ == "Ready")
                    })
                    .map(|condition| match condition.status.as_str() {
                        "True" => "Ready",
                        "False" => "NotReady",
                        _ => "Unknown",
                    })
                    .unwrap_or("Unknown")
                    .to_string();
                let version = node
                    .status
                    .as_ref()
                    .and_then(|status| status.node_info.as_ref())
                    .map(|info| info.kubelet_version.clone())
                    .unwrap_or_else(|| "-".to_string());
                let roles = node_roles(&node);
                row(&node, vec![ready, roles, version], None)
            })
            .collect();

        Ok(Listing::new(&["NAME", "STATUS", "ROLES", "VERSION", "AGE"], rows))
    }

    async fn fetch_namespaces(&self, params: &ListParams) -> Result<Listing> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let list = list_all(&namespaces, params).await?;
        let rows = list
            .into_iter()
            .map(|namespace| {
                let phase = namespace
                    .status
                    .as_ref()
                    .and_then(|status| status.phase.clone())
                    .unwrap_or_else(|| "Active".to_string());
                row(&namespace, vec![phase], None)
            })
            .collect();

        Ok(Listing::new(&["NAME", "STATUS", "AGE"], rows))
    }

    async fn fetch_dynamic(
        &self,
        gvr: &Gvr,
        namespace: Option<&str>,
        params: &ListParams,
    ) -> Result<Listing> {
        let namespaced = ResourceKind::from_gvr(gvr).is_none_or(ResourceKind::namespaced);
        let api = self.dynamic_api(gvr, namespace.filter(|_| namespaced));
        let list = list_all(&api, params)
            .await
            .with_context(|| format!("failed to list {gvr}"))?;
        let rows = list
            .into_iter()
            .map(|object| row(&object, Vec::new(), None))
            .collect::<Vec<_>>();

        if namespaced {
            Ok(Listing::new(&["NAMESPACE", "NAME", "AGE"], rows))
        } else {
            Ok(Listing::new(&["NAME", "AGE"], rows))
        }
    }

    /// Rules granted to a subject through role bindings and cluster role bindings.
    async fn fetch_policy(&self, kind: &str, name: &str) -> Result<Listing> {
        let cluster_bindings: Api<ClusterRoleBinding> = Api::all(self.client.clone());
        let bindings: Api<RoleBinding> = Api::all(self.client.clone());
        let cluster_roles: Api<ClusterRole> = Api::all(self.client.clone());
        let cluster_rules = cluster_roles
            .list(&ListParams::default())
            .await
            .context("failed to list cluster roles")?
            .into_iter()
            .map(|role| (role.name_any(), role.rules.unwrap_or_default()))
            .collect::<HashMap<_, _>>();

        let mut rows = Vec::new();
        for binding in cluster_bindings
            .list(&ListParams::default())
            .await
            .context("failed to list cluster role bindings")?
        {
            if !binding_names(binding.subjects.as_deref().unwrap_or(&[]), kind, name) {
                continue;
            }
            if let Some(rules) = cluster_rules.get(&binding.role_ref.name) {
                rows.extend(rule_rows(None, &binding.name_any(), rules));
            }
        }

        for binding in bindings
            .list(&ListParams::default())
            .await
            .context("failed to list role bindings")?
        {
            if !binding_names(binding.subjects.as_deref().unwrap_or(&[]), kind, name) {
                continue;
            }
            let namespace = binding.namespace().unwrap_or_default();
            let rules = if binding.role_ref.kind == "ClusterRole" {
                cluster_rules
                    .get(&binding.role_ref.name)
                    .cloned()
                    .unwrap_or_default()
            } else {
                let roles: Api<Role> = Api::namespaced(self.client.clone(), &namespace);
                match roles.get_opt(&binding.role_ref.name).await? {
                    Some(role) => role.rules.unwrap_or_default(),
                    None => Vec::new(),
                }
            };
            rows.extend(rule_rows(Some(&namespace), &binding.name_any(), &rules));
        }

        Ok(Listing::new(&["NAMESPACE", "NAME", "GROUP", "BINDING", "VERBS"], rows))
    }

    /// Rules of a role, or of the role a binding points at.
    async fn fetch_rbac(&self, ctx: &FetchContext) -> Result<Listing> {
        let parent = ctx.parent.as_ref().context("no role selected")?;
        let path = ctx.path.as_deref().context("no role selected")?;
        let (namespace, name) = split_path(path);
        let (role_kind, role_name) = match ResourceKind::from_gvr(parent) {
            Some(ResourceKind::Roles) => ("Role".to_string(), name.to_string()),
            Some(ResourceKind::ClusterRoles) => ("ClusterRole".to_string(), name.to_string()),
            Some(ResourceKind::RoleBindings) => {
                let namespace = namespace.context("namespace is required for a role binding")?;
                let bindings: Api<RoleBinding> = Api::namespaced(self.client.clone(), namespace);
                let binding = bindings
                    .get(name)
                    .await
                    .with_context(|| format!("failed to load role binding {path}"))?;
                (binding.role_ref.kind, binding.role_ref.name)
            }
            Some(ResourceKind::ClusterRoleBindings) => {
                let bindings: Api<ClusterRoleBinding> = Api::all(self.client.clone());
                let binding = bindings
                    .get(name)
                    .await
                    .with_context(|| format!("failed to load cluster role binding {path}"))?;
                (binding.role_ref.kind, binding.role_ref.name)
            }
            _ => anyhow::bail!("{parent} has no rules"),
        };

        let rules = self.role_rules(namespace, &role_kind, &role_name).await?;
        Ok(rbac_listing(namespace, &role_name, &rules))
    }

    async fn role_rules(
        &self,
        namespace: Option<&str>,
        kind: &str,
        name: &str,
    ) -> Result<Vec<PolicyRule>> {
        let rules = if kind == "ClusterRole" {
            let roles: Api<ClusterRole> = Api::all(self.client.clone());
            roles
                .get(name)
                .await
                .with_context(|| format!("failed to load cluster role {name}"))?
                .rules
        } else {
            let namespace = namespace.context("namespace is required for a role")?;
            let roles: Api<Role> = Api::namespaced(self.client.clone(), namespace);
            roles
                .get(name)
                .await
                .with_context(|| format!("failed to load role {namespace}/{name}"))?
                .rules
        };
        Ok(rules.unwrap_or_default())
    }
}

/// Every item of a list, following continue tokens page by page.
async fn list_all<K>(api: &Api<K>, params: &ListParams) -> Result<Vec<K>>
where
    K: Clone + DeserializeOwned + Debug,
{
    collect_pages(move |token| {
        let params = match token {
            Some(token) => params.clone().continue_token(&token),
            None => params.clone(),
        };
        async move {
            let page = api.list(&params).await?;
            Ok((page.items, page.metadata.continue_))
        }
    })
    .await
}

async fn collect_pages<T, F, Fut>(mut next_page: F) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Option<String>)>>,
{
    let mut items = Vec::new();
    let mut token = None;
    loop {
        let (page, next) = next_page(token.take()).await?;
        items.extend(page);
        match next.filter(|next| !next.is_empty()) {
            Some(next) => token = Some(next),
            None => return Ok(items),
        }
    }
}

fn list_params(ctx: &FetchContext) -> ListParams {
    let mut params = ListParams::default().limit(PAGE_SIZE);
    if let Some(labels) = ctx.labels.as_deref().filter(|labels| !labels.is_empty()) {
        params = params.labels(labels);
    }
    if let Some(fields) = ctx.fields.as_deref().filter(|fields| !fields.is_empty()) {
        params = params.fields(fields);
    }
    params
}

fn api_resource(gvr: &Gvr) -> ApiResource {
    let kind = ResourceKind::from_gvr(gvr)
        .map(|kind| kind.kind().to_string())
        .unwrap_or_else(|| gvr.resource().to_string());
    let gvk = GroupVersionKind::gvk(gvr.group(), gvr.version(), &kind);
    ApiResource::from_gvk_with_plural(&gvk, gvr.resource())
}

/// A row with the shared `NAMESPACE`, `NAME` leading and `AGE` trailing columns.
fn row<K: Resource>(object: &K, middle: Vec<String>, selector: Option<String>) -> RowData {
    let meta = object.meta();
    let name = meta.name.clone().unwrap_or_default();
    let namespace = meta.namespace.clone();
    let timestamp = meta.creation_timestamp.as_ref();

    let mut columns = Vec::with_capacity(middle.len() + 3);
    if let Some(namespace) = &namespace {
        columns.push(namespace.clone());
    }
    columns.push(name.clone());
    columns.extend(middle);
    columns.push(human_age(timestamp));

    RowData {
        name,
        namespace,
        columns,
        age_seconds: age_seconds(timestamp),
        selector,
    }
}

/// Files of a dump or bench directory, newest first. A missing directory lists nothing.
pub fn list_dir(dir: &Path) -> Result<Listing> {
    let headers = ["NAME", "SIZE", "AGE"];
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Listing::new(&headers, Vec::new()));
        }
        Err(error) => {
            return Err(error).with_context(|| format!("failed to list {}", dir.display()));
        }
    };

    let mut rows = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to list {}", dir.display()))?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| SystemTime::now().duration_since(modified).ok())
            .and_then(|elapsed| i64::try_from(elapsed.as_secs()).ok());
        rows.push(RowData {
            name: name.clone(),
            namespace: None,
            columns: vec![
                name,
                metadata.len().to_string(),
                age.map(format_elapsed_seconds)
                    .unwrap_or_else(|| "-".to_string()),
            ],
            age_seconds: age,
            selector: None,
        });
    }
    Ok(Listing::new(&headers, rows))
}

/// Whether one of `subjects` is the subject `kind`/`name`.
/// Service accounts are named `namespace/name`.
fn binding_names(subjects: &[Subject], kind: &str, name: &str) -> bool {
    subjects.iter().any(|subject| {
        if subject.kind != kind {
            return false;
        }
        if kind == SERVICE_ACCOUNT {
            let (namespace, account) = split_path(name);
            subject.name == account
                && namespace.is_none_or(|namespace| subject.namespace.as_deref() == Some(namespace))
        } else {
            subject.name == name
        }
    })
}

/// One row per resource of each rule. Non resource URLs become their own rows.
fn rule_rows(namespace: Option<&str>, binding: &str, rules: &[PolicyRule]) -> Vec<RowData> {
    let namespace = namespace.filter(|namespace| !namespace.is_empty());
    let mut rows = Vec::new();
    for rule in rules {
        let verbs = rule.verbs.join(",");
        let group = rule
            .api_groups
            .as_ref()
            .map(|groups| {
                groups
                    .iter()
                    .map(|group| if group.is_empty() { "core" } else { group.as_str() })
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .unwrap_or_default();
        let resources = rule
            .resources
            .iter()
            .flatten()
            .chain(rule.non_resource_urls.iter().flatten());
        for resource in resources {
            rows.push(RowData {
                name: resource.clone(),
                namespace: namespace.map(str::to_string),
                columns: vec![
                    namespace.unwrap_or("*").to_string(),
                    resource.clone(),
                    group.clone(),
                    binding.to_string(),
                    verbs.clone(),
                ],
                age_seconds: None,
                selector: None,
            });
        }
    }
    rows
}

fn rbac_listing(namespace: Option<&str>, role: &str, rules: &[PolicyRule]) -> Listing {
    Listing::new(
        &["NAMESPACE", "NAME", "GROUP", "ROLE", "VERBS"],
        rule_rows(namespace, role, rules),
    )
}

/// `spec.selector.matchLabels` of workloads, `spec.selector` of services.
fn object_selector(data: &Value) -> Option<String> {
    let selector = data.get("spec")?.get("selector")?;
    let labels = selector.get("matchLabels").unwrap_or(selector).as_object()?;
    let labels = labels
        .iter()
        .filter_map(|(key, value)| value.as_str().map(|value| (key.clone(), value.to_string())))
        .collect::<BTreeMap<_, _>>();
    (!labels.is_empty()).then(|| selector_query(&labels))
}

fn selector_query(selector: &BTreeMap<String, String>) -> String {
    selector
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn pod_status(pod: &Pod) -> String {
    if pod.metadata.deletion_timestamp.is_some() {
        return "Terminating".to_string();
    }
    let waiting = pod
        .status
        .as_ref()
        .and_then(|status| status.container_statuses.as_ref())
        .and_then(|statuses| {
            statuses.iter().find_map(|status| {
                status
                    .state
                    .as_ref()
                    .and_then(|state| state.waiting.as_ref())
                    .and_then(|waiting| waiting.reason.clone())
            })
        });
    waiting
        .or_else(|| pod.status.as_ref().and_then(|status| status.phase.clone()))
        .unwrap_or_else(|| "Unknown".to_string())
}

fn pod_is_running(pod: &Pod) -> bool {
    pod.status
        .as_ref()
        .and_then(|status| status.phase.as_deref())
        == Some("Running")
}

fn pod_readiness(status: &k8s_openapi::api::core::v1::PodStatus) -> (usize, usize, i32) {
    let container_statuses = status.container_statuses.as_deref().unwrap_or(&[]);
    let total = container_statuses.len();
    let ready = container_statuses
        .iter()
        .filter(|container| container.ready)
        .count();
    let restarts = container_statuses
        .iter()
        .map(|container| container.restart_count)
        .sum();

    (ready, total, restarts)
}

fn node_roles(node: &Node) -> String {
    let Some(labels) = node.metadata.labels.as_ref() else {
        return "-".to_string();
    };

    let mut roles = labels
        .keys()
        .filter_map(|key| key.strip_prefix("node-role.kubernetes.io/"))
        .map(|role| {
            if role.is_empty() {
                "worker".to_string()
            } else {
                role.to_string()
            }
        })
        .collect::<Vec<_>>();

    if roles.is_empty()
        && let Some(role) = labels.get("kubernetes.io/role")
    {
        roles.push(role.clone());
    }

    if roles.is_empty() {
        "-".to_string()
    } else {
        roles.sort();
        roles.dedup();
        roles.join(",")
    }
}

fn keep_last_lines(text: &str, max: i64) -> String {
    let max = usize::try_from(max).unwrap_or(usize::MAX);
    let lines = text.lines().collect::<Vec<_>>();
    let start = lines.len().saturating_sub(max);
    lines[start..].join("\n")
}

fn age_seconds(timestamp: Option<&Time>) -> Option<i64> {
    timestamp.map(|timestamp| {
        (k8s_openapi::jiff::Timestamp::now().as_second() - timestamp.0.as_second()).max(0)
    })
}

fn human_age(timestamp: Option<&Time>) -> String {
    age_seconds(timestamp)
        .map(format_elapsed_seconds)
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_elapsed_seconds(seconds: i64) -> String {
    if seconds >= 86_400 {
        return format!("{}d", seconds / 86_400);
    }

    if seconds >= 3_600 {
        return format!("{}h", seconds / 3_600);
    }

    if seconds >= 60 {
        return format!("{}m", seconds / 60);
    }

    format!("{seconds}s")
}

/// Error chain flattened to at most two causes, for the flash line.
pub fn compact_error(error: &anyhow::Error) -> String {
    let mut out = Vec::new();
    for (index, cause) in error.chain().enumerate() {
        if index == 0 {
            out.push(cause.to_string());
        } else if index <= 2 {
            out.push(format!("caused by: {cause}"));
        } else {
            break;
        }
    }

    out.join("\n")
}

/// Where a local kind's rows live, if `gvr` is one.
pub fn local_dir(gvr: &Gvr, ctx_dir: Option<&Path>) -> Option<PathBuf> {
    ResourceKind::from_gvr(gvr)
        .filter(|kind| kind.is_local())
        .and(ctx_dir.map(Path::to_path_buf))
}
