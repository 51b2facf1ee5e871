use super::benchmark::benchmark_view;
use super::extensions::{Image, Logs, PortForward, Restart, Scale};
use super::screen_dump::screen_dump_view;
use super::{
    Browser, DetailSource, Extender, KeyAction, ResourceViewer, SERVICE_ACCOUNT, Target,
    ViewCommand, ViewSpec, bind_keys_fn, colorer, enter_fn, policy_view, port_forward_view,
    sort_action,
};
use crate::config::ALL_NAMESPACES;
use crate::input::Key;
use crate::model::{Gvr, ResourceKind, TableData, split_path};

/// Narrows a resource view to what its parent row selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    /// Overrides the active namespace, `all` lists every namespace.
    pub namespace: Option<String>,
    pub labels: Option<String>,
    pub fields: Option<String>,
    /// Path of the row this view was opened from.
    pub path: Option<String>,
}

/// Composes the viewer shown for `gvr`.
pub fn viewer_for(gvr: &Gvr, scope: Scope) -> Box<dyn ResourceViewer> {
    let Some(kind) = ResourceKind::from_gvr(gvr) else {
        return Box::new(Browser::new(gvr.clone()).with_scope(scope));
    };
    let browser = Box::new(Browser::new(gvr.clone()).with_scope(scope));

    match kind {
        ResourceKind::Pods => pods(browser),
        ResourceKind::Deployments | ResourceKind::StatefulSets => {
            let chain = Extender::boxed(
                Extender::boxed(
                    Extender::boxed(
                        Extender::boxed(Extender::boxed(browser, Logs), Image),
                        Scale,
                    ),
                    Restart,
                ),
                PortForward,
            );
            workload(chain, true)
        }
        ResourceKind::DaemonSets => {
            let chain = Extender::boxed(
                Extender::boxed(Extender::boxed(Extender::boxed(browser, Logs), Image), Restart),
                PortForward,
            );
            workload(chain, false)
        }
        ResourceKind::Services => {
            let mut viewer = Extender::boxed(Extender::boxed(browser, Logs), PortForward);
            viewer.set_enter_fn(enter_fn(|_, table, _, path| show_pods_from_selector(table, path)));
            viewer
        }
        ResourceKind::ServiceAccounts => {
            let mut viewer: Box<dyn ResourceViewer> = browser;
            viewer.set_enter_fn(enter_fn(|_, _, _, path| {
                ViewCommand::Push(ViewSpec::Policy {
                    subject: "s".to_string(),
                    name: path.to_string(),
                })
            }));
            viewer
        }
        ResourceKind::Nodes => {
            let mut viewer: Box<dyn ResourceViewer> = browser;
            viewer.set_enter_fn(enter_fn(|_, _, _, path| {
                ViewCommand::Push(ViewSpec::Resource {
                    gvr: ResourceKind::Pods.gvr(),
                    scope: Scope {
                        namespace: Some(ALL_NAMESPACES.to_string()),
                        fields: Some(format!("spec.nodeName={path}")),
                        path: Some(path.to_string()),
                        ..Scope::default()
                    },
                })
            }));
            viewer
        }
        ResourceKind::Namespaces => {
            let mut viewer: Box<dyn ResourceViewer> = browser;
            viewer.set_enter_fn(enter_fn(|_, _, _, path| {
                ViewCommand::SwitchNamespace(path.to_string())
            }));
            viewer
        }
        ResourceKind::ScreenDumps => screen_dump_view(),
        ResourceKind::Benchmarks => benchmark_view(),
        ResourceKind::Policy => policy_view(SERVICE_ACCOUNT, ""),
        ResourceKind::PortForwards => port_forward_view(),
        ResourceKind::Roles
        | ResourceKind::ClusterRoles
        | ResourceKind::RoleBindings
        | ResourceKind::ClusterRoleBindings => {
            let mut viewer: Box<dyn ResourceViewer> = browser;
            viewer.set_enter_fn(enter_fn(|_, _, gvr, path| {
                ViewCommand::Push(ViewSpec::Rbac {
                    gvr: gvr.clone(),
                    path: path.to_string(),
                })
            }));
            viewer
        }
        _ => browser,
    }
}

fn pods(browser: Box<dyn ResourceViewer>) -> Box<dyn ResourceViewer> {
    let mut viewer = Extender::boxed(
        Extender::boxed(Extender::boxed(browser, Logs), Image),
        PortForward,
    );
    viewer.set_colorer_fn(colorer::pod);
    viewer.add_bind_keys_fn(bind_keys_fn(|_, actions| {
        actions.add([
            (Key::shift('r'), KeyAction::hidden("Sort Ready", sort_action("READY", true))),
            (Key::shift('s'), KeyAction::hidden("Sort Status", sort_action("STATUS", true))),
        ]);
    }));
    viewer.set_enter_fn(enter_fn(|_, _, gvr, path| {
        ViewCommand::Push(ViewSpec::Details {
            title: "Logs".to_string(),
            subject: path.to_string(),
            source: DetailSource::Logs {
                target: Target {
                    gvr: gvr.clone(),
                    path: path.to_string(),
                },
                previous: false,
            },
        })
    }));
    viewer
}

fn workload(mut viewer: Box<dyn ResourceViewer>, scalable: bool) -> Box<dyn ResourceViewer> {
    viewer.set_colorer_fn(colorer::workload);
    viewer.add_bind_keys_fn(bind_keys_fn(move |_, actions| {
        actions.add([(
            Key::shift('r'),
            KeyAction::hidden("Sort Ready", sort_action("READY", true)),
        )]);
        if scalable {
            actions.add([
                (
                    Key::shift('u'),
                    KeyAction::hidden("Sort UpToDate", sort_action("UP-TO-DATE", true)),
                ),
                (
                    Key::shift('l'),
                    KeyAction::hidden("Sort Available", sort_action("AVAILABLE", true)),
                ),
            ]);
        }
    }));
    viewer.set_enter_fn(enter_fn(|_, table, _, path| show_pods_from_selector(table, path)));
    viewer
}

/// Pods matching the label selector of the row at `path`.
fn show_pods_from_selector(table: &TableData, path: &str) -> ViewCommand {
    let Some(row) = table.rows.iter().find(|row| row.path() == path) else {
        return ViewCommand::FlashErr(format!("{path} is no longer listed"));
    };
    let Some(selector) = row.selector.clone().filter(|selector| !selector.is_empty()) else {
        return ViewCommand::FlashErr(format!("{path} has no pod selector"));
    };
    let (namespace, _) = split_path(path);
    ViewCommand::Push(ViewSpec::Resource {
        gvr: ResourceKind::Pods.gvr(),
        scope: Scope {
            namespace: namespace.map(str::to_string),
            labels: Some(selector),
            path: Some(path.to_string()),
            ..Scope::default()
        },
    })
}
