use super::colorer;
use super::registry::Scope;
use super::{
    BindKeysFn, ColorerFn, ConfirmKind, ContextFn, DetailSource, EnterFn, FetchContext,
    KeyAction, KeyActions, ResourceViewer, ViewCommand, ViewEnv, ViewSpec, action, sort_action,
};
use crate::config::is_all_namespaces;
use crate::input::Key;
use crate::model::{Gvr, ResourceKind, SortSpec, TableData};

/// The generic resource table every view is built on.
pub struct Browser {
    gvr: Gvr,
    name: String,
    scope: Scope,
    table: TableData,
    colorer: ColorerFn,
    context_fn: Option<ContextFn>,
    bind_keys_fns: Vec<BindKeysFn>,
    enter_fn: Option<EnterFn>,
    actions: KeyActions,
}

impl Browser {
    pub fn new(gvr: Gvr) -> Self {
        let name = ResourceKind::from_gvr(&gvr)
            .map(|kind| kind.title().to_string())
            .unwrap_or_else(|| gvr.resource().to_string());
        Self {
            gvr,
            name,
            scope: Scope::default(),
            table: TableData::default(),
            colorer: colorer::default,
            context_fn: None,
            bind_keys_fns: Vec::new(),
            enter_fn: None,
            actions: KeyActions::default(),
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_sort(mut self, column: &str, ascending: bool) -> Self {
        self.table.sort = Some(SortSpec {
            column: column.to_string(),
            ascending,
        });
        self
    }

    fn namespaced(&self) -> bool {
        ResourceKind::from_gvr(&self.gvr).is_none_or(ResourceKind::namespaced)
    }

    fn bind_base_keys(&mut self, env: &ViewEnv<'_>) {
        self.actions.add([
            (
                Key::ENTER,
                KeyAction::new("View", action(|_| ViewCommand::Enter)),
            ),
            (Key::ESC, KeyAction::new("Back", action(|_| ViewCommand::Back))),
            (
                Key::char('d'),
                KeyAction::new(
                    "Describe",
                    action(|ctx| match ctx.target() {
                        Some(target) => ViewCommand::Push(ViewSpec::Details {
                            title: "Describe".to_string(),
                            subject: target.path.clone(),
                            source: DetailSource::Describe(target),
                        }),
                        None => ViewCommand::None,
                    }),
                ),
            ),
            (
                Key::char('y'),
                KeyAction::new(
                    "YAML",
                    action(|ctx| match ctx.target() {
                        Some(target) => ViewCommand::Push(ViewSpec::Details {
                            title: "YAML".to_string(),
                            subject: target.path.clone(),
                            source: DetailSource::Yaml(target),
                        }),
                        None => ViewCommand::None,
                    }),
                ),
            ),
            (
                Key::ctrl('s'),
                KeyAction::new("Save", action(|_| ViewCommand::SaveTable)),
            ),
            (Key::SPACE, KeyAction::new("Mark", action(|_| ViewCommand::ToggleMark))),
            (
                Key::CTRL_SPACE,
                KeyAction::hidden("Clear Marks", action(|_| ViewCommand::ClearMarks)),
            ),
            (Key::shift('n'), KeyAction::hidden("Sort Name", sort_action("NAME", true))),
            (Key::shift('a'), KeyAction::hidden("Sort Age", sort_action("AGE", true))),
            (
                Key::char('/'),
                KeyAction::new("Filter", action(|_| ViewCommand::StartFilter)),
            ),
            (
                Key::char(':'),
                KeyAction::hidden("Command", action(|_| ViewCommand::StartCommand)),
            ),
            (
                Key::char('?'),
                KeyAction::new("Help", action(|_| ViewCommand::ToggleHelp)),
            ),
        ]);

        if !env.read_only() {
            self.actions.add([(
                Key::ctrl('d'),
                KeyAction::new(
                    "Delete",
                    action(|ctx| match ctx.target() {
                        Some(target) => ViewCommand::Confirm(ConfirmKind::Delete, target),
                        None => ViewCommand::None,
                    }),
                ),
            )]);
        }
    }
}

impl ResourceViewer for Browser {
    fn name(&self) -> &str {
        &self.name
    }

    fn gvr(&self) -> &Gvr {
        &self.gvr
    }

    fn table(&self) -> &TableData {
        &self.table
    }

    fn table_mut(&mut self) -> &mut TableData {
        &mut self.table
    }

    fn colorer(&self) -> ColorerFn {
        self.colorer
    }

    fn set_colorer_fn(&mut self, f: ColorerFn) {
        self.colorer = f;
    }

    fn set_context_fn(&mut self, f: ContextFn) {
        self.context_fn = Some(f);
    }

    fn add_bind_keys_fn(&mut self, f: BindKeysFn) {
        self.bind_keys_fns.push(f);
    }

    fn set_enter_fn(&mut self, f: EnterFn) {
        self.enter_fn = Some(f);
    }

    fn init(&mut self, env: &ViewEnv<'_>) {
        self.actions.clear();
        self.bind_base_keys(env);
        for bind_keys in &self.bind_keys_fns {
            bind_keys(env, &mut self.actions);
        }
    }

    fn build_context(&self, env: &ViewEnv<'_>) -> FetchContext {
        let active = self
            .scope
            .namespace
            .clone()
            .unwrap_or_else(|| env.config.active_namespace());
        let namespace = (self.namespaced() && !is_all_namespaces(&active)).then_some(active);
        let ctx = FetchContext {
            gvr: self.gvr.clone(),
            namespace,
            path: self.scope.path.clone(),
            labels: self.scope.labels.clone(),
            fields: self.scope.fields.clone(),
            ..FetchContext::default()
        };
        match &self.context_fn {
            Some(f) => f(env, ctx),
            None => ctx,
        }
    }

    fn enter(&self, env: &ViewEnv<'_>, path: &str) -> ViewCommand {
        match &self.enter_fn {
            Some(f) => f(env, &self.table, &self.gvr, path),
            None => ViewCommand::Push(ViewSpec::Details {
                title: "Describe".to_string(),
                subject: path.to_string(),
                source: DetailSource::Describe(super::Target {
                    gvr: self.gvr.clone(),
                    path: path.to_string(),
                }),
            }),
        }
    }

    fn actions(&self) -> &KeyActions {
        &self.actions
    }
}

#[cfg(test)]
mod tests {
    use super::Browser;
    use crate::input::Key;
    use crate::model::Gvr;
    use crate::view::registry::Scope;
    use crate::view::testing::EnvFixture;
    use crate::view::{
        ActionCtx, DetailSource, KeyAction, ResourceViewer, ViewCommand, ViewSpec, action,
        bind_keys_fn, context_fn, enter_fn,
    };

    #[test]
    fn base_context_carries_namespace_and_scope() {
        let mut fixture = EnvFixture::new();
        fixture.config.set_active_namespace("fred").unwrap();
        let browser = Browser::new(Gvr::new("v1/pods")).with_scope(Scope {
            labels: Some("app=nginx".to_string()),
            path: Some("fred/nginx".to_string()),
            ..Scope::default()
        });

        let ctx = browser.build_context(&fixture.env());
        assert_eq!(ctx.gvr, Gvr::new("v1/pods"));
        assert_eq!(ctx.namespace.as_deref(), Some("fred"));
        assert_eq!(ctx.labels.as_deref(), Some("app=nginx"));
        assert_eq!(ctx.path.as_deref(), Some("fred/nginx"));
    }

    #[test]
    fn cluster_scoped_kinds_ignore_namespace() {
        let mut fixture = EnvFixture::new();
        fixture.config.set_active_namespace("fred").unwrap();
        let browser = Browser::new(Gvr::new("v1/nodes"));
        assert_eq!(browser.build_context(&fixture.env()).namespace, None);
    }

    #[test]
    fn all_namespaces_lists_everything() {
        let mut fixture = EnvFixture::new();
        fixture.config.set_active_namespace("all").unwrap();
        let browser = Browser::new(Gvr::new("v1/pods"));
        assert_eq!(browser.build_context(&fixture.env()).namespace, None);
    }

    #[test]
    fn scope_namespace_wins_over_active() {
        let fixture = EnvFixture::new();
        let browser = Browser::new(Gvr::new("v1/pods")).with_scope(Scope {
            namespace: Some("kube-system".to_string()),
            ..Scope::default()
        });
        assert_eq!(
            browser.build_context(&fixture.env()).namespace.as_deref(),
            Some("kube-system")
        );
    }

    #[test]
    fn context_fn_applies_on_top_of_base() {
        let fixture = EnvFixture::new();
        let mut browser = Browser::new(Gvr::new("v1/pods"));
        browser.set_context_fn(context_fn(|_, mut ctx| {
            ctx.fields = Some("spec.nodeName=n1".to_string());
            ctx
        }));
        let ctx = browser.build_context(&fixture.env());
        assert_eq!(ctx.fields.as_deref(), Some("spec.nodeName=n1"));
        assert_eq!(ctx.namespace.as_deref(), Some("default"));
    }

    #[test]
    fn init_binds_base_then_hooks_in_order() {
        let fixture = EnvFixture::new();
        let mut browser = Browser::new(Gvr::new("v1/configmaps"));
        browser.add_bind_keys_fn(bind_keys_fn(|_, actions| {
            actions.add([(
                Key::char('x'),
                KeyAction::new("First", action(|_| ViewCommand::None)),
            )]);
        }));
        browser.add_bind_keys_fn(bind_keys_fn(|_, actions| {
            actions.add([(
                Key::char('x'),
                KeyAction::new("Second", action(|_| ViewCommand::None)),
            )]);
        }));
        browser.init(&fixture.env());

        assert_eq!(browser.name(), "ConfigMaps");
        assert_eq!(
            browser.actions().get(&Key::char('x')).map(|a| a.description.as_str()),
            Some("Second")
        );
        assert!(browser.actions().get(&Key::ctrl('d')).is_some());
        assert_eq!(browser.actions().len(), 14);
    }

    #[test]
    fn init_is_repeatable() {
        let fixture = EnvFixture::new();
        let mut browser = Browser::new(Gvr::new("v1/configmaps"));
        browser.init(&fixture.env());
        let first = browser.hints();
        browser.init(&fixture.env());
        assert_eq!(browser.hints(), first);
    }

    #[test]
    fn read_only_drops_delete() {
        let fixture = EnvFixture::read_only();
        let mut browser = Browser::new(Gvr::new("v1/configmaps"));
        browser.init(&fixture.env());
        assert!(browser.actions().get(&Key::ctrl('d')).is_none());
        assert_eq!(browser.actions().len(), 12);
    }

    #[test]
    fn describe_targets_selected_row() {
        let fixture = EnvFixture::new();
        let mut browser = Browser::new(Gvr::new("v1/configmaps"));
        browser.init(&fixture.env());
        let gvr = Gvr::new("v1/configmaps");
        let describe = browser.actions().get(&Key::char('d')).unwrap();

        let command = (describe.action)(&ActionCtx {
            gvr: &gvr,
            path: Some("fred/cm1"),
        });
        match command {
            ViewCommand::Push(ViewSpec::Details { subject, source, .. }) => {
                assert_eq!(subject, "fred/cm1");
                assert!(matches!(
                    source,
                    DetailSource::Describe(target) if target.path == "fred/cm1"
                ));
            }
            other => panic!("unexpected command {other:?}"),
        }

        let command = (describe.action)(&ActionCtx {
            gvr: &gvr,
            path: None,
        });
        assert_eq!(command, ViewCommand::None);
    }

    #[test]
    fn enter_uses_hook_when_set() {
        let fixture = EnvFixture::new();
        let mut browser = Browser::new(Gvr::new("v1/configmaps"));
        assert!(matches!(
            browser.enter(&fixture.env(), "fred/cm1"),
            ViewCommand::Push(ViewSpec::Details { .. })
        ));

        browser.set_enter_fn(enter_fn(|_, _, gvr, path| {
            ViewCommand::FlashErr(format!("{gvr} {path}"))
        }));
        assert_eq!(
            browser.enter(&fixture.env(), "fred/cm1"),
            ViewCommand::FlashErr("v1/configmaps fred/cm1".to_string())
        );
    }
}
