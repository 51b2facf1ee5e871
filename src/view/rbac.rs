use super::{
    Browser, KeyAction, ResourceViewer, ViewCommand, bind_keys_fn, colorer, context_fn, enter_fn,
    sort_action,
};
use crate::input::Key;
use crate::model::{Gvr, ResourceKind};

/// Rules of one role. `gvr` is the kind of the row at `path`: a role, a
/// cluster role, or a binding whose role is shown.
pub fn rbac_view(gvr: &Gvr, path: &str) -> Box<dyn ResourceViewer> {
    let parent = gvr.clone();
    let path = path.to_string();

    let mut browser = Browser::new(ResourceKind::Rbac.gvr()).with_sort("NAME", true);
    browser.set_colorer_fn(colorer::policy);
    browser.set_enter_fn(enter_fn(|_, _, _, _| ViewCommand::None));
    browser.add_bind_keys_fn(bind_keys_fn(|_, actions| {
        actions.delete(&[
            Key::shift('a'),
            Key::CTRL_SPACE,
            Key::SPACE,
            Key::char('d'),
            Key::char('y'),
            Key::ctrl('d'),
        ]);
        actions.add([
            (Key::shift('o'), KeyAction::hidden("Sort Group", sort_action("GROUP", true))),
            (Key::shift('v'), KeyAction::hidden("Sort Verbs", sort_action("VERBS", true))),
        ]);
    }));
    browser.set_context_fn(context_fn(move |_, mut ctx| {
        ctx.path = Some(path.clone());
        ctx.parent = Some(parent.clone());
        ctx
    }));
    Box::new(browser)
}

#[cfg(test)]
mod tests {
    use super::rbac_view;
    use crate::input::Key;
    use crate::model::ResourceKind;
    use crate::view::ViewCommand;
    use crate::view::testing::EnvFixture;

    #[test]
    fn context_names_the_role() {
        let fixture = EnvFixture::new();
        let view = rbac_view(&ResourceKind::Roles.gvr(), "fred/reader");
        let ctx = view.build_context(&fixture.env());
        assert_eq!(ctx.gvr, ResourceKind::Rbac.gvr());
        assert_eq!(ctx.parent, Some(ResourceKind::Roles.gvr()));
        assert_eq!(ctx.path.as_deref(), Some("fred/reader"));
        assert_eq!(ctx.namespace, None);
    }

    #[test]
    fn rules_are_read_only() {
        let fixture = EnvFixture::new();
        let mut view = rbac_view(&ResourceKind::ClusterRoles.gvr(), "admin");
        view.init(&fixture.env());

        assert_eq!(view.name(), "Rbac");
        for key in [Key::SPACE, Key::ctrl('d'), Key::char('d'), Key::char('y')] {
            assert!(view.actions().get(&key).is_none(), "{} still bound", key.signature());
        }
        assert!(view.actions().get(&Key::shift('o')).is_some());
        assert!(view.actions().get(&Key::shift('v')).is_some());
        assert_eq!(view.hints().len(), 5);
        assert_eq!(view.enter(&fixture.env(), "pods"), ViewCommand::None);
    }
}
