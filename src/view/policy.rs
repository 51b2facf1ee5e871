use super::{
    Browser, KeyAction, ResourceViewer, ViewCommand, bind_keys_fn, colorer, context_fn, enter_fn,
    sort_action,
};
use crate::input::Key;
use crate::model::ResourceKind;

pub const GROUP: &str = "Group";
pub const USER: &str = "User";
pub const SERVICE_ACCOUNT: &str = "ServiceAccount";

/// Expands the one letter subject shorthand used on the command line.
pub fn map_subject(subject: &str) -> &str {
    match subject {
        "g" => GROUP,
        "s" => SERVICE_ACCOUNT,
        "u" => USER,
        other => other,
    }
}

/// RBAC rules granted to a user, group or service account.
pub fn policy_view(subject: &str, name: &str) -> Box<dyn ResourceViewer> {
    let kind = map_subject(subject).to_string();
    let name = name.to_string();

    let mut browser = Browser::new(ResourceKind::Policy.gvr()).with_sort("NAME", false);
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
            (Key::shift('n'), KeyAction::hidden("Sort Name", sort_action("NAME", true))),
            (Key::shift('o'), KeyAction::hidden("Sort Group", sort_action("GROUP", true))),
            (
                Key::shift('b'),
                KeyAction::hidden("Sort Binding", sort_action("BINDING", true)),
            ),
        ]);
    }));
    browser.set_context_fn(context_fn(move |_, mut ctx| {
        ctx.path = Some(format!("{kind}:{name}"));
        ctx.subject_kind = Some(kind.clone());
        ctx.subject_name = Some(name.clone());
        ctx
    }));
    Box::new(browser)
}

#[cfg(test)]
mod tests {
    use super::{map_subject, policy_view};
    use crate::input::Key;
    use crate::view::ViewCommand;
    use crate::view::testing::EnvFixture;

    #[test]
    fn subject_shorthands() {
        assert_eq!(map_subject("g"), "Group");
        assert_eq!(map_subject("s"), "ServiceAccount");
        assert_eq!(map_subject("u"), "User");
        assert_eq!(map_subject("Group"), "Group");
        assert_eq!(map_subject("x"), "x");
        assert_eq!(map_subject(""), "");
    }

    #[test]
    fn context_carries_subject() {
        let fixture = EnvFixture::new();
        let view = policy_view("s", "default/builder");
        let ctx = view.build_context(&fixture.env());
        assert_eq!(ctx.subject_kind.as_deref(), Some("ServiceAccount"));
        assert_eq!(ctx.subject_name.as_deref(), Some("default/builder"));
        assert_eq!(ctx.path.as_deref(), Some("ServiceAccount:default/builder"));
        assert_eq!(ctx.namespace, None);
    }

    #[test]
    fn bindings_drop_marks_and_add_sorts() {
        let fixture = EnvFixture::new();
        let mut view = policy_view("u", "fernand");
        view.init(&fixture.env());

        for key in [Key::shift('a'), Key::SPACE, Key::CTRL_SPACE] {
            assert!(view.actions().get(&key).is_none(), "{} still bound", key.signature());
        }
        for key in [Key::shift('n'), Key::shift('o'), Key::shift('b')] {
            let action = view.actions().get(&key).unwrap();
            assert!(!action.visible);
        }
        assert_eq!(view.table().sort.as_ref().map(|sort| sort.ascending), Some(false));
        assert_eq!(view.enter(&fixture.env(), "pods"), ViewCommand::None);
    }
}
