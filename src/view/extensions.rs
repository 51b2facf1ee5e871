use super::{
    ConfirmKind, DetailSource, Extension, KeyAction, KeyActions, PromptKind, ViewCommand, ViewEnv,
    ViewSpec, action,
};
use crate::input::Key;

/// `l` tails the selected resource's logs, `p` shows the previous container's.
pub struct Logs;

impl Extension for Logs {
    fn bind_keys(&self, _env: &ViewEnv<'_>, actions: &mut KeyActions) {
        actions.add([
            (Key::char('l'), KeyAction::new("Logs", logs_action(false))),
            (Key::char('p'), KeyAction::new("Logs Previous", logs_action(true))),
        ]);
    }
}

fn logs_action(previous: bool) -> super::ActionFn {
    action(move |ctx| match ctx.target() {
        Some(target) => ViewCommand::Push(ViewSpec::Details {
            title: if previous { "Logs Previous" } else { "Logs" }.to_string(),
            subject: target.path.clone(),
            source: DetailSource::Logs { target, previous },
        }),
        None => ViewCommand::None,
    })
}

pub struct Image;

impl Extension for Image {
    fn bind_keys(&self, env: &ViewEnv<'_>, actions: &mut KeyActions) {
        if env.read_only() {
            return;
        }
        actions.add([(
            Key::char('i'),
            KeyAction::new("Set Image", prompt_action(PromptKind::Image)),
        )]);
    }
}

pub struct Scale;

impl Extension for Scale {
    fn bind_keys(&self, env: &ViewEnv<'_>, actions: &mut KeyActions) {
        if env.read_only() {
            return;
        }
        actions.add([(
            Key::char('s'),
            KeyAction::new("Scale", prompt_action(PromptKind::Scale)),
        )]);
    }
}

pub struct Restart;

impl Extension for Restart {
    fn bind_keys(&self, env: &ViewEnv<'_>, actions: &mut KeyActions) {
        if env.read_only() {
            return;
        }
        actions.add([(
            Key::char('r'),
            KeyAction::new(
                "Restart",
                action(|ctx| match ctx.target() {
                    Some(target) => ViewCommand::Confirm(ConfirmKind::Restart, target),
                    None => ViewCommand::None,
                }),
            ),
        )]);
    }
}

pub struct PortForward;

impl Extension for PortForward {
    fn bind_keys(&self, _env: &ViewEnv<'_>, actions: &mut KeyActions) {
        actions.add([(
            Key::shift('f'),
            KeyAction::new("Port-Forward", prompt_action(PromptKind::PortForward)),
        )]);
    }
}

fn prompt_action(kind: PromptKind) -> super::ActionFn {
    action(move |ctx| match ctx.target() {
        Some(target) => ViewCommand::Prompt(kind, target),
        None => ViewCommand::None,
    })
}

#[cfg(test)]
mod tests {
    use super::{Image, Logs, PortForward, Restart, Scale};
    use crate::input::Key;
    use crate::model::Gvr;
    use crate::view::testing::EnvFixture;
    use crate::view::{
        ActionCtx, Browser, ConfirmKind, Extender, Extension, KeyAction, KeyActions, PromptKind,
        ResourceViewer, ViewCommand, ViewEnv, action,
    };

    fn chain() -> Box<dyn ResourceViewer> {
        let browser = Box::new(Browser::new(Gvr::new("apps/v1/deployments")));
        let logs = Extender::boxed(browser, Logs);
        let scale = Extender::boxed(logs, Scale);
        let restart = Extender::boxed(scale, Restart);
        Extender::boxed(restart, PortForward)
    }

    #[test]
    fn chain_carries_every_layer() {
        let fixture = EnvFixture::new();
        let mut viewer = chain();
        viewer.init(&fixture.env());

        for key in [
            Key::char('l'),
            Key::char('p'),
            Key::char('s'),
            Key::char('r'),
            Key::shift('f'),
        ] {
            assert!(viewer.actions().get(&key).is_some(), "missing {}", key.signature());
        }
    }

    #[test]
    fn read_only_hides_mutating_layers() {
        let fixture = EnvFixture::read_only();
        let browser = Box::new(Browser::new(Gvr::new("apps/v1/deployments")));
        let mut viewer = Extender::boxed(Extender::boxed(chain_with(browser), Image), Restart);
        viewer.init(&fixture.env());

        assert!(viewer.actions().get(&Key::char('s')).is_none());
        assert!(viewer.actions().get(&Key::char('i')).is_none());
        assert!(viewer.actions().get(&Key::char('r')).is_none());
        assert!(viewer.actions().get(&Key::char('l')).is_some());
    }

    fn chain_with(browser: Box<dyn ResourceViewer>) -> Box<dyn ResourceViewer> {
        Extender::boxed(Extender::boxed(browser, Logs), Scale)
    }

    struct Override;

    impl Extension for Override {
        fn bind_keys(&self, _env: &ViewEnv<'_>, actions: &mut KeyActions) {
            actions.delete(&[Key::char('l')]);
            actions.add([(
                Key::char('l'),
                KeyAction::new("Custom Logs", action(|_| ViewCommand::None)),
            )]);
        }
    }

    #[test]
    fn outer_layer_overrides_inner_binding() {
        let fixture = EnvFixture::new();
        let mut viewer = Extender::boxed(chain(), Override);
        viewer.init(&fixture.env());
        assert_eq!(
            viewer.actions().get(&Key::char('l')).map(|a| a.description.as_str()),
            Some("Custom Logs")
        );
    }

    #[test]
    fn actions_target_the_selection() {
        let fixture = EnvFixture::new();
        let mut viewer = chain();
        viewer.init(&fixture.env());
        let gvr = Gvr::new("apps/v1/deployments");
        let ctx = ActionCtx {
            gvr: &gvr,
            path: Some("fred/nginx"),
        };

        let scale = viewer.actions().get(&Key::char('s')).unwrap();
        assert!(matches!(
            (scale.action)(&ctx),
            ViewCommand::Prompt(PromptKind::Scale, target) if target.path == "fred/nginx"
        ));

        let restart = viewer.actions().get(&Key::char('r')).unwrap();
        assert!(matches!(
            (restart.action)(&ctx),
            ViewCommand::Confirm(ConfirmKind::Restart, _)
        ));

        let empty = ActionCtx {
            gvr: &gvr,
            path: None,
        };
        let logs = viewer.actions().get(&Key::char('l')).unwrap();
        assert_eq!((logs.action)(&empty), ViewCommand::None);
    }
}
