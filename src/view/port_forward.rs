use super::{
    Browser, ConfirmKind, KeyAction, ResourceViewer, ViewCommand, action, bind_keys_fn, enter_fn,
    sort_action,
};
use crate::input::Key;
use crate::model::ResourceKind;

/// Port-forwards started in this session. The rows come from the app, not the cluster.
pub fn port_forward_view() -> Box<dyn ResourceViewer> {
    let mut browser = Browser::new(ResourceKind::PortForwards.gvr()).with_sort("AGE", true);
    browser.set_enter_fn(enter_fn(|_, _, _, _| ViewCommand::None));
    browser.add_bind_keys_fn(bind_keys_fn(|_, actions| {
        actions.delete(&[Key::char('d'), Key::char('y'), Key::SPACE, Key::CTRL_SPACE]);
        actions.add([
            (
                Key::ctrl('d'),
                KeyAction::new(
                    "Stop",
                    action(|ctx| match ctx.target() {
                        Some(target) => ViewCommand::Confirm(ConfirmKind::Delete, target),
                        None => ViewCommand::None,
                    }),
                ),
            ),
            (Key::shift('p'), KeyAction::hidden("Sort Ports", sort_action("PORTS", true))),
        ]);
    }));
    Box::new(browser)
}

#[cfg(test)]
mod tests {
    use super::port_forward_view;
    use crate::input::Key;
    use crate::model::ResourceKind;
    use crate::view::testing::EnvFixture;
    use crate::view::{ActionCtx, ConfirmKind, Target, ViewCommand};

    #[test]
    fn stop_is_bound_even_when_read_only() {
        let fixture = EnvFixture::read_only();
        let mut view = port_forward_view();
        view.init(&fixture.env());
        assert_eq!(view.name(), "PortForwards");

        let stop = view.actions().get(&Key::ctrl('d')).unwrap();
        assert!(stop.visible);
        let gvr = ResourceKind::PortForwards.gvr();
        let command = (stop.action)(&ActionCtx {
            gvr: &gvr,
            path: Some("fred/nginx|8080:80"),
        });
        assert_eq!(
            command,
            ViewCommand::Confirm(
                ConfirmKind::Delete,
                Target {
                    gvr: gvr.clone(),
                    path: "fred/nginx|8080:80".to_string(),
                }
            )
        );
        assert!(view.actions().get(&Key::char('y')).is_none());
    }
}
