use super::{Target, ViewCommand};
use crate::input::Key;
use crate::model::Gvr;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// What an action sees when it fires: the viewer's kind and the selected row.
pub struct ActionCtx<'a> {
    pub gvr: &'a Gvr,
    pub path: Option<&'a str>,
}

impl ActionCtx<'_> {
    pub fn target(&self) -> Option<Target> {
        self.path.map(|path| Target {
            gvr: self.gvr.clone(),
            path: path.to_string(),
        })
    }
}

pub type ActionFn = Arc<dyn Fn(&ActionCtx<'_>) -> ViewCommand>;

#[derive(Clone)]
pub struct KeyAction {
    pub description: String,
    pub action: ActionFn,
    pub visible: bool,
}

impl KeyAction {
    pub fn new(description: impl Into<String>, action: ActionFn) -> Self {
        Self {
            description: description.into(),
            action,
            visible: true,
        }
    }

    /// Bound but left out of the key hints.
    pub fn hidden(description: impl Into<String>, action: ActionFn) -> Self {
        Self {
            visible: false,
            ..Self::new(description, action)
        }
    }
}

impl Debug for KeyAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyAction")
            .field("description", &self.description)
            .field("visible", &self.visible)
            .finish_non_exhaustive()
    }
}

/// Key bindings of a view. Adding a key that is already bound replaces it.
#[derive(Debug, Clone, Default)]
pub struct KeyActions(HashMap<Key, KeyAction>);

impl KeyActions {
    pub fn add(&mut self, actions: impl IntoIterator<Item = (Key, KeyAction)>) {
        self.0.extend(actions);
    }

    pub fn delete(&mut self, keys: &[Key]) {
        for key in keys {
            self.0.remove(key);
        }
    }

    pub fn get(&self, key: &Key) -> Option<&KeyAction> {
        self.0.get(key)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Visible bindings as `(key, description)`, sorted by key.
    pub fn hints(&self) -> Vec<(String, String)> {
        let mut hints = self
            .0
            .iter()
            .filter(|(_, action)| action.visible)
            .map(|(key, action)| (key.signature(), action.description.clone()))
            .collect::<Vec<_>>();
        hints.sort();
        hints
    }
}

#[cfg(test)]
mod tests {
    use super::{ActionCtx, KeyAction, KeyActions};
    use crate::input::Key;
    use crate::model::Gvr;
    use crate::view::{ViewCommand, action};

    fn noop() -> super::ActionFn {
        action(|_| ViewCommand::None)
    }

    #[test]
    fn later_registration_wins() {
        let mut actions = KeyActions::default();
        actions.add([(Key::char('l'), KeyAction::new("Logs", noop()))]);
        actions.add([(Key::char('l'), KeyAction::new("Logs Previous", noop()))]);
        assert_eq!(actions.len(), 1);
        assert_eq!(
            actions.get(&Key::char('l')).map(|action| action.description.as_str()),
            Some("Logs Previous")
        );
    }

    #[test]
    fn hints_skip_hidden_actions() {
        let mut actions = KeyActions::default();
        actions.add([
            (Key::char('d'), KeyAction::new("Describe", noop())),
            (Key::shift('n'), KeyAction::hidden("Sort Name", noop())),
            (Key::ctrl('d'), KeyAction::new("Delete", noop())),
        ]);
        assert_eq!(
            actions.hints(),
            vec![
                ("ctrl-d".to_string(), "Delete".to_string()),
                ("d".to_string(), "Describe".to_string()),
            ]
        );
        actions.delete(&[Key::ctrl('d'), Key::char('x')]);
        assert_eq!(actions.len(), 2);
    }

    #[test]
    fn action_ctx_target_needs_selection() {
        let gvr = Gvr::new("v1/pods");
        let ctx = ActionCtx {
            gvr: &gvr,
            path: None,
        };
        assert!(ctx.target().is_none());

        let ctx = ActionCtx {
            gvr: &gvr,
            path: Some("fred/p1"),
        };
        assert_eq!(ctx.target().map(|target| target.path), Some("fred/p1".to_string()));
    }
}
