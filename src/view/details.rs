use super::{DetailSource, KeyAction, KeyActions, ViewCommand, action};
use crate::input::Key;
use crate::model::Motion;

const PAGE_SIZE: u16 = 20;

/// A scrollable text page: YAML, describe output, logs or a file.
#[derive(Debug, Clone)]
pub struct Details {
    pub title: String,
    pub subject: String,
    pub source: DetailSource,
    pub content: String,
    pub error: Option<String>,
    pub loading: bool,
    pub scroll: u16,
    actions: KeyActions,
}

impl Details {
    pub fn new(title: impl Into<String>, subject: impl Into<String>, source: DetailSource) -> Self {
        let mut actions = KeyActions::default();
        actions.add([
            (Key::ESC, KeyAction::new("Back", action(|_| ViewCommand::Back))),
            (
                Key::ctrl('s'),
                KeyAction::new("Save", action(|_| ViewCommand::SaveTable)),
            ),
            (Key::UP, KeyAction::hidden("Up", move_action(Motion::Up))),
            (Key::char('k'), KeyAction::hidden("Up", move_action(Motion::Up))),
            (Key::DOWN, KeyAction::hidden("Down", move_action(Motion::Down))),
            (Key::char('j'), KeyAction::hidden("Down", move_action(Motion::Down))),
            (Key::PAGE_UP, KeyAction::hidden("Page Up", move_action(Motion::PageUp))),
            (
                Key::PAGE_DOWN,
                KeyAction::hidden("Page Down", move_action(Motion::PageDown)),
            ),
            (Key::char('g'), KeyAction::new("Top", move_action(Motion::Top))),
            (Key::shift('g'), KeyAction::new("Bottom", move_action(Motion::Bottom))),
        ]);
        Self {
            title: title.into(),
            subject: subject.into(),
            source,
            content: String::new(),
            error: None,
            loading: true,
            scroll: 0,
            actions,
        }
    }

    pub fn actions(&self) -> &KeyActions {
        &self.actions
    }

    pub fn set_content(&mut self, result: Result<String, String>) {
        self.loading = false;
        match result {
            Ok(content) => {
                self.content = content;
                self.error = None;
            }
            Err(error) => self.error = Some(error),
        }
        self.scroll = self.scroll.min(self.max_scroll());
    }

    pub fn scroll_by(&mut self, motion: Motion) {
        let last = self.max_scroll();
        self.scroll = match motion {
            Motion::Up => self.scroll.saturating_sub(1),
            Motion::Down => self.scroll.saturating_add(1).min(last),
            Motion::PageUp => self.scroll.saturating_sub(PAGE_SIZE),
            Motion::PageDown => self.scroll.saturating_add(PAGE_SIZE).min(last),
            Motion::Top => 0,
            Motion::Bottom => last,
        };
    }

    fn max_scroll(&self) -> u16 {
        let lines = self.content.lines().count().saturating_sub(1);
        u16::try_from(lines).unwrap_or(u16::MAX)
    }

    /// `Logs(fred/nginx)` style title shown in the border and used for saved files.
    pub fn heading(&self) -> String {
        if self.subject.is_empty() {
            self.title.clone()
        } else {
            format!("{}({})", self.title, self.subject)
        }
    }
}

fn move_action(motion: Motion) -> super::ActionFn {
    action(move |_| ViewCommand::Move(motion))
}

#[cfg(test)]
mod tests {
    use super::Details;
    use crate::input::Key;
    use crate::model::Motion;
    use crate::view::{ActionCtx, DetailSource, ViewCommand};
    use std::path::PathBuf;

    fn details() -> Details {
        Details::new("Results", "svc/default", DetailSource::File(PathBuf::from("/tmp/x")))
    }

    #[test]
    fn scroll_is_bounded_by_content() {
        let mut details = details();
        details.set_content(Ok("a\nb\nc".to_string()));
        details.scroll_by(Motion::PageDown);
        assert_eq!(details.scroll, 2);
        details.scroll_by(Motion::Down);
        assert_eq!(details.scroll, 2);
        details.scroll_by(Motion::Up);
        assert_eq!(details.scroll, 1);
        details.scroll_by(Motion::Top);
        assert_eq!(details.scroll, 0);
    }

    #[test]
    fn error_keeps_previous_content() {
        let mut details = details();
        assert!(details.loading);
        details.set_content(Ok("a".to_string()));
        details.set_content(Err("boom".to_string()));
        assert!(!details.loading);
        assert_eq!(details.content, "a");
        assert_eq!(details.error.as_deref(), Some("boom"));
        assert_eq!(details.heading(), "Results(svc/default)");
    }

    #[test]
    fn keys_map_to_motions() {
        let details = details();
        let gvr = crate::model::Gvr::default();
        let ctx = ActionCtx {
            gvr: &gvr,
            path: None,
        };
        let down = details.actions().get(&Key::char('j')).unwrap();
        assert_eq!((down.action)(&ctx), ViewCommand::Move(Motion::Down));
        let back = details.actions().get(&Key::ESC).unwrap();
        assert_eq!((back.action)(&ctx), ViewCommand::Back);
    }
}
