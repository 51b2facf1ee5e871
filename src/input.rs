use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A normalized key press, used as the key of an action map.
///
/// Letters typed with shift are stored lowercase plus `SHIFT`, so `N` and
/// `shift-n` are the same key. Punctuation never carries `SHIFT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Key {
    pub const ENTER: Self = Self::code(KeyCode::Enter);
    pub const ESC: Self = Self::code(KeyCode::Esc);
    pub const UP: Self = Self::code(KeyCode::Up);
    pub const DOWN: Self = Self::code(KeyCode::Down);
    pub const PAGE_UP: Self = Self::code(KeyCode::PageUp);
    pub const PAGE_DOWN: Self = Self::code(KeyCode::PageDown);
    pub const HOME: Self = Self::code(KeyCode::Home);
    pub const END: Self = Self::code(KeyCode::End);
    pub const SPACE: Self = Self::char(' ');
    pub const CTRL_SPACE: Self = Self::ctrl(' ');

    pub const fn code(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub const fn char(c: char) -> Self {
        Self::code(KeyCode::Char(c))
    }

    pub const fn shift(c: char) -> Self {
        Self {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::SHIFT,
        }
    }

    pub const fn ctrl(c: char) -> Self {
        Self {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn from_event(key: KeyEvent) -> Self {
        let mut modifiers = key.modifiers & (KeyModifiers::CONTROL | KeyModifiers::ALT);
        let code = match key.code {
            KeyCode::Char(c) if c.is_ascii_uppercase() => {
                modifiers |= KeyModifiers::SHIFT;
                KeyCode::Char(c.to_ascii_lowercase())
            }
            KeyCode::Char(c)
                if c.is_ascii_lowercase() && key.modifiers.contains(KeyModifiers::SHIFT) =>
            {
                modifiers |= KeyModifiers::SHIFT;
                KeyCode::Char(c)
            }
            KeyCode::Char(c) => KeyCode::Char(c),
            KeyCode::BackTab => {
                modifiers |= KeyModifiers::SHIFT;
                KeyCode::BackTab
            }
            other => {
                modifiers |= key.modifiers & KeyModifiers::SHIFT;
                other
            }
        };
        Self { code, modifiers }
    }

    /// Human readable form shown in key hints, e.g. `shift-n`, `ctrl-d`, `enter`.
    pub fn signature(&self) -> String {
        let key_name = match self.code {
            KeyCode::Char(' ') => "space".to_string(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Enter => "enter".to_string(),
            KeyCode::Tab => "tab".to_string(),
            KeyCode::BackTab => "backtab".to_string(),
            KeyCode::Backspace => "backspace".to_string(),
            KeyCode::Delete => "delete".to_string(),
            KeyCode::Esc => "esc".to_string(),
            KeyCode::Left => "left".to_string(),
            KeyCode::Right => "right".to_string(),
            KeyCode::Up => "up".to_string(),
            KeyCode::Down => "down".to_string(),
            KeyCode::Home => "home".to_string(),
            KeyCode::End => "end".to_string(),
            KeyCode::PageUp => "pgup".to_string(),
            KeyCode::PageDown => "pgdn".to_string(),
            KeyCode::F(n) => format!("f{n}"),
            _ => "?".to_string(),
        };

        let mut parts = Vec::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            parts.push("ctrl".to_string());
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            parts.push("alt".to_string());
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) && self.code != KeyCode::BackTab {
            parts.push("shift".to_string());
        }
        parts.push(key_name);
        parts.join("-")
    }
}

/// Line editing actions while the command line, filter, or a prompt is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Submit,
    Cancel,
    Backspace,
    Complete,
    Char(char),
}

pub fn map_input_key(key: KeyEvent) -> Option<InputAction> {
    match key.code {
        KeyCode::Esc => Some(InputAction::Cancel),
        KeyCode::Enter => Some(InputAction::Submit),
        KeyCode::Char('m') | KeyCode::Char('j')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            Some(InputAction::Submit)
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(InputAction::Cancel)
        }
        KeyCode::Tab => Some(InputAction::Complete),
        KeyCode::Backspace => Some(InputAction::Backspace),
        KeyCode::Char(c) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            Some(InputAction::Char(c))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{InputAction, Key, map_input_key};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn uppercase_letters_normalize_to_shift() {
        let plain = Key::from_event(KeyEvent::new(KeyCode::Char('N'), KeyModifiers::SHIFT));
        let bare = Key::from_event(KeyEvent::new(KeyCode::Char('N'), KeyModifiers::NONE));
        assert_eq!(plain, Key::shift('n'));
        assert_eq!(bare, Key::shift('n'));
        assert_eq!(plain.signature(), "shift-n");
    }

    #[test]
    fn punctuation_drops_shift() {
        let key = Key::from_event(KeyEvent::new(KeyCode::Char('?'), KeyModifiers::SHIFT));
        assert_eq!(key, Key::char('?'));
        assert_eq!(key.signature(), "?");
    }

    #[test]
    fn control_keys_keep_modifier() {
        let key = Key::from_event(KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL));
        assert_eq!(key, Key::ctrl('d'));
        assert_eq!(key.signature(), "ctrl-d");
        assert_eq!(Key::CTRL_SPACE.signature(), "ctrl-space");
    }

    #[test]
    fn input_mode_maps_char() {
        let key = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(map_input_key(key), Some(InputAction::Char('a')));
    }

    #[test]
    fn input_mode_maps_ctrl_m_and_ctrl_j_to_submit() {
        let ctrl_m = KeyEvent::new(KeyCode::Char('m'), KeyModifiers::CONTROL);
        let ctrl_j = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::CONTROL);
        assert_eq!(map_input_key(ctrl_m), Some(InputAction::Submit));
        assert_eq!(map_input_key(ctrl_j), Some(InputAction::Submit));
    }

    #[test]
    fn input_mode_ignores_other_control_chords() {
        let key = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL);
        assert_eq!(map_input_key(key), None);
    }
}
