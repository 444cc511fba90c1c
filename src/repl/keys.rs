//! Keyboard handling for the completion menu

use std::ops::Range;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use super::menu::CompletionMenu;

/// Keys the menu reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Tab,
    BackTab,
    Up,
    Down,
    Enter,
    Escape,
    Char(char),
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
    };
}

impl From<KeyModifiers> for Modifiers {
    fn from(modifiers: KeyModifiers) -> Self {
        Self {
            shift: modifiers.contains(KeyModifiers::SHIFT),
            ctrl: modifiers.contains(KeyModifiers::CONTROL),
            alt: modifiers.contains(KeyModifiers::ALT),
        }
    }
}

impl From<KeyCode> for Key {
    fn from(code: KeyCode) -> Self {
        match code {
            KeyCode::Tab => Key::Tab,
            KeyCode::BackTab => Key::BackTab,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Escape,
            KeyCode::Char(c) => Key::Char(c),
            _ => Key::Other,
        }
    }
}

impl From<KeyEvent> for Key {
    fn from(event: KeyEvent) -> Self {
        event.code.into()
    }
}

impl From<KeyEvent> for Modifiers {
    fn from(event: KeyEvent) -> Self {
        event.modifiers.into()
    }
}

/// Split a terminal key event into the key and its modifiers
pub fn split_event(event: KeyEvent) -> (Key, Modifiers) {
    (event.into(), event.into())
}

impl Key {
    /// Parse a key name as used by the `--keys` replay option
    pub fn parse(name: &str) -> Option<(Key, Modifiers)> {
        let key = match name.to_lowercase().as_str() {
            "tab" => (Key::Tab, Modifiers::NONE),
            "shift-tab" | "s-tab" | "backtab" => (Key::BackTab, Modifiers::SHIFT),
            "up" => (Key::Up, Modifiers::NONE),
            "down" => (Key::Down, Modifiers::NONE),
            "enter" | "return" => (Key::Enter, Modifiers::NONE),
            "esc" | "escape" => (Key::Escape, Modifiers::NONE),
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => (Key::Char(c), Modifiers::NONE),
                    _ => return None,
                }
            }
        };
        Some(key)
    }
}

/// What a keypress did to the menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key is not for the menu; the editor should process it
    NotHandled,
    /// Selection moved
    Navigated,
    /// The selected value should be inserted
    Accepted {
        insert_text: String,
        /// Character range of the input the text replaces, when known
        replace_range: Option<Range<usize>>,
    },
    /// Menu closed without inserting
    Dismissed,
}

impl KeyOutcome {
    pub fn is_handled(&self) -> bool {
        !matches!(self, KeyOutcome::NotHandled)
    }

    pub fn insert_text(&self) -> Option<&str> {
        match self {
            KeyOutcome::Accepted { insert_text, .. } => Some(insert_text),
            _ => None,
        }
    }
}

/// Maps keys onto menu actions
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyHandler;

impl KeyHandler {
    /// Apply `key` to `menu`
    ///
    /// An inactive menu never handles anything.
    pub fn handle(menu: &mut CompletionMenu, key: Key, modifiers: Modifiers) -> KeyOutcome {
        if !menu.is_active() {
            return KeyOutcome::NotHandled;
        }

        let outcome = match key {
            Key::Tab if modifiers.shift => {
                menu.select_previous();
                KeyOutcome::Navigated
            }
            Key::BackTab | Key::Up => {
                menu.select_previous();
                KeyOutcome::Navigated
            }
            Key::Tab | Key::Down => {
                menu.select_next();
                KeyOutcome::Navigated
            }
            Key::Enter => match menu.accept() {
                Some(completion) => KeyOutcome::Accepted {
                    insert_text: completion.value,
                    replace_range: None,
                },
                None => KeyOutcome::NotHandled,
            },
            Key::Escape => {
                menu.clear();
                KeyOutcome::Dismissed
            }
            Key::Char(_) | Key::Other => KeyOutcome::NotHandled,
        };

        debug!("key {:?} -> {:?}", key, outcome);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repl::completion::{Completion, CompletionGroup};

    fn active_menu() -> CompletionMenu {
        let mut menu = CompletionMenu::new();
        menu.set_completions(
            ["git", "gcc", "grep"]
                .iter()
                .map(|v| Completion::new(*v, CompletionGroup::RecommendedCommand, 80.0, "test"))
                .collect(),
        );
        menu
    }

    #[test]
    fn test_inactive_menu_handles_nothing() {
        let mut menu = CompletionMenu::new();
        for key in [Key::Tab, Key::Up, Key::Down, Key::Enter, Key::Escape] {
            assert_eq!(
                KeyHandler::handle(&mut menu, key, Modifiers::NONE),
                KeyOutcome::NotHandled
            );
        }
    }

    #[test]
    fn test_navigation() {
        let mut menu = active_menu();
        assert_eq!(
            KeyHandler::handle(&mut menu, Key::Tab, Modifiers::NONE),
            KeyOutcome::Navigated
        );
        assert_eq!(menu.selected_index(), 1);

        KeyHandler::handle(&mut menu, Key::Down, Modifiers::NONE);
        assert_eq!(menu.selected_index(), 2);

        KeyHandler::handle(&mut menu, Key::Up, Modifiers::NONE);
        assert_eq!(menu.selected_index(), 1);

        KeyHandler::handle(&mut menu, Key::Tab, Modifiers::SHIFT);
        assert_eq!(menu.selected_index(), 0);

        KeyHandler::handle(&mut menu, Key::BackTab, Modifiers::NONE);
        assert_eq!(menu.selected_index(), 2);
    }

    #[test]
    fn test_enter_accepts() {
        let mut menu = active_menu();
        KeyHandler::handle(&mut menu, Key::Tab, Modifiers::NONE);
        let outcome = KeyHandler::handle(&mut menu, Key::Enter, Modifiers::NONE);
        assert_eq!(outcome.insert_text(), Some("gcc"));
        assert!(!menu.is_active());
    }

    #[test]
    fn test_escape_dismisses() {
        let mut menu = active_menu();
        let outcome = KeyHandler::handle(&mut menu, Key::Escape, Modifiers::NONE);
        assert_eq!(outcome, KeyOutcome::Dismissed);
        assert!(outcome.is_handled());
        assert!(!menu.is_active());
    }

    #[test]
    fn test_typing_passes_through() {
        let mut menu = active_menu();
        let outcome = KeyHandler::handle(&mut menu, Key::Char('x'), Modifiers::NONE);
        assert!(!outcome.is_handled());
        assert!(menu.is_active());
    }

    #[test]
    fn test_from_crossterm_event() {
        let (key, modifiers) = split_event(KeyEvent::new(KeyCode::Tab, KeyModifiers::SHIFT));
        assert_eq!(key, Key::Tab);
        assert!(modifiers.shift);
        assert!(!modifiers.ctrl);

        let key: Key = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE).into();
        assert_eq!(key, Key::Escape);

        let key: Key = KeyEvent::new(KeyCode::F(5), KeyModifiers::NONE).into();
        assert_eq!(key, Key::Other);
    }

    #[test]
    fn test_parse_key_names() {
        assert_eq!(Key::parse("tab"), Some((Key::Tab, Modifiers::NONE)));
        assert_eq!(Key::parse("Shift-Tab"), Some((Key::BackTab, Modifiers::SHIFT)));
        assert_eq!(Key::parse("x"), Some((Key::Char('x'), Modifiers::NONE)));
        assert_eq!(Key::parse("bogus"), None);
    }
}
