//! Key map for the page preview.
//!
//! Actions here are what the page does when no behavior consumed the key
//! first: the modal manager sees Escape and Tab before these bindings do.

use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    FocusNext,
    FocusPrev,
    /// Click the focused control.
    Activate,
    CloseModal,
    ToggleTheme,
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,
    ScrollHome,
    ScrollEnd,
}

impl Action {
    /// Verb shown after the key in the status bar.
    pub fn hint(self) -> &'static str {
        match self {
            Action::Quit => "quit",
            Action::FocusNext => "next",
            Action::FocusPrev => "prev",
            Action::Activate => "open",
            Action::CloseModal => "close",
            Action::ToggleTheme => "theme",
            Action::ScrollUp | Action::ScrollPageUp | Action::ScrollHome => "up",
            Action::ScrollDown | Action::ScrollPageDown | Action::ScrollEnd => "down",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Quit => "Leave the preview",
            Action::FocusNext => "Move focus to the next control",
            Action::FocusPrev => "Move focus to the previous control",
            Action::Activate => "Click the focused control",
            Action::CloseModal => "Close the open dialog",
            Action::ToggleTheme => "Switch between light and dark",
            Action::ScrollUp => "Scroll one step up",
            Action::ScrollDown => "Scroll one step down",
            Action::ScrollPageUp => "Scroll one screen up",
            Action::ScrollPageDown => "Scroll one screen down",
            Action::ScrollHome => "Jump to the top of the page",
            Action::ScrollEnd => "Jump to the bottom of the page",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            mods: KeyModifiers::NONE,
        }
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.code == self.code && key.modifiers == self.mods
    }

    pub fn display(&self) -> String {
        let prefixes = [
            (KeyModifiers::CONTROL, "Ctrl+"),
            (KeyModifiers::SHIFT, "Shift+"),
            (KeyModifiers::ALT, "Alt+"),
        ];
        let mut out: String = prefixes
            .iter()
            .filter(|(m, _)| self.mods.contains(*m))
            .map(|(_, p)| *p)
            .collect();
        match self.code {
            KeyCode::Char(' ') => out.push_str("Space"),
            KeyCode::Char(c) => out.push(c.to_ascii_uppercase()),
            KeyCode::F(n) => out.push_str(&format!("F{n}")),
            // crossterm's Debug names (Esc, Tab, PageUp, ...) read fine as labels
            other => out.push_str(&format!("{other:?}")),
        }
        out
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

const DEFAULTS: &[(Action, KeyCode, KeyModifiers)] = &[
    (Action::Quit, KeyCode::Char('q'), KeyModifiers::CONTROL),
    (Action::FocusNext, KeyCode::Tab, KeyModifiers::NONE),
    (Action::FocusPrev, KeyCode::BackTab, KeyModifiers::NONE),
    (Action::FocusPrev, KeyCode::BackTab, KeyModifiers::SHIFT),
    (Action::FocusPrev, KeyCode::Tab, KeyModifiers::SHIFT),
    (Action::Activate, KeyCode::Enter, KeyModifiers::NONE),
    (Action::Activate, KeyCode::Char(' '), KeyModifiers::NONE),
    (Action::CloseModal, KeyCode::Esc, KeyModifiers::NONE),
    (Action::ToggleTheme, KeyCode::Char('t'), KeyModifiers::NONE),
    (Action::ScrollUp, KeyCode::Up, KeyModifiers::NONE),
    (Action::ScrollUp, KeyCode::Char('k'), KeyModifiers::NONE),
    (Action::ScrollDown, KeyCode::Down, KeyModifiers::NONE),
    (Action::ScrollDown, KeyCode::Char('j'), KeyModifiers::NONE),
    (Action::ScrollPageUp, KeyCode::PageUp, KeyModifiers::NONE),
    (Action::ScrollPageDown, KeyCode::PageDown, KeyModifiers::NONE),
    (Action::ScrollHome, KeyCode::Home, KeyModifiers::NONE),
    (Action::ScrollEnd, KeyCode::End, KeyModifiers::NONE),
];

#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<Action, Vec<KeyCombo>>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut kb = Self::new();
        for (action, code, mods) in DEFAULTS {
            kb.add(*action, KeyCombo::new(*code, *mods));
        }
        kb
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    /// Drop every combo bound to `action`.
    pub fn clear(&mut self, action: Action) {
        self.map.remove(&action);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        self.map
            .get(&action)
            .is_some_and(|combos| combos.iter().any(|c| c.matches(key)))
    }

    pub fn combos_for(&self, action: Action) -> Vec<String> {
        self.map
            .get(&action)
            .map(|combos| combos.iter().map(KeyCombo::display).collect())
            .unwrap_or_default()
    }

    pub fn first_combo(&self, action: Action) -> Option<KeyCombo> {
        self.map.get(&action)?.first().cloned()
    }

    /// One-line key summary for the status bar.
    pub fn hint_line(&self, actions: &[Action]) -> String {
        actions
            .iter()
            .filter_map(|a| {
                self.first_combo(*a)
                    .map(|combo| format!("{} {}", combo.display(), a.hint()))
            })
            .collect::<Vec<_>>()
            .join("  ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_q_quits_but_plain_q_does_not() {
        let kb = KeyBindings::default();
        let ctrl_q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        let q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert!(kb.matches(Action::Quit, &ctrl_q));
        assert!(!kb.matches(Action::Quit, &q));
    }

    #[test]
    fn every_shift_tab_spelling_moves_backward() {
        let kb = KeyBindings::default();
        for mods in [KeyModifiers::NONE, KeyModifiers::SHIFT] {
            assert!(kb.matches(Action::FocusPrev, &KeyEvent::new(KeyCode::BackTab, mods)));
        }
        assert!(kb.matches(
            Action::FocusPrev,
            &KeyEvent::new(KeyCode::Tab, KeyModifiers::SHIFT)
        ));
        assert!(!kb.matches(
            Action::FocusPrev,
            &KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)
        ));
    }

    #[test]
    fn hint_line_uses_first_combo() {
        let kb = KeyBindings::default();
        assert_eq!(
            kb.hint_line(&[Action::CloseModal, Action::Quit]),
            "Esc close  Ctrl+Q quit"
        );
        assert_eq!(kb.combos_for(Action::Activate), vec!["Enter", "Space"]);
        assert_eq!(kb.combos_for(Action::ScrollPageDown), vec!["PageDown"]);
    }

    #[test]
    fn cleared_action_no_longer_matches() {
        let mut kb = KeyBindings::default();
        kb.clear(Action::ToggleTheme);
        kb.add(Action::ToggleTheme, KeyCombo::plain(KeyCode::F(2)));
        let t = KeyEvent::new(KeyCode::Char('t'), KeyModifiers::NONE);
        assert!(!kb.matches(Action::ToggleTheme, &t));
        assert_eq!(kb.combos_for(Action::ToggleTheme), vec!["F2"]);
    }
}
