//! Shell-level key chords. The command line consumes plain keystrokes, so
//! every chord here carries a modifier or lives on a function key.

use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    ToggleExplorer,
    ToggleAgent,
    ToggleHistory,
    ToggleDebugLog,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Quit => "Quit",
            Action::ToggleExplorer => "Toggle explorer sidebar",
            Action::ToggleAgent => "Toggle agent panel",
            Action::ToggleHistory => "Toggle command history size",
            Action::ToggleDebugLog => "Toggle debug log",
        };
        write!(f, "{}", s)
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

    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.code == self.code && key.modifiers == self.mods
    }
}

#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<Action, Vec<KeyCombo>>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use Action::*;
        let mut kb = Self {
            map: HashMap::new(),
        };
        kb.add(Quit, KeyCombo::new(KeyCode::Char('q'), KeyModifiers::CONTROL));
        kb.add(
            ToggleExplorer,
            KeyCombo::new(KeyCode::Char('e'), KeyModifiers::CONTROL),
        );
        kb.add(
            ToggleAgent,
            KeyCombo::new(KeyCode::Char('g'), KeyModifiers::CONTROL),
        );
        kb.add(
            ToggleHistory,
            KeyCombo::new(KeyCode::F(5), KeyModifiers::NONE),
        );
        kb.add(
            ToggleDebugLog,
            KeyCombo::new(KeyCode::F(12), KeyModifiers::NONE),
        );
        kb
    }
}

impl KeyBindings {
    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        self.map
            .get(&action)
            .is_some_and(|combos| combos.iter().any(|combo| combo.matches(key)))
    }

    /// Resolve a key event to the first matching action, if any.
    pub fn action_for(&self, key: &KeyEvent) -> Option<Action> {
        self.map.iter().find_map(|(action, combos)| {
            combos
                .iter()
                .any(|combo| combo.matches(key))
                .then_some(*action)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_resolve() {
        let kb = KeyBindings::default();
        let quit = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(kb.matches(Action::Quit, &quit));
        assert_eq!(kb.action_for(&quit), Some(Action::Quit));
        let plain_q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(kb.action_for(&plain_q), None);
    }
}
