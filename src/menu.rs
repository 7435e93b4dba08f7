//! Menu items and the cursor state machine.
//!
//! Everything here is terminal-agnostic: keys arrive already decoded into
//! [`Key`], and [`handle_key`] is a pure function from one [`SelectionState`]
//! to the next. The cursor wraps around at both ends of the list.

use crate::input::Param;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    List,
    Upgrade,
    Downgrade,
    Uninstall,
    Search,
    Quit,
}

impl MenuAction {
    /// Prompt fields collected, in order, before the action can run.
    pub fn params(self) -> &'static [Param] {
        match self {
            MenuAction::List | MenuAction::Quit => &[],
            MenuAction::Upgrade | MenuAction::Uninstall => &[Param::Package],
            MenuAction::Downgrade => &[Param::Package, Param::Version],
            MenuAction::Search => &[Param::Query],
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            MenuAction::List => "List",
            MenuAction::Upgrade => "Upgrade",
            MenuAction::Downgrade => "Downgrade",
            MenuAction::Uninstall => "Uninstall",
            MenuAction::Search => "Search",
            MenuAction::Quit => "Quit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub action: MenuAction,
}

impl MenuItem {
    pub fn new(label: impl Into<String>, action: MenuAction) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

pub fn default_items() -> Vec<MenuItem> {
    vec![
        MenuItem::new("List installed packages", MenuAction::List),
        MenuItem::new("Upgrade a package", MenuAction::Upgrade),
        MenuItem::new("Downgrade a package", MenuAction::Downgrade),
        MenuItem::new("Uninstall a package", MenuAction::Uninstall),
        MenuItem::new("Search available versions", MenuAction::Search),
        MenuItem::new("Quit", MenuAction::Quit),
    ]
}

/// Keys the menu understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Home,
    End,
    Enter,
    Escape,
    Quit,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuSignal {
    None,
    Selected(MenuAction),
    Quit,
}

/// Menu items plus the cursor. `cursor < items.len()` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    items: Vec<MenuItem>,
    cursor: usize,
}

impl SelectionState {
    /// Returns `None` for an empty item list, which has no valid cursor.
    pub fn new(items: Vec<MenuItem>) -> Option<Self> {
        if items.is_empty() {
            None
        } else {
            Some(Self { items, cursor: 0 })
        }
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> &MenuItem {
        &self.items[self.cursor]
    }

    /// Moves the cursor onto the first item carrying `action`, if any.
    pub fn select_action(mut self, action: MenuAction) -> Self {
        if let Some(index) = self.items.iter().position(|item| item.action == action) {
            self.cursor = index;
        }
        self
    }

}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            items: default_items(),
            cursor: 0,
        }
    }
}

/// New cursor position in a list of `len` rows after a movement key.
///
/// Up and Down wrap around. Non-movement keys leave the cursor alone.
pub fn move_cursor(cursor: usize, len: usize, key: Key) -> usize {
    let last = len.saturating_sub(1);
    match key {
        Key::Up if cursor == 0 => last,
        Key::Up => cursor - 1,
        Key::Down if cursor >= last => 0,
        Key::Down => cursor + 1,
        Key::Home => 0,
        Key::End => last,
        _ => cursor.min(last),
    }
}

pub fn handle_key(mut state: SelectionState, key: Key) -> (SelectionState, MenuSignal) {
    let signal = match key {
        Key::Up | Key::Down | Key::Home | Key::End => {
            state.cursor = move_cursor(state.cursor, state.items.len(), key);
            MenuSignal::None
        }
        Key::Enter => match state.current().action {
            MenuAction::Quit => MenuSignal::Quit,
            action => MenuSignal::Selected(action),
        },
        Key::Escape | Key::Quit => MenuSignal::Quit,
        Key::Other => MenuSignal::None,
    };
    (state, signal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(state: SelectionState, keys: &[Key]) -> SelectionState {
        keys.iter().fold(state, |s, &k| handle_key(s, k).0)
    }

    #[test]
    fn empty_menu_is_rejected() {
        assert!(SelectionState::new(Vec::new()).is_none());
    }

    #[test]
    fn up_from_top_wraps_to_bottom() {
        let state = SelectionState::default();
        let (state, signal) = handle_key(state, Key::Up);
        assert_eq!(signal, MenuSignal::None);
        assert_eq!(state.cursor(), default_items().len() - 1);
        assert_eq!(state.current().action, MenuAction::Quit);
    }

    #[test]
    fn down_from_bottom_wraps_to_top() {
        let state = press(SelectionState::default(), &[Key::End, Key::Down]);
        assert_eq!(state.cursor(), 0);
        assert_eq!(state.current().action, MenuAction::List);
    }

    #[test]
    fn enter_selects_item_under_cursor() {
        let state = press(SelectionState::default(), &[Key::Down, Key::Down]);
        let (state, signal) = handle_key(state, Key::Enter);
        assert_eq!(signal, MenuSignal::Selected(MenuAction::Downgrade));
        assert_eq!(state.cursor(), 2);
    }

    #[test]
    fn enter_on_quit_item_quits() {
        let state = SelectionState::default().select_action(MenuAction::Quit);
        assert_eq!(handle_key(state, Key::Enter).1, MenuSignal::Quit);
    }

    #[test]
    fn escape_and_quit_keys_quit_without_moving() {
        let state = press(SelectionState::default(), &[Key::Down]);
        let (after, signal) = handle_key(state.clone(), Key::Escape);
        assert_eq!(signal, MenuSignal::Quit);
        assert_eq!(after, state);
        assert_eq!(handle_key(state, Key::Quit).1, MenuSignal::Quit);
    }

    #[test]
    fn other_keys_are_ignored() {
        let state = press(SelectionState::default(), &[Key::Down]);
        assert_eq!(handle_key(state.clone(), Key::Other), (state, MenuSignal::None));
    }

    #[test]
    fn single_item_menu_stays_put() {
        let state = SelectionState::new(vec![MenuItem::new("Quit", MenuAction::Quit)]).unwrap();
        let state = press(state, &[Key::Up, Key::Down, Key::End, Key::Home]);
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn move_cursor_wraps_in_any_list() {
        assert_eq!(move_cursor(0, 3, Key::Up), 2);
        assert_eq!(move_cursor(2, 3, Key::Down), 0);
        assert_eq!(move_cursor(1, 3, Key::End), 2);
        assert_eq!(move_cursor(2, 3, Key::Home), 0);
        assert_eq!(move_cursor(1, 3, Key::Enter), 1);
        assert_eq!(move_cursor(0, 0, Key::Down), 0);
    }

    #[test]
    fn parameterized_actions_declare_prompts() {
        assert!(MenuAction::List.params().is_empty());
        assert_eq!(MenuAction::Upgrade.params(), &[Param::Package]);
        assert_eq!(
            MenuAction::Downgrade.params(),
            &[Param::Package, Param::Version]
        );
        assert_eq!(MenuAction::Search.params(), &[Param::Query]);
    }
}
