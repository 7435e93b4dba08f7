use crate::menu::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scroll {
    LineUp,
    LineDown,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Leave immediately from any screen.
    Quit,
    /// Key forwarded to the menu state machine.
    Menu(Key),
    /// Key forwarded to the open picker.
    Pick(Key),
    UpdateInput(String),
    SubmitInput,
    CancelPrompt,
    Scroll(Scroll),
    DismissResult,
    ToggleHelp,
    CycleTheme,
    None,
}
