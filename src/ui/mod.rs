pub mod header;
pub mod help;
pub mod menu_list;
pub mod prompt;
pub mod result_view;
pub mod statusbar;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::{App, Pick, Screen};
use crate::menu::MenuAction;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    header::render(
        frame,
        chunks[0],
        &app.manager_banner,
        screen_title(&app.screen),
        &app.theme,
    );

    match &mut app.screen {
        Screen::Menu => menu_list::render(frame, chunks[1], &app.selection, &app.theme),
        Screen::Prompt(prompt) => prompt::render(frame, chunks[1], prompt, &app.theme),
        Screen::Picker(picker) => {
            menu_list::render_picker(frame, chunks[1], picker, &app.theme)
        }
        Screen::Executing(invocation) => {
            result_view::render_running(frame, chunks[1], invocation, &app.theme)
        }
        Screen::Result(view) => result_view::render(frame, chunks[1], view, &app.theme),
    }

    statusbar::render(
        frame,
        chunks[2],
        &app.screen,
        app.status_message.as_ref(),
        &app.theme,
    );

    // Overlay last so it sits on top
    if app.show_help {
        help::render(frame, frame.area(), &app.help_entries(), &app.theme);
    }
}

fn screen_title(screen: &Screen) -> &'static str {
    match screen {
        Screen::Menu => "Menu",
        Screen::Prompt(prompt) => prompt.action.title(),
        Screen::Picker(picker) => match &picker.pick {
            Pick::Package { action } => action.title(),
            Pick::Version { .. } => MenuAction::Downgrade.title(),
        },
        Screen::Executing(_) => "Running",
        Screen::Result(view) => view.request.action().title(),
    }
}
