use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, ListState};

use crate::app::PickerState;
use crate::menu::SelectionState;
use crate::ui::theme::Theme;

pub const CURSOR: &str = "➤ ";

/// Draws the action list with the cursor row highlighted.
pub fn render(frame: &mut Frame, area: Rect, selection: &SelectionState, theme: &Theme) {
    let labels: Vec<&str> = selection
        .items()
        .iter()
        .map(|item| item.label.as_str())
        .collect();
    render_list(
        frame,
        area,
        " Package Manager ",
        &labels,
        selection.cursor(),
        theme,
    );
}

/// Draws a package or version picker with the same cursor as the menu.
pub fn render_picker(frame: &mut Frame, area: Rect, picker: &PickerState, theme: &Theme) {
    render_list(
        frame,
        area,
        &picker.title,
        &picker.labels(),
        picker.cursor,
        theme,
    );
}

fn render_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    labels: &[&str],
    cursor: usize,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            title.to_string(),
            Style::default()
                .fg(theme.text_primary)
                .add_modifier(Modifier::BOLD),
        ));

    let items: Vec<ListItem> = labels
        .iter()
        .map(|label| {
            ListItem::new(Span::styled(
                label.to_string(),
                Style::default().fg(theme.text_primary),
            ))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_symbol(CURSOR)
        .highlight_style(
            Style::default()
                .fg(theme.highlight_fg)
                .bg(theme.highlight_bg)
                .add_modifier(Modifier::BOLD),
        );

    // ListState scrolls long pickers so the cursor stays visible
    let mut state = ListState::default().with_selected(Some(cursor));
    frame.render_stateful_widget(list, area, &mut state);
}
