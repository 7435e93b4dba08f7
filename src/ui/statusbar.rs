use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{Screen, StatusKind, StatusMessage};
use crate::ui::theme::Theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    screen: &Screen,
    status_message: Option<&StatusMessage>,
    theme: &Theme,
) {
    let bg_style = Style::default().bg(theme.statusbar_bg);

    // Status message takes priority
    if let Some(status) = status_message {
        let color = match status.kind {
            StatusKind::Ok => theme.status_ok,
            StatusKind::Error => theme.status_err,
            StatusKind::Info => theme.text_primary,
        };
        let line = Line::from(Span::styled(
            format!(" {}", status.text),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(line).style(bg_style), area);
        return;
    }

    let pills: &[(&str, &str)] = match screen {
        Screen::Menu => &[
            ("\u{2191}\u{2193}", "Move"),
            ("Enter", "Select"),
            ("?", "Help"),
            ("q", "Quit"),
        ],
        Screen::Prompt(_) => &[("Enter", "Submit"), ("Esc", "Cancel")],
        Screen::Picker(_) => &[
            ("\u{2191}\u{2193}", "Move"),
            ("Enter", "Pick"),
            ("Esc", "Back"),
        ],
        Screen::Executing(_) => &[("Ctrl+C", "Abort and quit")],
        Screen::Result(_) => &[
            ("\u{2191}\u{2193}", "Scroll"),
            ("PgUp/PgDn", "Page"),
            ("any key", "Back"),
        ],
    };

    let spans: Vec<Span> = pills
        .iter()
        .flat_map(|(key, desc)| pill_spans(key, desc, theme))
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)).style(bg_style), area);
}

fn pill_spans<'a>(key: &'a str, desc: &'a str, theme: &Theme) -> Vec<Span<'a>> {
    vec![
        Span::raw(" "),
        Span::styled(
            format!(" {key} "),
            Style::default()
                .fg(theme.pill_key_fg)
                .bg(theme.pill_key_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {desc}"),
            Style::default().fg(theme.pill_desc_fg).bg(theme.surface_bg),
        ),
    ]
}
