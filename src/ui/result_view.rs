use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::app::{ResultView, Stream};
use crate::command::Invocation;
use crate::error::describe_exit;
use crate::format::{format_elapsed, truncate_unicode};
use crate::ui::theme::Theme;

pub fn render(frame: &mut Frame, area: Rect, view: &mut ResultView, theme: &Theme) {
    let ok = view.result.success();
    let status_color = if ok { theme.status_ok } else { theme.status_err };
    let border_room = (area.width as usize).saturating_sub(4);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(status_color))
        .title(Span::styled(
            truncate_unicode(&format!(" $ {} ", view.invocation), border_room),
            Style::default()
                .fg(theme.text_primary)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    view.set_viewport(inner.height as usize);

    let first = view.scroll;
    let last = (first + view.viewport).min(view.lines.len());
    let footer = format!(
        " exit {} · {} · {}-{}/{} ",
        describe_exit(view.result.exit_code),
        format_elapsed(view.result.elapsed),
        first + 1,
        last,
        view.lines.len()
    );
    let block = block.title_bottom(
        Line::from(Span::styled(footer, Style::default().fg(status_color))).right_aligned(),
    );

    let lines: Vec<Line> = view.lines[first..last]
        .iter()
        .map(|(stream, text)| {
            let style = match stream {
                Stream::Stdout => Style::default().fg(theme.text_primary),
                Stream::Stderr => Style::default().fg(theme.stderr_fg),
                Stream::Note => Style::default()
                    .fg(theme.text_secondary)
                    .add_modifier(Modifier::ITALIC),
            };
            Line::from(Span::styled(text.as_str(), style))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Placeholder shown while the package manager runs.
pub fn render_running(frame: &mut Frame, area: Rect, invocation: &Invocation, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border));

    let lines = vec![
        Line::from(Span::styled(
            "Running…",
            Style::default()
                .fg(theme.cursor_fg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::from(Span::styled(
            format!("$ {invocation}"),
            Style::default().fg(theme.text_secondary),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
