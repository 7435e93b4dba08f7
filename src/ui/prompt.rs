use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use crate::app::PromptState;
use crate::ui::theme::Theme;

pub fn render(frame: &mut Frame, area: Rect, prompt: &PromptState, theme: &Theme) {
    let (step, total) = prompt.step();
    let title = if total > 1 {
        format!(" {} ({step}/{total}) ", prompt.action.title())
    } else {
        format!(" {} ", prompt.action.title())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.cursor_fg))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme.text_primary)
                .add_modifier(Modifier::BOLD),
        ));

    let mut lines: Vec<Line> = prompt
        .collected
        .iter()
        .map(|(param, value)| {
            Line::from(vec![
                Span::styled(
                    format!("{}: ", param.prompt()),
                    Style::default().fg(theme.text_secondary),
                ),
                Span::styled(value.as_str(), Style::default().fg(theme.text_secondary)),
            ])
        })
        .collect();

    lines.push(Line::from(vec![
        Span::styled(
            format!("{}: ", prompt.current_param().prompt()),
            Style::default()
                .fg(theme.cursor_fg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            prompt.input.as_str(),
            Style::default().fg(theme.text_primary),
        ),
        Span::styled("\u{2588}", Style::default().fg(theme.cursor_fg)),
    ]));

    if let Some(err) = &prompt.error {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            err.to_string(),
            Style::default()
                .fg(theme.status_err)
                .add_modifier(Modifier::BOLD),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}
