use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::format::truncate_unicode;
use crate::ui::theme::Theme;

pub fn render(frame: &mut Frame, area: Rect, banner: &str, title: &str, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let title_width = title.width() as u16 + 2;
    let [left, right] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(title_width)]).areas(inner);

    const BRAND: &str = " pkgmenu ";
    let banner_room = (left.width as usize).saturating_sub(BRAND.width() + 2);
    let line = Line::from(vec![
        Span::styled(
            BRAND,
            Style::default()
                .fg(theme.header_accent_fg)
                .bg(theme.header_accent_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            truncate_unicode(banner, banner_room),
            Style::default().fg(theme.text_secondary),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), left);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            title,
            Style::default()
                .fg(theme.cursor_fg)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Right),
        right,
    );
}
