use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Clear, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use dynaview::navigation::{Notice, NoticeKind};

use crate::{
    util::{centered, fill_bg, pad},
    widgets::theme::Theme,
};

const MIN_WIDTH: u16 = 34;

pub fn rect(notice: &Notice, area: Rect) -> Rect {
    let widest = notice
        .message
        .lines()
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0)
        .max(notice.title.width()) as u16;
    let width = (widest + 6).clamp(MIN_WIDTH, (area.width * 3 / 4).max(MIN_WIDTH));
    let inner_width = width.saturating_sub(4).max(1) as usize;
    let wrapped: usize = notice
        .message
        .lines()
        .map(|line| line.width().div_ceil(inner_width).max(1))
        .sum();
    // borders, margins and the dismiss line
    centered(area, width, wrapped as u16 + 5)
}

pub fn render(frame: &mut Frame, area: Rect, notice: &Notice, theme: &Theme) {
    let area = rect(notice, area);
    frame.render_widget(Clear, area);
    fill_bg(frame.buffer_mut(), area, theme.panel_bg());

    let accent = match notice.kind {
        NoticeKind::Info => theme.success(),
        NoticeKind::Error => theme.error(),
    };
    let title = Line::styled(
        pad(notice.title.as_str(), 1),
        Style::default().fg(accent).add_modifier(Modifier::BOLD),
    )
    .centered();
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .title(title)
        .border_style(Style::default().fg(accent))
        .style(Style::default().bg(theme.panel_bg()).fg(theme.text()));
    frame.render_widget(block.clone(), area);

    let inner = block.inner(area).inner(Margin::new(1, 0));
    let [body_area, footer_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

    let lines: Vec<Line> = notice
        .message
        .lines()
        .map(|line| Line::from(Span::styled(line, Style::default().fg(theme.text()))))
        .collect();
    let body = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(body, body_area);

    let footer = Line::styled("press any key", Style::default().fg(theme.text_muted())).centered();
    frame.render_widget(footer, footer_area);
}
