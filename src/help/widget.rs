use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, Padding, Row, Table},
};

use crate::{
    help::Entry,
    util::{centered, fill_bg, pad},
    widgets::theme::Theme,
};

/// Full help for one screen, two entries per row.
pub struct Overlay<'a> {
    entries: Vec<&'a Entry<'a>>,
}

impl<'a> Overlay<'a> {
    pub fn new(entries: Vec<&'a Entry<'a>>) -> Self {
        Self { entries }
    }

    pub fn rect(&self, area: Rect) -> Rect {
        let rows = self.entries.len().div_ceil(2) as u16;
        // borders plus vertical padding
        centered(area, area.width * 3 / 4, rows + 4)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let area = self.rect(area);
        frame.render_widget(Clear, area);
        fill_bg(frame.buffer_mut(), area, theme.panel_bg());
        let title = Line::styled(
            pad("Help", 2),
            Style::default()
                .fg(theme.accent())
                .add_modifier(Modifier::BOLD),
        )
        .centered();
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(title)
            .border_style(Style::default().fg(theme.border()))
            .style(Style::default().bg(theme.panel_bg()).fg(theme.text()))
            .padding(Padding::new(2, 2, 1, 1));

        let rows: Vec<_> = self
            .entries
            .chunks(2)
            .map(|chunk| {
                let cells = |entry: Option<&&Entry<'_>>| match entry {
                    Some(entry) => [
                        Line::from(display_key(entry, theme)),
                        Line::from(Span::styled(
                            entry.long.to_string(),
                            Style::default().fg(theme.text()),
                        )),
                    ],
                    None => [Line::default(), Line::default()],
                };
                let [left_key, left_desc] = cells(chunk.first());
                let [right_key, right_desc] = cells(chunk.get(1));
                Row::new(vec![left_key, left_desc, right_key, right_desc])
            })
            .collect();

        let widths = [
            Constraint::Length(12),
            Constraint::Fill(1),
            Constraint::Length(12),
            Constraint::Fill(1),
        ];
        let table = Table::new(rows, widths)
            .block(block)
            .style(Style::default().fg(theme.text()));
        frame.render_widget(table, area);
    }
}

fn display_key(entry: &Entry<'_>, theme: &Theme) -> Span<'static> {
    Span::styled(
        format!("[{}]", entry.keys),
        Style::default()
            .fg(theme.accent_alt())
            .add_modifier(Modifier::BOLD),
    )
}
