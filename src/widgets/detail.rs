use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Cell, HighlightSpacing, Row, Table, TableState},
};
use unicode_width::UnicodeWidthStr;

use dynaview::dynamodb::value::is_nested;
use dynaview::navigation::DetailView;

use crate::{
    util::pad,
    widgets::theme::Theme,
};

const MAX_NAME_WIDTH: usize = 32;

pub fn render(frame: &mut Frame, area: Rect, view: &DetailView, theme: &Theme) {
    let block = Block::bordered()
        .title_top(Line::styled(
            pad(format!("Item in {}", view.table().name), 1),
            Style::default()
                .fg(theme.text())
                .add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::styled(
            pad(format!("{} attributes", view.rows().len()), 1),
            Style::default().fg(theme.text_muted()),
        ))
        .border_style(Style::default().fg(theme.border()))
        .style(Style::default().bg(theme.panel_bg()).fg(theme.text()));

    let name_width = view
        .rows()
        .iter()
        .map(|row| row.name.width())
        .max()
        .unwrap_or(0)
        .min(MAX_NAME_WIDTH) as u16;

    let rows: Vec<Row> = view
        .rows()
        .iter()
        .map(|row| {
            let nested = view
                .record()
                .raw(&row.name)
                .is_some_and(is_nested);
            let value_style = if nested {
                Style::default().fg(theme.accent())
            } else {
                Style::default().fg(theme.text())
            };
            Row::new(vec![
                Cell::from(row.name.clone()).style(
                    Style::default()
                        .fg(theme.accent_alt())
                        .add_modifier(Modifier::BOLD),
                ),
                Cell::from(row.value.clone()).style(value_style),
            ])
        })
        .collect();

    let header = Row::new(vec![Cell::from("Field"), Cell::from("Value")]).style(
        Style::default()
            .fg(theme.text_muted())
            .add_modifier(Modifier::BOLD),
    );
    let table = Table::new(
        rows,
        [Constraint::Length(name_width.max(5) + 1), Constraint::Fill(1)],
    )
    .block(block)
    .header(header)
    .highlight_spacing(HighlightSpacing::Always)
    .highlight_symbol(">> ")
    .row_highlight_style(
        Style::default()
            .bg(theme.selection_bg())
            .fg(theme.selection_fg()),
    );
    let mut state = TableState::default().with_selected(Some(view.selected()));
    frame.render_stateful_widget(table, area, &mut state);
}
