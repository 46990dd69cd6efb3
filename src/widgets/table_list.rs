use humansize::{BINARY, format_size};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Cell, HighlightSpacing, Paragraph, Row, Table, TableState},
};
use throbber_widgets_tui::{Throbber, ThrobberState};

use dynaview::dynamodb::{KeyAttr, TableInfo};
use dynaview::navigation::{LoadingState, TableList};

use crate::{
    util::{format_count, pad},
    widgets::theme::Theme,
};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    list: &TableList,
    theme: &Theme,
    throbber: &mut ThrobberState,
) {
    let block = Block::bordered()
        .title_top(Line::styled(
            pad("Tables", 1),
            Style::default()
                .fg(theme.text())
                .add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::styled(
            pad(count_label(list.tables().len()), 2),
            Style::default().fg(theme.text_muted()),
        ))
        .border_style(Style::default().fg(theme.border()))
        .style(Style::default().bg(theme.panel_bg_alt()).fg(theme.text()));

    match list.loading() {
        LoadingState::Idle | LoadingState::Loading => {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let spinner = Throbber::default()
                .label("Loading tables...")
                .style(Style::default().fg(theme.warning()));
            frame.render_stateful_widget(spinner, inner, throbber);
        }
        LoadingState::Error(_) => {
            let text = Paragraph::new("Could not list tables. Press ^r to retry.")
                .style(Style::default().fg(theme.error()))
                .block(block);
            frame.render_widget(text, area);
        }
        LoadingState::Loaded if list.tables().is_empty() => {
            let text = Paragraph::new("No tables found.")
                .style(Style::default().fg(theme.text_muted()))
                .block(block);
            frame.render_widget(text, area);
        }
        LoadingState::Loaded => {
            let header = Row::new(vec![
                Cell::from("Table"),
                Cell::from("Status"),
                Cell::from(Text::from("Items").alignment(Alignment::Right)),
                Cell::from(Text::from("Size").alignment(Alignment::Right)),
                Cell::from("Key"),
            ])
            .style(
                Style::default()
                    .fg(theme.text_muted())
                    .add_modifier(Modifier::BOLD),
            );

            let rows: Vec<Row> = list
                .tables()
                .iter()
                .map(|table| {
                    Row::new(vec![
                        Cell::from(table.name.clone()),
                        Cell::from(table.status.clone()).style(status_style(&table.status, theme)),
                        Cell::from(
                            Text::from(format_count(table.item_count)).alignment(Alignment::Right),
                        ),
                        Cell::from(
                            Text::from(format_size_bytes(table.size_bytes))
                                .alignment(Alignment::Right),
                        ),
                        Cell::from(key_label(table)),
                    ])
                })
                .collect();

            let table = Table::new(
                rows,
                [
                    Constraint::Fill(1),
                    Constraint::Length(10),
                    Constraint::Length(12),
                    Constraint::Length(11),
                    Constraint::Fill(1),
                ],
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
            let mut state = TableState::default().with_selected(Some(list.selected()));
            frame.render_stateful_widget(table, area, &mut state);
        }
    }
}

fn count_label(count: usize) -> String {
    match count {
        1 => "1 table".to_string(),
        n => format!("{} tables", format_count(n as i64)),
    }
}

fn format_size_bytes(size: i64) -> String {
    u64::try_from(size)
        .map(|value| format_size(value, BINARY))
        .unwrap_or_else(|_| "—".to_string())
}

fn key_label(table: &TableInfo) -> String {
    let attr = |key: &KeyAttr| format!("{} ({})", key.name, key.kind.label());
    match (table.partition_key.as_ref(), table.sort_key.as_ref()) {
        (Some(pk), Some(sk)) => format!("{} / {}", attr(pk), attr(sk)),
        (Some(pk), None) => attr(pk),
        _ => String::new(),
    }
}

fn status_style(status: &str, theme: &Theme) -> Style {
    let lower = status.to_ascii_lowercase();
    if lower == "active" {
        Style::default().fg(theme.success())
    } else if lower.contains("creat") || lower.contains("updat") || lower.contains("delet") {
        Style::default().fg(theme.warning())
    } else {
        Style::default().fg(theme.text_muted())
    }
}
