use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Cell, HighlightSpacing, Paragraph, Row, Table, TableState},
};
use throbber_widgets_tui::{Throbber, ThrobberState};
use unicode_width::UnicodeWidthStr;

use dynaview::navigation::{NO_ITEMS, ResultsView};
use dynaview::pagination::Pager;

use crate::{util::pad, widgets::theme::Theme};

pub fn title(pager: &Pager, view: &ResultsView) -> String {
    let kind = pager.request().map(|request| request.label()).unwrap_or("Query");
    format!(
        "{kind} Results for {} - Page {}",
        view.table().name,
        pager.page_number()
    )
}

fn paging_label(pager: &Pager) -> String {
    let mut parts = Vec::new();
    if pager.has_previous() {
        parts.push("^b prev");
    }
    if pager.has_next() {
        parts.push("^n next");
    }
    if parts.is_empty() {
        "no more pages".to_string()
    } else {
        parts.join(" · ")
    }
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    pager: &Pager,
    view: &ResultsView,
    theme: &Theme,
    throbber: &mut ThrobberState,
) {
    let mut bottom = vec![Span::styled(
        pad(paging_label(pager), 1),
        Style::default().fg(theme.text_muted()),
    )];
    if pager.has_next() {
        bottom.push(Span::styled(
            pad("more available", 1),
            Style::default().fg(theme.accent_alt()),
        ));
    }
    let block = Block::bordered()
        .title_top(Line::styled(
            pad(title(pager, view), 1),
            Style::default()
                .fg(theme.text())
                .add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(bottom))
        .border_style(Style::default().fg(theme.border()))
        .style(Style::default().bg(theme.panel_bg_alt()).fg(theme.text()));
    let inner = block.inner(area);

    let records = pager
        .current_page()
        .map(|page| page.records.as_slice())
        .unwrap_or_default();

    let [table_area, status_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);
    frame.render_widget(block, area);

    if records.is_empty() {
        let text = Paragraph::new(NO_ITEMS).style(Style::default().fg(theme.text_muted()));
        frame.render_widget(text, table_area);
    } else {
        let columns = view.columns();
        let rows: Vec<Vec<String>> = records.iter().map(|record| view.row(record)).collect();
        let widths: Vec<Constraint> = columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let widest = rows
                    .iter()
                    .map(|row| row.get(i).map(|cell| cell.width()).unwrap_or(0))
                    .max()
                    .unwrap_or(0)
                    .max(name.width());
                Constraint::Max(widest as u16 + 2)
            })
            .collect();

        let header = Row::new(columns.iter().cloned().map(Cell::from)).style(
            Style::default()
                .fg(theme.text_muted())
                .add_modifier(Modifier::BOLD),
        );
        let table = Table::new(rows.into_iter().map(Row::new), widths)
            .header(header)
            .highlight_spacing(HighlightSpacing::Always)
            .highlight_symbol(">> ")
            .row_highlight_style(
                Style::default()
                    .bg(theme.selection_bg())
                    .fg(theme.selection_fg()),
            );
        let mut state = TableState::default().with_selected(Some(view.selected()));
        frame.render_stateful_widget(table, table_area, &mut state);
    }

    if pager.is_loading() {
        let spinner = Throbber::default()
            .label("Loading next page...")
            .style(Style::default().fg(theme.warning()));
        frame.render_stateful_widget(spinner, status_area, throbber);
    }
}

#[cfg(test)]
mod tests {
    use dynaview::dynamodb::{KeyAttr, PageRequest, QueryResult, ScalarKind, TableInfo};
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::widgets::theme::Variant;

    fn table() -> TableInfo {
        TableInfo {
            name: "events".to_string(),
            status: "ACTIVE".to_string(),
            item_count: 0,
            size_bytes: 0,
            partition_key: Some(KeyAttr::new("id", ScalarKind::String)),
            sort_key: None,
            schema_fields: vec!["id".to_string()],
        }
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn paging_label_without_pages() {
        assert_eq!(paging_label(&Pager::new()), "no more pages");
    }

    #[test]
    fn empty_last_page_says_no_items() {
        let mut pager = Pager::new();
        let fetch = pager.first(PageRequest::Scan {
            table: "events".to_string(),
        });
        pager.complete(&fetch, Ok(QueryResult::default()));
        let mut view = ResultsView::new(table());
        if let Some(page) = pager.current_page() {
            view.show_page(page);
        }

        let theme = Theme::for_variant(Variant::Dark);
        let mut throbber = ThrobberState::default();
        let mut terminal = Terminal::new(TestBackend::new(60, 8)).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &pager, &view, &theme, &mut throbber))
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains(NO_ITEMS));
        assert!(text.contains("no more pages"));
        assert!(!text.contains("more available"));
        assert!(text.contains("Scan Results for events - Page 1"));
    }
}
