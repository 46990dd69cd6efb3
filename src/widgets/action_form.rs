use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph, Wrap},
};
use throbber_widgets_tui::{Throbber, ThrobberState};

use dynaview::dynamodb::PAGE_SIZE;
use dynaview::navigation::{ActionForm, ActionMode, FormField};

use crate::{util::pad, widgets::theme::Theme};

const FIELD_HEIGHT: u16 = 3;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    form: &ActionForm,
    submitting: bool,
    theme: &Theme,
    throbber: &mut ThrobberState,
) {
    let block = Block::bordered()
        .title_top(Line::styled(
            pad(&form.table().name, 1),
            Style::default()
                .fg(theme.text())
                .add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(theme.border()))
        .style(Style::default().bg(theme.panel_bg()).fg(theme.text()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let fields = form.fields();
    let mut constraints = vec![Constraint::Length(2)];
    constraints.extend(fields.iter().map(|_| Constraint::Length(FIELD_HEIGHT)));
    constraints.push(Constraint::Fill(1));
    constraints.push(Constraint::Length(1));
    let areas = Layout::vertical(constraints).split(inner);

    frame.render_widget(mode_tabs(form.mode(), theme), areas[0]);
    for (i, field) in fields.iter().enumerate() {
        render_field(frame, areas[i + 1], form, *field, theme);
    }

    let body_area = areas[fields.len() + 1];
    if form.mode() == ActionMode::Scan {
        let text = Paragraph::new(format!(
            "Scan reads every item of {}, {PAGE_SIZE} per page.",
            form.table().name
        ))
        .style(Style::default().fg(theme.text_muted()))
        .wrap(Wrap { trim: true });
        frame.render_widget(text, body_area);
    }

    let status_area = areas[fields.len() + 2];
    if submitting {
        let label = match form.mode() {
            ActionMode::Query => "Running query...",
            ActionMode::Scan => "Running scan...",
        };
        let spinner = Throbber::default()
            .label(label)
            .style(Style::default().fg(theme.warning()));
        frame.render_stateful_widget(spinner, status_area, throbber);
    } else {
        let hint = Line::styled(
            format!("⏎ run {}", form.mode().label().to_lowercase()),
            Style::default().fg(theme.text_muted()),
        );
        frame.render_widget(hint, status_area);
    }
}

fn mode_tabs(mode: ActionMode, theme: &Theme) -> Line<'static> {
    let tab = |tab: ActionMode| {
        let style = if tab == mode {
            Style::default()
                .bg(theme.selection_bg())
                .fg(theme.selection_fg())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text_muted())
        };
        Span::styled(pad(tab.label(), 1), style)
    };
    Line::from(vec![tab(ActionMode::Query), Span::raw(" "), tab(ActionMode::Scan)])
}

fn render_field(frame: &mut Frame, area: Rect, form: &ActionForm, field: FormField, theme: &Theme) {
    let focused = form.focus() == field;
    let border = if focused {
        theme.accent()
    } else {
        theme.border()
    };
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .title(Line::styled(
            pad(form.label(field), 1),
            Style::default().fg(theme.text_muted()),
        ))
        .border_style(Style::default().fg(border));

    let value = form.value(field);
    let line = match field {
        FormField::Operator => Line::from(vec![
            Span::styled("‹ ", Style::default().fg(theme.text_muted())),
            Span::styled(
                value.to_string(),
                Style::default()
                    .fg(theme.accent_alt())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" ›", Style::default().fg(theme.text_muted())),
        ]),
        _ if focused => Line::from(vec![
            Span::styled(value.to_string(), Style::default().fg(theme.text())),
            Span::styled("▏", Style::default().fg(theme.accent())),
        ]),
        _ => Line::styled(value.to_string(), Style::default().fg(theme.text())),
    };
    frame.render_widget(Paragraph::new(line).block(block), area);
}
