use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};

use dynaview::navigation::JsonFieldView;

use crate::{util::pad, widgets::theme::Theme};

pub fn render(frame: &mut Frame, area: Rect, view: &JsonFieldView, theme: &Theme) {
    let height = area.height.saturating_sub(2) as usize;
    let total = view.lines().len();
    let last = (view.offset() + height).min(total);
    let block = Block::bordered()
        .title_top(Line::styled(
            pad(view.field(), 1),
            Style::default()
                .fg(theme.text())
                .add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::styled(
            pad(format!("{}-{last} of {total}", view.offset() + 1), 1),
            Style::default().fg(theme.text_muted()),
        ))
        .border_style(Style::default().fg(theme.border()))
        .style(Style::default().bg(theme.panel_bg()).fg(theme.text()));

    let lines: Vec<Line> = view
        .visible(height)
        .iter()
        .map(|line| highlight(line, theme))
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Colors one line of pretty-printed JSON.
fn highlight(line: &str, theme: &Theme) -> Line<'static> {
    let trimmed = line.trim_start();
    let indent = &line[..line.len() - trimmed.len()];
    let mut spans = vec![Span::raw(indent.to_string())];

    let mut rest = trimmed;
    if let Some(end) = key_end(rest) {
        spans.push(Span::styled(
            rest[..end].to_string(),
            Style::default()
                .fg(theme.accent())
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(": ", Style::default().fg(theme.text_muted())));
        rest = &rest[end + 2..];
    }

    let (value, comma) = match rest.strip_suffix(',') {
        Some(value) => (value, ","),
        None => (rest, ""),
    };
    let style = match value.chars().next() {
        Some('"') => Style::default().fg(theme.success()),
        Some('-' | '0'..='9') => Style::default().fg(theme.accent_alt()),
        Some('t' | 'f' | 'n') => Style::default().fg(theme.warning()),
        _ => Style::default().fg(theme.text_muted()),
    };
    if !value.is_empty() {
        spans.push(Span::styled(value.to_string(), style));
    }
    if !comma.is_empty() {
        spans.push(Span::styled(comma, Style::default().fg(theme.text_muted())));
    }
    Line::from(spans)
}

/// Byte offset just past the closing quote of an object key, if `text`
/// starts with one.
fn key_end(text: &str) -> Option<usize> {
    if !text.starts_with('"') {
        return None;
    }
    let mut escaped = false;
    for (i, ch) in text.char_indices().skip(1) {
        match ch {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => {
                let end = i + 1;
                return text[end..].starts_with(": ").then_some(end);
            }
            _ => escaped = false,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &Line) -> Vec<String> {
        line.spans.iter().map(|span| span.content.to_string()).collect()
    }

    #[test]
    fn splits_key_value_and_comma() {
        let line = highlight(r#"    "name": "Ann","#, &Theme::dark());
        assert_eq!(texts(&line), vec!["    ", "\"name\"", ": ", "\"Ann\"", ","]);
    }

    #[test]
    fn array_elements_have_no_key() {
        let line = highlight(r#"    "a: b""#, &Theme::dark());
        assert_eq!(texts(&line), vec!["    ", "\"a: b\""]);
        let line = highlight("]", &Theme::dark());
        assert_eq!(texts(&line), vec!["", "]"]);
    }

    #[test]
    fn escaped_quotes_stay_inside_the_key() {
        assert_eq!(key_end(r#""a\"b": 1"#), Some(6));
        assert_eq!(key_end(r#""plain""#), None);
    }
}
