use std::borrow::Cow;

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use dynaview::navigation::ScreenKind;

mod widget;

pub use widget::Overlay;

use crate::widgets::theme::Theme;

#[derive(Clone, Debug)]
pub struct Entry<'a> {
    pub keys: Cow<'a, str>,
    pub short: Cow<'a, str>,
    pub long: Cow<'a, str>,
}

const fn entry(keys: &'static str, short: &'static str, long: &'static str) -> Entry<'static> {
    Entry {
        keys: Cow::Borrowed(keys),
        short: Cow::Borrowed(short),
        long: Cow::Borrowed(long),
    }
}

const HELP_TABLE_LIST: &[Entry<'static>] = &[
    entry("↑/↓/j/k", "move", "Move selection"),
    entry("⏎", "open", "Query or scan the table"),
    entry("^r", "refresh", "Reload the table list"),
    entry("q/esc", "quit", "Quit"),
];

const HELP_TABLE_ACTION: &[Entry<'static>] = &[
    entry("tab/⇧tab", "field", "Move between fields"),
    entry("←/→", "mode", "Switch Query/Scan, or change the operator"),
    entry("^q", "query", "Query mode"),
    entry("^s", "scan", "Scan mode"),
    entry("⏎", "run", "Run the query or scan"),
    entry("esc", "back", "Back to the table list"),
];

const HELP_RESULTS: &[Entry<'static>] = &[
    entry("↑/↓/j/k", "move", "Move selection"),
    entry("⏎", "open", "Show the full item"),
    entry("^n/→", "next", "Next page"),
    entry("^b/←", "prev", "Previous page"),
    entry("esc", "back", "Back to the query form"),
];

const HELP_ITEM_DETAIL: &[Entry<'static>] = &[
    entry("↑/↓/j/k", "move", "Move selection"),
    entry("⏎", "json", "Show a list or map field as JSON"),
    entry("^d", "export", "Save the item as JSON"),
    entry("esc", "back", "Back to the results"),
];

const HELP_JSON_FIELD: &[Entry<'static>] = &[
    entry("↑/↓/j/k", "scroll", "Scroll one line"),
    entry("space/PgDn", "page", "Scroll one page down"),
    entry("PgUp", "page up", "Scroll one page up"),
    entry("esc", "close", "Close the JSON view"),
];

const HELP_GLOBAL: &[Entry<'static>] = &[
    entry("F1", "help", "Toggle this help"),
    entry("^c", "quit", "Quit from anywhere"),
];

pub fn entries(kind: ScreenKind) -> Vec<&'static Entry<'static>> {
    let screen = match kind {
        ScreenKind::TableList => HELP_TABLE_LIST,
        ScreenKind::TableAction => HELP_TABLE_ACTION,
        ScreenKind::Results => HELP_RESULTS,
        ScreenKind::ItemDetail => HELP_ITEM_DETAIL,
        ScreenKind::JsonField => HELP_JSON_FIELD,
    };
    screen.iter().chain(HELP_GLOBAL.iter()).collect()
}

fn screen_title(kind: ScreenKind) -> &'static str {
    match kind {
        ScreenKind::TableList => "Table list",
        ScreenKind::TableAction => "Query/Scan form",
        ScreenKind::Results => "Results",
        ScreenKind::ItemDetail => "Item detail",
        ScreenKind::JsonField => "JSON viewer",
    }
}

/// Plain-text shortcut listing for `--help`.
pub fn shortcuts_text() -> String {
    let mut out = String::from("Keyboard shortcuts:\n");
    for kind in [
        ScreenKind::TableList,
        ScreenKind::TableAction,
        ScreenKind::Results,
        ScreenKind::ItemDetail,
        ScreenKind::JsonField,
    ] {
        out.push_str(&format!("\n  {}:\n", screen_title(kind)));
        let screen = entries(kind);
        for entry in screen.iter().take(screen.len() - HELP_GLOBAL.len()) {
            out.push_str(&format!("    {:<12} {}\n", entry.keys, entry.long));
        }
    }
    out.push_str("\n  Anywhere:\n");
    for entry in HELP_GLOBAL {
        out.push_str(&format!("    {:<12} {}\n", entry.keys, entry.long));
    }
    out
}

fn make_spans<'a>(entries: &[&'a Entry<'a>], theme: &Theme) -> Vec<Span<'a>> {
    let mut spans: Vec<_> = entries
        .iter()
        .flat_map(|&entry| {
            [
                Span::styled(format!("[{}]", entry.keys), Style::default().bold()),
                Span::raw(" "),
                Span::raw(entry.short.as_ref()),
                Span::styled(" • ", Style::default().fg(theme.text_muted())),
            ]
        })
        .collect();
    // trailing separator
    spans.pop();
    spans
}

/// Rows the footer needs at `area`'s width.
pub fn height(entries: &[&Entry<'_>], area: Rect) -> u16 {
    let theme = Theme::default();
    let total_width: usize = make_spans(entries, &theme)
        .iter()
        .map(|s| s.content.width())
        .sum();
    let available_width = (area.width as usize).max(1);
    total_width.div_ceil(available_width) as u16
}

pub fn render(entries: &[&Entry<'_>], frame: &mut Frame, area: Rect, theme: &Theme) {
    let spans = make_spans(entries, theme);
    let footer = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(theme.text()))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, area);
}
