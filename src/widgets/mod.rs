use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
};
use throbber_widgets_tui::ThrobberState;

use dynaview::navigation::{Screen, Session};

use crate::{help, util::fill_bg};

pub mod action_form;
pub mod detail;
pub mod json_view;
pub mod notice;
pub mod results;
pub mod table_list;
pub mod theme;

use theme::Theme;

/// Draws the whole session and returns the rows available to the screen body.
pub fn draw(
    frame: &mut Frame,
    session: &Session,
    context: &str,
    theme: &Theme,
    throbber: &mut ThrobberState,
) -> u16 {
    let area = frame.area();
    fill_bg(frame.buffer_mut(), area, theme.bg());

    let entries = help::entries(session.kind());
    let footer_height = help::height(&entries, area);
    let [title_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(footer_height),
    ])
    .areas(area);

    frame.render_widget(title_line(session, context, theme), title_area);

    match session.top() {
        None => table_list::render(frame, body_area, session.table_list(), theme, throbber),
        Some(Screen::TableAction(form)) => action_form::render(
            frame,
            body_area,
            form,
            session.is_submitting(),
            theme,
            throbber,
        ),
        Some(Screen::Results(view)) => {
            results::render(frame, body_area, session.pager(), view, theme, throbber)
        }
        Some(Screen::ItemDetail(view)) => detail::render(frame, body_area, view, theme),
        Some(Screen::JsonField(view)) => json_view::render(frame, body_area, view, theme),
    }

    help::render(&entries, frame, footer_area, theme);

    if session.show_help() {
        help::Overlay::new(entries).render(frame, body_area, theme);
    }
    if let Some(notice) = session.notice() {
        notice::render(frame, body_area, notice, theme);
    }

    // borders, plus the header row on tabular screens
    let chrome = match session.top() {
        Some(Screen::JsonField(_) | Screen::TableAction(_)) => 2,
        _ => 3,
    };
    body_area.height.saturating_sub(chrome)
}

fn title_line<'a>(session: &'a Session, context: &'a str, theme: &Theme) -> Line<'a> {
    let mut spans = vec![Span::styled(
        "dynaview",
        Style::default()
            .fg(theme.accent())
            .add_modifier(Modifier::BOLD),
    )];
    let table = session.screens().iter().find_map(|screen| match screen {
        Screen::TableAction(form) => Some(form.table().name.as_str()),
        _ => None,
    });
    let crumbs = [Some(context), table].into_iter().flatten();
    for crumb in crumbs {
        spans.push(Span::styled(" › ", Style::default().fg(theme.text_muted())));
        spans.push(Span::styled(crumb, Style::default().fg(theme.text())));
    }
    Line::from(spans).centered()
}
