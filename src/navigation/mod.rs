//! Screen flow of the browser.
//!
//! [`Session`] owns every piece of navigation state and is driven by three
//! calls from the UI loop: [`Session::start`], [`Session::handle`] for user
//! [`Input`] and [`Session::apply`] for finished backend work. Each returns the
//! [`Command`]s the loop has to carry out. Backend calls never run inside the
//! session, so it can be exercised without a terminal or a network.

use std::path::PathBuf;

use crate::dynamodb::client::QueryResult;
use crate::dynamodb::table::TableInfo;
use crate::error::{BackendError, Error};
use crate::export::{ExportSink, FsSink, export_record};
use crate::pagination::{Advance, Completion, PageFetch, Pager};

pub mod detail;
pub mod form;
pub mod json_view;
pub mod results;

pub use detail::{DetailRow, DetailView, detail_rows};
pub use form::{ActionForm, ActionMode, FormField};
pub use json_view::JsonFieldView;
pub use results::{NO_ITEMS, ResultsView, preview_columns, truncate_cell};

/// Terminal-independent user intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Up,
    Down,
    PageUp,
    PageDown,
    Left,
    Right,
    NextField,
    PrevField,
    Char(char),
    Backspace,
    Submit,
    Back,
    Quit,
    QueryMode,
    ScanMode,
    NextPage,
    PrevPage,
    Export,
    Refresh,
    Help,
}

/// Work the UI loop performs on behalf of the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadTables { request_id: u64 },
    FetchPage(PageFetch),
    Invalidate,
    Quit,
}

/// Completion of a command, posted back by the task that ran it.
#[derive(Debug)]
pub enum Message {
    TablesLoaded {
        request_id: u64,
        result: Result<Vec<TableInfo>, BackendError>,
    },
    PageLoaded {
        fetch: PageFetch,
        result: Result<QueryResult, Error>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadingState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error(String),
}

#[derive(Debug, Clone, Default)]
pub struct TableList {
    loading: LoadingState,
    tables: Vec<TableInfo>,
    selected: usize,
}

impl TableList {
    pub fn loading(&self) -> &LoadingState {
        &self.loading
    }

    pub fn tables(&self) -> &[TableInfo] {
        &self.tables
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_table(&self) -> Option<&TableInfo> {
        self.tables.get(self.selected)
    }

    fn select_by(&mut self, delta: isize) {
        if self.tables.is_empty() {
            return;
        }
        let target = self.selected as isize + delta;
        self.selected = target.clamp(0, self.tables.len() as isize - 1) as usize;
    }
}

/// Screens stacked above the table list.
#[derive(Debug, Clone)]
pub enum Screen {
    TableAction(ActionForm),
    Results(ResultsView),
    ItemDetail(DetailView),
    JsonField(JsonFieldView),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    TableList,
    TableAction,
    Results,
    ItemDetail,
    JsonField,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Dismissible message shown over the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

const DEFAULT_VIEWPORT_HEIGHT: usize = 20;

pub struct Session {
    table_list: TableList,
    stack: Vec<Screen>,
    pager: Pager,
    notice: Option<Notice>,
    show_help: bool,
    request_seq: u64,
    viewport_height: usize,
    export_dir: PathBuf,
    sink: Box<dyn ExportSink + Send>,
}

impl Session {
    pub fn new(export_dir: PathBuf) -> Self {
        Self::with_sink(export_dir, Box::new(FsSink))
    }

    pub fn with_sink(export_dir: PathBuf, sink: Box<dyn ExportSink + Send>) -> Self {
        Self {
            table_list: TableList::default(),
            stack: Vec::new(),
            pager: Pager::new(),
            notice: None,
            show_help: false,
            request_seq: 0,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            export_dir,
            sink,
        }
    }

    /// Kicks off the initial table listing.
    pub fn start(&mut self) -> Vec<Command> {
        vec![self.reload_tables(), Command::Invalidate]
    }

    pub fn table_list(&self) -> &TableList {
        &self.table_list
    }

    pub fn screens(&self) -> &[Screen] {
        &self.stack
    }

    pub fn top(&self) -> Option<&Screen> {
        self.stack.last()
    }

    pub fn kind(&self) -> ScreenKind {
        match self.stack.last() {
            None => ScreenKind::TableList,
            Some(Screen::TableAction(_)) => ScreenKind::TableAction,
            Some(Screen::Results(_)) => ScreenKind::Results,
            Some(Screen::ItemDetail(_)) => ScreenKind::ItemDetail,
            Some(Screen::JsonField(_)) => ScreenKind::JsonField,
        }
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    /// True while the action form waits for its first page.
    pub fn is_submitting(&self) -> bool {
        self.kind() == ScreenKind::TableAction && self.pager.is_loading()
    }

    /// Rows available to the body of the current screen; drives paging.
    pub fn set_viewport_height(&mut self, rows: usize) {
        self.viewport_height = rows.max(1);
    }

    pub fn handle(&mut self, input: Input) -> Vec<Command> {
        let mut commands = Vec::new();
        if input == Input::Quit {
            commands.push(Command::Quit);
            return commands;
        }
        if self.notice.take().is_some() || (self.show_help && input != Input::Help) {
            self.show_help = false;
            commands.push(Command::Invalidate);
            return commands;
        }
        if input == Input::Help {
            self.show_help = !self.show_help;
            commands.push(Command::Invalidate);
            return commands;
        }

        let handled = match self.kind() {
            ScreenKind::TableList => self.handle_table_list(input, &mut commands),
            ScreenKind::TableAction => self.handle_table_action(input, &mut commands),
            ScreenKind::Results => self.handle_results(input, &mut commands),
            ScreenKind::ItemDetail => self.handle_item_detail(input),
            ScreenKind::JsonField => self.handle_json_field(input),
        };
        if handled {
            commands.push(Command::Invalidate);
        }
        commands
    }

    pub fn apply(&mut self, message: Message) -> Vec<Command> {
        let changed = match message {
            Message::TablesLoaded { request_id, result } => {
                self.apply_tables(request_id, result)
            }
            Message::PageLoaded { fetch, result } => self.apply_page(&fetch, result),
        };
        if changed {
            vec![Command::Invalidate]
        } else {
            Vec::new()
        }
    }

    fn reload_tables(&mut self) -> Command {
        self.request_seq += 1;
        self.table_list.loading = LoadingState::Loading;
        tracing::debug!(request_id = self.request_seq, "load_tables");
        Command::LoadTables {
            request_id: self.request_seq,
        }
    }

    fn apply_tables(
        &mut self,
        request_id: u64,
        result: Result<Vec<TableInfo>, BackendError>,
    ) -> bool {
        if request_id != self.request_seq {
            tracing::debug!(request_id, active = self.request_seq, "stale table list");
            return false;
        }
        match result {
            Ok(tables) => {
                tracing::debug!(tables = tables.len(), "tables_loaded");
                let last = tables.len().saturating_sub(1);
                self.table_list.tables = tables;
                self.table_list.loading = LoadingState::Loaded;
                self.table_list.selected = self.table_list.selected.min(last);
            }
            Err(err) => {
                tracing::error!(error = %err, "list_tables_failed");
                self.table_list.loading = LoadingState::Error(err.to_string());
                self.notice = Some(Notice::error("Failed to list tables", err.to_string()));
            }
        }
        true
    }

    fn apply_page(&mut self, fetch: &PageFetch, result: Result<QueryResult, Error>) -> bool {
        match self.pager.complete(fetch, result) {
            Completion::Stale => false,
            Completion::Applied => {
                let Some(page) = self.pager.current_page() else {
                    return false;
                };
                if fetch.page == 1 {
                    let Some(Screen::TableAction(form)) = self.stack.last() else {
                        return false;
                    };
                    let mut view = ResultsView::new(form.table().clone());
                    view.show_page(page);
                    tracing::debug!(table = %form.table().name, "push_results");
                    self.stack.push(Screen::Results(view));
                } else if let Some(view) = results_view_mut(&mut self.stack) {
                    // the page may land while a detail screen is on top
                    view.show_page(page);
                }
                true
            }
            Completion::Failed(err) => {
                tracing::error!(
                    table = %fetch.request.table_name(),
                    page = fetch.page,
                    error = %err,
                    "fetch_page_failed"
                );
                let title = format!("{} failed", fetch.request.label());
                self.notice = Some(Notice::error(title, err.to_string()));
                true
            }
        }
    }

    fn handle_table_list(&mut self, input: Input, commands: &mut Vec<Command>) -> bool {
        let page = self.viewport_height as isize;
        match input {
            Input::Down | Input::Char('j') => self.table_list.select_by(1),
            Input::Up | Input::Char('k') => self.table_list.select_by(-1),
            Input::PageDown => self.table_list.select_by(page),
            Input::PageUp => self.table_list.select_by(-page),
            Input::Refresh | Input::Char('r') => commands.push(self.reload_tables()),
            Input::Back | Input::Char('q') => commands.push(Command::Quit),
            Input::Char('?') => self.show_help = true,
            Input::Submit => {
                if self.table_list.loading != LoadingState::Loaded {
                    return false;
                }
                let Some(table) = self.table_list.selected_table() else {
                    return false;
                };
                tracing::debug!(table = %table.name, "open_table");
                self.stack.push(Screen::TableAction(ActionForm::new(table.clone())));
            }
            _ => return false,
        }
        true
    }

    fn handle_table_action(&mut self, input: Input, commands: &mut Vec<Command>) -> bool {
        if self.pager.is_loading() {
            match input {
                Input::Submit => self.submit(commands),
                Input::Back => self.pager.abandon(),
                _ => return false,
            }
            return true;
        }
        match input {
            Input::Submit => self.submit(commands),
            Input::Back => {
                self.stack.pop();
            }
            input => {
                let Some(Screen::TableAction(form)) = self.stack.last_mut() else {
                    return false;
                };
                return form.edit(input);
            }
        }
        true
    }

    fn submit(&mut self, commands: &mut Vec<Command>) {
        let Some(Screen::TableAction(form)) = self.stack.last() else {
            return;
        };
        match form.request() {
            Ok(request) => {
                let fetch = self.pager.first(request);
                commands.push(Command::FetchPage(fetch));
            }
            Err(err) => {
                tracing::debug!(error = %err, "invalid_request");
                self.notice = Some(Notice::error("Invalid query", err.to_string()));
            }
        }
    }

    fn handle_results(&mut self, input: Input, commands: &mut Vec<Command>) -> bool {
        let len = self
            .pager
            .current_page()
            .map(|page| page.records.len())
            .unwrap_or(0);
        let page = self.viewport_height as isize;
        let Some(Screen::Results(view)) = self.stack.last_mut() else {
            return false;
        };
        match input {
            Input::Down | Input::Char('j') => view.select_next(len),
            Input::Up | Input::Char('k') => view.select_previous(),
            Input::PageDown => view.select_by(page, len),
            Input::PageUp => view.select_by(-page, len),
            Input::NextPage | Input::Right => match self.pager.next() {
                Advance::Cached => {
                    if let Some(page) = self.pager.current_page() {
                        view.show_page(page);
                    }
                }
                Advance::Fetch(fetch) => commands.push(Command::FetchPage(fetch)),
                Advance::End | Advance::InFlight => return false,
            },
            Input::PrevPage | Input::Left => match self.pager.previous() {
                Some(page) => view.show_page(page),
                None => return false,
            },
            Input::Submit => {
                let Some(record) = self
                    .pager
                    .current_page()
                    .and_then(|page| page.records.get(view.selected()))
                else {
                    return false;
                };
                let detail = DetailView::new(view.table().clone(), record.clone());
                self.stack.push(Screen::ItemDetail(detail));
            }
            Input::Back => {
                self.pager.abandon();
                self.stack.pop();
            }
            _ => return false,
        }
        true
    }

    fn handle_item_detail(&mut self, input: Input) -> bool {
        let page = self.viewport_height as isize;
        let Some(Screen::ItemDetail(view)) = self.stack.last_mut() else {
            return false;
        };
        match input {
            Input::Down | Input::Char('j') => view.select_by(1),
            Input::Up | Input::Char('k') => view.select_by(-1),
            Input::PageDown => view.select_by(page),
            Input::PageUp => view.select_by(-page),
            Input::Submit => {
                let Some((field, value)) = view.selected_nested() else {
                    return false;
                };
                match JsonFieldView::new(field, value) {
                    Ok(json) => self.stack.push(Screen::JsonField(json)),
                    Err(err) => {
                        self.notice = Some(Notice::error("Cannot display field", err.to_string()))
                    }
                }
            }
            Input::Export => {
                let notice = match export_record(
                    self.sink.as_ref(),
                    &self.export_dir,
                    view.table(),
                    view.record(),
                ) {
                    Ok(path) => Notice::info("Exported", format!("Saved {}", path.display())),
                    Err(err) => {
                        tracing::error!(error = %err, "export_failed");
                        Notice::error("Export failed", err.to_string())
                    }
                };
                self.notice = Some(notice);
            }
            Input::Back => {
                self.stack.pop();
            }
            _ => return false,
        }
        true
    }

    fn handle_json_field(&mut self, input: Input) -> bool {
        let height = self.viewport_height;
        let Some(Screen::JsonField(view)) = self.stack.last_mut() else {
            return false;
        };
        match input {
            Input::Down | Input::Char('j') => view.scroll(1, height),
            Input::Up | Input::Char('k') => view.scroll(-1, height),
            Input::PageDown | Input::Char(' ') => view.page_down(height),
            Input::PageUp => view.page_up(height),
            Input::Back => {
                self.stack.pop();
            }
            _ => return false,
        }
        true
    }
}

fn results_view_mut(stack: &mut [Screen]) -> Option<&mut ResultsView> {
    stack.iter_mut().rev().find_map(|screen| match screen {
        Screen::Results(view) => Some(view),
        _ => None,
    })
}
