use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::dynamodb::table::TableInfo;
use crate::dynamodb::value::Record;
use crate::pagination::PageState;

/// Attributes worth showing next to the keys, highest priority first.
pub const PREVIEW_FIELDS: [&str; 5] = ["title", "name", "displayName", "description", "email"];
pub const MAX_PREVIEW_COLUMNS: usize = 2;
pub const MAX_CELL_WIDTH: usize = 50;
pub const NO_ITEMS: &str = "No items found.";

/// Preview attributes present in `record`, skipping key columns.
pub fn preview_columns(table: &TableInfo, record: &Record) -> Vec<String> {
    PREVIEW_FIELDS
        .iter()
        .filter(|field| !table.is_key_attribute(field))
        .filter(|field| record.contains(field))
        .take(MAX_PREVIEW_COLUMNS)
        .map(|field| field.to_string())
        .collect()
}

pub fn truncate_cell(value: &str) -> String {
    if value.width() <= MAX_CELL_WIDTH {
        return value.to_string();
    }
    let keep = MAX_CELL_WIDTH - 3;
    let mut out = String::with_capacity(MAX_CELL_WIDTH);
    let mut width = 0;
    for ch in value.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > keep {
            break;
        }
        width += ch_width;
        out.push(ch);
    }
    out.push_str("...");
    out
}

/// Column layout and cursor for the results screen. The rows themselves live
/// in the pager.
#[derive(Debug, Clone)]
pub struct ResultsView {
    table: TableInfo,
    preview: Option<Vec<String>>,
    selected: usize,
}

impl ResultsView {
    pub fn new(table: TableInfo) -> Self {
        Self {
            table,
            preview: None,
            selected: 0,
        }
    }

    pub fn table(&self) -> &TableInfo {
        &self.table
    }

    /// Called whenever a page becomes current. Preview columns are picked
    /// from the first non-empty page and then kept for the whole history.
    pub fn show_page(&mut self, page: &PageState) {
        self.selected = 0;
        if self.preview.is_none()
            && let Some(first) = page.records.first()
        {
            self.preview = Some(preview_columns(&self.table, first));
        }
    }

    pub fn columns(&self) -> Vec<String> {
        let mut columns = Vec::new();
        if let Some(name) = self.table.partition_key_name() {
            columns.push(name.to_string());
        }
        if let Some(name) = self.table.sort_key_name() {
            columns.push(name.to_string());
        }
        if let Some(preview) = self.preview.as_ref() {
            columns.extend(preview.iter().cloned());
        }
        columns
    }

    pub fn row(&self, record: &Record) -> Vec<String> {
        self.columns()
            .iter()
            .map(|column| truncate_cell(record.display(column).unwrap_or("")))
            .collect()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_by(&mut self, delta: isize, len: usize) {
        if len == 0 {
            return;
        }
        let target = self.selected as isize + delta;
        self.selected = target.clamp(0, len as isize - 1) as usize;
    }
}
