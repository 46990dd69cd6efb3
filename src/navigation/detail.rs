use serde_json::Value;

use crate::dynamodb::table::TableInfo;
use crate::dynamodb::value::{Record, is_nested};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub name: String,
    pub value: String,
}

/// Schema fields present in the record, in schema order, then every other
/// attribute sorted by name. The record itself is left untouched.
pub fn detail_rows(table: &TableInfo, record: &Record) -> Vec<DetailRow> {
    let row = |name: &str| DetailRow {
        name: name.to_string(),
        value: record.display(name).unwrap_or_default().to_string(),
    };

    let mut rows: Vec<DetailRow> = table
        .schema_fields
        .iter()
        .filter(|name| record.contains(name))
        .map(|name| row(name))
        .collect();

    let mut rest: Vec<&str> = record
        .names()
        .filter(|name| !table.schema_fields.iter().any(|field| field == name))
        .collect();
    rest.sort_unstable();
    rows.extend(rest.into_iter().map(row));
    rows
}

#[derive(Debug, Clone)]
pub struct DetailView {
    table: TableInfo,
    record: Record,
    rows: Vec<DetailRow>,
    selected: usize,
}

impl DetailView {
    pub fn new(table: TableInfo, record: Record) -> Self {
        let rows = detail_rows(&table, &record);
        Self {
            table,
            record,
            rows,
            selected: 0,
        }
    }

    pub fn table(&self) -> &TableInfo {
        &self.table
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn rows(&self) -> &[DetailRow] {
        &self.rows
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_row(&self) -> Option<&DetailRow> {
        self.rows.get(self.selected)
    }

    /// The selected field's structured value, if it is a list or map.
    pub fn selected_nested(&self) -> Option<(&str, &Value)> {
        let row = self.selected_row()?;
        let value = self.record.raw(&row.name)?;
        is_nested(value).then_some((row.name.as_str(), value))
    }

    pub fn select_by(&mut self, delta: isize) {
        if self.rows.is_empty() {
            return;
        }
        let target = self.selected as isize + delta;
        self.selected = target.clamp(0, self.rows.len() as isize - 1) as usize;
    }
}
