use std::{
    fs,
    path::{Path, PathBuf},
};

use serde_json::Value;

use crate::dynamodb::table::TableInfo;
use crate::dynamodb::value::{Record, to_pretty_json};
use crate::error::ExportError;

/// Destination for exported bytes.
pub trait ExportSink {
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), ExportError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FsSink;

impl ExportSink for FsSink {
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
        fs::write(path, bytes).map_err(|source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// `<pk>[_<sk>].json`, built from the display form of the key values.
pub fn export_file_name(table: &TableInfo, record: &Record) -> String {
    let key_value = |name: Option<&str>| {
        name.and_then(|name| record.display(name))
            .unwrap_or("unknown")
            .to_string()
    };
    let mut name = key_value(table.partition_key_name());
    if table.sort_key_name().is_some() {
        name.push('_');
        name.push_str(&key_value(table.sort_key_name()));
    }
    format!("{}.json", sanitize_filename_component(&name))
}

pub fn sanitize_filename_component(raw: &str) -> String {
    raw.chars()
        .map(|ch| match ch {
            '/' | ' ' | ':' => '_',
            ch => ch,
        })
        .collect()
}

/// Writes the whole record, pretty printed, into `dir` and returns the path.
pub fn export_record(
    sink: &dyn ExportSink,
    dir: &Path,
    table: &TableInfo,
    record: &Record,
) -> Result<PathBuf, ExportError> {
    let path = dir.join(export_file_name(table, record));
    let payload = to_pretty_json(&Value::Object(record.raw_item().clone()))?;
    sink.write(&path, payload.as_bytes())?;
    tracing::debug!(path = %path.display(), table = %table.name, "exported item");
    Ok(path)
}
