use color_eyre::Result;
use humansize::{BINARY, format_size};
use serde::Serialize;

use dynaview::dynamodb::{Backend, RetrievalClient, TableInfo};

use crate::util::format_count;

pub struct Options {
    pub json: bool,
}

#[derive(Serialize)]
struct TableSummary<'a> {
    name: &'a str,
    status: &'a str,
    item_count: i64,
    size_bytes: i64,
    partition_key: Option<&'a str>,
    sort_key: Option<&'a str>,
}

impl<'a> From<&'a TableInfo> for TableSummary<'a> {
    fn from(table: &'a TableInfo) -> Self {
        Self {
            name: &table.name,
            status: &table.status,
            item_count: table.item_count,
            size_bytes: table.size_bytes,
            partition_key: table.partition_key_name(),
            sort_key: table.sort_key_name(),
        }
    }
}

pub async fn command<B: Backend>(client: &RetrievalClient<B>, options: Options) -> Result<()> {
    let tables = client.list_tables().await?;
    print!("{}", render(&tables, options.json)?);
    Ok(())
}

fn render(tables: &[TableInfo], json: bool) -> Result<String> {
    if json {
        let summaries: Vec<TableSummary> = tables.iter().map(TableSummary::from).collect();
        return Ok(format!("{}\n", serde_json::to_string(&summaries)?));
    }

    let width = tables.iter().map(|t| t.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for table in tables {
        let size = u64::try_from(table.size_bytes)
            .map(|bytes| format_size(bytes, BINARY))
            .unwrap_or_default();
        out.push_str(&format!(
            "{:<width$}  {:>12} items  {:>10}\n",
            table.name,
            format_count(table.item_count),
            size
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use dynaview::dynamodb::{KeyAttr, ScalarKind};

    use super::*;

    fn table(name: &str, items: i64) -> TableInfo {
        TableInfo {
            name: name.to_string(),
            status: "ACTIVE".to_string(),
            item_count: items,
            size_bytes: items * 100,
            partition_key: Some(KeyAttr::new("id", ScalarKind::String)),
            sort_key: None,
            schema_fields: vec!["id".to_string()],
        }
    }

    #[test]
    fn json_lists_tables_in_order() {
        let out = render(&[table("big", 5000), table("small", 1)], true).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        let names: Vec<&str> = parsed
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|t| t["name"].as_str())
            .collect();
        assert_eq!(names, vec!["big", "small"]);
        assert_eq!(parsed[0]["partition_key"], "id");
        assert!(parsed[0]["sort_key"].is_null());
    }

    #[test]
    fn plain_output_has_one_line_per_table() {
        let out = render(&[table("big", 5000), table("small", 1)], false).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("big  "));
        assert!(lines[0].contains("5,000 items"));
    }
}
