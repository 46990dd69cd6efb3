use crate::dynamodb::client::{PageRequest, QueryParams};
use crate::dynamodb::condition::{KeyOperator, KeyValue, SortCondition};
use crate::dynamodb::table::TableInfo;
use crate::error::ConfigError;

use super::Input;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionMode {
    Query,
    Scan,
}

impl ActionMode {
    pub fn label(&self) -> &'static str {
        match self {
            ActionMode::Query => "Query",
            ActionMode::Scan => "Scan",
        }
    }

    fn toggled(self) -> Self {
        match self {
            ActionMode::Query => ActionMode::Scan,
            ActionMode::Scan => ActionMode::Query,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Partition,
    Operator,
    Sort,
    /// Upper bound, only shown for `between`.
    Upper,
}

/// Query/scan form for one table. Values survive mode switches.
#[derive(Debug, Clone)]
pub struct ActionForm {
    table: TableInfo,
    mode: ActionMode,
    partition: String,
    operator: KeyOperator,
    sort: String,
    upper: String,
    focus: FormField,
}

impl ActionForm {
    pub fn new(table: TableInfo) -> Self {
        let mode = if table.sort_key.is_some() {
            ActionMode::Query
        } else {
            ActionMode::Scan
        };
        Self {
            table,
            mode,
            partition: String::new(),
            operator: KeyOperator::default(),
            sort: String::new(),
            upper: String::new(),
            focus: FormField::Partition,
        }
    }

    pub fn table(&self) -> &TableInfo {
        &self.table
    }

    pub fn mode(&self) -> ActionMode {
        self.mode
    }

    pub fn operator(&self) -> KeyOperator {
        self.operator
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    pub fn set_mode(&mut self, mode: ActionMode) {
        self.mode = mode;
        self.fix_focus();
    }

    /// Fields shown in the current mode, top to bottom.
    pub fn fields(&self) -> Vec<FormField> {
        if self.mode == ActionMode::Scan {
            return Vec::new();
        }
        let mut fields = vec![FormField::Partition];
        if self.table.sort_key.is_some() {
            fields.push(FormField::Operator);
            fields.push(FormField::Sort);
            if self.operator.needs_upper_bound() {
                fields.push(FormField::Upper);
            }
        }
        fields
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Partition => &self.partition,
            FormField::Operator => self.operator.as_str(),
            FormField::Sort => &self.sort,
            FormField::Upper => &self.upper,
        }
    }

    pub fn label(&self, field: FormField) -> String {
        match field {
            FormField::Partition => self
                .table
                .partition_key
                .as_ref()
                .map(|key| format!("{} ({})", key.name, key.kind.label()))
                .unwrap_or_else(|| "partition key".to_string()),
            FormField::Operator => "operator".to_string(),
            FormField::Sort => self
                .table
                .sort_key
                .as_ref()
                .map(|key| format!("{} ({})", key.name, key.kind.label()))
                .unwrap_or_else(|| "sort key".to_string()),
            FormField::Upper => "and".to_string(),
        }
    }

    /// Applies an editing input. Returns false for inputs the form does not
    /// use, leaving them to the caller.
    pub fn edit(&mut self, input: Input) -> bool {
        match input {
            Input::QueryMode => self.set_mode(ActionMode::Query),
            Input::ScanMode => self.set_mode(ActionMode::Scan),
            Input::Left | Input::Right
                if self.mode == ActionMode::Query && self.focus == FormField::Operator =>
            {
                self.operator = if input == Input::Right {
                    self.operator.next()
                } else {
                    self.operator.previous()
                };
                self.fix_focus();
            }
            Input::Left | Input::Right => self.set_mode(self.mode.toggled()),
            Input::NextField | Input::Down => self.move_focus(1),
            Input::PrevField | Input::Up => self.move_focus(-1),
            Input::Char(c) => match self.focused_text() {
                Some(text) => text.push(c),
                None => return false,
            },
            Input::Backspace => {
                if let Some(text) = self.focused_text() {
                    text.pop();
                }
            }
            _ => return false,
        }
        true
    }

    /// The request this form describes, validated before anything is sent.
    pub fn request(&self) -> Result<PageRequest, ConfigError> {
        if self.mode == ActionMode::Scan {
            return Ok(PageRequest::Scan {
                table: self.table.name.clone(),
            });
        }
        let partition_key = self
            .table
            .partition_key
            .clone()
            .ok_or_else(|| ConfigError::NoPartitionKey(self.table.name.clone()))?;
        let sort = self.table.sort_key.clone().map(|attr| {
            let condition = SortCondition::new(attr, self.operator, self.sort.clone());
            if self.operator.needs_upper_bound() {
                condition.with_upper(self.upper.clone())
            } else {
                condition
            }
        });
        let params = QueryParams {
            table: self.table.name.clone(),
            partition: KeyValue::new(partition_key, self.partition.clone()),
            sort,
        };
        params.condition()?;
        Ok(PageRequest::Query(params))
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        if self.mode == ActionMode::Scan {
            return None;
        }
        match self.focus {
            FormField::Partition => Some(&mut self.partition),
            FormField::Sort => Some(&mut self.sort),
            FormField::Upper => Some(&mut self.upper),
            FormField::Operator => None,
        }
    }

    fn move_focus(&mut self, delta: isize) {
        let fields = self.fields();
        if fields.is_empty() {
            return;
        }
        let current = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        let len = fields.len() as isize;
        let next = (current as isize + delta).rem_euclid(len) as usize;
        self.focus = fields[next];
    }

    fn fix_focus(&mut self) {
        let fields = self.fields();
        if !fields.is_empty() && !fields.contains(&self.focus) {
            self.focus = if fields.contains(&FormField::Sort) {
                FormField::Sort
            } else {
                FormField::Partition
            };
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::dynamodb::table::{KeyAttr, ScalarKind};

    pub(crate) fn events_table() -> TableInfo {
        TableInfo {
            name: "events".to_string(),
            status: "ACTIVE".to_string(),
            item_count: 10,
            size_bytes: 2048,
            partition_key: Some(KeyAttr::new("id", ScalarKind::String)),
            sort_key: Some(KeyAttr::new("ts", ScalarKind::String)),
            schema_fields: vec!["id".to_string(), "ts".to_string()],
        }
    }

    fn type_text(form: &mut ActionForm, text: &str) {
        for c in text.chars() {
            assert!(form.edit(Input::Char(c)));
        }
    }

    #[test]
    fn defaults_to_query_only_with_a_sort_key() {
        assert_eq!(ActionForm::new(events_table()).mode(), ActionMode::Query);
        let mut table = events_table();
        table.sort_key = None;
        assert_eq!(ActionForm::new(table).mode(), ActionMode::Scan);
    }

    #[test]
    fn values_survive_mode_switches() {
        let mut form = ActionForm::new(events_table());
        type_text(&mut form, "u1");
        form.edit(Input::ScanMode);
        assert!(form.fields().is_empty());
        assert!(!form.edit(Input::Char('x')));
        form.edit(Input::Right);
        assert_eq!(form.mode(), ActionMode::Query);
        assert_eq!(form.value(FormField::Partition), "u1");
    }

    #[test]
    fn upper_bound_field_follows_the_operator() {
        let mut form = ActionForm::new(events_table());
        form.edit(Input::NextField);
        assert_eq!(form.focus(), FormField::Operator);
        form.edit(Input::Left);
        assert_eq!(form.operator(), KeyOperator::Between);
        assert_eq!(
            form.fields(),
            vec![
                FormField::Partition,
                FormField::Operator,
                FormField::Sort,
                FormField::Upper
            ]
        );
        form.edit(Input::Right);
        assert_eq!(form.operator(), KeyOperator::Eq);
        assert!(!form.fields().contains(&FormField::Upper));
    }

    #[test]
    fn builds_a_query_request() {
        let mut form = ActionForm::new(events_table());
        type_text(&mut form, "u1");
        form.edit(Input::NextField);
        while form.operator() != KeyOperator::Ge {
            form.edit(Input::Right);
        }
        form.edit(Input::NextField);
        type_text(&mut form, "2024-01-01");

        let PageRequest::Query(params) = form.request().unwrap() else {
            panic!("expected a query");
        };
        assert_eq!(params.partition.value, "u1");
        assert_eq!(
            params.condition().unwrap().expression,
            "#pk = :pk AND #sk >= :sk"
        );
    }

    #[test]
    fn missing_partition_value_is_a_config_error() {
        let form = ActionForm::new(events_table());
        assert_eq!(
            form.request().unwrap_err(),
            ConfigError::MissingPartitionValue("id".to_string())
        );
    }

    #[test]
    fn backspace_edits_the_focused_field() {
        let mut form = ActionForm::new(events_table());
        type_text(&mut form, "abc");
        form.edit(Input::Backspace);
        assert_eq!(form.value(FormField::Partition), "ab");
    }
}
