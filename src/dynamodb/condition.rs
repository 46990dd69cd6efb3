use std::{collections::HashMap, fmt, str::FromStr};

use aws_sdk_dynamodb::types::AttributeValue;

use super::table::{KeyAttr, ScalarKind};
use crate::error::ConfigError;

const PARTITION_NAME: &str = "#pk";
const PARTITION_VALUE: &str = ":pk";
const SORT_NAME: &str = "#sk";
const SORT_VALUE: &str = ":sk";
const SORT_UPPER_VALUE: &str = ":sk2";

/// Comparison applied to the sort key of a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum KeyOperator {
    #[default]
    Eq,
    BeginsWith,
    Lt,
    Le,
    Gt,
    Ge,
    Between,
}

impl KeyOperator {
    /// Operators in the order the form cycles through them.
    pub const ALL: [KeyOperator; 7] = [
        KeyOperator::Eq,
        KeyOperator::BeginsWith,
        KeyOperator::Lt,
        KeyOperator::Le,
        KeyOperator::Gt,
        KeyOperator::Ge,
        KeyOperator::Between,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyOperator::Eq => "=",
            KeyOperator::BeginsWith => "begins_with",
            KeyOperator::Lt => "<",
            KeyOperator::Le => "<=",
            KeyOperator::Gt => ">",
            KeyOperator::Ge => ">=",
            KeyOperator::Between => "between",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|op| *op == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let idx = Self::ALL.iter().position(|op| *op == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn needs_upper_bound(&self) -> bool {
        matches!(self, KeyOperator::Between)
    }
}

impl fmt::Display for KeyOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyOperator {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ConfigError::UnknownOperator(trimmed.to_string()))
    }
}

/// A key attribute together with the text entered for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub attr: KeyAttr,
    pub value: String,
}

impl KeyValue {
    pub fn new(attr: KeyAttr, value: impl Into<String>) -> Self {
        Self {
            attr,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortCondition {
    pub attr: KeyAttr,
    pub operator: KeyOperator,
    pub value: String,
    /// Upper bound, only read for `between`.
    pub upper: Option<String>,
}

impl SortCondition {
    pub fn new(attr: KeyAttr, operator: KeyOperator, value: impl Into<String>) -> Self {
        Self {
            attr,
            operator,
            value: value.into(),
            upper: None,
        }
    }

    pub fn with_upper(mut self, upper: impl Into<String>) -> Self {
        self.upper = Some(upper.into());
        self
    }

    fn is_blank(&self) -> bool {
        let upper_blank = self.upper.as_deref().is_none_or(|upper| upper.trim().is_empty());
        self.value.trim().is_empty() && (!self.operator.needs_upper_bound() || upper_blank)
    }
}

/// A key condition ready to hand to `Query`: the expression only ever refers
/// to placeholders, the real names and values live in the two tables.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyConditionExpression {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

impl KeyConditionExpression {
    pub fn build(
        partition: &KeyValue,
        sort: Option<&SortCondition>,
    ) -> Result<Self, ConfigError> {
        if partition.value.trim().is_empty() {
            return Err(ConfigError::MissingPartitionValue(
                partition.attr.name.clone(),
            ));
        }

        let mut names = HashMap::new();
        let mut values = HashMap::new();
        names.insert(PARTITION_NAME.to_string(), partition.attr.name.clone());
        values.insert(
            PARTITION_VALUE.to_string(),
            bind_value(&partition.attr, &partition.value)?,
        );
        let mut expression = format!("{PARTITION_NAME} = {PARTITION_VALUE}");

        // blank sort value means the caller only wants the partition,
        // except for a between that already has one of its bounds
        if let Some(sort) = sort.filter(|sort| !sort.is_blank()) {
            let clause = sort_clause(sort, &mut values)?;
            names.insert(SORT_NAME.to_string(), sort.attr.name.clone());
            expression.push_str(" AND ");
            expression.push_str(&clause);
        }

        Ok(Self {
            expression,
            names,
            values,
        })
    }
}

fn sort_clause(
    sort: &SortCondition,
    values: &mut HashMap<String, AttributeValue>,
) -> Result<String, ConfigError> {
    let clause = match sort.operator {
        KeyOperator::BeginsWith => {
            if sort.attr.kind == ScalarKind::Number {
                return Err(ConfigError::InvalidOperator {
                    operator: sort.operator.to_string(),
                    attribute: sort.attr.name.clone(),
                });
            }
            format!("begins_with({SORT_NAME}, {SORT_VALUE})")
        }
        KeyOperator::Between => {
            if sort.value.trim().is_empty() {
                return Err(ConfigError::MissingLowerBound(sort.attr.name.clone()));
            }
            let upper = sort
                .upper
                .as_deref()
                .map(str::trim)
                .filter(|upper| !upper.is_empty())
                .ok_or_else(|| ConfigError::MissingUpperBound(sort.attr.name.clone()))?;
            values.insert(SORT_UPPER_VALUE.to_string(), bind_value(&sort.attr, upper)?);
            format!("{SORT_NAME} BETWEEN {SORT_VALUE} AND {SORT_UPPER_VALUE}")
        }
        op => format!("{SORT_NAME} {op} {SORT_VALUE}"),
    };
    values.insert(SORT_VALUE.to_string(), bind_value(&sort.attr, &sort.value)?);
    Ok(clause)
}

fn bind_value(attr: &KeyAttr, raw: &str) -> Result<AttributeValue, ConfigError> {
    match attr.kind {
        ScalarKind::String => Ok(AttributeValue::S(raw.to_string())),
        ScalarKind::Number => {
            let trimmed = raw.trim();
            if trimmed.parse::<f64>().is_err() {
                return Err(ConfigError::InvalidNumber {
                    attribute: attr.name.clone(),
                    value: raw.to_string(),
                });
            }
            Ok(AttributeValue::N(trimmed.to_string()))
        }
        ScalarKind::Binary => Err(ConfigError::UnsupportedKeyType(attr.name.clone())),
    }
}
