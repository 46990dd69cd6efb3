//! Conversions from DynamoDB attribute values into the two forms the browser
//! works with: a display string for tables and a `serde_json::Value` for the
//! structured views and JSON export.

use std::collections::HashMap;
use std::io::ErrorKind;

use aws_sdk_dynamodb::types::AttributeValue;
use serde::Serialize;
use serde_json::{Map, Number, Value};

/// An item as returned by the backend.
pub type Item = HashMap<String, AttributeValue>;

/// Closed view of a DynamoDB attribute value.
///
/// The SDK enum is non-exhaustive; anything it adds later lands in
/// [`Attr::Unknown`], so every match over `Attr` stays exhaustive.
#[derive(Debug, Clone, PartialEq)]
pub enum Attr {
    S(String),
    N(String),
    Bool(bool),
    Null,
    /// Only the length of binary content is kept.
    B(usize),
    L(Vec<Attr>),
    M(HashMap<String, Attr>),
    Ss(Vec<String>),
    Ns(Vec<String>),
    Bs(Vec<usize>),
    Unknown,
}

impl From<&AttributeValue> for Attr {
    fn from(value: &AttributeValue) -> Self {
        match value {
            AttributeValue::S(text) => Attr::S(text.clone()),
            AttributeValue::N(number) => Attr::N(number.clone()),
            AttributeValue::Bool(value) => Attr::Bool(*value),
            AttributeValue::Null(_) => Attr::Null,
            AttributeValue::B(blob) => Attr::B(blob.as_ref().len()),
            AttributeValue::L(list) => Attr::L(list.iter().map(Attr::from).collect()),
            AttributeValue::M(map) => Attr::M(
                map.iter()
                    .map(|(key, value)| (key.clone(), Attr::from(value)))
                    .collect(),
            ),
            AttributeValue::Ss(set) => Attr::Ss(set.clone()),
            AttributeValue::Ns(set) => Attr::Ns(set.clone()),
            AttributeValue::Bs(set) => Attr::Bs(set.iter().map(|b| b.as_ref().len()).collect()),
            _ => Attr::Unknown,
        }
    }
}

fn binary_placeholder(len: usize) -> String {
    format!("<binary: {len} bytes>")
}

/// Human-readable rendering used by the result and detail tables.
///
/// Map keys are sorted so equal values always render the same string.
pub fn display_string(value: &Attr) -> String {
    match value {
        Attr::S(text) => text.clone(),
        Attr::N(number) => number.clone(),
        Attr::Bool(value) => value.to_string(),
        Attr::Null => "null".to_string(),
        Attr::B(len) => binary_placeholder(*len),
        Attr::L(list) => {
            let parts: Vec<String> = list.iter().map(display_string).collect();
            format!("[{}]", parts.join(", "))
        }
        Attr::M(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let parts: Vec<String> = keys
                .into_iter()
                .map(|key| format!("{key}: {}", display_string(&map[key])))
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
        Attr::Ss(set) | Attr::Ns(set) => format!("[{}]", set.join(", ")),
        Attr::Bs(set) => {
            let parts: Vec<String> = set.iter().map(|len| binary_placeholder(*len)).collect();
            format!("[{}]", parts.join(", "))
        }
        Attr::Unknown => "unknown".to_string(),
    }
}

/// Structured value used for JSON views and export.
///
/// Binary content is reduced to a `<binary: N bytes>` placeholder; nothing
/// downstream needs the bytes.
pub fn to_native(value: &Attr) -> Value {
    match value {
        Attr::S(text) => Value::String(text.clone()),
        Attr::N(number) => number_to_native(number),
        Attr::Bool(value) => Value::Bool(*value),
        Attr::Null => Value::Null,
        Attr::B(len) => Value::String(binary_placeholder(*len)),
        Attr::L(list) => Value::Array(list.iter().map(to_native).collect()),
        Attr::M(map) => {
            let mut object = Map::with_capacity(map.len());
            for (key, value) in map {
                object.insert(key.clone(), to_native(value));
            }
            Value::Object(object)
        }
        Attr::Ss(set) | Attr::Ns(set) => {
            Value::Array(set.iter().cloned().map(Value::String).collect())
        }
        Attr::Bs(set) => Value::Array(
            set.iter()
                .map(|len| Value::String(binary_placeholder(*len)))
                .collect(),
        ),
        Attr::Unknown => Value::String("unknown".to_string()),
    }
}

/// Integer first, then a finite float, otherwise the original text.
fn number_to_native(text: &str) -> Value {
    let trimmed = text.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return Value::Number(Number::from(int));
    }
    if let Ok(float) = trimmed.parse::<f64>()
        && let Some(number) = Number::from_f64(float)
    {
        return Value::Number(number);
    }
    Value::String(text.to_string())
}

/// Both projections of one item, derived together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    display: HashMap<String, String>,
    raw: Map<String, Value>,
}

impl Record {
    pub fn from_item(item: &Item) -> Self {
        let mut display = HashMap::with_capacity(item.len());
        let mut raw = Map::with_capacity(item.len());
        for (name, value) in item {
            let attr = Attr::from(value);
            display.insert(name.clone(), display_string(&attr));
            raw.insert(name.clone(), to_native(&attr));
        }
        Self { display, raw }
    }

    pub fn display(&self, name: &str) -> Option<&str> {
        self.display.get(name).map(String::as_str)
    }

    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.raw.get(name)
    }

    pub fn raw_item(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub fn contains(&self, name: &str) -> bool {
        self.display.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.display.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.display.len()
    }

    pub fn is_empty(&self) -> bool {
        self.display.is_empty()
    }
}

/// Pretty JSON with four-space indentation, the layout used by exports and
/// the field viewer.
pub fn to_pretty_json(value: &Value) -> Result<String, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    String::from_utf8(out)
        .map_err(|err| serde_json::Error::io(std::io::Error::new(ErrorKind::InvalidData, err)))
}

/// Lists and maps open in the field viewer; everything else is a scalar.
pub fn is_nested(value: &Value) -> bool {
    value.is_array() || value.is_object()
}
