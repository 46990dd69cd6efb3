use aws_sdk_dynamodb::types::{
    AttributeDefinition, KeySchemaElement, KeyType, ScalarAttributeType, TableDescription,
};

/// Scalar type of a key attribute, taken from the table's attribute
/// definitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScalarKind {
    #[default]
    String,
    Number,
    Binary,
}

impl ScalarKind {
    pub fn label(&self) -> &'static str {
        match self {
            ScalarKind::String => "S",
            ScalarKind::Number => "N",
            ScalarKind::Binary => "B",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAttr {
    pub name: String,
    pub kind: ScalarKind,
}

impl KeyAttr {
    pub fn new(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub name: String,
    pub status: String,
    pub item_count: i64,
    pub size_bytes: i64,
    pub partition_key: Option<KeyAttr>,
    pub sort_key: Option<KeyAttr>,
    /// Primary key attributes first, then every secondary index key, without
    /// duplicates. Drives the field order of the item detail view.
    pub schema_fields: Vec<String>,
}

impl TableInfo {
    pub fn from_table_description(name: &str, desc: &TableDescription) -> Self {
        let definitions = desc.attribute_definitions();
        let key_attr = |name: String| {
            let kind = attribute_kind(definitions, &name);
            KeyAttr { name, kind }
        };

        let partition_key = extract_key(desc.key_schema(), KeyType::Hash).map(key_attr);
        let sort_key = extract_key(desc.key_schema(), KeyType::Range).map(key_attr);

        let mut schema_fields = Vec::new();
        let mut push_field = |name: &str| {
            if !schema_fields.iter().any(|existing| existing == name) {
                schema_fields.push(name.to_string());
            }
        };
        if let Some(key) = partition_key.as_ref() {
            push_field(&key.name);
        }
        if let Some(key) = sort_key.as_ref() {
            push_field(&key.name);
        }
        for gsi in desc.global_secondary_indexes() {
            for element in gsi.key_schema() {
                push_field(element.attribute_name());
            }
        }
        for lsi in desc.local_secondary_indexes() {
            for element in lsi.key_schema() {
                push_field(element.attribute_name());
            }
        }

        Self {
            name: desc.table_name().unwrap_or(name).to_string(),
            status: desc
                .table_status()
                .map(|status| status.as_str().to_string())
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            item_count: desc.item_count().unwrap_or(0),
            size_bytes: desc.table_size_bytes().unwrap_or(0),
            partition_key,
            sort_key,
            schema_fields,
        }
    }

    pub fn partition_key_name(&self) -> Option<&str> {
        self.partition_key.as_ref().map(|key| key.name.as_str())
    }

    pub fn sort_key_name(&self) -> Option<&str> {
        self.sort_key.as_ref().map(|key| key.name.as_str())
    }

    pub fn is_key_attribute(&self, name: &str) -> bool {
        self.partition_key_name() == Some(name) || self.sort_key_name() == Some(name)
    }
}

/// Largest tables first; equal counts keep their listing order.
pub fn sort_by_item_count(tables: &mut [TableInfo]) {
    tables.sort_by(|a, b| b.item_count.cmp(&a.item_count));
}

fn extract_key(schema: &[KeySchemaElement], key_type: KeyType) -> Option<String> {
    schema
        .iter()
        .find(|element| *element.key_type() == key_type)
        .map(|element| element.attribute_name().to_string())
}

fn attribute_kind(definitions: &[AttributeDefinition], name: &str) -> ScalarKind {
    definitions
        .iter()
        .find(|definition| definition.attribute_name() == name)
        .map(|definition| match definition.attribute_type() {
            ScalarAttributeType::N => ScalarKind::Number,
            ScalarAttributeType::B => ScalarKind::Binary,
            _ => ScalarKind::String,
        })
        .unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod tests {
    use aws_sdk_dynamodb::types::{GlobalSecondaryIndexDescription, TableStatus};

    use super::*;

    pub(crate) fn key(name: &str, key_type: KeyType) -> KeySchemaElement {
        KeySchemaElement::builder()
            .attribute_name(name)
            .key_type(key_type)
            .build()
            .expect("key schema should be valid")
    }

    fn definition(name: &str, kind: ScalarAttributeType) -> AttributeDefinition {
        AttributeDefinition::builder()
            .attribute_name(name)
            .attribute_type(kind)
            .build()
            .expect("attribute definition should be valid")
    }

    fn description() -> TableDescription {
        let gsi = GlobalSecondaryIndexDescription::builder()
            .index_name("by-email")
            .key_schema(key("email", KeyType::Hash))
            .key_schema(key("ts", KeyType::Range))
            .build();
        TableDescription::builder()
            .table_name("users")
            .table_status(TableStatus::Active)
            .item_count(120)
            .table_size_bytes(4096)
            .key_schema(key("id", KeyType::Hash))
            .key_schema(key("ts", KeyType::Range))
            .attribute_definitions(definition("id", ScalarAttributeType::S))
            .attribute_definitions(definition("ts", ScalarAttributeType::N))
            .global_secondary_indexes(gsi)
            .build()
    }

    #[test]
    fn extracts_keys_and_types() {
        let info = TableInfo::from_table_description("users", &description());
        assert_eq!(info.name, "users");
        assert_eq!(info.status, "ACTIVE");
        assert_eq!(info.item_count, 120);
        assert_eq!(info.size_bytes, 4096);
        assert_eq!(info.partition_key, Some(KeyAttr::new("id", ScalarKind::String)));
        assert_eq!(info.sort_key, Some(KeyAttr::new("ts", ScalarKind::Number)));
    }

    #[test]
    fn schema_fields_put_primary_key_first_without_duplicates() {
        let info = TableInfo::from_table_description("users", &description());
        assert_eq!(info.schema_fields, vec!["id", "ts", "email"]);
        assert!(info.is_key_attribute("ts"));
        assert!(!info.is_key_attribute("email"));
    }

    #[test]
    fn sort_is_descending_and_stable() {
        let table = |name: &str, item_count: i64| TableInfo {
            name: name.to_string(),
            status: "ACTIVE".to_string(),
            item_count,
            size_bytes: 0,
            partition_key: None,
            sort_key: None,
            schema_fields: Vec::new(),
        };
        let mut tables = vec![table("a", 5), table("b", 50), table("c", 5), table("d", 0)];
        sort_by_item_count(&mut tables);
        let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c", "d"]);
    }
}
