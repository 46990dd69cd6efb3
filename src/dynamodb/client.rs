use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::TableDescription;

use super::condition::{KeyConditionExpression, KeyValue, SortCondition};
use super::send_dynamo_request;
use super::table::{TableInfo, sort_by_item_count};
use super::value::{Item, Record};
use crate::error::{BackendError, ConfigError, Error, format_sdk_error};

/// Items requested per Query or Scan call.
pub const PAGE_SIZE: i32 = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct QueryInput {
    pub table_name: String,
    pub key_condition: KeyConditionExpression,
    pub limit: i32,
    pub exclusive_start_key: Option<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanInput {
    pub table_name: String,
    pub limit: i32,
    pub exclusive_start_key: Option<Item>,
}

/// Raw page as returned by a backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendPage {
    pub items: Vec<Item>,
    pub last_evaluated_key: Option<Item>,
}

/// The four calls the browser needs from a table store.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Every table name, following the listing cursor until it runs out.
    async fn list_table_names(&self) -> Result<Vec<String>, BackendError>;
    async fn describe_table(&self, name: &str) -> Result<TableDescription, BackendError>;
    async fn query(&self, input: QueryInput) -> Result<BackendPage, BackendError>;
    async fn scan(&self, input: ScanInput) -> Result<BackendPage, BackendError>;
}

#[derive(Clone, Debug)]
pub struct DynamoBackend {
    client: Client,
}

impl DynamoBackend {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Backend for DynamoBackend {
    async fn list_table_names(&self) -> Result<Vec<String>, BackendError> {
        let mut table_names = Vec::new();
        let mut last_evaluated_table_name: Option<String> = None;

        loop {
            let span = tracing::trace_span!(
                "ListTables",
                start_table = ?last_evaluated_table_name.as_deref()
            );
            let output = send_dynamo_request(
                span,
                || {
                    self.client
                        .list_tables()
                        .set_exclusive_start_table_name(last_evaluated_table_name.take())
                        .send()
                },
                format_sdk_error,
            )
            .await
            .map_err(|err| BackendError::from_sdk("ListTables", &err))?;
            table_names.extend(output.table_names().iter().cloned());

            match output.last_evaluated_table_name() {
                Some(name) => last_evaluated_table_name = Some(name.to_string()),
                None => break,
            }
        }

        Ok(table_names)
    }

    async fn describe_table(&self, name: &str) -> Result<TableDescription, BackendError> {
        let span = tracing::trace_span!("DescribeTable", table = %name);
        let output = send_dynamo_request(
            span,
            || self.client.describe_table().table_name(name).send(),
            format_sdk_error,
        )
        .await
        .map_err(|err| BackendError::from_sdk("DescribeTable", &err))?;
        output
            .table
            .ok_or_else(|| BackendError::new("DescribeTable", format!("no description for {name}")))
    }

    async fn query(&self, input: QueryInput) -> Result<BackendPage, BackendError> {
        let span = tracing::trace_span!(
            "Query",
            table = %input.table_name,
            key_condition = %input.key_condition.expression,
            start_key_present = input.exclusive_start_key.is_some(),
            limit = input.limit
        );
        let QueryInput {
            table_name,
            key_condition,
            limit,
            exclusive_start_key,
        } = input;
        let output = send_dynamo_request(
            span,
            || {
                self.client
                    .query()
                    .table_name(table_name)
                    .key_condition_expression(key_condition.expression)
                    .set_expression_attribute_names(Some(key_condition.names))
                    .set_expression_attribute_values(Some(key_condition.values))
                    .limit(limit)
                    .set_exclusive_start_key(exclusive_start_key)
                    .send()
            },
            format_sdk_error,
        )
        .await
        .map_err(|err| BackendError::from_sdk("Query", &err))?;
        Ok(BackendPage {
            items: output.items.unwrap_or_default(),
            last_evaluated_key: output.last_evaluated_key,
        })
    }

    async fn scan(&self, input: ScanInput) -> Result<BackendPage, BackendError> {
        let span = tracing::trace_span!(
            "Scan",
            table = %input.table_name,
            start_key_present = input.exclusive_start_key.is_some(),
            limit = input.limit
        );
        let ScanInput {
            table_name,
            limit,
            exclusive_start_key,
        } = input;
        let output = send_dynamo_request(
            span,
            || {
                self.client
                    .scan()
                    .table_name(table_name)
                    .limit(limit)
                    .set_exclusive_start_key(exclusive_start_key)
                    .send()
            },
            format_sdk_error,
        )
        .await
        .map_err(|err| BackendError::from_sdk("Scan", &err))?;
        Ok(BackendPage {
            items: output.items.unwrap_or_default(),
            last_evaluated_key: output.last_evaluated_key,
        })
    }
}

/// Parameters of a key-conditioned query, frozen for one page history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pub table: String,
    pub partition: KeyValue,
    pub sort: Option<SortCondition>,
}

impl QueryParams {
    pub fn condition(&self) -> Result<KeyConditionExpression, ConfigError> {
        KeyConditionExpression::build(&self.partition, self.sort.as_ref())
    }
}

/// What a page history is paging through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    Query(QueryParams),
    Scan { table: String },
}

impl PageRequest {
    pub fn table_name(&self) -> &str {
        match self {
            PageRequest::Query(params) => &params.table,
            PageRequest::Scan { table } => table,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PageRequest::Query(_) => "Query",
            PageRequest::Scan { .. } => "Scan",
        }
    }
}

/// One page of decoded records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub records: Vec<Record>,
    pub last_evaluated_key: Option<Item>,
}

impl QueryResult {
    fn from_page(page: BackendPage) -> Self {
        Self {
            records: page.items.iter().map(Record::from_item).collect(),
            // an empty key is no key
            last_evaluated_key: page.last_evaluated_key.filter(|key| !key.is_empty()),
        }
    }

    pub fn has_more(&self) -> bool {
        self.last_evaluated_key.is_some()
    }
}

/// One-page-at-a-time access to tables, decoding every item into a
/// [`Record`] on the way out. Never retries.
pub struct RetrievalClient<B> {
    backend: B,
}

impl<B: Backend> RetrievalClient<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Describes every table. Tables whose description fails are left out;
    /// only a failed listing is an error.
    pub async fn list_tables(&self) -> Result<Vec<TableInfo>, BackendError> {
        let names = self.backend.list_table_names().await?;
        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            match self.backend.describe_table(&name).await {
                Ok(desc) => tables.push(TableInfo::from_table_description(&name, &desc)),
                Err(err) => {
                    tracing::warn!(table = %name, error = %err, "omitting table");
                }
            }
        }
        sort_by_item_count(&mut tables);
        Ok(tables)
    }

    pub async fn describe_table(&self, name: &str) -> Result<TableInfo, BackendError> {
        let desc = self.backend.describe_table(name).await?;
        Ok(TableInfo::from_table_description(name, &desc))
    }

    pub async fn query(
        &self,
        params: &QueryParams,
        start_key: Option<Item>,
    ) -> Result<QueryResult, Error> {
        let key_condition = params.condition()?;
        let input = QueryInput {
            table_name: params.table.clone(),
            key_condition,
            limit: PAGE_SIZE,
            exclusive_start_key: start_key,
        };
        let page = self.backend.query(input).await?;
        let result = QueryResult::from_page(page);
        tracing::debug!(
            table = %params.table,
            records = result.records.len(),
            more = result.has_more(),
            "query_page"
        );
        Ok(result)
    }

    pub async fn scan(&self, table: &str, start_key: Option<Item>) -> Result<QueryResult, Error> {
        let input = ScanInput {
            table_name: table.to_string(),
            limit: PAGE_SIZE,
            exclusive_start_key: start_key,
        };
        let page = self.backend.scan(input).await?;
        let result = QueryResult::from_page(page);
        tracing::debug!(
            table = %table,
            records = result.records.len(),
            more = result.has_more(),
            "scan_page"
        );
        Ok(result)
    }

    pub async fn fetch(
        &self,
        request: &PageRequest,
        start_key: Option<Item>,
    ) -> Result<QueryResult, Error> {
        match request {
            PageRequest::Query(params) => self.query(params, start_key).await,
            PageRequest::Scan { table } => self.scan(table, start_key).await,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use aws_sdk_dynamodb::types::AttributeValue;

    use super::*;

    const PAGE_MARKER: &str = "__page";

    /// In-memory backend serving scripted pages. The continuation token of
    /// page `n` points at page `n + 1`.
    #[derive(Default)]
    pub struct FakeBackend {
        pub tables: Vec<(String, Result<TableDescription, BackendError>)>,
        pub pages: Vec<Vec<Item>>,
        pub fail_reads: bool,
        pub reads: AtomicUsize,
        pub queries: Mutex<Vec<QueryInput>>,
    }

    impl FakeBackend {
        pub fn with_pages(pages: Vec<Vec<Item>>) -> Self {
            Self {
                pages,
                ..Default::default()
            }
        }

        pub fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }

        fn page(&self, start_key: Option<&Item>) -> Result<BackendPage, BackendError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail_reads {
                return Err(BackendError::new("Scan", "AccessDeniedException"));
            }
            let index = start_key
                .and_then(|key| key.get(PAGE_MARKER))
                .and_then(|value| value.as_n().ok())
                .and_then(|n| n.parse::<usize>().ok())
                .unwrap_or(0);
            let items = self.pages.get(index).cloned().unwrap_or_default();
            let last_evaluated_key = (index + 1 < self.pages.len()).then(|| {
                Item::from([(
                    PAGE_MARKER.to_string(),
                    AttributeValue::N((index + 1).to_string()),
                )])
            });
            Ok(BackendPage {
                items,
                last_evaluated_key,
            })
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn list_table_names(&self) -> Result<Vec<String>, BackendError> {
            Ok(self.tables.iter().map(|(name, _)| name.clone()).collect())
        }

        async fn describe_table(&self, name: &str) -> Result<TableDescription, BackendError> {
            self.tables
                .iter()
                .find(|(table, _)| table == name)
                .map(|(_, desc)| desc.clone())
                .unwrap_or_else(|| Err(BackendError::new("DescribeTable", "ResourceNotFound")))
        }

        async fn query(&self, input: QueryInput) -> Result<BackendPage, BackendError> {
            let page = self.page(input.exclusive_start_key.as_ref());
            self.queries.lock().unwrap().push(input);
            page
        }

        async fn scan(&self, input: ScanInput) -> Result<BackendPage, BackendError> {
            self.page(input.exclusive_start_key.as_ref())
        }
    }

    pub fn item(entries: &[(&str, &str)]) -> Item {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), AttributeValue::S(value.to_string())))
            .collect()
    }

    /// `count` pages of `per_page` items each, ids numbered across pages.
    pub fn numbered_pages(count: usize, per_page: usize) -> Vec<Vec<Item>> {
        (0..count)
            .map(|page| {
                (0..per_page)
                    .map(|i| item(&[("id", &format!("item-{}", page * per_page + i))]))
                    .collect()
            })
            .collect()
    }
}
