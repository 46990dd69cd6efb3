pub mod client;
pub mod condition;
pub mod debug;
pub mod table;
pub mod value;

pub use client::{
    Backend, BackendPage, DynamoBackend, PAGE_SIZE, PageRequest, QueryInput, QueryParams,
    QueryResult, RetrievalClient, ScanInput,
};
pub use condition::{KeyConditionExpression, KeyOperator, KeyValue, SortCondition};
pub use debug::send_dynamo_request;
pub use table::{KeyAttr, ScalarKind, TableInfo};
pub use value::{Attr, Item, Record};
