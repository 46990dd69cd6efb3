use std::time::Duration;

use assert_cmd::Command;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::{Credentials, Region};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, KeySchemaElement, KeyType, ProvisionedThroughput,
    ScalarAttributeType,
};
use color_eyre::Result;
use testcontainers::{
    ContainerAsync, GenericImage, ImageExt,
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
};

use dynaview::dynamodb::{
    DynamoBackend, KeyOperator, KeyValue, PAGE_SIZE, PageRequest, QueryParams, RetrievalClient,
    SortCondition,
};
use dynaview::pagination::Pager;

#[allow(dead_code)]
struct DynamoDBEnv {
    container: ContainerAsync<GenericImage>,
    endpoint_url: String,
}

const CREATE_TABLE_MAX_ATTEMPTS: u32 = 6;
const CREATE_TABLE_RETRY_DELAY_MS: u64 = 150;

fn is_transient_dispatch_failure(err: &impl std::fmt::Debug) -> bool {
    let rendered = format!("{err:?}");
    rendered.contains("DispatchFailure")
        || rendered.contains("TransientError")
        || rendered.contains("IncompleteMessage")
}

fn key(name: &str, key_type: KeyType) -> KeySchemaElement {
    KeySchemaElement::builder()
        .attribute_name(name)
        .key_type(key_type)
        .build()
        .unwrap()
}

fn attribute(name: &str) -> AttributeDefinition {
    AttributeDefinition::builder()
        .attribute_name(name)
        .attribute_type(ScalarAttributeType::S)
        .build()
        .unwrap()
}

/// Creates `table_name` keyed by `pk` and, when given, `sk`.
async fn create_table_with_retry(
    client: &aws_sdk_dynamodb::Client,
    table_name: &str,
    sort_key: Option<&str>,
) -> Result<()> {
    for attempt in 1..=CREATE_TABLE_MAX_ATTEMPTS {
        let provisioned_throughput = ProvisionedThroughput::builder()
            .read_capacity_units(10)
            .write_capacity_units(5)
            .build()
            .unwrap();

        let mut request = client
            .create_table()
            .table_name(table_name)
            .key_schema(key("pk", KeyType::Hash))
            .attribute_definitions(attribute("pk"))
            .provisioned_throughput(provisioned_throughput);
        if let Some(sort_key) = sort_key {
            request = request
                .key_schema(key(sort_key, KeyType::Range))
                .attribute_definitions(attribute(sort_key));
        }

        match request.send().await {
            Ok(_) => return Ok(()),
            Err(err)
                if attempt < CREATE_TABLE_MAX_ATTEMPTS && is_transient_dispatch_failure(&err) =>
            {
                let delay_ms = CREATE_TABLE_RETRY_DELAY_MS * u64::from(attempt);
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            Err(err) => {
                return Err(color_eyre::eyre::eyre!(
                    "failed to create table {table_name} after {attempt} attempt(s): {err:?}"
                ));
            }
        }
    }
    unreachable!("create_table_with_retry must return from loop")
}

async fn new_dynamodb_env() -> Result<DynamoDBEnv> {
    let container = GenericImage::new("amazon/dynamodb-local", "2.5.2")
        .with_exposed_port(8000.tcp())
        .with_wait_for(WaitFor::message_on_stdout("CorsParams"))
        .with_user("root")
        .with_cmd(vec!["-jar", "DynamoDBLocal.jar", "-inMemory", "-sharedDb"])
        .start()
        .await
        .expect("Failed to start DynamoDB");
    let port = container.get_host_port_ipv4(8000).await?;
    Ok(DynamoDBEnv {
        container,
        endpoint_url: format!("http://127.0.0.1:{}", port),
    })
}

async fn new_local_client(endpoint_url: &str) -> Result<aws_sdk_dynamodb::Client> {
    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("local", "local", None, None, "test"))
        .endpoint_url(endpoint_url)
        .load()
        .await;
    Ok(aws_sdk_dynamodb::Client::new(&config))
}

async fn put_events(client: &aws_sdk_dynamodb::Client, table: &str, count: usize) -> Result<()> {
    for i in 0..count {
        client
            .put_item()
            .table_name(table)
            .item("pk", AttributeValue::S("user-1".to_string()))
            .item("sk", AttributeValue::S(format!("2024-01-{:02}", i + 1)))
            .item("title", AttributeValue::S(format!("event {i}")))
            .send()
            .await?;
    }
    Ok(())
}

#[tokio::test]
async fn pages_forward_and_back_against_dynamodb_local() {
    let env = new_dynamodb_env().await.unwrap();
    let sdk = new_local_client(&env.endpoint_url).await.unwrap();
    create_table_with_retry(&sdk, "events", Some("sk")).await.unwrap();
    put_events(&sdk, "events", 20).await.unwrap();

    let client = RetrievalClient::new(DynamoBackend::new(sdk));
    let table = client.describe_table("events").await.unwrap();
    assert_eq!(table.partition_key_name(), Some("pk"));
    assert_eq!(table.sort_key_name(), Some("sk"));

    let partition_key = table.partition_key.clone().unwrap();
    let sort_key = table.sort_key.clone().unwrap();
    let request = PageRequest::Query(QueryParams {
        table: "events".to_string(),
        partition: KeyValue::new(partition_key, "user-1"),
        sort: Some(SortCondition::new(sort_key, KeyOperator::Ge, "2024-01-01")),
    });

    let mut pager = Pager::new();
    let first = pager.load_first(&client, request).await.unwrap().cloned().unwrap();
    assert_eq!(first.records.len(), PAGE_SIZE as usize);
    assert!(first.has_more());
    assert_eq!(first.records[0].display("sk"), Some("2024-01-01"));

    let second = pager.load_next(&client).await.unwrap().cloned().unwrap();
    assert_eq!(second.records.len(), 20 - PAGE_SIZE as usize);
    assert_eq!(pager.page_number(), 2);

    // DynamoDB may hand back a token on an exactly exhausted page; follow it
    while pager.has_next() {
        let page = pager.load_next(&client).await.unwrap().cloned().unwrap();
        assert!(page.records.is_empty());
    }
    let pages = pager.history_len();

    let back = pager.previous().cloned();
    assert_eq!(pager.page_number(), pages - 1);
    if pages == 2 {
        assert_eq!(back.as_ref(), Some(&first));
    }
    while pager.previous().is_some() {}
    assert_eq!(pager.current_page(), Some(&first));
    assert_eq!(pager.load_next(&client).await.unwrap(), Some(&second));
}

#[tokio::test]
async fn between_needs_both_bounds_before_any_request() {
    let env = new_dynamodb_env().await.unwrap();
    let sdk = new_local_client(&env.endpoint_url).await.unwrap();
    create_table_with_retry(&sdk, "events", Some("sk")).await.unwrap();

    let client = RetrievalClient::new(DynamoBackend::new(sdk));
    let table = client.describe_table("events").await.unwrap();
    let params = QueryParams {
        table: "events".to_string(),
        partition: KeyValue::new(table.partition_key.clone().unwrap(), "user-1"),
        sort: Some(SortCondition::new(
            table.sort_key.clone().unwrap(),
            KeyOperator::Between,
            "2024-01-01",
        )),
    };
    let err = client.query(&params, None).await.unwrap_err();
    assert!(matches!(err, dynaview::error::Error::Config(_)));

    let params = QueryParams {
        sort: params.sort.map(|sort| sort.with_upper("2024-01-31")),
        ..params
    };
    let result = client.query(&params, None).await.unwrap();
    assert!(result.records.is_empty());
    assert!(!result.has_more());
}

#[tokio::test]
async fn list_tables() {
    let mut cmd = Command::cargo_bin("dynaview").unwrap();
    let env = new_dynamodb_env().await.unwrap();
    let endpoint_url = env.endpoint_url.as_str();
    let table_names = vec![
        String::from("test-table1"),
        String::from("test-table2"),
        String::from("test-table3"),
    ];
    let client = new_local_client(endpoint_url).await.unwrap();
    for table_name in &table_names {
        create_table_with_retry(&client, table_name, None).await.unwrap();
    }
    let log_home = tempfile::tempdir().unwrap();
    let stdout = cmd
        .env("AWS_REGION", "us-east-1")
        .env("AWS_ACCESS_KEY_ID", "local")
        .env("AWS_SECRET_ACCESS_KEY", "local")
        .env("XDG_DATA_HOME", log_home.path())
        .env("HOME", log_home.path())
        .arg("--endpoint-url")
        .arg(endpoint_url)
        .arg("list-tables")
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&stdout).expect("output is valid JSON");
    let arr = parsed.as_array().expect("expected top-level JSON array");

    let names: Vec<String> = arr
        .iter()
        .filter_map(|v| v["name"].as_str().map(|s| s.to_string()))
        .collect();
    assert_eq!(names, table_names);
    assert!(arr.iter().all(|v| v["partition_key"] == "pk"));
}
