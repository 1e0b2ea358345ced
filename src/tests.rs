//! Tests for the table client
//!
//! These tests cover:
//! - Table creation, idempotent re-creation and the wait-until-active loop
//! - Item validation before any request is sent
//! - Filtered and unfiltered scans, including multi-page scans
//! - Error propagation from the connector
//! - Item, Condition and Course conversions
//!
//! Most tests run against [`InMemoryStore`] and need no credentials. Waiting
//! tests use tokio's paused clock, so they finish instantly.
//!
//! # DynamoDB Local
//!
//! `test_dynamodb_local_round_trip` is ignored by default. To run it, start
//! DynamoDB Local, add a `default` profile with dummy keys to the shared
//! credentials file:
//!
//! ```text
//! [default]
//! aws_access_key_id = dummy
//! aws_secret_access_key = dummy
//! ```
//!
//! and set:
//!
//! ```text
//! AWS_ENDPOINT_URL=http://localhost:8000
//! ```
//!
//! then run:
//!
//! ```text
//! cargo test -- --ignored
//! ```

use crate::courses::{sample_courses, Course, GPA_ATTRIBUTE, SEMESTER_KEY, SUBJECTS_ATTRIBUTE};
use crate::dynamodb::{
    ComparisonOperator, Condition, Connection, DynamoDbConnector, Error, FieldType,
    InMemoryStore, Item, Table, TableClient, TableStatus, Throughput, WaitConfig,
};
use crate::utils::poll_until;
use anyhow::Result;
use aws_sdk_dynamodb::types::AttributeValue;
use tokio::time::{Duration, Instant};
use tracing::info;

const TEST_TABLE_NAME: &str = "test-courses";

fn courses_table() -> Table<'static> {
    Table::new(TEST_TABLE_NAME, SEMESTER_KEY, FieldType::String).with_throughput(
        Throughput::Provisioned {
            read_capacity_units: 1,
            write_capacity_units: 1,
        },
    )
}

fn wait_config() -> WaitConfig {
    WaitConfig {
        interval: Duration::from_secs(1),
        max_interval: Duration::from_secs(5),
        timeout: Duration::from_secs(30),
    }
}

async fn seeded_client(store: InMemoryStore) -> Result<TableClient<InMemoryStore>> {
    let client = TableClient::new(store, wait_config());
    let table = courses_table();
    client.ensure_table(&table).await?;
    for course in sample_courses() {
        client.put_item(&table, course.to_item()?).await?;
    }
    Ok(client)
}

fn semesters(items: &[Item]) -> Vec<String> {
    let mut semesters: Vec<String> = items
        .iter()
        .filter_map(|item| item.get_string(SEMESTER_KEY).cloned())
        .collect();
    semesters.sort();
    semesters
}

// --- Table Operations ---

#[tokio::test]
async fn test_ensure_table_is_idempotent() -> Result<()> {
    let store = InMemoryStore::new();
    let client = TableClient::new(store.clone(), wait_config());
    let table = courses_table();

    let first = client.ensure_table(&table).await?;
    let second = client.ensure_table(&table).await?;

    assert_eq!(first.status, TableStatus::Active);
    assert_eq!(second.status, TableStatus::Active);
    assert_eq!(store.calls().await.create_table, 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_ensure_table_waits_for_active() -> Result<()> {
    const CREATING_POLLS: usize = 3;
    let store = InMemoryStore::new().with_activation_polls(CREATING_POLLS);
    let client = TableClient::new(store.clone(), wait_config());

    let started = Instant::now();
    let metadata = client.ensure_table(&courses_table()).await?;
    let elapsed = started.elapsed();

    info!("Table became active after {elapsed:?}");
    assert!(metadata.is_active());
    assert!(elapsed >= wait_config().interval * CREATING_POLLS as u32);
    // One existence check, K creating polls, one active poll.
    assert_eq!(store.calls().await.describe_table, CREATING_POLLS + 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_ensure_table_times_out() {
    let store = InMemoryStore::new().never_activate();
    let client = TableClient::new(store.clone(), wait_config());

    let started = Instant::now();
    let result = client.ensure_table(&courses_table()).await;

    match result {
        Err(Error::ProvisionTimeout {
            table_name,
            timeout,
        }) => {
            assert_eq!(table_name, TEST_TABLE_NAME);
            assert_eq!(timeout, wait_config().timeout);
        }
        other => panic!("expected ProvisionTimeout, got {other:?}"),
    }
    assert!(started.elapsed() >= wait_config().timeout);
    assert_eq!(store.calls().await.put_item, 0);
}

#[tokio::test(start_paused = true)]
async fn test_ensure_table_times_out_after_long_wait() {
    let long_waits = [
        WaitConfig {
            timeout: Duration::from_secs(3600),
            ..WaitConfig::default()
        },
        WaitConfig {
            interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(3600),
        },
    ];

    for wait in long_waits {
        let store = InMemoryStore::new().never_activate();
        let client = TableClient::new(store.clone(), wait);

        let started = Instant::now();
        let result = client.ensure_table(&courses_table()).await;

        assert!(
            matches!(&result, Err(Error::ProvisionTimeout { timeout, .. }) if *timeout == wait.timeout),
            "expected ProvisionTimeout, got {result:?}"
        );
        assert!(started.elapsed() >= wait.timeout);
        assert!(store.calls().await.describe_table > 2);
    }
}

#[tokio::test]
async fn test_describe_missing_table() {
    let client = TableClient::new(InMemoryStore::new(), wait_config());

    let result = client.describe_table("no-such-table").await;

    assert!(matches!(
        result,
        Err(Error::NotFound { ref table_name }) if table_name == "no-such-table"
    ));
}

#[tokio::test]
async fn test_describe_table() -> Result<()> {
    let client = seeded_client(InMemoryStore::new()).await?;

    let description = client.describe_table(TEST_TABLE_NAME).await?;

    assert_eq!(description.name, TEST_TABLE_NAME);
    assert_eq!(description.key_attribute.as_deref(), Some(SEMESTER_KEY));
    assert_eq!(description.key_type, Some(FieldType::String));
    assert_eq!(description.item_count, Some(3));
    assert!(description.to_string().contains("rcu=1 wcu=1"));
    Ok(())
}

// --- Item Operations ---

#[tokio::test]
async fn test_put_item_with_non_finite_number_is_rejected() -> Result<()> {
    let store = InMemoryStore::new();
    let client = TableClient::new(store.clone(), wait_config());
    let table = courses_table();
    client.ensure_table(&table).await?;

    for gpa in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let item = Item::new()
            .set_string(SEMESTER_KEY, "fall2018")
            .set_number(GPA_ATTRIBUTE, gpa);
        let result = client.put_item(&table, item).await;
        assert!(matches!(result, Err(Error::Validation(_))), "{gpa}: {result:?}");
    }
    assert_eq!(store.calls().await.put_item, 0);
    Ok(())
}

#[tokio::test]
async fn test_put_item_without_key_is_rejected_locally() -> Result<()> {
    let store = InMemoryStore::new();
    let client = TableClient::new(store.clone(), wait_config());
    let table = courses_table();
    client.ensure_table(&table).await?;

    let item = Item::new()
        .set_number(GPA_ATTRIBUTE, 3.2)
        .set_string_set(SUBJECTS_ATTRIBUTE, ["Compilers"]);
    let result = client.put_item(&table, item).await;

    assert!(matches!(result, Err(Error::Validation(_))));
    assert_eq!(store.calls().await.put_item, 0);
    Ok(())
}

#[tokio::test]
async fn test_put_item_with_invalid_key_or_set_is_rejected() -> Result<()> {
    let store = InMemoryStore::new();
    let client = TableClient::new(store.clone(), wait_config());
    let table = courses_table();
    client.ensure_table(&table).await?;

    let numeric_key = Item::new().set_number(SEMESTER_KEY, 2016.0);
    let empty_key = Item::new().set_string(SEMESTER_KEY, "");
    let empty_set = Item::new()
        .set_string(SEMESTER_KEY, "fall2018")
        .set_string_set(SUBJECTS_ATTRIBUTE, Vec::<String>::new());

    for item in [numeric_key, empty_key, empty_set] {
        let result = client.put_item(&table, item).await;
        assert!(matches!(result, Err(Error::Validation(_))), "{result:?}");
    }
    assert_eq!(store.calls().await.put_item, 0);
    Ok(())
}

#[tokio::test]
async fn test_put_item_transport_error_is_not_retried() -> Result<()> {
    let store = InMemoryStore::new();
    let client = TableClient::new(store.clone(), wait_config());
    let table = courses_table();
    client.ensure_table(&table).await?;

    store.fail_next_put("connection reset by peer").await;
    let item = sample_courses()[0].to_item()?;
    let result = client.put_item(&table, item).await;

    match result {
        Err(Error::Transport(message)) => assert_eq!(message, "connection reset by peer"),
        other => panic!("expected Transport, got {other:?}"),
    }
    assert_eq!(store.calls().await.put_item, 1);
    assert_eq!(store.item_count(TEST_TABLE_NAME).await, Some(0));
    Ok(())
}

#[tokio::test]
async fn test_put_item_last_write_wins() -> Result<()> {
    let store = InMemoryStore::new();
    let client = seeded_client(store.clone()).await?;
    let table = courses_table();

    let updated = Course::new("fall2016", 3.7, &["Distributed Systems"]);
    client.put_item(&table, updated.to_item()?).await?;

    let items = client.scan_all(TEST_TABLE_NAME, &Condition::always()).await?;
    let fall = items
        .into_iter()
        .find(|item| item.get_string(SEMESTER_KEY).map(String::as_str) == Some("fall2016"))
        .map(Course::from_item)
        .transpose()?;

    assert_eq!(fall, Some(updated));
    assert_eq!(store.item_count(TEST_TABLE_NAME).await, Some(3));
    Ok(())
}

// --- Scan Operations ---

#[tokio::test]
async fn test_scan_by_gpa_threshold() -> Result<()> {
    let client = seeded_client(InMemoryStore::new()).await?;

    let items = client
        .scan_all(TEST_TABLE_NAME, &Condition::greater_than(GPA_ATTRIBUTE, 3.5))
        .await?;

    assert_eq!(items.len(), 2);
    assert_eq!(semesters(&items), vec!["fall2016", "spring2017"]);
    let mut gpas: Vec<f64> = items
        .iter()
        .filter_map(|item| item.get_number(GPA_ATTRIBUTE))
        .collect();
    gpas.sort_by(|a, b| a.total_cmp(b));
    assert_eq!(gpas, vec![3.9, 4.0]);
    Ok(())
}

#[tokio::test]
async fn test_scan_round_trip() -> Result<()> {
    let store = InMemoryStore::new();
    let client = TableClient::new(store, wait_config());
    let table = courses_table();
    client.ensure_table(&table).await?;

    let item = Item::new()
        .set_string(SEMESTER_KEY, "summer2017")
        .set_number(GPA_ATTRIBUTE, 3.65)
        .set_string_set(SUBJECTS_ATTRIBUTE, ["Operating Systems", "Networks"]);
    client.put_item(&table, item.clone()).await?;

    let items = client.scan_all(TEST_TABLE_NAME, &Condition::always()).await?;

    assert_eq!(items, vec![item]);
    Ok(())
}

#[tokio::test]
async fn test_scan_follows_pages() -> Result<()> {
    let store = InMemoryStore::new().with_page_size(1);
    let client = seeded_client(store.clone()).await?;

    let items = client
        .scan_all(TEST_TABLE_NAME, &Condition::greater_than(GPA_ATTRIBUTE, 3.5))
        .await?;

    assert_eq!(semesters(&items), vec!["fall2016", "spring2017"]);
    assert_eq!(store.calls().await.scan, 3);
    Ok(())
}

#[tokio::test]
async fn test_scan_missing_table() {
    let client = TableClient::new(InMemoryStore::new(), wait_config());

    let result = client
        .scan_all("no-such-table", &Condition::always())
        .await;

    assert!(matches!(result, Err(Error::NotFound { .. })));
}

// --- Model ---

#[test]
fn test_item_operations() {
    let item = Item::new()
        .set_string("key1", "value1")
        .set_number("key2", 42.0)
        .set_string_set("key3", ["a", "b"]);

    assert_eq!(item.get_string("key1"), Some(&"value1".to_string()));
    assert_eq!(item.get_number("key2"), Some(42.0));
    assert_eq!(
        item.get_string_set("key3"),
        Some(&vec!["a".to_string(), "b".to_string()])
    );
    assert_eq!(item.get_string("key2"), None);
    assert_eq!(item.get_number("non_existent"), None);
    assert_eq!(item.len(), 3);

    let names: Vec<&String> = item.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["key1", "key2", "key3"]);
}

#[test]
fn test_table_operations() {
    let table = Table::new("test_table", "partition_key", FieldType::Number);

    assert_eq!(table.name(), "test_table");
    assert_eq!(table.partition_key(), "partition_key");
    assert_eq!(table.key_type(), FieldType::Number);
    assert_eq!(table.throughput(), Throughput::OnDemand);

    let provisioned = table.with_throughput(Throughput::Provisioned {
        read_capacity_units: 5,
        write_capacity_units: 2,
    });
    assert!(matches!(
        provisioned.throughput(),
        Throughput::Provisioned {
            read_capacity_units: 5,
            write_capacity_units: 2
        }
    ));
}

#[test]
fn test_condition_filter_expression() {
    let condition = Condition::greater_than(GPA_ATTRIBUTE, 3.5);
    let filter = condition.to_filter_expression().expect("filter expression");

    assert_eq!(filter.expression, "#attr > :value");
    assert_eq!(filter.names.get("#attr").map(String::as_str), Some(GPA_ATTRIBUTE));
    assert_eq!(
        filter.values.get(":value"),
        Some(&AttributeValue::N("3.5".to_string()))
    );
    assert!(Condition::always().to_filter_expression().is_none());
}

#[test]
fn test_condition_matching() {
    let item = Item::new()
        .set_string(SEMESTER_KEY, "fall2016")
        .set_number(GPA_ATTRIBUTE, 4.0);

    assert!(Condition::greater_than(GPA_ATTRIBUTE, 3.5).matches(&item));
    assert!(!Condition::greater_than(GPA_ATTRIBUTE, 4.0).matches(&item));
    assert!(Condition::compare(
        GPA_ATTRIBUTE,
        ComparisonOperator::Ge,
        AttributeValue::N("4".to_string())
    )
    .matches(&item));
    assert!(Condition::compare(
        SEMESTER_KEY,
        ComparisonOperator::Lt,
        AttributeValue::S("spring2016".to_string())
    )
    .matches(&item));
    // Missing attribute and type mismatch never match.
    assert!(!Condition::greater_than("credits", 0.0).matches(&item));
    assert!(!Condition::greater_than(SEMESTER_KEY, 0.0).matches(&item));
    assert!(Condition::always().matches(&Item::new()));
}

#[test]
fn test_course_item_conversion() -> Result<()> {
    let course = Course::new("spring2017", 3.9, &["NoSQL", "Web Design"]);

    let item = course.to_item()?;
    assert_eq!(item.get_string(SEMESTER_KEY), Some(&"spring2017".to_string()));
    assert_eq!(item.get_number(GPA_ATTRIBUTE), Some(3.9));
    assert!(item.get_string_set(SUBJECTS_ATTRIBUTE).is_some());

    assert_eq!(Course::from_item(item)?, course);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_poll_until_gives_up_at_deadline() {
    let mut attempts = 0;
    let result: Result<Option<()>, Error> = poll_until(
        || {
            attempts += 1;
            async { Ok(None) }
        },
        Duration::from_secs(1),
        Duration::from_secs(2),
        Duration::from_secs(5),
    )
    .await;

    assert!(matches!(result, Ok(None)));
    // Polls at t = 0, 1, 2, 4 and the deadline at 5.
    assert_eq!(attempts, 5);
}

// --- Connection ---

#[tokio::test]
async fn test_connect_with_unknown_profile_fails_auth() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config_file = dir.path().join("config");
    let credentials_file = dir.path().join("credentials");
    std::fs::write(&config_file, "")?;
    std::fs::write(&credentials_file, "")?;

    std::env::set_var("AWS_CONFIG_FILE", &config_file);
    std::env::set_var("AWS_SHARED_CREDENTIALS_FILE", &credentials_file);
    // Environment credentials must not stand in for the missing profile.
    std::env::set_var("AWS_ACCESS_KEY_ID", "dummy");
    std::env::set_var("AWS_SECRET_ACCESS_KEY", "dummy");
    std::env::remove_var("AWS_SESSION_TOKEN");
    std::env::remove_var("AWS_PROFILE");

    let result = Connection::connect("no-such-profile", "us-west-2", None).await;

    std::env::remove_var("AWS_ACCESS_KEY_ID");
    std::env::remove_var("AWS_SECRET_ACCESS_KEY");

    match result {
        Err(Error::Auth {
            profile, location, ..
        }) => {
            assert_eq!(profile, "no-such-profile");
            assert_eq!(location, credentials_file.to_string_lossy());
        }
        other => panic!("expected Auth error, got {other:?}"),
    }
    Ok(())
}

// --- DynamoDB Local ---

#[tokio::test]
#[ignore = "requires DynamoDB Local at AWS_ENDPOINT_URL"]
async fn test_dynamodb_local_round_trip() -> Result<()> {
    dotenv::dotenv().ok();
    let endpoint =
        std::env::var("AWS_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
    let connection = Connection::connect("default", "us-west-2", Some(&endpoint)).await?;
    let client = TableClient::new(DynamoDbConnector::new(&connection), wait_config());
    let table = courses_table();

    client.ensure_table(&table).await?;
    for course in sample_courses() {
        client.put_item(&table, course.to_item()?).await?;
    }

    let items = client
        .scan_all(TEST_TABLE_NAME, &Condition::greater_than(GPA_ATTRIBUTE, 3.5))
        .await?;
    assert_eq!(semesters(&items), vec!["fall2016", "spring2017"]);
    Ok(())
}
