//! Tests for the dashboard's store client, query workflow and session.
//!
//! Almost everything runs against [`InMemoryStore`], so no AWS account is
//! needed. The one DynamoDB round trip is `#[ignore]`d.
//!
//! # Running against DynamoDB
//!
//! Set the following environment variables in your `.env` file:
//!
//! ```
//! AWS_ACCESS_KEY_ID=your_access_key
//! AWS_SECRET_ACCESS_KEY=your_secret_key
//! AWS_REGION=your_preferred_region
//! ```
//!
//! For local testing with DynamoDB Local, you can use dummy values and set:
//!
//! ```
//! AWS_ENDPOINT_URL=http://localhost:8000
//! ```
//!
//! Then run:
//!
//! ```
//! cargo test -- --ignored
//! ```
//!
//! Note: running against a real DynamoDB instance may incur AWS charges.

use crate::activity::{ActivityLog, Outcome};
use crate::command_line::{parse_row_count, resolve_choice};
use crate::display::{format_latency, render_record, render_table};
use crate::dynamodb::{Column, DynamoDb, Item, Table, PARTITION_KEY, SORT_KEY};
use crate::error::DashboardError;
use crate::generator::generate;
use crate::query::{QueryOutcome, QueryWorkflow, SelectionError, Stage};
use crate::record::Record;
use crate::session::Session;
use crate::store::{InMemoryStore, TableStore};
use crate::table_client::{Fetched, Lookup, TableClient};
use anyhow::Result;
use pretty_assertions::assert_eq;
use std::collections::{BTreeSet, HashSet};
use std::time::Duration;
use tracing::info;

const TEST_TABLE_NAME: &str = "T";

fn memory_client() -> TableClient {
    TableClient::new(InMemoryStore::new())
}

async fn seeded_client(rows: usize) -> Result<TableClient> {
    let client = memory_client();
    client.create_table(TEST_TABLE_NAME).await?;
    client.insert_batch(TEST_TABLE_NAME, rows).await?;
    Ok(client)
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// --- Record generator ---

#[test]
fn test_generate_is_deterministic() {
    let records = generate(40);

    assert_eq!(records.len(), 40);
    assert_eq!(records, generate(40));

    let keys: HashSet<(&str, &str)> = records
        .iter()
        .map(|r| (r.date.as_str(), r.id.as_str()))
        .collect();
    assert_eq!(keys.len(), 40);

    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.value, i as i64 * 10);
        assert_eq!(record.id, (i + 1).to_string());
        assert_eq!(record.factory_label, records[i % 3].factory_label);
    }
}

#[test]
fn test_generate_dates_advance_one_day() {
    let records = generate(23);

    assert_eq!(records[0].date, "2025-11-10");
    assert_eq!(records[1].date, "2025-11-11");
    assert_eq!(records[20].date, "2025-11-30");
    assert_eq!(records[21].date, "2025-12-01");
    assert_eq!(records[2].factory_label, "Factory_3");
    assert_eq!(records[3].factory_label, "Factory_1");
    assert_eq!(records[4].metric_label, "Metric_5");
}

#[test]
fn test_generate_zero() {
    assert!(generate(0).is_empty());
}

#[test]
fn test_record_item_attribute_names() -> Result<()> {
    let item = generate(1)[0].to_item()?;

    let names: BTreeSet<&str> = item.attribute_names().collect();
    assert_eq!(
        names,
        BTreeSet::from(["date", "factory_name", "id", "metric", "value"])
    );
    assert_eq!(item.get_number("value"), Some(0));
    Ok(())
}

// --- Item, Column and Table ---

#[test]
fn test_item_operations() {
    let item = Item::new()
        .set_string("key1", "value1")
        .set_number("key2", 42);

    assert_eq!(item.get_string("key1"), Some(&"value1".to_string()));
    assert_eq!(item.get_number("key2"), Some(42));
    assert_eq!(item.get_string("non_existent"), None);
    assert_eq!(item.get_number("key1"), None);
}

#[test]
fn test_projection_keeps_only_requested_columns() -> Result<()> {
    let item = generate(3)[2].to_item()?;

    let projected = item.project(&[Column::Date, Column::Value]);

    let names: BTreeSet<&str> = projected.attribute_names().collect();
    assert_eq!(names, BTreeSet::from(["date", "value"]));
    assert_eq!(projected.get_number("value"), Some(20));
    Ok(())
}

#[test]
fn test_projection_skips_missing_columns() {
    let item = Item::new().set_string("date", "2025-11-10").set_string("id", "1");

    let projected = item.project(&[Column::Date, Column::Metric, Column::Value]);

    assert_eq!(projected.len(), 1);
    assert!(projected.contains("date"));
}

#[test]
fn test_factory_filter_is_case_insensitive_exact_match() {
    let item = Item::new().set_string("factory_name", "Factory_2");

    assert!(item.matches_factory("factory_2"));
    assert!(item.matches_factory("FACTORY_2"));
    assert!(item.matches_factory(" Factory_2 "));
    assert!(item.matches_factory(""));
    assert!(!item.matches_factory("Factory_1"));
    assert!(!item.matches_factory("Factory"));
    assert!(!Item::new().matches_factory("Factory_2"));
}

#[test]
fn test_column_parse_list() {
    assert_eq!(
        Column::parse_list("value, DATE,value").unwrap(),
        vec![Column::Date, Column::Value]
    );
    assert_eq!(Column::parse_list("  ").unwrap(), Column::ALL.to_vec());
    assert!(Column::parse_list("date,price").is_err());
}

#[test]
fn test_table_operations() {
    let table = Table::composite("metrics");

    assert_eq!(table.name(), "metrics");
    assert_eq!(table.partition_key(), PARTITION_KEY);
    assert_eq!(table.sort_key(), SORT_KEY);
}

// --- Table store client ---

#[tokio::test]
async fn test_create_table_twice_reports_already_exists() -> Result<()> {
    let client = seeded_client(3).await?;

    let err = client.create_table(TEST_TABLE_NAME).await.unwrap_err();
    assert_eq!(err, DashboardError::AlreadyExists(TEST_TABLE_NAME.to_string()));

    match client.scan_all(TEST_TABLE_NAME).await? {
        Fetched::Records { items, .. } => assert_eq!(items.len(), 3),
        other => panic!("expected records, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_create_table_invalid_name_fails() {
    let client = memory_client();

    let err = client.create_table("").await.unwrap_err();
    assert!(matches!(err, DashboardError::CreateFailed(_)));
}

#[tokio::test]
async fn test_insert_into_missing_table_fails() {
    let client = memory_client();

    let err = client.insert_batch("missing", 5).await.unwrap_err();
    match err {
        DashboardError::InsertFailed(message) => assert!(message.contains("not found")),
        other => panic!("expected InsertFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_batch_write_is_not_rolled_back() -> Result<()> {
    let store = InMemoryStore::new();
    store.create_table(&Table::composite("partial")).await?;

    let good = generate(2)
        .iter()
        .map(Record::to_item)
        .collect::<Result<Vec<_>>>()?;
    let bad = Item::new().set_string("date", "2025-11-12");
    let items = vec![good[0].clone(), bad, good[1].clone()];

    assert!(store.put_batch("partial", items).await.is_err());
    assert_eq!(store.scan("partial", None).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_scan_empty_table_is_not_an_error() -> Result<()> {
    let client = memory_client();
    client.create_table(TEST_TABLE_NAME).await?;

    assert!(matches!(
        client.scan_all(TEST_TABLE_NAME).await?,
        Fetched::Empty { .. }
    ));
    assert!(client.list_partition_keys(TEST_TABLE_NAME).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_scan_missing_table_fails() {
    let client = memory_client();

    assert!(matches!(
        client.scan_all("missing").await,
        Err(DashboardError::FetchFailed(_))
    ));
}

#[tokio::test]
async fn test_list_partition_keys_sorted_and_distinct() -> Result<()> {
    let client = seeded_client(3).await?;
    // Same records again: overwrites, no new dates.
    let inserted = client.insert_batch(TEST_TABLE_NAME, 2).await?;
    assert_eq!(inserted.count, 2);

    let keys = client.list_partition_keys(TEST_TABLE_NAME).await?;
    assert_eq!(keys, strings(&["2025-11-10", "2025-11-11", "2025-11-12"]));
    Ok(())
}

#[tokio::test]
async fn test_list_sort_keys_for_partition() -> Result<()> {
    let store = InMemoryStore::new();
    store.create_table(&Table::composite(TEST_TABLE_NAME)).await?;
    let items = ["2", "1", "10"]
        .iter()
        .map(|id| Item::key((PARTITION_KEY, "2025-11-10"), (SORT_KEY, *id)))
        .chain(std::iter::once(Item::key(
            (PARTITION_KEY, "2025-11-11"),
            (SORT_KEY, "4"),
        )))
        .collect();
    store.put_batch(TEST_TABLE_NAME, items).await?;
    let client = TableClient::new(store);

    let ids = client
        .list_sort_keys_for_partition(TEST_TABLE_NAME, "2025-11-10")
        .await?;
    assert_eq!(ids, strings(&["1", "10", "2"]));

    let none = client
        .list_sort_keys_for_partition(TEST_TABLE_NAME, "1999-01-01")
        .await?;
    assert!(none.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_get_record_round_trip() -> Result<()> {
    let client = seeded_client(5).await?;
    let expected = generate(5).remove(3);

    match client
        .get_record(TEST_TABLE_NAME, &expected.date, &expected.id)
        .await?
    {
        Lookup::Found { item, .. } => assert_eq!(Record::from_item(&item)?, expected),
        other => panic!("expected a record, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_get_record_missing_key_is_not_found() -> Result<()> {
    let client = seeded_client(2).await?;

    let lookup = client.get_record(TEST_TABLE_NAME, "2025-11-10", "2").await?;
    assert!(matches!(lookup, Lookup::NotFound { .. }));
    Ok(())
}

#[tokio::test]
async fn test_get_record_missing_table_is_query_failed() {
    let client = memory_client();

    assert!(matches!(
        client.get_record("missing", "2025-11-10", "1").await,
        Err(DashboardError::QueryFailed(_))
    ));
}

// --- Query workflow ---

#[tokio::test]
async fn test_query_workflow_end_to_end() -> Result<()> {
    let client = memory_client();
    client.create_table(TEST_TABLE_NAME).await?;
    client.insert_batch(TEST_TABLE_NAME, 5).await?;
    match client.scan_all(TEST_TABLE_NAME).await? {
        Fetched::Records { items, .. } => assert_eq!(items.len(), 5),
        other => panic!("expected records, got {other:?}"),
    }

    let third = generate(5).remove(2);
    let mut workflow = QueryWorkflow::new();
    assert_eq!(workflow.stage(), &Stage::NoTable);

    workflow.set_table(TEST_TABLE_NAME);
    let dates = workflow.load_partition_keys(&client).await?.to_vec();
    assert_eq!(dates.len(), 5);

    let ids = workflow.choose_partition(&client, &third.date).await?;
    assert_eq!(ids, &strings(&["3"])[..]);

    workflow.choose_sort_key("3")?;
    assert!(matches!(workflow.stage(), Stage::Ready { .. }));

    match workflow.execute(&client).await? {
        QueryOutcome::Found { item, .. } => {
            assert_eq!(item.get_number("value"), Some(20));
            assert_eq!(item.len(), 5);
        }
        other => panic!("expected a record, got {other:?}"),
    }
    assert_eq!(
        workflow.stage(),
        &Stage::PartitionChosen {
            table: TEST_TABLE_NAME.to_string(),
            partition_key: third.date.clone(),
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_query_workflow_filter_and_projection() -> Result<()> {
    let client = seeded_client(5).await?;
    let second = generate(5).remove(1);
    let mut workflow = QueryWorkflow::new();
    workflow.set_table(TEST_TABLE_NAME);
    workflow.load_partition_keys(&client).await?;
    workflow.choose_partition(&client, &second.date).await?;

    workflow.set_filter("factory_1");
    workflow.choose_sort_key("2")?;
    assert_eq!(
        workflow.execute(&client).await?,
        QueryOutcome::FilterMismatch {
            filter: "factory_1".to_string(),
            factory: Some("Factory_2".to_string()),
        }
    );

    workflow.set_filter("FACTORY_2");
    workflow.set_columns(vec![Column::Date, Column::Value]);
    workflow.choose_sort_key("2")?;
    match workflow.execute(&client).await? {
        QueryOutcome::Found { item, .. } => {
            let names: BTreeSet<&str> = item.attribute_names().collect();
            assert_eq!(names, BTreeSet::from(["date", "value"]));
            assert_eq!(item.get_number("value"), Some(10));
        }
        other => panic!("expected a record, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_query_workflow_rejects_out_of_order_steps() -> Result<()> {
    let client = seeded_client(2).await?;
    let mut workflow = QueryWorkflow::new();

    assert_eq!(
        workflow.load_partition_keys(&client).await.unwrap_err(),
        SelectionError::NoTable
    );

    workflow.set_table(TEST_TABLE_NAME);
    assert_eq!(
        workflow.choose_sort_key("1").unwrap_err(),
        SelectionError::NoPartition
    );
    assert_eq!(
        workflow.execute(&client).await.unwrap_err(),
        SelectionError::NoPartition
    );

    workflow.load_partition_keys(&client).await?;
    assert_eq!(
        workflow
            .choose_partition(&client, "1999-01-01")
            .await
            .unwrap_err(),
        SelectionError::UnknownPartition("1999-01-01".to_string())
    );

    workflow.choose_partition(&client, "2025-11-10").await?;
    assert_eq!(
        workflow.execute(&client).await.unwrap_err(),
        SelectionError::NoSortKey
    );
    assert_eq!(
        workflow.choose_sort_key("2").unwrap_err(),
        SelectionError::UnknownSortKey("2".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn test_query_workflow_table_change_resets_selection() -> Result<()> {
    let client = seeded_client(2).await?;
    let mut workflow = QueryWorkflow::new();
    workflow.set_table(TEST_TABLE_NAME);
    workflow.load_partition_keys(&client).await?;
    workflow.choose_partition(&client, "2025-11-10").await?;
    workflow.set_filter("Factory_1");
    workflow.set_columns(vec![Column::Id]);

    workflow.set_table(TEST_TABLE_NAME);
    assert_eq!(workflow.partition_key(), Some("2025-11-10"));

    workflow.set_table("other");
    assert_eq!(
        workflow.stage(),
        &Stage::KeysLoading {
            table: "other".to_string()
        }
    );
    assert!(workflow.partition_keys().is_empty());
    assert!(workflow.sort_keys().is_empty());
    assert_eq!(workflow.filter(), "");
    assert_eq!(workflow.columns(), &Column::ALL[..]);

    workflow.set_table("  ");
    assert_eq!(workflow.stage(), &Stage::NoTable);
    Ok(())
}

#[tokio::test]
async fn test_query_workflow_store_failure_returns_to_partition() -> Result<()> {
    let store = InMemoryStore::new();
    store.create_table(&Table::composite(TEST_TABLE_NAME)).await?;
    store
        .put_batch(
            TEST_TABLE_NAME,
            vec![Item::key((PARTITION_KEY, "2025-11-10"), (SORT_KEY, "1"))],
        )
        .await?;
    let client = TableClient::new(store);
    let mut workflow = QueryWorkflow::new();
    workflow.set_table(TEST_TABLE_NAME);
    workflow.load_partition_keys(&client).await?;
    workflow.choose_partition(&client, "2025-11-10").await?;
    workflow.choose_sort_key("1")?;

    // Points at a table that does not exist in this store.
    let other = memory_client();
    assert!(matches!(
        workflow.execute(&other).await,
        Err(SelectionError::Store(DashboardError::QueryFailed(_)))
    ));
    assert!(matches!(workflow.stage(), Stage::PartitionChosen { .. }));
    Ok(())
}

// --- Activity log and session ---

#[test]
fn test_activity_log_renders_most_recent_first() {
    let mut log = ActivityLog::new();
    assert!(log.is_empty());

    log.success("first");
    log.failure("second");
    log.success("third");

    let messages: Vec<&str> = log.render_all().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["third", "second", "first"]);
    assert_eq!(log.last().map(|e| e.outcome), Some(Outcome::Success));
    assert_eq!(log.len(), 3);
}

#[tokio::test]
async fn test_session_logs_every_action() -> Result<()> {
    let mut session = Session::new(memory_client(), " T ");
    assert_eq!(session.table_name(), TEST_TABLE_NAME);

    session.create_table().await?;
    assert!(session.create_table().await.is_err());
    session.insert_records(5).await?;
    assert!(session.insert_records(0).await.is_err());
    session.fetch_records().await?;

    let outcomes: Vec<Outcome> = session.log().render_all().map(|e| e.outcome).collect();
    assert_eq!(
        outcomes,
        vec![
            Outcome::Success,
            Outcome::Failure,
            Outcome::Success,
            Outcome::Failure,
            Outcome::Success,
        ]
    );
    let latest = session.log().last().map(|e| e.message.clone());
    assert!(latest.is_some_and(|m| m.starts_with("Fetched 5 records from 'T'")));
    Ok(())
}

#[tokio::test]
async fn test_session_query_logs_outcomes() -> Result<()> {
    let mut session = Session::new(seeded_client(3).await?, TEST_TABLE_NAME);

    let dates = session.load_dates().await?;
    let ids = session.choose_date(&dates[0]).await?;
    session.choose_id(&ids[0])?;
    session.set_filter("Factory_3");
    assert!(matches!(
        session.run_query().await?,
        QueryOutcome::FilterMismatch { .. }
    ));

    session.set_filter("");
    session.choose_id(&ids[0])?;
    assert!(matches!(
        session.run_query().await?,
        QueryOutcome::Found { .. }
    ));

    let entries: Vec<(Outcome, &str)> = session
        .log()
        .render_all()
        .map(|e| (e.outcome, e.message.as_str()))
        .collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].0, Outcome::Success);
    assert!(entries[0].1.starts_with("Queried (2025-11-10, 1) in 'T'"));
    assert_eq!(entries[1].0, Outcome::Failure);
    Ok(())
}

#[tokio::test]
async fn test_session_store_failure_is_logged_not_raised() {
    let mut session = Session::new(memory_client(), "missing");

    assert!(session.fetch_records().await.is_err());
    assert!(session.load_dates().await.is_err());

    let failures = session
        .log()
        .render_all()
        .filter(|e| e.outcome == Outcome::Failure)
        .count();
    assert_eq!(failures, 2);
}

// --- Terminal helpers ---

#[test]
fn test_parse_row_count() {
    assert_eq!(parse_row_count("", 10), Some(10));
    assert_eq!(parse_row_count(" 25 ", 10), Some(25));
    assert_eq!(parse_row_count("0", 10), None);
    assert_eq!(parse_row_count("-3", 10), None);
    assert_eq!(parse_row_count("ten", 10), None);
}

#[test]
fn test_resolve_choice() {
    let options = strings(&["2025-11-10", "2025-11-11", "3"]);

    assert_eq!(resolve_choice("2", &options), Some("2025-11-11"));
    assert_eq!(resolve_choice("2025-11-10", &options), Some("2025-11-10"));
    assert_eq!(resolve_choice("3", &options), Some("3"));
    assert_eq!(resolve_choice("0", &options), None);
    assert_eq!(resolve_choice("9", &options), None);
}

#[test]
fn test_render_table_and_record() -> Result<()> {
    let items = vec![
        generate(1)[0].to_item()?,
        Item::new().set_string("date", "2025-12-31").set_string("id", "x"),
    ];

    let table = render_table(&items, &[Column::Date, Column::Id, Column::Value]);
    assert_eq!(
        table,
        [
            "date       | id | value",
            "-----------+----+------",
            "2025-11-10 | 1  |     0",
            "2025-12-31 | x  |",
        ]
        .join("\n")
    );

    let record = render_record(&items[0], &[Column::FactoryName, Column::Metric]);
    assert_eq!(record, "factory_name: Factory_1\nmetric: Metric_1");
    Ok(())
}

#[test]
fn test_format_latency() {
    assert_eq!(format_latency(Duration::from_micros(12_340)), "12.34 ms");
    assert_eq!(format_latency(Duration::ZERO), "0.00 ms");
}

// --- DynamoDB ---

#[tokio::test]
#[ignore = "needs DynamoDB credentials or DynamoDB Local"]
async fn test_dynamodb_round_trip() -> Result<()> {
    dotenv::dotenv().ok();
    let sdk_config = aws_config::load_from_env().await;
    let client = TableClient::new(DynamoDb::new(&sdk_config));
    let table_name = "table-dashboard-test";

    match client.create_table(table_name).await {
        Ok(()) | Err(DashboardError::AlreadyExists(_)) => {}
        Err(e) => return Err(e.into()),
    }
    info!("Table ready");

    let inserted = client.insert_batch(table_name, 30).await?;
    assert_eq!(inserted.count, 30);

    let expected = generate(30).remove(26);
    match client
        .get_record(table_name, &expected.date, &expected.id)
        .await?
    {
        Lookup::Found { item, .. } => assert_eq!(Record::from_item(&item)?, expected),
        other => panic!("expected a record, got {other:?}"),
    }

    let keys = client.list_partition_keys(table_name).await?;
    assert!(keys.contains(&expected.date));
    Ok(())
}
