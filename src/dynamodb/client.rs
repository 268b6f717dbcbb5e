use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use aws_sdk_dynamodb::{
    error::DisplayErrorContext,
    operation::scan::ScanOutput,
    types::{
        AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType, PutRequest,
        ScalarAttributeType, TableStatus, WriteRequest,
    },
    Client,
};
use std::collections::HashMap;
use tokio::time::Duration;
use tracing::{info, warn};

use crate::dynamodb::{Item, Table};
use crate::store::TableStore;
use crate::utils::wait_until;

/// Maximum number of put requests DynamoDB accepts in one `BatchWriteItem` call.
const BATCH_WRITE_LIMIT: usize = 25;

/// How many times a chunk's unprocessed items are handed back to DynamoDB
/// before the batch is abandoned.
const MAX_UNPROCESSED_ROUNDS: usize = 8;

const ACTIVE_POLL_DELAY: Duration = Duration::from_secs(1);
const ACTIVE_MAX_POLLS: usize = 10;

/// DynamoDB client wrapper for the dashboard's table operations.
///
/// This struct provides a convenient interface for interacting with Amazon DynamoDB,
/// abstracting away many of the low-level details of the AWS SDK.
///
/// # DynamoDB Concepts
///
/// ## Tables
/// In DynamoDB, a table is a collection of items (rows), and each item consists of attributes (columns).
/// Tables are schema-less apart from their primary key.
///
/// ## Primary Key
/// Dashboard tables use a composite key: a partition key (`date`) that DynamoDB
/// uses to distribute data, and a sort key (`id`) that orders items within a partition.
///
/// ## Operations
/// - **BatchWriteItem**: Add up to 25 items per call
/// - **Get**: Retrieve an item by its primary key
/// - **Query**: Retrieve the items of one partition
/// - **Scan**: Read every item in a table
///
/// # Example
///
/// ```rust
/// use aws_config::load_from_env;
/// use dynamodb::{DynamoDb, Table};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = load_from_env().await;
///     let client = DynamoDb::new(&config);
///
///     client.create_table(&Table::composite("metrics")).await?;
///     let items = client.scan("metrics", None).await?;
///     Ok(())
/// }
/// ```
///
/// # Error Handling
///
/// Methods return `anyhow::Result`. SDK errors are rendered with
/// [`DisplayErrorContext`] so the service's own message reaches the operator.
#[derive(Debug, Clone)]
pub struct DynamoDb {
    client: Client,
}

fn sdk_error<E: std::error::Error>(err: E) -> anyhow::Error {
    anyhow!("{}", DisplayErrorContext(err))
}

impl DynamoDb {
    /// Creates a new `DynamoDb` instance.
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    /// Reports whether the table has reached `ACTIVE`.
    async fn table_is_active(&self, table_name: &str) -> Result<bool> {
        let output = self
            .client
            .describe_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(sdk_error)?;
        Ok(output.table().and_then(|t| t.table_status()) == Some(&TableStatus::Active))
    }

    /// Sends one chunk of put requests, handing unprocessed items back until
    /// DynamoDB has accepted all of them.
    async fn write_chunk(&self, table_name: &str, mut requests: Vec<WriteRequest>) -> Result<()> {
        for round in 0..=MAX_UNPROCESSED_ROUNDS {
            if requests.is_empty() {
                return Ok(());
            }
            if round > 0 {
                warn!(
                    "{} items unprocessed, resubmitting ({round}/{MAX_UNPROCESSED_ROUNDS})",
                    requests.len()
                );
            }
            let response = self
                .client
                .batch_write_item()
                .request_items(table_name, requests)
                .send()
                .await
                .map_err(sdk_error)?;

            requests = response
                .unprocessed_items
                .unwrap_or_default()
                .remove(table_name)
                .unwrap_or_default();
        }
        if requests.is_empty() {
            return Ok(());
        }
        bail!(
            "{} items still unprocessed after {MAX_UNPROCESSED_ROUNDS} resubmissions",
            requests.len()
        )
    }
}

#[async_trait]
impl TableStore for DynamoDb {
    async fn table_exists(&self, table_name: &str) -> Result<bool> {
        let mut start_table_name = None;
        loop {
            let tables = self
                .client
                .list_tables()
                .set_exclusive_start_table_name(start_table_name)
                .send()
                .await
                .map_err(sdk_error)?;

            if tables.table_names().iter().any(|name| name == table_name) {
                return Ok(true);
            }

            start_table_name = tables.last_evaluated_table_name;
            if start_table_name.is_none() {
                return Ok(false);
            }
        }
    }

    async fn create_table(&self, table: &Table<'_>) -> Result<()> {
        let attribute_definitions = vec![
            AttributeDefinition::builder()
                .attribute_name(table.partition_key())
                .attribute_type(ScalarAttributeType::S)
                .build()?,
            AttributeDefinition::builder()
                .attribute_name(table.sort_key())
                .attribute_type(ScalarAttributeType::S)
                .build()?,
        ];

        let key_schema = vec![
            KeySchemaElement::builder()
                .attribute_name(table.partition_key())
                .key_type(KeyType::Hash)
                .build()?,
            KeySchemaElement::builder()
                .attribute_name(table.sort_key())
                .key_type(KeyType::Range)
                .build()?,
        ];

        self.client
            .create_table()
            .table_name(table.name())
            .billing_mode(BillingMode::PayPerRequest)
            .set_attribute_definitions(Some(attribute_definitions))
            .set_key_schema(Some(key_schema))
            .send()
            .await
            .map_err(sdk_error)?;

        info!("Table '{}' requested, waiting for it to become active", table.name());
        wait_until(
            || self.table_is_active(table.name()),
            ACTIVE_POLL_DELAY,
            ACTIVE_MAX_POLLS,
        )
        .await
        .map_err(|e| anyhow!("table '{}' did not become active: {e:#}", table.name()))?;
        info!("Table '{}' is active", table.name());
        Ok(())
    }

    async fn put_batch(&self, table_name: &str, items: Vec<Item>) -> Result<()> {
        let requests = items
            .into_iter()
            .map(|item| -> Result<WriteRequest> {
                let put = PutRequest::builder().set_item(Some(item.attributes)).build()?;
                Ok(WriteRequest::builder().put_request(put).build())
            })
            .collect::<Result<Vec<_>>>()?;

        let total = requests.len();
        for chunk in requests.chunks(BATCH_WRITE_LIMIT) {
            self.write_chunk(table_name, chunk.to_vec()).await?;
        }

        info!("{total} items written to '{table_name}'");
        Ok(())
    }

    async fn scan(&self, table_name: &str, projection: Option<&[&str]>) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        let mut last_evaluated_key = None;

        loop {
            let mut scan = self.client.scan().table_name(table_name);

            if let Some(names) = projection {
                let placeholders: Vec<String> =
                    (0..names.len()).map(|i| format!("#p{i}")).collect();
                scan = scan.projection_expression(placeholders.join(", "));
                for (placeholder, name) in placeholders.into_iter().zip(names) {
                    scan = scan.expression_attribute_names(placeholder, *name);
                }
            }

            if let Some(key) = last_evaluated_key {
                scan = scan.set_exclusive_start_key(Some(key));
            }

            let response: ScanOutput = scan.send().await.map_err(sdk_error)?;

            if let Some(new_items) = response.items {
                items.extend(new_items.into_iter().map(Item::from));
            }

            last_evaluated_key = response.last_evaluated_key;

            if last_evaluated_key.is_none() {
                break;
            }
        }

        Ok(items)
    }

    async fn query_items(
        &self,
        table_name: &str,
        partition_key: (&str, AttributeValue),
    ) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        let mut last_evaluated_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let response = self
                .client
                .query()
                .table_name(table_name)
                .key_condition_expression("#pk = :pkval")
                .expression_attribute_names("#pk", partition_key.0)
                .expression_attribute_values(":pkval", partition_key.1.clone())
                .set_exclusive_start_key(last_evaluated_key)
                .send()
                .await
                .map_err(sdk_error)?;

            items.extend(response.items.unwrap_or_default().into_iter().map(Item::from));

            last_evaluated_key = response.last_evaluated_key;
            if last_evaluated_key.is_none() {
                break;
            }
        }

        Ok(items)
    }

    async fn get_item(&self, table_name: &str, key: Item) -> Result<Option<Item>> {
        let response = self
            .client
            .get_item()
            .table_name(table_name)
            .set_key(Some(key.attributes))
            .send()
            .await
            .map_err(sdk_error)?;

        Ok(response.item.map(Item::from))
    }
}
