//! # Table store backends
//!
//! The dashboard talks to its table store through [`TableStore`], a thin set of
//! the primitives it needs: create a table, batch-write items, scan, query one
//! partition and get one item by its full key.
//!
//! Two implementations exist:
//!
//! - [`DynamoDb`](crate::dynamodb::DynamoDb): Amazon DynamoDB (or DynamoDB Local).
//! - [`InMemoryStore`]: a process-local store used for offline demos and tests.
//!
//! Backends report failures as `anyhow::Error` with the store's own message.
//! Mapping those into the dashboard's error kinds happens one level up, in
//! [`TableClient`](crate::table_client::TableClient).

mod memory;

use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;

use crate::dynamodb::{Item, Table};

pub use memory::InMemoryStore;

#[async_trait]
pub trait TableStore: Send + Sync {
    /// Checks if a table exists.
    async fn table_exists(&self, table_name: &str) -> Result<bool>;

    /// Creates a table with an on-demand, composite-key schema and waits
    /// until it is active.
    async fn create_table(&self, table: &Table<'_>) -> Result<()>;

    /// Writes `items` in one batched session.
    ///
    /// The session is not atomic: on failure, items written before the
    /// failing request stay in the table.
    async fn put_batch(&self, table_name: &str, items: Vec<Item>) -> Result<()>;

    /// Reads every item of a table, following pagination to the end.
    ///
    /// With `projection`, only the named attributes are returned.
    async fn scan(&self, table_name: &str, projection: Option<&[&str]>) -> Result<Vec<Item>>;

    /// Reads the items whose partition key equals the given value, in sort key order.
    async fn query_items(
        &self,
        table_name: &str,
        partition_key: (&str, AttributeValue),
    ) -> Result<Vec<Item>>;

    /// Gets a single item by its full primary key.
    async fn get_item(&self, table_name: &str, key: Item) -> Result<Option<Item>>;
}
