use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use tracing::info;

use crate::dynamodb::{Item, Table};
use crate::store::TableStore;

/// A table store kept entirely in process memory.
///
/// Mirrors the DynamoDB behaviour the dashboard relies on: composite keys are
/// unique, writes to a missing table fail, queries return one partition in
/// sort key order and batched writes are not atomic. Data is lost when the
/// store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<BTreeMap<String, MemoryTable>>,
}

#[derive(Debug)]
struct MemoryTable {
    partition_key: String,
    sort_key: String,
    items: BTreeMap<(String, String), Item>,
}

impl MemoryTable {
    fn key_of(&self, item: &Item) -> Result<(String, String)> {
        let missing = |key: &str| {
            anyhow!("One or more parameter values were invalid: Missing the key {key} in the item")
        };
        let partition = item
            .get_string(&self.partition_key)
            .ok_or_else(|| missing(&self.partition_key))?;
        let sort = item
            .get_string(&self.sort_key)
            .ok_or_else(|| missing(&self.sort_key))?;
        Ok((partition.clone(), sort.clone()))
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found() -> anyhow::Error {
    anyhow!("ResourceNotFoundException: Requested resource not found")
}

fn validate_table_name(name: &str) -> Result<()> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if name.is_empty() || !valid_chars {
        bail!("ValidationException: TableName '{name}' must be made of [a-zA-Z0-9_.-]");
    }
    Ok(())
}

#[async_trait]
impl TableStore for InMemoryStore {
    async fn table_exists(&self, table_name: &str) -> Result<bool> {
        Ok(self.tables.lock().await.contains_key(table_name))
    }

    async fn create_table(&self, table: &Table<'_>) -> Result<()> {
        validate_table_name(table.name())?;
        let mut tables = self.tables.lock().await;
        if tables.contains_key(table.name()) {
            bail!("ResourceInUseException: Table already exists: {}", table.name());
        }
        tables.insert(
            table.name().to_string(),
            MemoryTable {
                partition_key: table.partition_key().to_string(),
                sort_key: table.sort_key().to_string(),
                items: BTreeMap::new(),
            },
        );
        info!("Table '{}' created in memory", table.name());
        Ok(())
    }

    async fn put_batch(&self, table_name: &str, items: Vec<Item>) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let table = tables.get_mut(table_name).ok_or_else(not_found)?;
        for item in items {
            let key = table.key_of(&item)?;
            table.items.insert(key, item);
        }
        Ok(())
    }

    async fn scan(&self, table_name: &str, projection: Option<&[&str]>) -> Result<Vec<Item>> {
        let tables = self.tables.lock().await;
        let table = tables.get(table_name).ok_or_else(not_found)?;
        Ok(table
            .items
            .values()
            .map(|item| match projection {
                Some(names) => Item::from(
                    item.attributes
                        .iter()
                        .filter(|(name, _)| names.contains(&name.as_str()))
                        .map(|(name, value)| (name.clone(), value.clone()))
                        .collect::<std::collections::HashMap<_, _>>(),
                ),
                None => item.clone(),
            })
            .collect())
    }

    async fn query_items(
        &self,
        table_name: &str,
        partition_key: (&str, AttributeValue),
    ) -> Result<Vec<Item>> {
        let tables = self.tables.lock().await;
        let table = tables.get(table_name).ok_or_else(not_found)?;
        if partition_key.0 != table.partition_key {
            bail!(
                "ValidationException: Query condition missed key schema element: {}",
                table.partition_key
            );
        }
        Ok(table
            .items
            .values()
            .filter(|item| item.attributes.get(partition_key.0) == Some(&partition_key.1))
            .cloned()
            .collect())
    }

    async fn get_item(&self, table_name: &str, key: Item) -> Result<Option<Item>> {
        let tables = self.tables.lock().await;
        let table = tables.get(table_name).ok_or_else(not_found)?;
        let key = table.key_of(&key)?;
        Ok(table.items.get(&key).cloned())
    }
}
