//! Dashboard operations on top of a [`TableStore`].
//!
//! Each method is one attempt at one store operation. Store failures come back
//! as the matching [`DashboardError`] kind; soft outcomes such as an empty
//! table or a missing record are part of the success value.

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::dynamodb::{Item, Table, PARTITION_KEY, SORT_KEY};
use crate::error::{DashboardError, Result};
use crate::generator;
use crate::record::Record;
use crate::store::TableStore;

/// Result of a batched insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inserted {
    pub count: usize,
    /// Wall-clock time spent in the batched write.
    pub latency: Duration,
}

/// Result of scanning a whole table.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Empty { latency: Duration },
    Records { items: Vec<Item>, latency: Duration },
}

/// Result of a lookup by full key.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    NotFound { latency: Duration },
    Found { item: Item, latency: Duration },
}

fn wall_clock_since(start: DateTime<Utc>) -> Duration {
    (Utc::now() - start).to_std().unwrap_or_default()
}

/// Store client shared by every action of a session.
pub struct TableClient {
    store: Box<dyn TableStore>,
}

impl TableClient {
    pub fn new(store: impl TableStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Creates `name` with the `(date, id)` key schema and waits until it is active.
    ///
    /// An existing table is left untouched and reported as [`DashboardError::AlreadyExists`].
    pub async fn create_table(&self, name: &str) -> Result<()> {
        let exists = self
            .store
            .table_exists(name)
            .await
            .map_err(DashboardError::create_failed)?;
        if exists {
            warn!("Table '{name}' already exists");
            return Err(DashboardError::AlreadyExists(name.to_string()));
        }

        self.store
            .create_table(&Table::composite(name))
            .await
            .map_err(|e| {
                error!("Create table '{name}' failed: {e:#}");
                DashboardError::create_failed(e)
            })?;
        info!("Table '{name}' created");
        Ok(())
    }

    /// Writes `n` generated records to `name` in one batched session.
    ///
    /// Records written before a failure are not rolled back.
    pub async fn insert_batch(&self, name: &str, n: usize) -> Result<Inserted> {
        let items = generator::generate(n)
            .iter()
            .map(Record::to_item)
            .collect::<anyhow::Result<Vec<_>>>()
            .map_err(DashboardError::insert_failed)?;

        let start = Utc::now();
        self.store.put_batch(name, items).await.map_err(|e| {
            error!("Insert into '{name}' failed: {e:#}");
            DashboardError::insert_failed(e)
        })?;
        let latency = wall_clock_since(start);

        info!("Inserted {n} records into '{name}' in {latency:?}");
        Ok(Inserted { count: n, latency })
    }

    /// Reads every record of `name`, in whatever order the store returns them.
    pub async fn scan_all(&self, name: &str) -> Result<Fetched> {
        let start = Utc::now();
        let items = self.store.scan(name, None).await.map_err(|e| {
            error!("Scan of '{name}' failed: {e:#}");
            DashboardError::fetch_failed(e)
        })?;
        let latency = wall_clock_since(start);

        if items.is_empty() {
            warn!("Table '{name}' is empty");
            return Ok(Fetched::Empty { latency });
        }
        info!("Scanned {} records from '{name}' in {latency:?}", items.len());
        Ok(Fetched::Records { items, latency })
    }

    /// Distinct partition keys of `name`, sorted ascending.
    pub async fn list_partition_keys(&self, name: &str) -> Result<Vec<String>> {
        let items = self
            .store
            .scan(name, Some(&[PARTITION_KEY][..]))
            .await
            .map_err(DashboardError::fetch_failed)?;

        let keys: BTreeSet<String> = items
            .iter()
            .filter_map(|item| item.get_string(PARTITION_KEY).cloned())
            .collect();
        Ok(keys.into_iter().collect())
    }

    /// Sort keys stored under `partition_key`, in store order.
    pub async fn list_sort_keys_for_partition(
        &self,
        name: &str,
        partition_key: &str,
    ) -> Result<Vec<String>> {
        let items = self
            .store
            .query_items(
                name,
                (PARTITION_KEY, AttributeValue::S(partition_key.to_string())),
            )
            .await
            .map_err(DashboardError::fetch_failed)?;

        Ok(items
            .iter()
            .filter_map(|item| item.get_string(SORT_KEY).cloned())
            .collect())
    }

    /// Fetches one record by its full key, timing the call with a monotonic clock.
    pub async fn get_record(&self, name: &str, partition_key: &str, sort_key: &str) -> Result<Lookup> {
        let key = Item::key((PARTITION_KEY, partition_key), (SORT_KEY, sort_key));

        let start = Instant::now();
        let item = self.store.get_item(name, key).await.map_err(|e| {
            error!("Get ({partition_key}, {sort_key}) from '{name}' failed: {e:#}");
            DashboardError::query_failed(e)
        })?;
        let latency = start.elapsed();

        Ok(match item {
            Some(item) => Lookup::Found { item, latency },
            None => {
                warn!("No record ({partition_key}, {sort_key}) in '{name}'");
                Lookup::NotFound { latency }
            }
        })
    }
}
