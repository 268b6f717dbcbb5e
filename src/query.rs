//! Interactive lookup of a single record.
//!
//! The workflow walks `NoTable -> KeysLoading -> PartitionChosen -> Ready`.
//! Any earlier step can be repeated at any time; after a lookup the workflow
//! returns to `PartitionChosen` so another ID under the same date can be
//! queried straight away.

use std::time::Duration;

use crate::dynamodb::{Column, Item};
use crate::error::DashboardError;
use crate::table_client::{Lookup, TableClient};

/// Mistakes in the order or content of query selections.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("Enter a valid table name to continue")]
    NoTable,

    #[error("Select a date first")]
    NoPartition,

    #[error("Select a record ID first")]
    NoSortKey,

    #[error("'{0}' is not one of the listed dates")]
    UnknownPartition(String),

    #[error("'{0}' is not one of the listed record IDs")]
    UnknownSortKey(String),

    #[error(transparent)]
    Store(#[from] DashboardError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    NoTable,
    KeysLoading {
        table: String,
    },
    PartitionChosen {
        table: String,
        partition_key: String,
    },
    Ready {
        table: String,
        partition_key: String,
        sort_key: String,
    },
}

/// What a triggered lookup produced.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    NotFound {
        latency: Duration,
    },
    /// The record exists but its factory does not match the filter; it is discarded.
    FilterMismatch {
        filter: String,
        factory: Option<String>,
    },
    /// The record passed the filter and was projected onto the chosen columns.
    Found {
        item: Item,
        latency: Duration,
    },
}

#[derive(Debug)]
pub struct QueryWorkflow {
    stage: Stage,
    partition_keys: Vec<String>,
    sort_keys: Vec<String>,
    filter: String,
    columns: Vec<Column>,
}

impl Default for QueryWorkflow {
    fn default() -> Self {
        Self {
            stage: Stage::NoTable,
            partition_keys: Vec::new(),
            sort_keys: Vec::new(),
            filter: String::new(),
            columns: Column::ALL.to_vec(),
        }
    }
}

impl QueryWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn table(&self) -> Option<&str> {
        match &self.stage {
            Stage::NoTable => None,
            Stage::KeysLoading { table }
            | Stage::PartitionChosen { table, .. }
            | Stage::Ready { table, .. } => Some(table),
        }
    }

    pub fn partition_key(&self) -> Option<&str> {
        match &self.stage {
            Stage::PartitionChosen { partition_key, .. } | Stage::Ready { partition_key, .. } => {
                Some(partition_key)
            }
            _ => None,
        }
    }

    pub fn partition_keys(&self) -> &[String] {
        &self.partition_keys
    }

    pub fn sort_keys(&self) -> &[String] {
        &self.sort_keys
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Points the workflow at `name`.
    ///
    /// Changing the table drops every selection made so far. Setting the same
    /// table again keeps them.
    pub fn set_table(&mut self, name: &str) {
        let name = name.trim();
        if self.table() == Some(name) {
            return;
        }
        *self = Self::default();
        if !name.is_empty() {
            self.stage = Stage::KeysLoading {
                table: name.to_string(),
            };
        }
    }

    /// Loads the dates present in the table.
    ///
    /// An empty result is not an error; the workflow stays in `KeysLoading`.
    pub async fn load_partition_keys(
        &mut self,
        client: &TableClient,
    ) -> Result<&[String], SelectionError> {
        let table = self.table().ok_or(SelectionError::NoTable)?.to_string();
        self.partition_keys = client.list_partition_keys(&table).await?;
        self.sort_keys.clear();
        self.stage = Stage::KeysLoading { table };
        Ok(&self.partition_keys)
    }

    /// Selects a date and loads the IDs stored under it.
    pub async fn choose_partition(
        &mut self,
        client: &TableClient,
        partition_key: &str,
    ) -> Result<&[String], SelectionError> {
        let table = self.table().ok_or(SelectionError::NoTable)?.to_string();
        if !self.partition_keys.iter().any(|key| key == partition_key) {
            return Err(SelectionError::UnknownPartition(partition_key.to_string()));
        }
        self.sort_keys = client
            .list_sort_keys_for_partition(&table, partition_key)
            .await?;
        self.stage = Stage::PartitionChosen {
            table,
            partition_key: partition_key.to_string(),
        };
        Ok(&self.sort_keys)
    }

    /// Sets the factory filter. Blank disables filtering.
    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.trim().to_string();
    }

    /// Sets the output columns. An empty selection means every column.
    pub fn set_columns(&mut self, columns: Vec<Column>) {
        self.columns = if columns.is_empty() {
            Column::ALL.to_vec()
        } else {
            columns
        };
    }

    /// Selects the ID to look up, moving to `Ready`.
    pub fn choose_sort_key(&mut self, sort_key: &str) -> Result<(), SelectionError> {
        let (table, partition_key) = match &self.stage {
            Stage::NoTable => return Err(SelectionError::NoTable),
            Stage::KeysLoading { .. } => return Err(SelectionError::NoPartition),
            Stage::PartitionChosen {
                table,
                partition_key,
            }
            | Stage::Ready {
                table,
                partition_key,
                ..
            } => (table.clone(), partition_key.clone()),
        };
        if !self.sort_keys.iter().any(|key| key == sort_key) {
            return Err(SelectionError::UnknownSortKey(sort_key.to_string()));
        }
        self.stage = Stage::Ready {
            table,
            partition_key,
            sort_key: sort_key.to_string(),
        };
        Ok(())
    }

    /// Runs the lookup for the current selection.
    ///
    /// Whatever happens, the workflow ends up back in `PartitionChosen`.
    pub async fn execute(&mut self, client: &TableClient) -> Result<QueryOutcome, SelectionError> {
        let (table, partition_key, sort_key) = match &self.stage {
            Stage::NoTable => return Err(SelectionError::NoTable),
            Stage::KeysLoading { .. } => return Err(SelectionError::NoPartition),
            Stage::PartitionChosen { .. } => return Err(SelectionError::NoSortKey),
            Stage::Ready {
                table,
                partition_key,
                sort_key,
            } => (table.clone(), partition_key.clone(), sort_key.clone()),
        };

        let lookup = client.get_record(&table, &partition_key, &sort_key).await;
        self.stage = Stage::PartitionChosen {
            table,
            partition_key,
        };

        Ok(match lookup? {
            Lookup::NotFound { latency } => QueryOutcome::NotFound { latency },
            Lookup::Found { item, .. } if !item.matches_factory(&self.filter) => {
                QueryOutcome::FilterMismatch {
                    filter: self.filter.clone(),
                    factory: item
                        .get_string(Column::FactoryName.attribute_name())
                        .cloned(),
                }
            }
            Lookup::Found { item, latency } => QueryOutcome::Found {
                item: item.project(&self.columns),
                latency,
            },
        })
    }
}
