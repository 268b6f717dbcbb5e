//! State shared by the actions of one interactive session.

use crate::activity::ActivityLog;
use crate::display::format_latency;
use crate::dynamodb::Column;
use crate::error::{DashboardError, Result};
use crate::query::{QueryOutcome, QueryWorkflow, SelectionError, Stage};
use crate::table_client::{Fetched, Inserted, TableClient};

/// Everything an action needs: the store client, the remembered table name,
/// the activity log and the in-progress query.
///
/// Every action records its outcome in the log before returning, success or not.
pub struct Session {
    client: TableClient,
    table_name: String,
    log: ActivityLog,
    query: QueryWorkflow,
}

impl Session {
    pub fn new(client: TableClient, table_name: &str) -> Self {
        let mut session = Self {
            client,
            table_name: String::new(),
            log: ActivityLog::new(),
            query: QueryWorkflow::new(),
        };
        session.set_table_name(table_name);
        session
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn set_table_name(&mut self, name: &str) {
        self.table_name = name.trim().to_string();
        self.query.set_table(&self.table_name);
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn query(&self) -> &QueryWorkflow {
        &self.query
    }

    pub async fn create_table(&mut self) -> Result<()> {
        let name = self.table_name.clone();
        match self.client.create_table(&name).await {
            Ok(()) => {
                self.log.success(format!("Created table '{name}'."));
                Ok(())
            }
            Err(e @ DashboardError::AlreadyExists(_)) => {
                self.log.failure(format!("{e}."));
                Err(e)
            }
            Err(e) => {
                self.log.failure(format!("Create table failed: {e}"));
                Err(e)
            }
        }
    }

    pub async fn insert_records(&mut self, rows: usize) -> Result<Inserted> {
        let name = self.table_name.clone();
        let result = if rows == 0 {
            Err(DashboardError::InsertFailed(
                "number of records must be a positive integer".to_string(),
            ))
        } else {
            self.client.insert_batch(&name, rows).await
        };
        match &result {
            Ok(inserted) => self.log.success(format!(
                "Inserted {} records into '{name}' in {}.",
                inserted.count,
                format_latency(inserted.latency)
            )),
            Err(e) => self.log.failure(format!("Insert failed: {e}")),
        }
        result
    }

    pub async fn fetch_records(&mut self) -> Result<Fetched> {
        let name = self.table_name.clone();
        let result = self.client.scan_all(&name).await;
        match &result {
            Ok(Fetched::Empty { .. }) => {
                self.log.success(format!("Fetched 0 records from '{name}'."))
            }
            Ok(Fetched::Records { items, latency }) => self.log.success(format!(
                "Fetched {} records from '{name}' in {}.",
                items.len(),
                format_latency(*latency)
            )),
            Err(e) => self.log.failure(format!("Fetch failed: {e}")),
        }
        result
    }

    /// Lists the dates of the current table for the query workflow.
    pub async fn load_dates(&mut self) -> std::result::Result<Vec<String>, SelectionError> {
        let result = self
            .query
            .load_partition_keys(&self.client)
            .await
            .map(<[String]>::to_vec);
        self.log_selection_failure(&result);
        result
    }

    /// Selects a date and lists the IDs stored under it.
    pub async fn choose_date(
        &mut self,
        date: &str,
    ) -> std::result::Result<Vec<String>, SelectionError> {
        let result = self
            .query
            .choose_partition(&self.client, date)
            .await
            .map(<[String]>::to_vec);
        self.log_selection_failure(&result);
        result
    }

    pub fn set_filter(&mut self, filter: &str) {
        self.query.set_filter(filter);
    }

    pub fn set_columns(&mut self, columns: Vec<Column>) {
        self.query.set_columns(columns);
    }

    pub fn choose_id(&mut self, id: &str) -> std::result::Result<(), SelectionError> {
        self.query.choose_sort_key(id)
    }

    /// Runs the selected lookup and records how it went.
    pub async fn run_query(&mut self) -> std::result::Result<QueryOutcome, SelectionError> {
        let key = match self.query.stage() {
            Stage::Ready {
                table,
                partition_key,
                sort_key,
            } => format!("({partition_key}, {sort_key}) in '{table}'"),
            _ => String::new(),
        };

        let result = self.query.execute(&self.client).await;
        match &result {
            Ok(QueryOutcome::Found { latency, .. }) => self.log.success(format!(
                "Queried {key} in {}.",
                format_latency(*latency)
            )),
            Ok(QueryOutcome::NotFound { .. }) => {
                self.log.failure(format!("No record found for {key}."))
            }
            Ok(QueryOutcome::FilterMismatch { filter, .. }) => self.log.failure(format!(
                "Record {key} does not match factory filter '{filter}'."
            )),
            Err(_) => self.log_selection_failure(&result),
        }
        result
    }

    fn log_selection_failure<T>(&mut self, result: &std::result::Result<T, SelectionError>) {
        if let Err(SelectionError::Store(e)) = result {
            self.log.failure(format!("Query failed: {e}"));
        }
    }
}
