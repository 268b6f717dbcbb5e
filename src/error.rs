//! Error types for dashboard actions.

/// Failures of a single dashboard action against the table store.
///
/// Each variant carries the underlying store message verbatim so it can be
/// shown to the operator and written to the activity log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DashboardError {
    /// The table is already present; nothing was created.
    #[error("Table '{0}' already exists")]
    AlreadyExists(String),

    /// Table creation (or waiting for it to become active) failed.
    #[error("Error creating table: {0}")]
    CreateFailed(String),

    /// The batched write was aborted.
    #[error("Error inserting: {0}")]
    InsertFailed(String),

    /// A scan or key listing failed.
    #[error("Error fetching: {0}")]
    FetchFailed(String),

    /// A single-record lookup failed.
    #[error("Error querying record: {0}")]
    QueryFailed(String),
}

impl DashboardError {
    pub fn create_failed(err: anyhow::Error) -> Self {
        Self::CreateFailed(format!("{err:#}"))
    }

    pub fn insert_failed(err: anyhow::Error) -> Self {
        Self::InsertFailed(format!("{err:#}"))
    }

    pub fn fetch_failed(err: anyhow::Error) -> Self {
        Self::FetchFailed(format!("{err:#}"))
    }

    pub fn query_failed(err: anyhow::Error) -> Self {
        Self::QueryFailed(format!("{err:#}"))
    }
}

/// Result type for dashboard actions.
pub type Result<T> = std::result::Result<T, DashboardError>;
