//! Command line and environment configuration.

use clap::{Parser, Subcommand, ValueEnum};
use std::str::FromStr;

use crate::dynamodb::{Column, UnknownColumn};

/// Administrative dashboard for DynamoDB tables keyed by `(date, id)`.
#[derive(Parser, Debug, Clone)]
#[command(name = "table-dashboard", version)]
pub struct Config {
    /// Table name to start with
    #[arg(long, env = "DASHBOARD_TABLE", default_value = "")]
    pub table: String,

    /// Which table store to talk to
    #[arg(long, value_enum, env = "DASHBOARD_STORE", default_value_t = StoreKind::Dynamodb)]
    pub store: StoreKind,

    /// Custom DynamoDB endpoint (e.g., http://localhost:8000 for DynamoDB Local)
    #[arg(long, env = "AWS_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Amazon DynamoDB, configured from the AWS_* environment variables
    Dynamodb,
    /// A throwaway store that lives as long as the process
    Memory,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Interactive prompt (default)
    Shell,

    /// Create the table
    Create,

    /// Insert synthetic records
    Insert {
        /// Number of records to insert
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
        rows: u32,
    },

    /// Show every record of the table
    Fetch,

    /// Look up one record by date and id
    Query {
        #[arg(long)]
        date: String,

        #[arg(long)]
        id: String,

        /// Only show the record if its factory matches (case-insensitive)
        #[arg(long, default_value = "")]
        filter: String,

        /// Comma separated columns to show (default: all)
        #[arg(long, default_value = "")]
        columns: ColumnList,
    },
}

/// Comma separated column selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnList(pub Vec<Column>);

impl FromStr for ColumnList {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::parse_list(s).map(ColumnList)
    }
}

impl Config {
    /// Loads AWS settings from the environment, applying `--endpoint-url` if given.
    ///
    /// Credentials are only resolved here, not validated.
    pub async fn sdk_config(&self) -> aws_config::SdkConfig {
        let mut loader = aws_config::from_env();
        if let Some(url) = &self.endpoint_url {
            loader = loader.endpoint_url(url);
        }
        loader.load().await
    }
}
