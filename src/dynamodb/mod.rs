//! # DynamoDB Module
//!
//! This module provides the dashboard's interface to Amazon DynamoDB.
//!
//! ## Components
//!
//! - `DynamoDb`: A client wrapper implementing [`TableStore`](crate::store::TableStore).
//! - `Item`: Represents a DynamoDB item as a raw attribute map.
//! - `Column`: The attributes the dashboard writes and displays.
//! - `Table`: A table name plus its composite key.
//!
//! ## Usage
//!
//! To use this module, you need to set up the following environment variables:
//!
//! - `AWS_ACCESS_KEY_ID`: Your AWS access key ID.
//! - `AWS_SECRET_ACCESS_KEY`: Your AWS secret access key.
//! - `AWS_REGION`: The AWS region where your DynamoDB tables are located.
//!
//! Optionally, you can also set:
//! - `AWS_SESSION_TOKEN`: If you're using temporary credentials.
//! - `AWS_ENDPOINT_URL`: For using a custom endpoint (e.g., DynamoDB Local).
//!
//! Credentials are not checked up front. A missing or invalid credential shows
//! up as an error on the first table operation.

mod client;
mod item;
mod schema;
mod table;

pub use client::DynamoDb;
pub use item::Item;
pub use schema::{Column, FieldType, UnknownColumn, PARTITION_KEY, SORT_KEY};
pub use table::Table;
