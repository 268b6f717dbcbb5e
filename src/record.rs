use anyhow::Result;
use aws_sdk_dynamodb::types::AttributeValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::dynamodb::Item;

/// A dashboard record as stored in a table.
///
/// `(date, id)` is the composite primary key; the remaining fields are plain
/// attributes. Records are written once and never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Partition key.
    pub date: String,
    /// Sort key, unique within a `date`.
    pub id: String,
    #[serde(rename = "factory_name")]
    pub factory_label: String,
    #[serde(rename = "metric")]
    pub metric_label: String,
    pub value: i64,
}

impl Record {
    pub fn to_item(&self) -> Result<Item> {
        let attributes: HashMap<String, AttributeValue> = serde_dynamo::to_item(self)?;
        Ok(Item::from(attributes))
    }

    pub fn from_item(item: &Item) -> Result<Self> {
        Ok(serde_dynamo::from_item(item.attributes.clone())?)
    }
}
