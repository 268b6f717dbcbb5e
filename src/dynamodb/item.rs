use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;

use crate::dynamodb::schema::Column;

/// Represents a DynamoDB item with various attribute types.
///
/// In DynamoDB, an item is a collection of attributes, each with a name and a value.
/// Items are similar to rows or records in other database systems.
///
/// Items read back from a table can have any shape, so the dashboard keeps
/// them as raw attribute maps and only converts to a typed
/// [`Record`](crate::record::Record) where it needs one.
///
/// # Primary Key
///
/// - Every item in a table is uniquely identified by its primary key.
/// - Dashboard tables use a composite key: `date` (partition) and `id` (sort).
///
/// # Example
///
/// ```
/// use dynamodb::Item;
///
/// let item = Item::new()
///     .set_string("date", "2025-11-10")
///     .set_string("id", "1")
///     .set_number("value", 0);
/// ```
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Item {
    pub(crate) attributes: HashMap<String, AttributeValue>,
}

impl Item {
    /// Creates a new empty `Item`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the key of a single item from its partition and sort key values.
    pub fn key(
        partition_key: (&str, impl Into<String>),
        sort_key: (&str, impl Into<String>),
    ) -> Self {
        Self::new()
            .set_string(partition_key.0, partition_key.1)
            .set_string(sort_key.0, sort_key.1)
    }

    /// Sets a string attribute.
    pub fn set_string(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .insert(key.into(), AttributeValue::S(value.into()));
        self
    }

    /// Sets a number attribute.
    ///
    /// DynamoDB transmits numbers as strings, so any integer is stored exactly.
    pub fn set_number(mut self, key: impl Into<String>, value: impl Into<i64>) -> Self {
        self.attributes
            .insert(key.into(), AttributeValue::N(value.into().to_string()));
        self
    }

    /// Gets the value of an attribute as a string.
    ///
    /// Returns `None` if the attribute doesn't exist or is not a string.
    pub fn get_string(&self, key: &str) -> Option<&String> {
        self.attributes.get(key).and_then(|av| av.as_s().ok())
    }

    /// Gets the value of an attribute as an integer.
    ///
    /// Returns `None` if the attribute doesn't exist, is not a number, or can't be parsed as i64.
    pub fn get_number(&self, key: &str) -> Option<i64> {
        self.attributes
            .get(key)
            .and_then(|av| av.as_n().ok())
            .and_then(|n| n.parse().ok())
    }

    /// Returns `true` if the item carries the attribute.
    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Returns the attribute names present on the item.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Renders an attribute for display.
    ///
    /// Strings and numbers are shown as-is, anything else in its debug form.
    pub fn display_value(&self, key: &str) -> Option<String> {
        self.attributes.get(key).map(|av| match av {
            AttributeValue::S(s) => s.clone(),
            AttributeValue::N(n) => n.clone(),
            AttributeValue::Bool(b) => b.to_string(),
            AttributeValue::Null(_) => "null".to_string(),
            other => format!("{other:?}"),
        })
    }

    /// Keeps only the requested columns.
    ///
    /// Columns the item does not carry are skipped rather than reported.
    pub fn project(&self, columns: &[Column]) -> Item {
        let attributes = columns
            .iter()
            .filter_map(|column| {
                let name = column.attribute_name();
                self.attributes
                    .get(name)
                    .map(|value| (name.to_string(), value.clone()))
            })
            .collect();
        Item { attributes }
    }

    /// Returns `true` if the item's `factory_name` equals `filter`, ignoring case.
    ///
    /// A blank filter matches every item.
    pub fn matches_factory(&self, filter: &str) -> bool {
        let filter = filter.trim();
        if filter.is_empty() {
            return true;
        }
        self.get_string(Column::FactoryName.attribute_name())
            .is_some_and(|factory| factory.to_lowercase() == filter.to_lowercase())
    }
}

impl From<HashMap<String, AttributeValue>> for Item {
    fn from(attributes: HashMap<String, AttributeValue>) -> Self {
        Self { attributes }
    }
}

impl From<Item> for HashMap<String, AttributeValue> {
    fn from(item: Item) -> Self {
        item.attributes
    }
}
