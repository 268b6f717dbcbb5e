use crate::dynamodb::schema::{PARTITION_KEY, SORT_KEY};

/// DynamoDB table configuration.
///
/// This struct names a table and its composite primary key. Every table the
/// dashboard creates uses the same key schema: a `date` partition key and an
/// `id` sort key, both strings.
///
/// # Table Structure
///
/// - **Table Name**: A unique identifier for the table within your AWS account and region.
/// - **Primary Key**: A partition key plus a sort key.
///   - **Partition Key**: Determines the partition where the item is stored.
///   - **Sort Key**: Orders items that share a partition key and makes the pair unique.
///
/// # Capacity Mode
///
/// Tables are created on-demand (`PAY_PER_REQUEST`), so no read or write
/// throughput is provisioned up front.
///
/// # Example
///
/// ```
/// use dynamodb::Table;
///
/// let table = Table::composite("metrics");
/// assert_eq!(table.partition_key(), "date");
/// assert_eq!(table.sort_key(), "id");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table<'a> {
    name: &'a str,
    partition_key: &'a str,
    sort_key: &'a str,
}

impl<'a> Table<'a> {
    /// Creates a new `Table` instance.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the DynamoDB table.
    /// * `partition_key` - The name of the partition key attribute.
    /// * `sort_key` - The name of the sort key attribute.
    pub fn new(name: &'a str, partition_key: &'a str, sort_key: &'a str) -> Self {
        Self {
            name,
            partition_key,
            sort_key,
        }
    }

    /// Creates a table with the dashboard's `(date, id)` key schema.
    pub fn composite(name: &'a str) -> Self {
        Self::new(name, PARTITION_KEY, SORT_KEY)
    }

    /// Returns the name of the table.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Returns the partition key of the table.
    pub fn partition_key(&self) -> &'a str {
        self.partition_key
    }

    /// Returns the sort key of the table.
    pub fn sort_key(&self) -> &'a str {
        self.sort_key
    }
}
