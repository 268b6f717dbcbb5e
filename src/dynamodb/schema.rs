use std::fmt;
use std::str::FromStr;

/// Attribute name of the partition (HASH) key of every dashboard table.
pub const PARTITION_KEY: &str = "date";

/// Attribute name of the sort (RANGE) key of every dashboard table.
pub const SORT_KEY: &str = "id";

/// A displayed column of a dashboard record.
///
/// DynamoDB itself is schemaless apart from the key attributes, so this enum
/// only describes the attributes the dashboard writes and knows how to show.
/// The declaration order is the display order.
///
/// # Example
///
/// ```
/// use dynamodb::Column;
///
/// let columns: Vec<Column> = Column::parse_list("date, value").unwrap();
/// assert_eq!(columns, vec![Column::Date, Column::Value]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Date,
    Id,
    FactoryName,
    Metric,
    Value,
}

/// Represents the type of a column as it is stored in DynamoDB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Stored as an `S` attribute.
    String,
    /// Stored as an `N` attribute.
    Number,
}

impl Column {
    /// Every column, in display order.
    pub const ALL: [Column; 5] = [
        Column::Date,
        Column::Id,
        Column::FactoryName,
        Column::Metric,
        Column::Value,
    ];

    /// Returns the attribute name used on the wire.
    pub fn attribute_name(self) -> &'static str {
        match self {
            Column::Date => PARTITION_KEY,
            Column::Id => SORT_KEY,
            Column::FactoryName => "factory_name",
            Column::Metric => "metric",
            Column::Value => "value",
        }
    }

    /// Returns the DynamoDB type of the column.
    pub fn field_type(self) -> FieldType {
        match self {
            Column::Value => FieldType::Number,
            _ => FieldType::String,
        }
    }

    /// Parses a comma separated list of attribute names.
    ///
    /// Duplicates are dropped and the result keeps display order. An empty
    /// list selects every column.
    pub fn parse_list(input: &str) -> Result<Vec<Column>, UnknownColumn> {
        let mut columns = input
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(Column::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        if columns.is_empty() {
            return Ok(Column::ALL.to_vec());
        }
        columns.sort();
        columns.dedup();
        Ok(columns)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute_name())
    }
}

/// Returned when a column name does not match any displayed attribute.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown column '{0}' (expected one of: date, id, factory_name, metric, value)")]
pub struct UnknownColumn(pub String);

impl FromStr for Column {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .into_iter()
            .find(|column| column.attribute_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownColumn(s.trim().to_string()))
    }
}
