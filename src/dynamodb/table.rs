use std::fmt;

use crate::dynamodb::{FieldType, Throughput};

/// DynamoDB table configuration.
///
/// This struct describes a table keyed by a single partition (hash) attribute.
///
/// # Table Structure
///
/// - **Table Name**: A unique identifier for the table within your AWS account and region.
/// - **Partition Key**: Determines the partition where the item is stored. Every item
///   written to the table must carry it.
/// - **Throughput**: Provisioned capacity units, or on-demand billing.
///
/// # Example
///
/// ```ignore
/// use dynamodb::{FieldType, Table, Throughput};
///
/// let table = Table::new("my-courses", "semester", FieldType::String).with_throughput(
///     Throughput::Provisioned {
///         read_capacity_units: 1,
///         write_capacity_units: 1,
///     },
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Table<'a> {
    name: &'a str,
    partition_key: &'a str,
    key_type: FieldType,
    throughput: Throughput,
}

impl<'a> Table<'a> {
    /// Creates a new on-demand `Table` definition.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the DynamoDB table.
    /// * `partition_key` - The name of the partition key attribute.
    /// * `key_type` - The scalar type of the partition key.
    pub fn new(name: &'a str, partition_key: &'a str, key_type: FieldType) -> Self {
        Self {
            name,
            partition_key,
            key_type,
            throughput: Throughput::OnDemand,
        }
    }

    /// Returns the name of the table.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Returns the partition key of the table.
    pub fn partition_key(&self) -> &str {
        self.partition_key
    }

    pub fn key_type(&self) -> FieldType {
        self.key_type
    }

    pub fn throughput(&self) -> Throughput {
        self.throughput
    }

    /// Sets the capacity mode used when the table is created.
    pub fn with_throughput(mut self, throughput: Throughput) -> Self {
        self.throughput = throughput;
        self
    }
}

/// Lifecycle status reported by `DescribeTable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    Creating,
    Updating,
    Deleting,
    Active,
    Other(String),
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableStatus::Creating => f.write_str("CREATING"),
            TableStatus::Updating => f.write_str("UPDATING"),
            TableStatus::Deleting => f.write_str("DELETING"),
            TableStatus::Active => f.write_str("ACTIVE"),
            TableStatus::Other(status) => f.write_str(status),
        }
    }
}

/// Schema and status of an existing table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableMetadata {
    pub name: String,
    pub status: TableStatus,
    pub key_attribute: Option<String>,
    pub key_type: Option<FieldType>,
    pub throughput: Option<Throughput>,
    pub item_count: Option<i64>,
    pub arn: Option<String>,
}

impl TableMetadata {
    pub fn is_active(&self) -> bool {
        self.status == TableStatus::Active
    }
}

impl fmt::Display for TableMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "table '{}' [{}]", self.name, self.status)?;
        if let Some(key) = &self.key_attribute {
            write!(f, " key={key}")?;
            if let Some(key_type) = self.key_type {
                write!(f, " ({key_type:?})")?;
            }
        }
        match self.throughput {
            Some(Throughput::Provisioned {
                read_capacity_units,
                write_capacity_units,
            }) => write!(f, " rcu={read_capacity_units} wcu={write_capacity_units}")?,
            Some(Throughput::OnDemand) => write!(f, " on-demand")?,
            None => {}
        }
        if let Some(count) = self.item_count {
            write!(f, " items={count}")?;
        }
        if let Some(arn) = &self.arn {
            write!(f, " arn={arn}")?;
        }
        Ok(())
    }
}

/// Result of a `CreateTable` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
}

/// Acknowledgement of a successful put.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutAck {
    pub table_name: String,
}
