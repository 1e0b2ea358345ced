use aws_sdk_dynamodb::types::{AttributeValue, ScalarAttributeType};

/// Represents the type of a key attribute in a DynamoDB table.
///
/// DynamoDB is schemaless apart from the primary key, and the key attribute
/// must be one of the scalar types. This enum represents the subset used here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Represents a string field.
    String,
    /// Represents a number field.
    Number,
}

impl FieldType {
    pub(crate) fn scalar_type(self) -> ScalarAttributeType {
        match self {
            FieldType::String => ScalarAttributeType::S,
            FieldType::Number => ScalarAttributeType::N,
        }
    }

    pub(crate) fn from_scalar_type(scalar: &ScalarAttributeType) -> Option<Self> {
        match scalar {
            ScalarAttributeType::S => Some(FieldType::String),
            ScalarAttributeType::N => Some(FieldType::Number),
            _ => None,
        }
    }

    /// Returns `true` if `value` is of this type.
    pub fn accepts(self, value: &AttributeValue) -> bool {
        matches!(
            (self, value),
            (FieldType::String, AttributeValue::S(_)) | (FieldType::Number, AttributeValue::N(_))
        )
    }
}

/// Capacity mode requested when a table is created.
///
/// - **Provisioned**: You specify the number of reads and writes per second.
/// - **On-Demand**: DynamoDB instantly accommodates workloads as they ramp up or down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Throughput {
    Provisioned {
        read_capacity_units: i64,
        write_capacity_units: i64,
    },
    OnDemand,
}
