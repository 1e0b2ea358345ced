use async_trait::async_trait;
use aws_sdk_dynamodb::{
    operation::describe_table::DescribeTableOutput,
    types::{
        AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ProvisionedThroughput,
        TableStatus as SdkTableStatus,
    },
    Client,
};
use tracing::{debug, info};

use crate::dynamodb::{
    error::{map_create_table_error, map_describe_table_error, map_put_item_error, map_scan_error},
    Condition, Connection, CreateOutcome, FieldType, Item, PutAck, Result, ScanPage,
    StoreConnector, Table, TableMetadata, TableStatus, Throughput,
};

/// DynamoDB connector backed by the AWS SDK.
///
/// Each method is a single SDK request; the SDK's own retry layer handles
/// throttling and transient faults.
///
/// # DynamoDB Concepts
///
/// ## Tables
/// In DynamoDB, a table is a collection of items (rows), and each item consists of attributes (columns).
/// Tables are schema-less apart from their primary key.
///
/// ## Operations
/// - **CreateTable**: Provision a table; it starts in `CREATING`
/// - **DescribeTable**: Read schema and lifecycle status
/// - **PutItem**: Add or replace an item by its primary key
/// - **Scan**: Read every item in a table, one page at a time, optionally filtered
///
/// # Example
///
/// ```ignore
/// use dynamodb::{Connection, DynamoDbConnector, TableClient, WaitConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let connection = Connection::connect("default", "us-west-2", None).await?;
///     let client = TableClient::new(DynamoDbConnector::new(&connection), WaitConfig::default());
///     let metadata = client.describe_table("my-courses").await?;
///     println!("{metadata}");
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DynamoDbConnector {
    client: Client,
}

impl DynamoDbConnector {
    /// Creates a new `DynamoDbConnector` instance.
    pub fn new(connection: &Connection) -> Self {
        Self {
            client: Client::new(connection.sdk_config()),
        }
    }
}

#[async_trait]
impl StoreConnector for DynamoDbConnector {
    async fn create_table(&self, table: &Table<'_>) -> Result<CreateOutcome> {
        let attribute_definition = AttributeDefinition::builder()
            .attribute_name(table.partition_key())
            .attribute_type(table.key_type().scalar_type())
            .build()?;

        let key_schema = KeySchemaElement::builder()
            .attribute_name(table.partition_key())
            .key_type(KeyType::Hash)
            .build()?;

        let mut request = self
            .client
            .create_table()
            .table_name(table.name())
            .attribute_definitions(attribute_definition)
            .key_schema(key_schema);

        request = match table.throughput() {
            Throughput::Provisioned {
                read_capacity_units,
                write_capacity_units,
            } => request
                .billing_mode(BillingMode::Provisioned)
                .provisioned_throughput(
                    ProvisionedThroughput::builder()
                        .read_capacity_units(read_capacity_units)
                        .write_capacity_units(write_capacity_units)
                        .build()?,
                ),
            Throughput::OnDemand => request.billing_mode(BillingMode::PayPerRequest),
        };

        match request.send().await {
            Ok(_) => {
                info!("Table '{}' creation requested", table.name());
                Ok(CreateOutcome::Created)
            }
            Err(e) => map_create_table_error(e),
        }
    }

    async fn describe_table(&self, table_name: &str) -> Result<TableMetadata> {
        let output = self
            .client
            .describe_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(|e| map_describe_table_error(e, table_name))?;

        Ok(metadata_from_output(table_name, &output))
    }

    async fn put_item(&self, table_name: &str, item: Item) -> Result<PutAck> {
        self.client
            .put_item()
            .table_name(table_name)
            .set_item(Some(item.into_attributes()))
            .send()
            .await
            .map_err(|e| map_put_item_error(e, table_name))?;

        info!("Item added to '{table_name}'");
        Ok(PutAck {
            table_name: table_name.to_string(),
        })
    }

    async fn scan_page(
        &self,
        table_name: &str,
        condition: &Condition,
        exclusive_start_key: Option<Item>,
    ) -> Result<ScanPage> {
        let mut scan = self.client.scan().table_name(table_name);

        if let Some(filter) = condition.to_filter_expression() {
            scan = scan
                .filter_expression(filter.expression)
                .set_expression_attribute_names(Some(filter.names))
                .set_expression_attribute_values(Some(filter.values));
        }

        if let Some(key) = exclusive_start_key {
            scan = scan.set_exclusive_start_key(Some(key.into_attributes()));
        }

        let response = scan
            .send()
            .await
            .map_err(|e| map_scan_error(e, table_name))?;

        let items: Vec<Item> = response
            .items
            .unwrap_or_default()
            .into_iter()
            .map(Item::from)
            .collect();
        debug!("Scan page from '{table_name}' returned {} items", items.len());

        Ok(ScanPage {
            items,
            last_evaluated_key: response.last_evaluated_key.map(Item::from),
        })
    }
}

fn metadata_from_output(table_name: &str, output: &DescribeTableOutput) -> TableMetadata {
    let Some(table) = output.table() else {
        return TableMetadata {
            name: table_name.to_string(),
            status: TableStatus::Other("UNKNOWN".to_string()),
            key_attribute: None,
            key_type: None,
            throughput: None,
            item_count: None,
            arn: None,
        };
    };

    let status = match table.table_status() {
        Some(SdkTableStatus::Active) => TableStatus::Active,
        Some(SdkTableStatus::Creating) => TableStatus::Creating,
        Some(SdkTableStatus::Updating) => TableStatus::Updating,
        Some(SdkTableStatus::Deleting) => TableStatus::Deleting,
        Some(other) => TableStatus::Other(other.as_str().to_string()),
        None => TableStatus::Other("UNKNOWN".to_string()),
    };

    let key_attribute = table
        .key_schema()
        .iter()
        .find(|element| element.key_type() == &KeyType::Hash)
        .map(|element| element.attribute_name().to_string());

    let key_type = key_attribute.as_deref().and_then(|key| {
        table
            .attribute_definitions()
            .iter()
            .find(|definition| definition.attribute_name() == key)
            .and_then(|definition| FieldType::from_scalar_type(definition.attribute_type()))
    });

    let on_demand = table
        .billing_mode_summary()
        .and_then(|summary| summary.billing_mode())
        .is_some_and(|mode| mode == &BillingMode::PayPerRequest);

    let throughput = if on_demand {
        Some(Throughput::OnDemand)
    } else {
        table.provisioned_throughput().and_then(|provisioned| {
            Some(Throughput::Provisioned {
                read_capacity_units: provisioned.read_capacity_units()?,
                write_capacity_units: provisioned.write_capacity_units()?,
            })
        })
    };

    TableMetadata {
        name: table.table_name().unwrap_or(table_name).to_string(),
        status,
        key_attribute,
        key_type,
        throughput,
        item_count: table.item_count(),
        arn: table.table_arn().map(str::to_string),
    }
}
