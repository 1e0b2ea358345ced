use async_stream::try_stream;
use aws_sdk_dynamodb::types::AttributeValue;
use futures_util::{Stream, TryStreamExt};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::dynamodb::{
    Condition, CreateOutcome, Error, Item, PutAck, Result, StoreConnector, Table, TableMetadata,
};
use crate::utils::poll_until;

/// How long and how often [`TableClient::ensure_table`] polls for `ACTIVE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Delay before the second poll; later delays grow by Fibonacci steps.
    pub interval: Duration,
    pub max_interval: Duration,
    pub timeout: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(20),
            timeout: Duration::from_secs(600),
        }
    }
}

/// Typed facade over a [`StoreConnector`].
///
/// Validation, the wait-until-active loop and scan pagination live here;
/// the connector only performs single requests. No operation retries on its
/// own: every connector error is returned to the caller as is.
#[derive(Debug)]
pub struct TableClient<C> {
    connector: C,
    wait: WaitConfig,
}

impl<C: StoreConnector> TableClient<C> {
    pub fn new(connector: C, wait: WaitConfig) -> Self {
        Self { connector, wait }
    }

    // --- Table Operations ---

    /// Creates the table if it doesn't exist, then waits until it is active.
    #[instrument(skip(self, table), fields(table = table.name()))]
    pub async fn ensure_table(&self, table: &Table<'_>) -> Result<TableMetadata> {
        match self.connector.describe_table(table.name()).await {
            Ok(existing) => {
                info!("Table '{}' exists ({})", table.name(), existing.status);
                if let Some(key) = existing.key_attribute.as_deref() {
                    if key != table.partition_key() {
                        warn!(
                            "Table '{}' is keyed by '{key}', expected '{}'",
                            table.name(),
                            table.partition_key()
                        );
                    }
                }
            }
            Err(Error::NotFound { .. }) => match self.connector.create_table(table).await? {
                CreateOutcome::Created => info!("Table '{}' created", table.name()),
                CreateOutcome::AlreadyExists => {
                    info!("Table '{}' was created concurrently", table.name())
                }
            },
            Err(e) => return Err(e),
        }

        self.wait_until_active(table.name()).await
    }

    /// Polls `DescribeTable` until the table reports `ACTIVE`.
    pub async fn wait_until_active(&self, table_name: &str) -> Result<TableMetadata> {
        let metadata = poll_until(
            move || async move {
                let metadata = self.connector.describe_table(table_name).await?;
                debug!("Table '{table_name}' status: {}", metadata.status);
                Ok::<_, Error>(metadata.is_active().then_some(metadata))
            },
            self.wait.interval,
            self.wait.max_interval,
            self.wait.timeout,
        )
        .await?;

        match metadata {
            Some(metadata) => {
                info!("Table '{table_name}' is active");
                Ok(metadata)
            }
            None => Err(Error::ProvisionTimeout {
                table_name: table_name.to_string(),
                timeout: self.wait.timeout,
            }),
        }
    }

    /// Retrieves the table's schema and status.
    pub async fn describe_table(&self, table_name: &str) -> Result<TableMetadata> {
        self.connector.describe_table(table_name).await
    }

    // --- Item Operations ---

    /// Puts an item into the table after checking it carries a valid key.
    ///
    /// Invalid items never reach the connector. Writes are last-write-wins.
    pub async fn put_item(&self, table: &Table<'_>, item: Item) -> Result<PutAck> {
        validate_item(table, &item)?;
        self.connector.put_item(table.name(), item).await
    }

    // --- Scan Operations ---

    /// Streams every item matching `condition`, following pages until the
    /// table is exhausted. Items arrive in no particular order.
    pub fn scan<'a>(
        &'a self,
        table_name: &'a str,
        condition: &'a Condition,
    ) -> impl Stream<Item = Result<Item>> + 'a {
        try_stream! {
            let mut start_key = None;
            let mut page_number = 0;
            loop {
                let page = self
                    .connector
                    .scan_page(table_name, condition, start_key.take())
                    .await?;
                page_number += 1;
                debug!("Scan page {page_number} of '{table_name}': {} items", page.items.len());

                for item in page.items {
                    yield item;
                }

                match page.last_evaluated_key {
                    Some(key) => start_key = Some(key),
                    None => break,
                }
            }
        }
    }

    /// Collects [`scan`](Self::scan) into a vector.
    pub async fn scan_all(&self, table_name: &str, condition: &Condition) -> Result<Vec<Item>> {
        self.scan(table_name, condition).try_collect().await
    }
}

fn validate_item(table: &Table<'_>, item: &Item) -> Result<()> {
    let key = table.partition_key();
    let value = item
        .get(key)
        .ok_or_else(|| Error::Validation(format!("missing key attribute '{key}'")))?;

    if !table.key_type().accepts(value) {
        return Err(Error::Validation(format!(
            "key attribute '{key}' must be of type {:?}",
            table.key_type()
        )));
    }

    if matches!(value, AttributeValue::S(s) if s.is_empty()) {
        return Err(Error::Validation(format!(
            "key attribute '{key}' must not be empty"
        )));
    }

    if let Some((name, _)) = item
        .iter()
        .find(|(_, value)| matches!(value, AttributeValue::Ss(set) if set.is_empty()))
    {
        return Err(Error::Validation(format!(
            "string set '{name}' must not be empty"
        )));
    }

    if let Some((name, _)) = item.iter().find(|(_, value)| {
        matches!(value, AttributeValue::N(n) if !n.parse::<f64>().is_ok_and(f64::is_finite))
    }) {
        return Err(Error::Validation(format!(
            "number '{name}' must be finite"
        )));
    }

    Ok(())
}
