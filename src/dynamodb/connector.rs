use async_trait::async_trait;

use crate::dynamodb::{Condition, CreateOutcome, Item, PutAck, Result, Table, TableMetadata};

/// One page of `Scan` results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanPage {
    pub items: Vec<Item>,
    /// Key of the last item read; `None` once the table is exhausted.
    pub last_evaluated_key: Option<Item>,
}

// Underlying store, which performs the actual network operations. Kept as a
// trait so that a real SDK client and an in-memory fake can be swapped.
//
// Kept minimal and close to the SDK operations it wraps: validation, waiting
// and pagination live in `TableClient`.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn create_table(&self, table: &Table<'_>) -> Result<CreateOutcome>;

    async fn describe_table(&self, table_name: &str) -> Result<TableMetadata>;

    async fn put_item(&self, table_name: &str, item: Item) -> Result<PutAck>;

    async fn scan_page(
        &self,
        table_name: &str,
        condition: &Condition,
        exclusive_start_key: Option<Item>,
    ) -> Result<ScanPage>;
}
