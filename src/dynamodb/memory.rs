//! In-memory store for tests and offline runs.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use tokio::sync::RwLock;

use crate::dynamodb::{
    Condition, CreateOutcome, Error, FieldType, Item, PutAck, Result, ScanPage, StoreConnector,
    Table, TableMetadata, TableStatus, Throughput,
};

/// Number of calls made to each connector operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub create_table: usize,
    pub describe_table: usize,
    pub put_item: usize,
    pub scan: usize,
}

#[derive(Debug)]
struct StoredTable {
    key_attribute: String,
    key_type: FieldType,
    throughput: Throughput,
    /// Describes left before the table reports `ACTIVE`; `None` never activates.
    pending_polls: Option<usize>,
    items: BTreeMap<String, Item>,
}

impl StoredTable {
    fn status(&self) -> TableStatus {
        match self.pending_polls {
            Some(0) => TableStatus::Active,
            _ => TableStatus::Creating,
        }
    }
}

#[derive(Debug, Clone)]
struct Settings {
    activation_polls: Option<usize>,
    page_size: Option<usize>,
}

#[derive(Debug, Default)]
struct State {
    tables: HashMap<String, StoredTable>,
    next_put_failure: Option<String>,
    calls: CallCounts,
}

/// In-memory [`StoreConnector`].
///
/// Holds tables in a HashMap wrapped in `Arc<RwLock<_>>`; clones share state,
/// so a test can keep a handle for inspection after moving one into a
/// [`TableClient`](super::TableClient). Data is lost when the last handle is dropped.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    settings: Arc<Settings>,
    state: Arc<RwLock<State>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Creates an empty store whose tables are active as soon as they are created.
    pub fn new() -> Self {
        Self {
            settings: Arc::new(Settings {
                activation_polls: Some(0),
                page_size: None,
            }),
            state: Arc::new(RwLock::new(State::default())),
        }
    }

    /// New tables report `CREATING` for the first `polls` describes.
    pub fn with_activation_polls(mut self, polls: usize) -> Self {
        Arc::make_mut(&mut self.settings).activation_polls = Some(polls);
        self
    }

    /// New tables stay in `CREATING` forever.
    pub fn never_activate(mut self) -> Self {
        Arc::make_mut(&mut self.settings).activation_polls = None;
        self
    }

    /// Limits how many items a scan reads per page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        Arc::make_mut(&mut self.settings).page_size = Some(page_size.max(1));
        self
    }

    /// Makes the next put fail with [`Error::Transport`] carrying `message`.
    pub async fn fail_next_put(&self, message: impl Into<String>) {
        self.state.write().await.next_put_failure = Some(message.into());
    }

    pub async fn calls(&self) -> CallCounts {
        self.state.read().await.calls
    }

    pub async fn item_count(&self, table_name: &str) -> Option<usize> {
        let state = self.state.read().await;
        state.tables.get(table_name).map(|table| table.items.len())
    }
}

/// Orders items by key value, tagged with the value's type.
fn storage_key(value: &AttributeValue) -> Option<String> {
    match value {
        AttributeValue::S(s) => Some(format!("S:{s}")),
        AttributeValue::N(n) => Some(format!("N:{n}")),
        _ => None,
    }
}

#[async_trait]
impl StoreConnector for InMemoryStore {
    async fn create_table(&self, table: &Table<'_>) -> Result<CreateOutcome> {
        let mut state = self.state.write().await;
        state.calls.create_table += 1;

        if state.tables.contains_key(table.name()) {
            return Ok(CreateOutcome::AlreadyExists);
        }

        let pending_polls = self.settings.activation_polls;
        state.tables.insert(
            table.name().to_string(),
            StoredTable {
                key_attribute: table.partition_key().to_string(),
                key_type: table.key_type(),
                throughput: table.throughput(),
                pending_polls,
                items: BTreeMap::new(),
            },
        );
        Ok(CreateOutcome::Created)
    }

    async fn describe_table(&self, table_name: &str) -> Result<TableMetadata> {
        let mut state = self.state.write().await;
        state.calls.describe_table += 1;

        let table = state
            .tables
            .get_mut(table_name)
            .ok_or_else(|| Error::not_found(table_name))?;

        let status = table.status();
        if let Some(pending) = table.pending_polls.as_mut() {
            *pending = pending.saturating_sub(1);
        }

        Ok(TableMetadata {
            name: table_name.to_string(),
            status,
            key_attribute: Some(table.key_attribute.clone()),
            key_type: Some(table.key_type),
            throughput: Some(table.throughput),
            item_count: Some(table.items.len() as i64),
            arn: None,
        })
    }

    async fn put_item(&self, table_name: &str, item: Item) -> Result<PutAck> {
        let mut state = self.state.write().await;
        state.calls.put_item += 1;

        if let Some(message) = state.next_put_failure.take() {
            return Err(Error::Transport(message));
        }

        let table = state
            .tables
            .get_mut(table_name)
            .filter(|table| table.status() == TableStatus::Active)
            .ok_or_else(|| Error::not_found(table_name))?;

        let key = item
            .get(&table.key_attribute)
            .and_then(storage_key)
            .ok_or_else(|| {
                Error::Validation(format!("missing key attribute '{}'", table.key_attribute))
            })?;

        table.items.insert(key, item);
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
        let mut state = self.state.write().await;
        state.calls.scan += 1;
        let page_size = self.settings.page_size.unwrap_or(usize::MAX);

        let table = state
            .tables
            .get(table_name)
            .ok_or_else(|| Error::not_found(table_name))?;

        let start = exclusive_start_key
            .as_ref()
            .and_then(|key| key.get(&table.key_attribute))
            .and_then(storage_key);

        let mut remaining = table
            .items
            .iter()
            .filter(|(key, _)| start.as_ref().map_or(true, |start| *key > start))
            .map(|(_, item)| item)
            .peekable();

        // DynamoDB applies the page limit before the filter.
        let mut items = Vec::new();
        let mut last_read = None;
        for item in remaining.by_ref().take(page_size) {
            if condition.matches(item) {
                items.push(item.clone());
            }
            last_read = Some(item);
        }

        let last_evaluated_key = match remaining.peek() {
            Some(_) => last_read.and_then(|item| item.project(&table.key_attribute)),
            None => None,
        };

        Ok(ScanPage {
            items,
            last_evaluated_key,
        })
    }
}
