//! # DynamoDB Table Client
//!
//! This module provides a typed facade over a single-key DynamoDB table.
//! The facade, [`TableClient`], talks to the store only through the
//! [`StoreConnector`] trait, implemented by [`DynamoDbConnector`] for the real
//! service and by [`InMemoryStore`] for tests and offline runs.
//!
//! ## Overview
//!
//! - **Connection**: credentials and region resolved once, injected into the connector
//! - **Table**: name, partition key and capacity mode
//! - **Item**: an ordered attribute map built with consuming setters
//! - **Condition**: a one-attribute scan filter
//!
//! ## Table lifecycle
//!
//! A table moves from absent to `CREATING` to `ACTIVE`. [`TableClient::ensure_table`]
//! creates it if needed and polls until it is active or the configured timeout passes.
//!
//! ## Example
//!
//! ```ignore
//! use dynamodb::{Condition, FieldType, InMemoryStore, Item, Table, TableClient, WaitConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TableClient::new(InMemoryStore::new(), WaitConfig::default());
//!     let table = Table::new("my-courses", "semester", FieldType::String);
//!
//!     client.ensure_table(&table).await?;
//!
//!     let item = Item::new()
//!         .set_string("semester", "fall2016")
//!         .set_number("gpa", 4.0);
//!     client.put_item(&table, item).await?;
//!
//!     let items = client
//!         .scan_all("my-courses", &Condition::greater_than("gpa", 3.5))
//!         .await?;
//!     assert_eq!(items.len(), 1);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod condition;
mod connection;
mod connector;
mod error;
mod item;
mod memory;
mod schema;
mod table;
mod table_client;

pub use client::DynamoDbConnector;
pub use condition::{ComparisonOperator, Condition};
pub use connection::Connection;
pub use connector::{ScanPage, StoreConnector};
pub use error::{Error, Result};
pub use item::Item;
pub use memory::InMemoryStore;
pub use schema::{FieldType, Throughput};
pub use table::{CreateOutcome, PutAck, Table, TableMetadata, TableStatus};
pub use table_client::{TableClient, WaitConfig};
