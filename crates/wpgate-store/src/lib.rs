//! Key-value stores for state the gateway keeps on the reader's side.
//!
//! The gateway only ever needs to read and overwrite whole JSON documents
//! under a fixed key, so that is all [`KvStore`] offers. [`MemoryStore`] is
//! for tests and one-shot runs; [`RedbStore`] survives restarts.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wpgate_store::{KvStore, RedbStore};
//!
//! let store: Arc<dyn KvStore> = Arc::new(RedbStore::open("wpgate.redb").await?);
//! store.write("greeting", &serde_json::json!(["hello"])).await?;
//! ```

mod memory;
mod redb_store;

use async_trait::async_trait;
use serde_json::Value;
use snafu::Snafu;
use tokio::task::JoinError;

pub use self::memory::MemoryStore;
pub use self::redb_store::RedbStore;

pub const LOG_TARGET: &str = "wpgate::store";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    #[snafu(display("Failed to open database: {source}"))]
    Database { source: redb::DatabaseError },
    #[snafu(display("Transaction error: {source}"))]
    Transaction {
        #[snafu(source(from(redb::TransactionError, Box::new)))]
        source: Box<redb::TransactionError>,
    },
    #[snafu(display("Table error: {source}"))]
    Table { source: redb::TableError },
    #[snafu(display("Storage error: {source}"))]
    Storage { source: redb::StorageError },
    #[snafu(display("Commit error: {source}"))]
    Commit { source: redb::CommitError },
    #[snafu(display("Blocking task failed: {source}"))]
    Join { source: JoinError },
    #[snafu(display("Failed to encode value for {key}: {source}"))]
    Encode {
        key: String,
        source: serde_json::Error,
    },
    /// Stored bytes under `key` are not valid JSON.
    #[snafu(display("Failed to decode value for {key}: {source}"))]
    Decode {
        key: String,
        source: serde_json::Error,
    },
    #[snafu(display("Store is not available"))]
    Unavailable,
}

impl StoreError {
    /// Whether the store itself works but the stored document is garbage.
    pub fn is_decode(&self) -> bool {
        matches!(self, StoreError::Decode { .. })
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A capability to read and overwrite JSON documents by key.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// `None` if nothing was ever written under `key`.
    async fn read(&self, key: &str) -> StoreResult<Option<Value>>;

    async fn write(&self, key: &str, value: &Value) -> StoreResult<()>;
}
