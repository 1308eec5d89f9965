use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{ReadableTable as _, TableDefinition};
use serde_json::Value;
use snafu::ResultExt as _;
use tracing::debug;

use crate::{
    CommitSnafu, DatabaseSnafu, DecodeSnafu, EncodeSnafu, JoinSnafu, KvStore, LOG_TARGET,
    StorageSnafu, StoreResult, TableSnafu, TransactionSnafu,
};

/// Key: document key
/// Value: JSON document bytes
const DOCUMENTS_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("wpgate_store::documents");

/// A redb-backed [`KvStore`].
#[derive(Debug, Clone)]
pub struct RedbStore {
    db: Arc<redb::Database>,
}

impl RedbStore {
    /// Open (or create) the database at `path`, making sure the documents
    /// table exists.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        debug!(target: LOG_TARGET, path = %path.display(), "Opening store");

        let db = tokio::task::spawn_blocking(move || -> StoreResult<redb::Database> {
            let db = redb::Database::create(path).context(DatabaseSnafu)?;
            let write_txn = db.begin_write().context(TransactionSnafu)?;
            // Opening the table in a write transaction ensures it exists
            let _ = write_txn.open_table(DOCUMENTS_TABLE).context(TableSnafu)?;
            write_txn.commit().context(CommitSnafu)?;
            Ok(db)
        })
        .await
        .context(JoinSnafu)??;

        Ok(Self { db: Arc::new(db) })
    }
}

#[async_trait]
impl KvStore for RedbStore {
    async fn read(&self, key: &str) -> StoreResult<Option<Value>> {
        let db = self.db.clone();
        let key = key.to_owned();

        tokio::task::spawn_blocking(move || {
            let read_txn = db.begin_read().context(TransactionSnafu)?;
            let table = read_txn.open_table(DOCUMENTS_TABLE).context(TableSnafu)?;

            let Some(bytes) = table.get(key.as_str()).context(StorageSnafu)? else {
                return Ok(None);
            };

            serde_json::from_slice(bytes.value())
                .map(Some)
                .context(DecodeSnafu { key: key.clone() })
        })
        .await
        .context(JoinSnafu)?
    }

    async fn write(&self, key: &str, value: &Value) -> StoreResult<()> {
        let bytes = serde_json::to_vec(value).context(EncodeSnafu { key })?;
        let db = self.db.clone();
        let key = key.to_owned();

        tokio::task::spawn_blocking(move || {
            let write_txn = db.begin_write().context(TransactionSnafu)?;
            {
                let mut table = write_txn.open_table(DOCUMENTS_TABLE).context(TableSnafu)?;
                table
                    .insert(key.as_str(), bytes.as_slice())
                    .context(StorageSnafu)?;
            }
            write_txn.commit().context(CommitSnafu)?;
            debug!(target: LOG_TARGET, key = %key, len = bytes.len(), "Stored document");
            Ok(())
        })
        .await
        .context(JoinSnafu)?
    }
}
