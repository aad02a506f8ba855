//! Storage gateway: a thin asynchronous facade over the metadata and data
//! stores.
//!
//! Metadata and payload bytes are stored separately but are 1:1 and
//! co-addressed by (owner, id). The gateway itself holds no state beyond the
//! two store handles; callers must not assume any transaction boundary beyond
//! the single (metadata, data) pair; see the service layer for how the
//! two-step-write hazard is bounded on reads.

pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::ids::{FragmentId, OwnerId};
use crate::model::Fragment;

pub use sqlite::{init_memory_pool, init_pool, DbPool};

/// Store for fragment metadata records, scoped by owner.
///
/// `write` upserts with last-writer-wins semantics; optimistic concurrency is
/// layered on top by the service via the fragment's version counter.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// All metadata records for an owner, ordered by creation time then id.
    async fn list(&self, owner: &OwnerId) -> Result<Vec<Fragment>>;

    /// Read one record, `None` when absent.
    async fn read(&self, owner: &OwnerId, id: FragmentId) -> Result<Option<Fragment>>;

    /// Insert or replace a record.
    async fn write(&self, fragment: &Fragment) -> Result<()>;

    /// Remove a record; returns whether it existed.
    async fn delete(&self, owner: &OwnerId, id: FragmentId) -> Result<bool>;
}

/// Store for raw fragment payloads, scoped by owner.
///
/// Writes replace the payload wholesale; partial or append writes are not
/// supported.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Read a payload, `None` when absent.
    async fn read(&self, owner: &OwnerId, id: FragmentId) -> Result<Option<Bytes>>;

    /// Replace the payload for (owner, id).
    async fn write(&self, owner: &OwnerId, id: FragmentId, data: Bytes) -> Result<()>;

    /// Remove a payload; returns whether it existed.
    async fn delete(&self, owner: &OwnerId, id: FragmentId) -> Result<bool>;
}

/// Facade composing one metadata store and one data store.
#[derive(Clone)]
pub struct StorageGateway {
    metadata: Arc<dyn MetadataStore>,
    data: Arc<dyn DataStore>,
}

impl StorageGateway {
    /// Compose a gateway from explicit store implementations.
    pub fn new(metadata: Arc<dyn MetadataStore>, data: Arc<dyn DataStore>) -> Self {
        Self { metadata, data }
    }

    /// Gateway over the in-memory backend.
    pub fn memory() -> Self {
        let store = Arc::new(memory::MemoryStore::default());
        Self::new(store.clone(), store)
    }

    /// Gateway over the SQLite backend, sharing one connection pool for both
    /// stores.
    pub fn sqlite(pool: DbPool) -> Self {
        let store = Arc::new(sqlite::SqliteStore::new(pool));
        Self::new(store.clone(), store)
    }

    /// IDs of all fragments for an owner, in listing order.
    pub async fn list_ids(&self, owner: &OwnerId) -> Result<Vec<FragmentId>> {
        Ok(self
            .metadata
            .list(owner)
            .await?
            .into_iter()
            .map(|f| f.id())
            .collect())
    }

    /// Full metadata records for an owner, in listing order.
    pub async fn list_records(&self, owner: &OwnerId) -> Result<Vec<Fragment>> {
        self.metadata.list(owner).await
    }

    pub async fn read_metadata(&self, owner: &OwnerId, id: FragmentId) -> Result<Option<Fragment>> {
        self.metadata.read(owner, id).await
    }

    pub async fn write_metadata(&self, fragment: &Fragment) -> Result<()> {
        self.metadata.write(fragment).await
    }

    pub async fn read_data(&self, owner: &OwnerId, id: FragmentId) -> Result<Option<Bytes>> {
        self.data.read(owner, id).await
    }

    pub async fn write_data(&self, owner: &OwnerId, id: FragmentId, data: Bytes) -> Result<()> {
        self.data.write(owner, id, data).await
    }

    /// Remove metadata and payload for (owner, id); returns whether the
    /// metadata record existed.
    pub async fn delete(&self, owner: &OwnerId, id: FragmentId) -> Result<bool> {
        let existed = self.metadata.delete(owner, id).await?;
        self.data.delete(owner, id).await?;
        Ok(existed)
    }
}
