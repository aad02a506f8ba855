//! In-memory storage backend.
//!
//! Backs the `memory` storage configuration and the test suite. Both stores
//! live in one struct so a single allocation can serve as metadata and data
//! store; keys are (owner, id) pairs, so cross-owner reads miss by
//! construction.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use crate::error::Result;
use crate::ids::{FragmentId, OwnerId};
use crate::model::Fragment;

use super::{DataStore, MetadataStore};

type Key = (OwnerId, FragmentId);

/// Process-local fragment storage.
#[derive(Default)]
pub struct MemoryStore {
    metadata: DashMap<Key, Fragment>,
    data: DashMap<Key, Bytes>,
}

#[async_trait]
impl MetadataStore for MemoryStore {
    async fn list(&self, owner: &OwnerId) -> Result<Vec<Fragment>> {
        let mut fragments: Vec<Fragment> = self
            .metadata
            .iter()
            .filter(|entry| &entry.key().0 == owner)
            .map(|entry| entry.value().clone())
            .collect();
        // DashMap iteration order is arbitrary; impose the listing order.
        fragments.sort_by_key(|f| (f.created(), f.id().to_string()));
        Ok(fragments)
    }

    async fn read(&self, owner: &OwnerId, id: FragmentId) -> Result<Option<Fragment>> {
        Ok(self
            .metadata
            .get(&(owner.clone(), id))
            .map(|entry| entry.value().clone()))
    }

    async fn write(&self, fragment: &Fragment) -> Result<()> {
        self.metadata.insert(
            (fragment.owner_id().clone(), fragment.id()),
            fragment.clone(),
        );
        Ok(())
    }

    async fn delete(&self, owner: &OwnerId, id: FragmentId) -> Result<bool> {
        Ok(self.metadata.remove(&(owner.clone(), id)).is_some())
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn read(&self, owner: &OwnerId, id: FragmentId) -> Result<Option<Bytes>> {
        Ok(self
            .data
            .get(&(owner.clone(), id))
            .map(|entry| entry.value().clone()))
    }

    async fn write(&self, owner: &OwnerId, id: FragmentId, data: Bytes) -> Result<()> {
        self.data.insert((owner.clone(), id), data);
        Ok(())
    }

    async fn delete(&self, owner: &OwnerId, id: FragmentId) -> Result<bool> {
        Ok(self.data.remove(&(owner.clone(), id)).is_some())
    }
}
