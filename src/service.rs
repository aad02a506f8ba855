//! Fragment lifecycle service: create, read, update, delete.
//!
//! Orchestrates the fragment entity and the storage gateway, enforcing the
//! entity invariants on every mutation. Each operation is presented as atomic
//! even though it issues two sequential writes (metadata, then data); the
//! window between them is bounded on the read side, where metadata without
//! data surfaces as a storage error rather than an empty payload.

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::ids::{FragmentId, OwnerId};
use crate::model::Fragment;
use crate::storage::StorageGateway;

/// Listing projection: bare IDs, or full metadata when expanded.
#[derive(Debug)]
pub enum Listing {
    Ids(Vec<FragmentId>),
    Full(Vec<Fragment>),
}

/// High-level fragment operations over the storage gateway.
#[derive(Clone)]
pub struct FragmentService {
    gateway: StorageGateway,
}

impl FragmentService {
    pub fn new(gateway: StorageGateway) -> Self {
        Self { gateway }
    }

    /// Create a fragment from a validated type and payload.
    ///
    /// The size is always computed from the payload, never supplied by the
    /// caller.
    pub async fn create(
        &self,
        owner: OwnerId,
        content_type: &str,
        data: Bytes,
    ) -> Result<Fragment> {
        let fragment = Fragment::new(owner.clone(), content_type, data.len() as u64)?;

        self.gateway.write_metadata(&fragment).await?;
        self.gateway.write_data(&owner, fragment.id(), data).await?;

        tracing::debug!(
            owner = %owner,
            id = %fragment.id(),
            content_type = fragment.type_str(),
            size = fragment.size(),
            "Fragment created"
        );
        Ok(fragment)
    }

    /// Fetch a fragment's metadata.
    pub async fn get(&self, owner: &OwnerId, id: FragmentId) -> Result<Fragment> {
        self.gateway
            .read_metadata(owner, id)
            .await?
            .ok_or_else(|| Error::not_found(id))
    }

    /// Fetch a fragment's metadata together with its payload.
    ///
    /// A fragment that has metadata but no payload is half-written state and
    /// surfaces as a storage error, never as an empty body.
    pub async fn get_data(&self, owner: &OwnerId, id: FragmentId) -> Result<(Fragment, Bytes)> {
        let fragment = self.get(owner, id).await?;
        let data = self
            .gateway
            .read_data(owner, id)
            .await?
            .ok_or_else(|| Error::storage(format!("fragment {id} has metadata but no payload")))?;
        Ok((fragment, data))
    }

    /// List an owner's fragments, as IDs or full metadata records.
    pub async fn list(&self, owner: &OwnerId, expand: bool) -> Result<Listing> {
        if expand {
            Ok(Listing::Full(self.gateway.list_records(owner).await?))
        } else {
            Ok(Listing::Ids(self.gateway.list_ids(owner).await?))
        }
    }

    /// Replace a fragment's payload.
    ///
    /// The declared type must equal the stored type exactly; type changes are
    /// never permitted on an existing fragment. When `expected_version` is
    /// given, the replace fails with a conflict if another write has landed
    /// since that version was read.
    pub async fn replace(
        &self,
        owner: &OwnerId,
        id: FragmentId,
        data: Bytes,
        declared_type: &str,
        expected_version: Option<u64>,
    ) -> Result<Fragment> {
        let mut fragment = self.get(owner, id).await?;

        if fragment.type_str() != declared_type {
            return Err(Error::TypeMismatch {
                stored: fragment.type_str().to_string(),
                declared: declared_type.to_string(),
            });
        }

        if let Some(expected) = expected_version {
            if expected != fragment.version() {
                return Err(Error::Conflict {
                    expected,
                    current: fragment.version(),
                });
            }
        }

        fragment.record_write(data.len() as u64);
        self.gateway.write_metadata(&fragment).await?;
        self.gateway.write_data(owner, id, data).await?;

        tracing::debug!(
            owner = %owner,
            id = %id,
            size = fragment.size(),
            version = fragment.version(),
            "Fragment replaced"
        );
        Ok(fragment)
    }

    /// Delete a fragment's metadata and payload.
    ///
    /// Deleting an id the owner does not have is always NotFound.
    pub async fn delete(&self, owner: &OwnerId, id: FragmentId) -> Result<()> {
        if !self.gateway.delete(owner, id).await? {
            return Err(Error::not_found(id));
        }
        tracing::debug!(owner = %owner, id = %id, "Fragment deleted");
        Ok(())
    }
}
