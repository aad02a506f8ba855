//! The fragment entity: a validated, owner-scoped, typed unit of stored
//! content.
//!
//! A fragment's `id`, `owner_id`, and `type` are immutable for its lifetime;
//! `size`, `updated`, and `version` advance together on every data write. The
//! derived accessors (`mime_type`, `is_text`, `formats`) are pure computations
//! over the stored type string and do no I/O.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::ids::{FragmentId, OwnerId};
use crate::model::catalog::{self, ContentType};

/// Metadata record for one stored payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    id: FragmentId,
    owner_id: OwnerId,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
    content_type: String,
    size: u64,
    version: u64,
}

impl Fragment {
    /// Construct a new fragment with a fresh ID for a payload of `size`
    /// bytes.
    ///
    /// Fails with a validation error when the owner is empty, and with an
    /// unsupported-type error when `content_type` is not in the catalog's
    /// supported-source set.
    pub fn new(owner_id: OwnerId, content_type: &str, size: u64) -> Result<Self> {
        let now = Utc::now();
        Self::from_parts(
            FragmentId::new(),
            owner_id,
            now,
            now,
            content_type.to_string(),
            size,
            1,
        )
    }

    /// Reconstruct a fragment from stored parts, re-validating the entity
    /// invariants.
    pub fn from_parts(
        id: FragmentId,
        owner_id: OwnerId,
        created: DateTime<Utc>,
        updated: DateTime<Utc>,
        content_type: String,
        size: u64,
        version: u64,
    ) -> Result<Self> {
        if owner_id.is_empty() {
            return Err(Error::validation("ownerId is required"));
        }
        if !catalog::is_supported_source(&content_type) {
            return Err(Error::UnsupportedType(content_type));
        }
        if updated < created {
            return Err(Error::validation("updated must not precede created"));
        }
        if version == 0 {
            return Err(Error::validation("version must be positive"));
        }
        Ok(Self {
            id,
            owner_id,
            created,
            updated,
            content_type,
            size,
            version,
        })
    }

    pub fn id(&self) -> FragmentId {
        self.id
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    /// The exact type string supplied at creation, parameters included.
    pub fn type_str(&self) -> &str {
        &self.content_type
    }

    /// Byte length of the currently stored payload.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Generation counter, advanced on every successful mutation. Served as
    /// the fragment's `ETag`.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The canonical content type (parameters stripped).
    pub fn content_type(&self) -> ContentType {
        // Valid by construction; from_parts rejects unsupported types.
        ContentType::parse(&self.content_type).expect("validated at construction")
    }

    /// The canonical MIME type string (type minus parameters).
    pub fn mime_type(&self) -> &'static str {
        self.content_type().as_mime()
    }

    /// Whether the stored payload is textual (`text/*`).
    pub fn is_text(&self) -> bool {
        self.content_type().is_text()
    }

    /// MIME types of all representations reachable from this fragment,
    /// identity first.
    pub fn formats(&self) -> Vec<&'static str> {
        catalog::reachable_targets(self.content_type())
            .iter()
            .map(|t| t.as_mime())
            .collect()
    }

    /// Record a data write: set the new payload length and advance `updated`.
    ///
    /// The caller persists the payload alongside the returned metadata; `size`
    /// is never set independently of a write.
    pub fn record_write(&mut self, payload_len: u64) {
        self.size = payload_len;
        self.updated = Utc::now();
        self.version += 1;
    }
}
