//! Error types used throughout fragstore.
//!
//! Every failure is resolved into one of these variants before it reaches the
//! HTTP layer; no raw storage or codec error crosses that boundary
//! unclassified. The split between [`Error::UnsupportedConversion`] and
//! [`Error::ConversionFailed`] matters: the former means the (source, target)
//! pair is never allowed (a client error), the latter means the pair was legal
//! but this payload could not be decoded (a server fault).

/// Unified error type for fragstore.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Construction input was malformed (missing owner, bad size, ...).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The supplied MIME type is not a supported source type.
    #[error("Unsupported fragment type: {0}")]
    UnsupportedType(String),

    /// The requested fragment does not exist for this owner.
    #[error("Fragment not found: {0}")]
    NotFound(String),

    /// An update attempted to change a fragment's immutable type.
    #[error("Fragment type cannot be changed (stored {stored}, declared {declared})")]
    TypeMismatch { stored: String, declared: String },

    /// The requested target representation is unreachable from the source.
    #[error("Cannot convert from {from} to .{to}")]
    UnsupportedConversion { from: String, to: String },

    /// A reachable conversion was attempted but the payload could not be
    /// decoded or transformed.
    #[error("Conversion failed: {0}")]
    ConversionFailed(String),

    /// A conditional update carried a stale version.
    #[error("Version conflict: expected {expected}, current {current}")]
    Conflict { expected: u64, current: u64 },

    /// The request did not carry valid credentials.
    #[error("Unauthorized")]
    Unauthorized,

    /// A storage gateway operation failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Create a new Validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new NotFound error for a fragment ID.
    pub fn not_found<S: std::fmt::Display>(id: S) -> Self {
        Self::NotFound(id.to_string())
    }

    /// Create a new ConversionFailed error.
    pub fn conversion_failed<S: Into<String>>(msg: S) -> Self {
        Self::ConversionFailed(msg.into())
    }

    /// Create a new Storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }

    /// HTTP status code this error maps to.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::TypeMismatch { .. } => 400,
            Self::Unauthorized => 401,
            Self::NotFound(_) => 404,
            Self::Conflict { .. } => 409,
            Self::UnsupportedType(_) | Self::UnsupportedConversion { .. } => 415,
            Self::ConversionFailed(_) | Self::Storage(_) => 500,
        }
    }

    /// Stable machine-readable code for response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::UnsupportedType(_) => "unsupported_type",
            Self::NotFound(_) => "not_found",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::UnsupportedConversion { .. } => "unsupported_conversion",
            Self::ConversionFailed(_) => "conversion_failed",
            Self::Conflict { .. } => "conflict",
            Self::Unauthorized => "unauthorized",
            Self::Storage(_) => "storage_error",
        }
    }

    /// Whether this error indicates a server fault worth logging, as opposed
    /// to an expected client-facing outcome.
    pub fn is_server_fault(&self) -> bool {
        matches!(self, Self::ConversionFailed(_) | Self::Storage(_))
    }
}

/// Result type alias using the fragstore Error type.
pub type Result<T> = std::result::Result<T, Error>;
