//! Error types for the relayer API model.

use thiserror::Error;

/// Main error type for union, cost and validation operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// A variant could not be serialized.
    #[error("failed to encode {target}: {message}")]
    Encode { target: &'static str, message: String },

    /// Stored bytes do not parse as the requested shape.
    #[error("failed to decode {target}: {message}")]
    Decode { target: &'static str, message: String },

    /// The container holds a different variant than the one requested.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: &'static str, actual: String },

    /// The discriminator is not part of the closed registry.
    #[error("unknown discriminator: {0}")]
    UnknownDiscriminator(String),

    /// The task type is not part of the closed registry.
    #[error("unknown task type: {0}")]
    UnknownTaskType(String),

    /// No variant has ever been set on the container.
    #[error("union is empty")]
    EmptyUnion,

    /// Stored cost does not have the requested shape.
    #[error("cost is not {expected}: {message}")]
    ShapeMismatch { expected: &'static str, message: String },

    /// Two fees in the same list share an id.
    #[error("duplicate fee ID: {0}")]
    DuplicateFeeId(String),

    /// The event type requires a cost but none was provided.
    #[error("cost is required for {event_type}")]
    MissingCost { event_type: String },

    /// Ordinal outside the on-chain TokenManagerType enum.
    #[error("invalid TokenManagerType: {0}")]
    InvalidTokenManagerType(u8),
}

impl ApiError {
    /// Returns true if this error comes from semantic validation
    /// rather than from structural decoding.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ApiError::ShapeMismatch { .. }
                | ApiError::DuplicateFeeId(_)
                | ApiError::MissingCost { .. }
        )
    }

    /// Returns true if the caller asked for the wrong variant or used a tag
    /// outside the registry.
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            ApiError::TypeMismatch { .. }
                | ApiError::UnknownDiscriminator(_)
                | ApiError::UnknownTaskType(_)
                | ApiError::EmptyUnion
        )
    }

    /// Wraps a serialization failure for `target`.
    pub fn encode(target: &'static str, err: serde_json::Error) -> Self {
        ApiError::Encode {
            target,
            message: err.to_string(),
        }
    }

    /// Wraps a deserialization failure for `target`.
    pub fn decode(target: &'static str, err: serde_json::Error) -> Self {
        ApiError::Decode {
            target,
            message: err.to_string(),
        }
    }
}

/// Convenience Result type for relayer API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
