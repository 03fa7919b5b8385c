//! Error types for content list operations.

use wfs_types::FeatureKey;

/// Errors that can occur while reading or mutating a content list.
///
/// All checks run before any mutation, so a failed operation leaves the list
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    /// A value of the wrong kind was assigned to a slot or group.
    #[error("wrong value kind: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// The container declares no group with this name.
    #[error("unknown group {group:?} on container {container}")]
    UnknownGroup { container: String, group: String },

    /// The key is not a member of the addressed group.
    #[error("key {key} is not a member of group {group:?}")]
    UnknownKey { group: String, key: FeatureKey },

    /// Raw append of a key that belongs to an exclusive group.
    #[error("key {key} belongs to exclusive group {group:?}; use the group setter")]
    GroupedKey { key: FeatureKey, group: String },

    /// The ordinal does not address a slot of the group.
    #[error("slot {ordinal} out of range for group {group:?}")]
    SlotOutOfRange { group: String, ordinal: u32 },
}

/// Convenience alias for content results.
pub type ContentResult<T> = Result<T, ContentError>;
