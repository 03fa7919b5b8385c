//! Error types for the schema crate.

use wfs_types::TypeError;

/// Errors that can occur while loading or querying a schema descriptor.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// No container type with this name is declared.
    #[error("unknown container type: {0}")]
    UnknownContainer(String),

    /// The container declares no group with this name.
    #[error("unknown group {group:?} on container {container}")]
    UnknownGroup { container: String, group: String },

    /// The container declares no attribute with this name.
    #[error("unknown attribute {attribute:?} on container {container}")]
    UnknownAttribute { container: String, attribute: String },

    /// The descriptor is structurally invalid.
    #[error("invalid schema for {container}: {reason}")]
    Invalid { container: String, reason: String },

    /// A default literal does not parse against its declared type.
    #[error("bad default for {container}@{attribute}: {source}")]
    BadDefault {
        container: String,
        attribute: String,
        #[source]
        source: TypeError,
    },

    /// TOML deserialization failed.
    #[error("parse error: {0}")]
    Parse(String),

    /// TOML serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Reading a descriptor file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for schema results.
pub type SchemaResult<T> = Result<T, SchemaError>;
