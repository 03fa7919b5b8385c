use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid {type_name} literal: {literal:?}")]
    InvalidLiteral { type_name: String, literal: String },

    #[error("invalid qualified name: {0:?}")]
    InvalidQName(String),

    #[error("{literal:?} is not one of the enumerated values {allowed:?}")]
    NotEnumerated {
        literal: String,
        allowed: Vec<String>,
    },
}
