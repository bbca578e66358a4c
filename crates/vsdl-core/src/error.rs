//! error types for vsdl-core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown record: {0}")]
    RecordNotFound(String),

    #[error("unknown policy: {0}")]
    InvalidPolicy(String),

    #[error("policy does not cover record: missing {missing:?}, unexpected {unexpected:?}")]
    PolicyRecordMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("duplicate field name: {0}")]
    DuplicateField(String),

    #[error("malformed point or scalar encoding")]
    Malformed,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("unknown token id")]
    TokenNotFound,

    #[error("internal error: {0}")]
    Internal(String),
}
