//! Error types for the editing core

use thiserror::Error;

use super::model::BlockKey;

/// Failure of a single edit operation
///
/// Edits are never fatal to the host: the dispatcher turns these into a
/// no-op on the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("block {0} not found")]
    BlockNotFound(BlockKey),

    #[error("selection spans blocks {anchor} and {focus}")]
    MultiBlockSelection { anchor: BlockKey, focus: BlockKey },

    #[error("offset {offset} out of bounds for block {key} of length {len}")]
    OffsetOutOfBounds {
        key: BlockKey,
        offset: usize,
        len: usize,
    },
}

/// Persisted content that cannot be turned back into a document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RawContentError {
    #[error("duplicate block key {0}")]
    DuplicateKey(String),

    #[error("style range {offset}+{length} exceeds block {key} of length {len}")]
    RangeOutOfBounds {
        key: String,
        offset: usize,
        length: usize,
        len: usize,
    },
}

/// Failure reading or writing the content store
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid stored JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid stored content: {0}")]
    Content(#[from] RawContentError),
}
