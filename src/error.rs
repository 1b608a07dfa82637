//! Item-scoped lookup errors.
//!
//! None of these are fatal to a row: the loader logs them and drops the item.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Details endpoint answered with a non-2xx status
    #[error("details lookup for item {item_id} failed with HTTP {status}")]
    Http { item_id: u64, status: u16 },

    /// Request never produced a response (connect, timeout, reset)
    #[error("details lookup for item {item_id} failed: {message}")]
    Network { item_id: u64, message: String },

    /// Response arrived but the body could not be decoded
    #[error("details for item {item_id} could not be decoded: {message}")]
    Decode { item_id: u64, message: String },
}

impl LookupError {
    pub fn item_id(&self) -> u64 {
        match self {
            LookupError::Http { item_id, .. }
            | LookupError::Network { item_id, .. }
            | LookupError::Decode { item_id, .. } => *item_id,
        }
    }
}
