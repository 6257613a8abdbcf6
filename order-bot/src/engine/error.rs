//! Engine errors
//!
//! Validation failures never become errors: they re-prompt inside the
//! step handlers. What escapes a handler is either a store failure or a
//! broken dialogue invariant.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Stale button, or a step reached without the data it needs
    #[error("Invariant violated: {0}")]
    Invariant(String),
}

impl EngineError {
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::Store(err) if err.is_transient())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
