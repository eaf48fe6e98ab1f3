//! Error types for buffkeep-core

use crate::{EffectKind, SlotIndex};
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A slot index outside the table's fixed capacity
    ///
    /// The capacity is fixed at startup to the host's maximum connection
    /// count, so this is always a programming error in the caller.
    #[error("{slot} out of range (capacity {capacity})")]
    InvalidSlot { slot: SlotIndex, capacity: usize },

    /// The kind exists in the catalog but is applied once, never maintained
    #[error("effect kind '{0}' cannot be toggled")]
    NotToggleable(EffectKind),

    /// A kind name that matches no known effect kind
    #[error("unknown effect kind: {0}")]
    UnknownKind(String),

    /// The kind has no catalog entry
    #[error("effect kind '{0}' is not in the catalog")]
    NotInCatalog(EffectKind),

    /// The host rejected a one-shot application
    #[error("apply failed: {0}")]
    Apply(#[from] ApplyError),
}

/// Failure reported by the host's apply-effect operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    /// The slot has no connected entity
    #[error("{0} is not connected")]
    NotConnected(SlotIndex),

    /// Any other host-side rejection
    #[error("host rejected effect: {0}")]
    Rejected(String),
}

// Compile-time check that Error is Send + Sync so host glue can move it across threads.
fn _assert_error_send_sync<T: Send + Sync>() {}
fn _error_is_send_sync() {
    _assert_error_send_sync::<Error>();
    _assert_error_send_sync::<ApplyError>();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidSlot {
            slot: SlotIndex::new(300),
            capacity: 256,
        };
        assert_eq!(err.to_string(), "slot:300 out of range (capacity 256)");

        let err: Error = ApplyError::NotConnected(SlotIndex::new(4)).into();
        assert_eq!(err.to_string(), "apply failed: slot:4 is not connected");

        let err: Error = ApplyError::Rejected("buff limit reached".into()).into();
        assert_eq!(
            err.to_string(),
            "apply failed: host rejected effect: buff limit reached"
        );
    }
}
