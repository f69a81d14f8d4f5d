//! The CRDT capabilities the client relies on.
//!
//! The client never merges anything itself. It only needs to build an empty
//! replica, apply a binary update to it, serialize it, capture a baseline and
//! later encode what changed since that baseline. [`Replica`] names exactly
//! that surface.
//!
//! Two implementations are provided:
//! - `yrs::Doc`: Yjs updates, the format the collaboration server stores.
//! - `automerge::AutoCommit`: Automerge change chunks.

mod automerge_doc;
mod yrs_doc;

use thiserror::Error;

use crate::error::Error;

/// Errors raised while applying an update to a local replica.
#[derive(Error, Debug)]
pub enum ReplicaError {
    #[error("Failed to decode update: {0}")]
    Decode(String),

    #[error("Failed to apply update: {0}")]
    Apply(String),
}

impl From<ReplicaError> for Error {
    fn from(e: ReplicaError) -> Self {
        Error::unknown(e)
    }
}

/// A local CRDT replica.
pub trait Replica {
    /// Opaque token describing what the replica contained when it was taken.
    type Baseline;

    /// Creates a replica with no content.
    fn empty() -> Self;

    /// Applies a full-state or diff update. An empty slice is a no-op.
    fn apply_update(&mut self, update: &[u8]) -> Result<(), ReplicaError>;

    /// Encodes the entire replica as a single update.
    fn encode_state(&mut self) -> Vec<u8>;

    /// Captures the current baseline.
    fn baseline(&mut self) -> Self::Baseline;

    /// Encodes everything that changed since `since`.
    ///
    /// Returns `None` when nothing changed.
    fn encode_diff(&mut self, since: &Self::Baseline) -> Option<Vec<u8>>;
}
