//! [`Replica`] for Automerge documents.
//!
//! Heads play the role of the state vector; a diff is the concatenation of
//! all changes made after those heads.

use automerge::{AutoCommit, ChangeHash};

use super::{Replica, ReplicaError};

impl Replica for AutoCommit {
    type Baseline = Vec<ChangeHash>;

    fn empty() -> Self {
        AutoCommit::new()
    }

    fn apply_update(&mut self, update: &[u8]) -> Result<(), ReplicaError> {
        if update.is_empty() {
            return Ok(());
        }

        self.load_incremental(update)
            .map(|_| ())
            .map_err(|e| ReplicaError::Apply(e.to_string()))
    }

    fn encode_state(&mut self) -> Vec<u8> {
        self.save()
    }

    fn baseline(&mut self) -> Vec<ChangeHash> {
        self.get_heads().to_vec()
    }

    fn encode_diff(&mut self, since: &Vec<ChangeHash>) -> Option<Vec<u8>> {
        let bytes = self.save_after(since);
        if bytes.is_empty() {
            None
        } else {
            Some(bytes)
        }
    }
}
