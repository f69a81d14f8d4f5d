//! [`Replica`] for Yjs documents.

use yrs::updates::decoder::Decode;
use yrs::{Doc, ReadTxn, Snapshot, StateVector, Transact, Update};

use super::{Replica, ReplicaError};

/// The baseline is a snapshot (state vector plus delete set), so a
/// transaction that only deletes content is still seen as a change.
impl Replica for Doc {
    type Baseline = Snapshot;

    fn empty() -> Self {
        Doc::new()
    }

    fn apply_update(&mut self, update: &[u8]) -> Result<(), ReplicaError> {
        if update.is_empty() {
            return Ok(());
        }

        let update = Update::decode_v1(update).map_err(|e| ReplicaError::Decode(e.to_string()))?;
        let mut txn = self.transact_mut();
        txn.apply_update(update)
            .map_err(|e| ReplicaError::Apply(e.to_string()))
    }

    fn encode_state(&mut self) -> Vec<u8> {
        self.transact()
            .encode_state_as_update_v1(&StateVector::default())
    }

    fn baseline(&mut self) -> Snapshot {
        self.transact().snapshot()
    }

    fn encode_diff(&mut self, since: &Snapshot) -> Option<Vec<u8>> {
        let txn = self.transact();
        if txn.snapshot() == *since {
            return None;
        }
        Some(txn.encode_state_as_update_v1(&since.state_map))
    }
}
