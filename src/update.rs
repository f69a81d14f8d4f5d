//! Read-modify-write transactions against a remote document.
//!
//! An [`UpdateTransaction`] fetches the full document into a local replica,
//! lets the caller mutate it, and on commit pushes only what changed since
//! the fetch. Dropping or aborting it pushes nothing.
//!
//! There is no concurrency check at push time. Pushes are CRDT merges, so
//! transactions racing on the same document converge, with their edits
//! interleaved at the CRDT's granularity.
//!
//! ```no_run
//! # async fn demo(conn: docsync::DocConnection) -> Result<(), docsync::Error> {
//! use yrs::{Doc, Text, Transact};
//!
//! conn.for_update(|doc: &mut Doc| {
//!     let text = doc.get_or_insert_text("text");
//!     let mut txn = doc.transact_mut();
//!     text.push(&mut txn, "Hello, world!");
//!     Ok::<_, docsync::Error>(())
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

use std::ops::{Deref, DerefMut};

use crate::connection::DocConnection;
use crate::error::Error;
use crate::replica::Replica;

/// Outcome of a committed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Committed {
    /// Nothing changed; no request was made.
    Unchanged,
    /// A diff of `bytes` bytes was pushed.
    Pushed { bytes: usize },
}

/// A local replica opened from a document, pending commit.
pub struct UpdateTransaction<'a, R: Replica> {
    conn: &'a DocConnection,
    replica: R,
    baseline: R::Baseline,
}

impl<'a, R: Replica> UpdateTransaction<'a, R> {
    /// Fetches the document and loads it into a fresh replica.
    pub async fn open(conn: &'a DocConnection) -> Result<Self, Error> {
        let update = conn.get_as_update().await?;

        let mut replica = R::empty();
        replica.apply_update(&update)?;
        let baseline = replica.baseline();

        tracing::debug!(
            "Opened update transaction on {} ({} bytes)",
            conn.doc_id(),
            update.len()
        );

        Ok(Self {
            conn,
            replica,
            baseline,
        })
    }

    /// Pushes the changes made since [`UpdateTransaction::open`], if any.
    pub async fn commit(mut self) -> Result<Committed, Error> {
        let Some(diff) = self.replica.encode_diff(&self.baseline) else {
            tracing::debug!("No changes to {}, skipping push", self.conn.doc_id());
            return Ok(Committed::Unchanged);
        };

        self.conn.update_doc(&diff).await?;
        tracing::debug!("Pushed {} bytes to {}", diff.len(), self.conn.doc_id());

        Ok(Committed::Pushed { bytes: diff.len() })
    }

    /// Discards the replica without pushing anything.
    pub fn abort(self) {
        tracing::debug!("Discarded update transaction on {}", self.conn.doc_id());
    }
}

impl<R: Replica> Deref for UpdateTransaction<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.replica
    }
}

impl<R: Replica> DerefMut for UpdateTransaction<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        &mut self.replica
    }
}

impl DocConnection {
    /// Opens an [`UpdateTransaction`] on this document.
    pub async fn begin_update<R: Replica>(&self) -> Result<UpdateTransaction<'_, R>, Error> {
        UpdateTransaction::open(self).await
    }

    /// Runs `f` against a fresh replica of the document.
    ///
    /// If `f` returns `Ok`, the changes it made are pushed. If it returns
    /// `Err`, nothing is pushed and the error is returned as is.
    pub async fn for_update<R, F, T, E>(&self, f: F) -> Result<T, E>
    where
        R: Replica,
        F: FnOnce(&mut R) -> Result<T, E>,
        E: From<Error>,
    {
        let mut txn = UpdateTransaction::<R>::open(self).await?;
        match f(&mut *txn) {
            Ok(value) => {
                txn.commit().await?;
                Ok(value)
            }
            Err(e) => {
                txn.abort();
                Err(e)
            }
        }
    }
}
