//! docsync
//!
//! Client for reading and writing CRDT documents held by a collaboration
//! server.
//!
//! ## Flow
//!
//! 1. A [`DocumentManager`] is built from a connection string
//!    (`ys://<token>@host` for HTTP, `yss://...` for HTTPS).
//! 2. It creates documents and mints per-document [`ClientToken`]s.
//! 3. A [`DocConnection`] uses a token to fetch (`as-update`) and push
//!    (`update`) binary updates.
//! 4. [`DocConnection::for_update`] wraps fetch, local mutation and a
//!    diff-only push into one scoped call.
//!
//! The CRDT itself is whatever implements [`Replica`]; `yrs::Doc` and
//! `automerge::AutoCommit` are supported.

pub mod config;
pub mod connection;
pub mod connection_string;
pub mod error;
mod http;
pub mod manager;
pub mod protocol;
pub mod replica;
pub mod update;

#[cfg(test)]
mod testing;

pub use config::{Config, ConfigError, ConfigSource, ConfigValue};
pub use connection::DocConnection;
pub use connection_string::ConnectionString;
pub use error::{Error, ErrorCode, Result};
pub use manager::{create_doc, get_client_token, get_or_create_doc_and_token, DocumentManager};
pub use protocol::{
    AuthDocRequest, Authorization, CheckStoreResult, ClientToken, DocCreationResult,
};
pub use replica::{Replica, ReplicaError};
pub use update::{Committed, UpdateTransaction};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
