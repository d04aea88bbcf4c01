//! Client-side session for the companion platform.
//!
//! Holds the current screen, open overlays and an optimistic copy of the
//! signed-in account. The copy is mirrored to a small on-disk cache after
//! every change and reconciled against the server on a fixed interval
//! (see [`poller`]). Unlock decisions are made locally first and only then
//! sent to the server through an [`AccountRemote`].

pub mod cache;
pub mod config;
pub mod error;
pub mod memory;
pub mod poller;
pub mod remote;
pub mod session;

pub use cache::LocalCache;
pub use config::ClientConfig;
pub use error::{ClientError, RemoteError};
pub use memory::MemoryRemote;
pub use remote::{AccountRemote, HttpRemote, RemoteAccount};
pub use session::{ClientSession, LocalState};
