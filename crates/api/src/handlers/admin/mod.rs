//! Admin-only handlers that have no public counterpart.

pub mod accounts;
pub mod events;
