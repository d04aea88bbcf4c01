//! Domain rules shared by the companion API server and client session.
//!
//! Everything in this crate is pure: no I/O, no database, no HTTP. The
//! server applies these rules inside repository transactions; the client
//! applies them to its optimistic local copy.

pub mod auth_messages;
pub mod chat;
pub mod credits;
pub mod error;
pub mod gallery;
pub mod navigation;
pub mod payment;
pub mod profile;
pub mod reconcile;
pub mod referral;
pub mod roles;
pub mod tier;
pub mod types;
pub mod upsell;
