//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Response types where the row carries fields that must not leave the server

pub mod account;
pub mod chat_history;
pub mod companion;
pub mod event;
pub mod payment;
pub mod referral;
pub mod session;
