//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`]: any signed-in account (Bearer JWT).
//! - [`rbac::RequireAdmin`]: the `admin` role.
//! - [`rbac::RequireApproved`]: an account approved for platform access.

pub mod auth;
pub mod rbac;
