//! Well-known role name constants.
//!
//! These must match the `ck_accounts_role` check constraint in the
//! `create_accounts` migration.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";
