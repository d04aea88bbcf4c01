//! Domain events for the companion platform.
//!
//! - [`EventBus`] is an in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`] is the event envelope.
//! - [`EventPersistence`] writes every published event to the `events` table.
//! - [`names`] lists the event types the platform emits.

pub mod bus;
pub mod names;
pub mod persistence;

pub use bus::{EventBus, PlatformEvent};
pub use persistence::EventPersistence;
