//! Best-effort lifecycle notification fan-out.
//!
//! Handlers publish [`LifecycleEvent`]s onto the in-process [`NotifyBus`];
//! the webhook delivery task forwards them to an external sink. Publishing
//! never blocks or fails the state transition that produced the event.

pub mod bus;
pub mod delivery;

pub use bus::{LifecycleEvent, NotifyBus};
pub use delivery::webhook::WebhookDelivery;
