//! # Inbound event router
//!
//! Messages arriving from the bus are decoded here and turned into calls on an [`InboundEventHandler`], which in
//! production is the [`OrderFlowApi`](crate::OrderFlowApi). Nothing in this module ever returns an error to the bus:
//! malformed payloads are logged and discarded, unknown topics are ignored, and the router loop keeps running until
//! its source closes.
//!
//! Inbound deliveries that must not be lost (payment confirmations, inventory counts) go through the bounded
//! [`inbound_queue`]. [`bus_deliveries`] adapts a broadcast subscription for observers that can afford to skip
//! messages when they fall behind.
mod handler;
pub mod messages;
mod queue;
mod router;

pub use handler::InboundEventHandler;
pub use queue::{inbound_queue, InboundReceiver, InboundSender, QueueError};
pub use router::{bus_deliveries, InboundRouter, RouteOutcome};
