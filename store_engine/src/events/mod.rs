mod bus;
mod channel;
mod event_types;
mod hooks;

pub use bus::{BusError, BusMessage, LocalBus, MessageBus};
pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
