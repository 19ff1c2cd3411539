//! The message bus seam.
//!
//! The engine only needs to be able to `publish(topic, payload)`. Transports (a broker client, a webhook
//! forwarder, the in-process [`LocalBus`]) implement [`MessageBus`] and are handed to
//! [`EventHooks::publish_to_bus`], which forwards every domain event as JSON.
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use log::*;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::events::{DomainEvent, EventHooks};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl BusMessage {
    pub fn new<S: Into<String>>(topic: S, payload: Vec<u8>) -> Self {
        Self { topic: topic.into(), payload }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("Nobody is subscribed to the bus")]
    NoSubscribers,
    #[error("The message bus is unavailable: {0}")]
    Unavailable(String),
}

pub trait MessageBus: Send + Sync {
    fn publish(&self, topic: &str, payload: Vec<u8>) -> BoxFuture<'_, Result<(), BusError>>;
}

/// An in-process bus. Every subscriber sees every message published after it subscribed.
#[derive(Debug, Clone)]
pub struct LocalBus {
    sender: broadcast::Sender<BusMessage>,
}

impl LocalBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.sender.subscribe()
    }

    /// Puts a message on the bus. Returns the number of subscribers that will see it.
    pub fn deliver(&self, message: BusMessage) -> Result<usize, BusError> {
        self.sender.send(message).map_err(|_| BusError::NoSubscribers)
    }
}

impl MessageBus for LocalBus {
    fn publish(&self, topic: &str, payload: Vec<u8>) -> BoxFuture<'_, Result<(), BusError>> {
        let result = self.deliver(BusMessage::new(topic, payload)).map(|n| trace!("🚌️ {topic} sent to {n} subscribers"));
        futures_util::future::ready(result).boxed()
    }
}

async fn forward(bus: Arc<dyn MessageBus>, event: DomainEvent) {
    let topic = event.topic();
    let payload = match event.to_payload() {
        Ok(p) => p,
        Err(e) => {
            error!("🚌️ Could not serialize a {topic} event. {e}");
            return;
        },
    };
    match bus.publish(topic, payload).await {
        Ok(()) => debug!("🚌️ Published {topic}"),
        Err(e) => warn!("🚌️ Could not publish {topic}. {e}"),
    }
}

macro_rules! forward_hook {
    ($hooks:ident, $method:ident, $bus:ident) => {
        let bus = Arc::clone(&$bus);
        $hooks.$method(move |ev| forward(Arc::clone(&bus), DomainEvent::from(ev)).boxed());
    };
}

impl EventHooks {
    /// Registers a hook for every domain event that publishes it on `bus` under its topic.
    pub fn publish_to_bus(&mut self, bus: Arc<dyn MessageBus>) -> &mut Self {
        let hooks = &mut *self;
        forward_hook!(hooks, on_user_registered, bus);
        forward_hook!(hooks, on_order_created, bus);
        forward_hook!(hooks, on_order_status_changed, bus);
        forward_hook!(hooks, on_product_created, bus);
        forward_hook!(hooks, on_product_updated, bus);
        forward_hook!(hooks, on_low_stock, bus);
        self
    }
}
