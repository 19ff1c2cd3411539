//! The inbound delivery queue.
//!
//! Webhooks and other transports hand inbound messages to an [`InboundSender`]; the router drains the matching
//! [`InboundReceiver`]. Unlike the broadcast [`LocalBus`](crate::events::LocalBus), the queue never overwrites a
//! message that has not been read yet. A message that was accepted is applied. When the queue is full the sender is
//! told so, and can retry or wait.
use futures_util::{stream, Stream};
use log::*;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::events::BusMessage;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("The inbound queue is full ({0} messages are waiting). Try again later")]
    Full(usize),
    #[error("The inbound router has stopped")]
    Closed,
}

#[derive(Debug, Clone)]
pub struct InboundSender {
    sender: mpsc::Sender<BusMessage>,
    capacity: usize,
}

pub struct InboundReceiver {
    receiver: mpsc::Receiver<BusMessage>,
}

/// Creates a bounded inbound queue that holds up to `capacity` undelivered messages.
pub fn inbound_queue(capacity: usize) -> (InboundSender, InboundReceiver) {
    let capacity = capacity.max(1);
    let (sender, receiver) = mpsc::channel(capacity);
    (InboundSender { sender, capacity }, InboundReceiver { receiver })
}

impl InboundSender {
    /// Queues a message without waiting. Fails immediately if the queue is full.
    pub fn try_enqueue(&self, message: BusMessage) -> Result<(), QueueError> {
        self.sender.try_send(message).map_err(|e| match e {
            TrySendError::Full(msg) => {
                debug!("📨️ Inbound queue is full. Rejecting a {} message", msg.topic);
                QueueError::Full(self.capacity)
            },
            TrySendError::Closed(_) => QueueError::Closed,
        })
    }

    /// Queues a message, waiting for space if the queue is full.
    pub async fn enqueue(&self, message: BusMessage) -> Result<(), QueueError> {
        self.sender.send(message).await.map_err(|_| QueueError::Closed)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl InboundReceiver {
    /// The next queued message, if there is one, without waiting.
    pub fn try_next(&mut self) -> Option<BusMessage> {
        self.receiver.try_recv().ok()
    }

    /// Every queued message, in order. The stream ends once every sender has been dropped and the queue is empty.
    pub fn into_stream(self) -> impl Stream<Item = BusMessage> {
        stream::unfold(self.receiver, |mut rx| async move {
            let msg = rx.recv().await?;
            Some((msg, rx))
        })
    }
}
