use futures_util::{stream, Stream, StreamExt};
use log::*;
use tokio::sync::broadcast::{error::RecvError, Receiver};

use crate::{
    events::{BusMessage, LowStockAlertEvent, LOW_STOCK_TOPIC},
    inbound::{
        messages::{InventoryUpdate, PaymentConfirmed, INVENTORY_UPDATE_TOPIC, PAYMENT_CONFIRMED_TOPIC},
        InboundEventHandler,
    },
    store_api::errors::ErrorKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The message was decoded and handled.
    Applied,
    /// Nobody handles this topic.
    Ignored,
    /// The message could not be decoded, or handling it failed. It has been logged and dropped.
    Discarded,
}

pub struct InboundRouter<H> {
    handler: H,
}

impl<H> InboundRouter<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }
}

impl<H> InboundRouter<H>
where H: InboundEventHandler
{
    /// Decodes a single delivery and dispatches it. Never fails.
    pub async fn route(&self, topic: &str, payload: &[u8]) -> RouteOutcome {
        match topic {
            PAYMENT_CONFIRMED_TOPIC => match serde_json::from_slice::<PaymentConfirmed>(payload) {
                Ok(msg) => self.payment_confirmed(msg).await,
                Err(e) => discard(topic, payload, &e),
            },
            INVENTORY_UPDATE_TOPIC => match serde_json::from_slice::<InventoryUpdate>(payload) {
                Ok(msg) => self.inventory_update(msg).await,
                Err(e) => discard(topic, payload, &e),
            },
            LOW_STOCK_TOPIC => match serde_json::from_slice::<LowStockAlertEvent>(payload) {
                Ok(alert) => {
                    warn!(
                        "📨️ LOW STOCK ALERT: {} ({}) has only {} items left",
                        alert.product_name, alert.product_id, alert.current_stock
                    );
                    RouteOutcome::Applied
                },
                Err(e) => discard(topic, payload, &e),
            },
            _ => {
                trace!("📨️ No route for topic {topic}. Ignoring it");
                RouteOutcome::Ignored
            },
        }
    }

    async fn payment_confirmed(&self, msg: PaymentConfirmed) -> RouteOutcome {
        debug!("📨️ Payment confirmation received for order {}", msg.order_id);
        match self.handler.apply_payment_confirmed(msg.order_id).await {
            Ok(Some(_)) => RouteOutcome::Applied,
            Ok(None) => RouteOutcome::Discarded,
            Err(e) => {
                log_failure(PAYMENT_CONFIRMED_TOPIC, e.kind(), &e);
                RouteOutcome::Discarded
            },
        }
    }

    async fn inventory_update(&self, msg: InventoryUpdate) -> RouteOutcome {
        debug!("📨️ Inventory update received: product {} has {} units", msg.product_id, msg.new_stock);
        match self.handler.apply_inventory_update(msg.product_id, msg.new_stock).await {
            Ok(Some(_)) => RouteOutcome::Applied,
            Ok(None) => RouteOutcome::Discarded,
            Err(e) => {
                log_failure(INVENTORY_UPDATE_TOPIC, e.kind(), &e);
                RouteOutcome::Discarded
            },
        }
    }

    /// The router loop. Deliveries are handled concurrently, up to `concurrency` at a time, and in no particular
    /// order. The loop returns when `deliveries` ends.
    pub async fn run<S>(&self, deliveries: S, concurrency: usize)
    where S: Stream<Item = BusMessage> {
        info!("📨️ Inbound router is listening");
        deliveries
            .for_each_concurrent(concurrency.max(1), |msg| async move {
                let outcome = self.route(&msg.topic, &msg.payload).await;
                trace!("📨️ {} -> {outcome:?}", msg.topic);
            })
            .await;
        info!("📨️ The inbound source has closed. Inbound router has stopped");
    }
}

/// Adapts a bus subscription for [`InboundRouter::run`]. If the subscriber falls behind the bus, the missed messages
/// are skipped with a warning, so only use this for traffic that may be lost. The stream ends when the bus closes.
pub fn bus_deliveries(receiver: Receiver<BusMessage>) -> impl Stream<Item = BusMessage> {
    stream::unfold(receiver, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(msg) => return Some((msg, rx)),
                Err(RecvError::Lagged(n)) => warn!("📨️ Bus subscriber fell behind. {n} messages were skipped"),
                Err(RecvError::Closed) => return None,
            }
        }
    })
}

fn discard(topic: &str, payload: &[u8], e: &serde_json::Error) -> RouteOutcome {
    warn!("📨️ Discarding malformed {topic} message ({e}): {}", String::from_utf8_lossy(payload));
    RouteOutcome::Discarded
}

fn log_failure(topic: &str, kind: ErrorKind, e: &dyn std::error::Error) {
    if kind.is_business_outcome() {
        warn!("📨️ Could not apply {topic} message. {e}");
    } else {
        error!("📨️ Could not apply {topic} message. {e}");
    }
}
