use std::fmt::Debug;

use log::*;

use crate::{
    db::traits::{StatusUpdate, StoreDatabase},
    db_types::{Order, OrderId, OrderStatusType, Product, ProductId, UserId},
    events::{EventProducers, LowStockAlertEvent, OrderCreatedEvent, OrderStatusChangedEvent},
    store_api::{
        errors::{OrderFlowError, StoreError},
        is_low_stock,
    },
};

/// `OrderFlowApi` is the order lifecycle engine. It is the only component that writes to both the catalog and the
/// order ledger in one logical operation.
///
/// Events are only ever emitted after the corresponding change has been committed, and emitting them never blocks
/// or fails the operation that triggered them.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}

impl<B> OrderFlowApi<B>
where B: StoreDatabase
{
    /// Places an order for `quantity` units of a product on behalf of `user_id`.
    ///
    /// 1. The quantity must be at least 1.
    /// 2. Stock is reserved atomically. If there is not enough stock, nothing is written and no events are emitted.
    /// 3. The order is recorded as `pending`, with its total fixed at the unit price read during the reservation.
    /// 4. Steps 2 and 3 succeed or fail together.
    /// 5. Once committed, an `OrderCreated` event is emitted, followed by a `LowStockAlert` if the remaining stock is
    ///    below [`LOW_STOCK_THRESHOLD`](crate::store_api::LOW_STOCK_THRESHOLD).
    pub async fn create_order(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Order, OrderFlowError> {
        if quantity < 1 {
            debug!("🔄️📦️ Rejecting order for {quantity} units of product {product_id}");
            return Err(OrderFlowError::InvalidQuantity(quantity));
        }
        let (order, reservation) = self.db.place_order(user_id, product_id, quantity).await.map_err(|e| {
            log_store_error("placing an order", &e);
            e
        })?;
        info!(
            "🔄️📦️ Order {} created for user {user_id}: {quantity} x {} for {}",
            order.id, reservation.product_name, order.total_cents
        );
        self.producers.publish_order_created(OrderCreatedEvent::new(&order));
        self.check_stock_level(reservation.product_id, &reservation.product_name, reservation.remaining_stock);
        Ok(order)
    }

    /// Fetches an order on behalf of a user. Orders belonging to other users are reported as not found.
    pub async fn fetch_order(&self, user_id: UserId, order_id: OrderId) -> Result<Order, OrderFlowError> {
        let order = self.db.fetch_order_for_user(order_id, user_id).await?;
        order.ok_or(OrderFlowError::StoreError(StoreError::OrderNotFound(order_id)))
    }

    /// All the user's orders, newest first.
    pub async fn fetch_orders(&self, user_id: UserId) -> Result<Vec<Order>, OrderFlowError> {
        let orders = self.db.fetch_orders_for_user(user_id).await?;
        Ok(orders)
    }

    /// Marks an order as paid in response to a payment confirmation.
    ///
    /// Payment confirmations are delivered at least once, so this is idempotent: confirming an order that is already
    /// `paid`, or that has moved further along, succeeds without changing anything and without emitting an event.
    /// An unknown order id is logged and ignored; `Ok(None)` is returned.
    pub async fn apply_payment_confirmed(&self, order_id: OrderId) -> Result<Option<Order>, OrderFlowError> {
        trace!("🔄️💰️ Payment confirmed for order {order_id}");
        match self.db.update_order_status(order_id, OrderStatusType::Paid).await {
            Ok(StatusUpdate::Changed(order)) => {
                info!("🔄️💰️ Order {order_id} is paid");
                self.producers.publish_order_status_changed(OrderStatusChangedEvent::new(&order));
                Ok(Some(order))
            },
            Ok(StatusUpdate::Unchanged(order)) => {
                debug!("🔄️💰️ Order {order_id} was already paid. Ignoring the duplicate confirmation");
                Ok(Some(order))
            },
            Err(StoreError::OrderNotFound(_)) => {
                warn!("🔄️💰️ Received a payment confirmation for order {order_id}, which does not exist");
                Ok(None)
            },
            Err(StoreError::ForbiddenStatusTransition { from, .. }) => {
                debug!("🔄️💰️ Order {order_id} is already {from}. Ignoring the late payment confirmation");
                Ok(self.db.fetch_order(order_id).await?)
            },
            Err(e) => {
                log_store_error("confirming a payment", &e);
                Err(e.into())
            },
        }
    }

    /// Overwrites a product's stock level with the result of an external inventory count.
    ///
    /// Applying the same count twice gives the same result. A `LowStockAlert` is emitted if the new level is below
    /// the threshold. An unknown product id is logged and ignored; `Ok(None)` is returned.
    pub async fn apply_inventory_update(
        &self,
        product_id: ProductId,
        new_stock: i64,
    ) -> Result<Option<Product>, OrderFlowError> {
        if new_stock < 0 {
            debug!("🔄️📋️ Rejecting inventory update for product {product_id}. {new_stock} is not a valid stock level");
            return Err(OrderFlowError::InvalidStockLevel(new_stock));
        }
        match self.db.set_stock(product_id, new_stock).await {
            Ok(product) => {
                info!("🔄️📋️ Stock for {} ({product_id}) is now {new_stock}", product.name);
                self.check_stock_level(product.id, &product.name, product.stock_quantity);
                Ok(Some(product))
            },
            Err(StoreError::ProductNotFound(_)) => {
                warn!("🔄️📋️ Received an inventory update for product {product_id}, which does not exist");
                Ok(None)
            },
            Err(e) => {
                log_store_error("updating stock", &e);
                Err(e.into())
            },
        }
    }

    /// Moves an order forward to `status`, e.g. when it ships or is delivered.
    ///
    /// Requesting the status the order already has returns [`StatusUpdate::Unchanged`]. Moving backwards fails with
    /// [`StoreError::ForbiddenStatusTransition`]. An `OrderStatusChanged` event is emitted only for real changes.
    pub async fn advance_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatusType,
    ) -> Result<StatusUpdate, OrderFlowError> {
        let update = self.db.update_order_status(order_id, status).await.map_err(|e| {
            log_store_error("changing an order status", &e);
            e
        })?;
        if let StatusUpdate::Changed(order) = &update {
            info!("🔄️🚚️ Order {order_id} is now {status}");
            self.producers.publish_order_status_changed(OrderStatusChangedEvent::new(order));
        }
        Ok(update)
    }

    fn check_stock_level(&self, product_id: ProductId, product_name: &str, stock: i64) {
        if is_low_stock(stock) {
            info!("🔄️📋️ Stock for {product_name} ({product_id}) is low: {stock} left");
            self.producers.publish_low_stock(LowStockAlertEvent::new(product_id, product_name, stock));
        }
    }
}

/// Expected business outcomes are not failures, so only infrastructure problems are logged as errors.
pub(crate) fn log_store_error(context: &str, e: &StoreError) {
    if e.kind().is_business_outcome() {
        debug!("🔄️ {context}: {e}");
    } else {
        error!("🔄️ Error while {context}: {e}");
    }
}
