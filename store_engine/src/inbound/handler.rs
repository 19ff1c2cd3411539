use crate::{
    db::traits::StoreDatabase,
    db_types::{Order, OrderId, Product, ProductId},
    store_api::errors::OrderFlowError,
    OrderFlowApi,
};

/// The operations the inbound router can trigger. Implementations must be idempotent, since bus deliveries are
/// at-least-once.
#[allow(async_fn_in_trait)]
pub trait InboundEventHandler {
    /// Returns `None` if the order does not exist.
    async fn apply_payment_confirmed(&self, order_id: OrderId) -> Result<Option<Order>, OrderFlowError>;

    /// Returns `None` if the product does not exist.
    async fn apply_inventory_update(
        &self,
        product_id: ProductId,
        new_stock: i64,
    ) -> Result<Option<Product>, OrderFlowError>;
}

impl<B: StoreDatabase> InboundEventHandler for OrderFlowApi<B> {
    async fn apply_payment_confirmed(&self, order_id: OrderId) -> Result<Option<Order>, OrderFlowError> {
        OrderFlowApi::apply_payment_confirmed(self, order_id).await
    }

    async fn apply_inventory_update(
        &self,
        product_id: ProductId,
        new_stock: i64,
    ) -> Result<Option<Product>, OrderFlowError> {
        OrderFlowApi::apply_inventory_update(self, product_id, new_stock).await
    }
}

impl<T: InboundEventHandler> InboundEventHandler for &T {
    async fn apply_payment_confirmed(&self, order_id: OrderId) -> Result<Option<Order>, OrderFlowError> {
        (**self).apply_payment_confirmed(order_id).await
    }

    async fn apply_inventory_update(
        &self,
        product_id: ProductId,
        new_stock: i64,
    ) -> Result<Option<Product>, OrderFlowError> {
        (**self).apply_inventory_update(product_id, new_stock).await
    }
}
