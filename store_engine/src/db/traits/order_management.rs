use crate::{
    db::traits::StatusUpdate,
    db_types::{NewOrder, Order, OrderId, OrderStatusType, UserId},
    store_api::errors::StoreError,
};

/// The `OrderManagement` trait defines the behaviour of the order ledger. The ledger exclusively owns order records.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Stores a new order with `pending` status. This is a plain insert: the caller is responsible for having
    /// reserved stock for the order beforehand.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError>;

    /// Fetches an order by id, regardless of who owns it. Only for internal flows (e.g. inbound events).
    async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Fetches an order on behalf of a user. An order belonging to another user is reported as `None`, exactly as
    /// if it did not exist.
    async fn fetch_order_for_user(&self, id: OrderId, user_id: UserId) -> Result<Option<Order>, StoreError>;

    /// All orders placed by the user, newest first.
    async fn fetch_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError>;

    /// Moves an order to `status`.
    ///
    /// * A forward move is applied and [`StatusUpdate::Changed`] is returned.
    /// * Requesting the status the order already has is a no-op that returns [`StatusUpdate::Unchanged`]. Duplicate
    ///   deliveries of the same signal rely on this.
    /// * A backward move fails with [`StoreError::ForbiddenStatusTransition`] and changes nothing.
    /// * An unknown order fails with [`StoreError::OrderNotFound`].
    async fn update_order_status(&self, id: OrderId, status: OrderStatusType) -> Result<StatusUpdate, StoreError>;
}
