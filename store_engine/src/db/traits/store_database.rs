use log::*;

use crate::{
    db::traits::{CatalogManagement, OrderManagement},
    db_types::{NewOrder, Order, ProductId, StockReservation, UserId},
    store_api::errors::StoreError,
};

/// This trait defines the highest level of behaviour for backends supporting the order lifecycle engine: the one
/// operation that writes to both the catalog and the order ledger.
#[allow(async_fn_in_trait)]
pub trait StoreDatabase: CatalogManagement + OrderManagement + Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Reserves `quantity` units of the product and records a `pending` order for them, priced at the unit price
    /// read during the reservation.
    ///
    /// Either both effects happen or neither does. The default implementation is for backends where the catalog and
    /// the ledger cannot share a transaction: it reserves, inserts, and releases the reservation again if the insert
    /// fails. Backends that can span both stores in one transaction should override it.
    async fn place_order(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<(Order, StockReservation), StoreError> {
        let reservation = self.reserve_stock(product_id, quantity).await?;
        let result = match NewOrder::from_reservation(user_id, &reservation, quantity) {
            Some(order) => self.insert_order(order).await,
            None => Err(StoreError::PriceOverflow { product_id, quantity }),
        };
        match result {
            Ok(order) => Ok((order, reservation)),
            Err(e) => {
                warn!("🗃️ Could not record order for product {product_id}. Releasing {quantity} reserved units. {e}");
                if let Err(release_err) = self.release_stock(product_id, quantity).await {
                    error!(
                        "🗃️ Failed to release {quantity} units of product {product_id} after a failed order. Stock is \
                         now understated and needs a manual correction. {release_err}"
                    );
                }
                Err(e)
            },
        }
    }

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}
