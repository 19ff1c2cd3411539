use crate::{
    db_types::{NewProduct, Product, ProductId, ProductUpdate, StockReservation},
    store_api::errors::StoreError,
};

/// The `CatalogManagement` trait defines the behaviour of the catalog store. The catalog store exclusively owns
/// product records.
///
/// Implementations must guarantee that a product's stock quantity is never negative, at every write site.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    /// Fetches the product with the given id. If the product does not exist, `None` is returned.
    async fn fetch_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Fetches the entire catalog, newest products first.
    async fn fetch_products(&self) -> Result<Vec<Product>, StoreError>;

    /// Adds a new product to the catalog and returns the stored record.
    async fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError>;

    /// Applies an administrative update. Returns [`StoreError::ProductNotFound`] if the product does not exist.
    async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product, StoreError>;

    /// Atomically checks that at least `quantity` units are in stock and decrements the stock by `quantity`.
    ///
    /// The check and the decrement must be a single atomic operation: two concurrent reservations against the last
    /// unit of stock must not both succeed.
    ///
    /// ## Failure modes
    /// * [`StoreError::ProductNotFound`] if the product does not exist.
    /// * [`StoreError::InsufficientStock`] if fewer than `quantity` units are available. Stock is unchanged.
    async fn reserve_stock(&self, id: ProductId, quantity: i64) -> Result<StockReservation, StoreError>;

    /// Returns `quantity` units to stock. Used to compensate a reservation whose order could not be recorded.
    async fn release_stock(&self, id: ProductId, quantity: i64) -> Result<Product, StoreError>;

    /// Unconditionally sets the stock level, e.g. after an external inventory count. `new_stock` must not be
    /// negative.
    async fn set_stock(&self, id: ProductId, new_stock: i64) -> Result<Product, StoreError>;
}
