use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;
use store_common::Cents;

use super::{db_url, new_pool, orders, products, users, SqliteDatabaseError};
use crate::{
    db::traits::{CatalogManagement, OrderManagement, StatusUpdate, StoreDatabase, UserManagement},
    db_types::{
        NewOrder,
        NewProduct,
        NewUser,
        Order,
        OrderId,
        OrderStatusType,
        Product,
        ProductId,
        ProductUpdate,
        StockReservation,
        User,
        UserId,
    },
    store_api::errors::StoreError,
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using the URL in `STORE_DATABASE_URL`, or the default.
    pub async fn new(max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let url = db_url();
        SqliteDatabase::new_with_url(&url, max_connections).await
    }

    /// Connects to the database at `url` and brings the schema up to date.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let pool = new_pool(url, max_connections).await?;
        sqlx::migrate!("./src/db/sqlite/migrations").run(&pool).await?;
        debug!("🗃️ Connected to {url} and ran migrations");
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Populates an empty catalog with a handful of sample products. Does nothing if any product already exists.
    /// Returns the number of products inserted.
    pub async fn seed_sample_products(&self) -> Result<usize, StoreError> {
        let mut tx = self.pool.begin().await?;
        if products::count_products(&mut tx).await? > 0 {
            debug!("🗃️ The catalog already has products. Skipping the sample data");
            return Ok(0);
        }
        let samples = [
            NewProduct::new("Go Programming Book", Cents::from(2999), 50)
                .with_description("Learn Go programming with practical examples"),
            NewProduct::new("MQTT Sensor Kit", Cents::from(4999), 25)
                .with_description("IoT sensor kit with MQTT connectivity"),
            NewProduct::new("Docker T-Shirt", Cents::from(1999), 100)
                .with_description("Comfortable cotton t-shirt with Docker logo"),
            NewProduct::new("Wireless Mouse", Cents::from(3499), 75)
                .with_description("Ergonomic wireless mouse with long battery life"),
        ];
        let count = samples.len();
        for product in samples {
            products::insert_product(product, &mut tx).await?;
        }
        tx.commit().await?;
        info!("🗃️ Seeded the catalog with {count} sample products");
        Ok(count)
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(id, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let products = products::fetch_products(&mut conn).await?;
        Ok(products)
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::insert_product(product, &mut conn).await?;
        Ok(product)
    }

    async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::update_product(id, update, &mut conn).await?;
        Ok(product)
    }

    async fn reserve_stock(&self, id: ProductId, quantity: i64) -> Result<StockReservation, StoreError> {
        let mut tx = self.pool.begin().await?;
        let reservation = products::reserve_stock(id, quantity, &mut tx).await?;
        tx.commit().await?;
        Ok(reservation)
    }

    async fn release_stock(&self, id: ProductId, quantity: i64) -> Result<Product, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::release_stock(id, quantity, &mut conn).await?;
        Ok(product)
    }

    async fn set_stock(&self, id: ProductId, new_stock: i64) -> Result<Product, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::set_stock(id, new_stock, &mut conn).await?;
        Ok(product)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::insert_order(order, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_for_user(&self, id: OrderId, user_id: UserId) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_for_user(id, user_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        Ok(orders)
    }

    async fn update_order_status(&self, id: OrderId, status: OrderStatusType) -> Result<StatusUpdate, StoreError> {
        let mut tx = self.pool.begin().await?;
        let update = orders::update_order_status(id, status, &mut tx).await?;
        tx.commit().await?;
        Ok(update)
    }
}

impl UserManagement for SqliteDatabase {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::insert_user(user, &mut conn).await?;
        Ok(user)
    }

    async fn fetch_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user(id, &mut conn).await?;
        Ok(user)
    }

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user_by_email(email, &mut conn).await?;
        Ok(user)
    }
}

impl StoreDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    /// The catalog and the ledger share a database, so the reservation and the insert run in one transaction. If
    /// anything fails before the commit, the transaction is rolled back and the stock is untouched.
    async fn place_order(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<(Order, StockReservation), StoreError> {
        let mut tx = self.pool.begin().await?;
        let reservation = products::reserve_stock(product_id, quantity, &mut tx).await?;
        let new_order = NewOrder::from_reservation(user_id, &reservation, quantity)
            .ok_or(StoreError::PriceOverflow { product_id, quantity })?;
        let order = orders::insert_order(new_order, &mut tx).await?;
        tx.commit().await?;
        debug!(
            "🗃️ Order {} placed for {quantity} units of product {product_id}. {} units left",
            order.id, reservation.remaining_stock
        );
        Ok((order, reservation))
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        self.pool.close().await;
        Ok(())
    }
}
