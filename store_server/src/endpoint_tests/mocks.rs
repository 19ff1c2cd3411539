use mockall::mock;
use store_engine::{
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
    CatalogManagement,
    OrderManagement,
    StatusUpdate,
    StoreDatabase,
    StoreError,
    UserManagement,
};

mock! {
    pub Store {}
    impl Clone for Store {
        fn clone(&self) -> Self;
    }
    impl CatalogManagement for Store {
        async fn fetch_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;
        async fn fetch_products(&self) -> Result<Vec<Product>, StoreError>;
        async fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError>;
        async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product, StoreError>;
        async fn reserve_stock(&self, id: ProductId, quantity: i64) -> Result<StockReservation, StoreError>;
        async fn release_stock(&self, id: ProductId, quantity: i64) -> Result<Product, StoreError>;
        async fn set_stock(&self, id: ProductId, new_stock: i64) -> Result<Product, StoreError>;
    }
    impl OrderManagement for Store {
        async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError>;
        async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;
        async fn fetch_order_for_user(&self, id: OrderId, user_id: UserId) -> Result<Option<Order>, StoreError>;
        async fn fetch_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError>;
        async fn update_order_status(&self, id: OrderId, status: OrderStatusType) -> Result<StatusUpdate, StoreError>;
    }
    impl UserManagement for Store {
        async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;
        async fn fetch_user(&self, id: UserId) -> Result<Option<User>, StoreError>;
        async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    }
}

// Placing an order goes through the default, compensating implementation, so only the reservation and insert
// expectations are needed.
impl StoreDatabase for MockStore {
    fn url(&self) -> &str {
        "mock://store"
    }
}
