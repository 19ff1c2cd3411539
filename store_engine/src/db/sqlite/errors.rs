use thiserror::Error;

use crate::{
    db_types::{OrderId, OrderStatusType, ProductId},
    store_api::errors::StoreError,
};

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Database migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("Product {0} not found")]
    ProductNotFound(ProductId),
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),
    #[error("Product {product_id} has {available} units in stock, {requested} requested")]
    InsufficientStock { product_id: ProductId, requested: i64, available: i64 },
    #[error("Order {order_id} cannot move from {from} to {to}")]
    ForbiddenStatusTransition { order_id: OrderId, from: OrderStatusType, to: OrderStatusType },
    #[error("Email {0} is already registered")]
    DuplicateEmail(String),
    #[error("Invalid query parameter: {0}")]
    QueryError(String),
}

impl From<SqliteDatabaseError> for StoreError {
    fn from(e: SqliteDatabaseError) -> Self {
        match e {
            SqliteDatabaseError::ProductNotFound(id) => StoreError::ProductNotFound(id),
            SqliteDatabaseError::OrderNotFound(id) => StoreError::OrderNotFound(id),
            SqliteDatabaseError::InsufficientStock { product_id, requested, available } => {
                StoreError::InsufficientStock { product_id, requested, available }
            },
            SqliteDatabaseError::ForbiddenStatusTransition { order_id, from, to } => {
                StoreError::ForbiddenStatusTransition { order_id, from, to }
            },
            SqliteDatabaseError::DuplicateEmail(email) => StoreError::UserAlreadyExists(email),
            SqliteDatabaseError::QueryError(s) => StoreError::InvalidInput(s),
            SqliteDatabaseError::DriverError(e) => e.into(),
            SqliteDatabaseError::MigrationError(e) => StoreError::DatabaseError(e.to_string()),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db_err) if db_err.is_check_violation() => {
                StoreError::InvalidInput(format!("A data constraint was violated. {db_err}"))
            },
            _ => StoreError::DatabaseError(e.to_string()),
        }
    }
}
