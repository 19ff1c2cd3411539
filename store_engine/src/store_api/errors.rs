use thiserror::Error;

use crate::db_types::{OrderId, OrderStatusType, ProductId};

/// Coarse classification of failures, used by the gateway to pick a transport-level status and by the engine to
/// decide how loudly to log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InsufficientStock,
    InvalidInput,
    Conflict,
    TransientInfra,
}

impl ErrorKind {
    /// Expected business outcomes are reported to the caller, but are not failures of the system.
    pub fn is_business_outcome(&self) -> bool {
        !matches!(self, ErrorKind::TransientInfra)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Product {0} does not exist")]
    ProductNotFound(ProductId),
    /// Also returned for orders that belong to somebody else.
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("User not found: {0}")]
    UserNotFound(String),
    #[error("Insufficient stock for product {product_id}. {requested} requested, but only {available} available")]
    InsufficientStock { product_id: ProductId, requested: i64, available: i64 },
    #[error("Order {order_id} cannot move from {from} to {to}")]
    ForbiddenStatusTransition { order_id: OrderId, from: OrderStatusType, to: OrderStatusType },
    #[error("A user with email {0} already exists")]
    UserAlreadyExists(String),
    #[error("The total for {quantity} units of product {product_id} does not fit in the currency type")]
    PriceOverflow { product_id: ProductId, quantity: i64 },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DatabaseError(_) => ErrorKind::TransientInfra,
            Self::ProductNotFound(_) | Self::OrderNotFound(_) | Self::UserNotFound(_) => ErrorKind::NotFound,
            Self::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            Self::ForbiddenStatusTransition { .. } | Self::UserAlreadyExists(_) => ErrorKind::Conflict,
            Self::PriceOverflow { .. } | Self::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderFlowError {
    #[error("Order quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),
    #[error("Stock level must not be negative, got {0}")]
    InvalidStockLevel(i64),
    #[error(transparent)]
    StoreError(#[from] StoreError),
}

impl OrderFlowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidQuantity(_) | Self::InvalidStockLevel(_) => ErrorKind::InvalidInput,
            Self::StoreError(e) => e.kind(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogApiError {
    #[error("Invalid product: {0}")]
    InvalidProduct(String),
    #[error(transparent)]
    StoreError(#[from] StoreError),
}

impl CatalogApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidProduct(_) => ErrorKind::InvalidInput,
            Self::StoreError(e) => e.kind(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountApiError {
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
    #[error(transparent)]
    StoreError(#[from] StoreError),
}

impl AccountApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidEmail(_) => ErrorKind::InvalidInput,
            Self::StoreError(e) => e.kind(),
        }
    }
}
