//! Domain events. Each event describes something that has already been committed to the database. Events are never
//! persisted; they are handed to the hooks and then forgotten.
use chrono::{serde::ts_seconds, DateTime, Utc};
use serde::{Deserialize, Serialize};
use store_common::Cents;

use crate::{
    db_types::{Order, OrderId, OrderStatusType, Product, ProductId, User, UserId},
    store_api::LOW_STOCK_THRESHOLD,
};

pub const USER_REGISTERED_TOPIC: &str = "user/registered";
pub const ORDER_CREATED_TOPIC: &str = "order/created";
pub const ORDER_STATUS_CHANGED_TOPIC: &str = "order/status_changed";
pub const PRODUCT_CREATED_TOPIC: &str = "product/created";
pub const PRODUCT_UPDATED_TOPIC: &str = "product/updated";
pub const LOW_STOCK_TOPIC: &str = "inventory/low_stock";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRegisteredEvent {
    pub user_id: UserId,
    pub email: String,
    #[serde(with = "ts_seconds")]
    pub timestamp: DateTime<Utc>,
}

impl UserRegisteredEvent {
    pub fn new(user: &User) -> Self {
        Self { user_id: user.id, email: user.email.clone(), timestamp: Utc::now() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreatedEvent {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub total_cents: Cents,
    #[serde(with = "ts_seconds")]
    pub timestamp: DateTime<Utc>,
}

impl OrderCreatedEvent {
    pub fn new(order: &Order) -> Self {
        Self {
            order_id: order.id,
            user_id: order.user_id,
            product_id: order.product_id,
            quantity: order.quantity,
            total_cents: order.total_cents,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChangedEvent {
    pub order_id: OrderId,
    pub status: OrderStatusType,
    #[serde(with = "ts_seconds")]
    pub timestamp: DateTime<Utc>,
}

impl OrderStatusChangedEvent {
    pub fn new(order: &Order) -> Self {
        Self { order_id: order.id, status: order.status, timestamp: Utc::now() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreatedEvent {
    pub product_id: ProductId,
    pub name: String,
    #[serde(with = "ts_seconds")]
    pub timestamp: DateTime<Utc>,
}

impl ProductCreatedEvent {
    pub fn new(product: &Product) -> Self {
        Self { product_id: product.id, name: product.name.clone(), timestamp: Utc::now() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdatedEvent {
    pub product_id: ProductId,
    pub name: String,
    #[serde(with = "ts_seconds")]
    pub timestamp: DateTime<Utc>,
}

impl ProductUpdatedEvent {
    pub fn new(product: &Product) -> Self {
        Self { product_id: product.id, name: product.name.clone(), timestamp: Utc::now() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockAlertEvent {
    pub product_id: ProductId,
    pub product_name: String,
    pub current_stock: i64,
    pub reorder_level: i64,
    #[serde(with = "ts_seconds")]
    pub timestamp: DateTime<Utc>,
}

impl LowStockAlertEvent {
    pub fn new(product_id: ProductId, product_name: &str, current_stock: i64) -> Self {
        Self {
            product_id,
            product_name: product_name.to_string(),
            current_stock,
            reorder_level: LOW_STOCK_THRESHOLD,
            timestamp: Utc::now(),
        }
    }
}

/// All the domain events, for consumers that treat them uniformly, such as the message bus bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    UserRegistered(UserRegisteredEvent),
    OrderCreated(OrderCreatedEvent),
    OrderStatusChanged(OrderStatusChangedEvent),
    ProductCreated(ProductCreatedEvent),
    ProductUpdated(ProductUpdatedEvent),
    LowStockAlert(LowStockAlertEvent),
}

impl DomainEvent {
    pub fn topic(&self) -> &'static str {
        match self {
            Self::UserRegistered(_) => USER_REGISTERED_TOPIC,
            Self::OrderCreated(_) => ORDER_CREATED_TOPIC,
            Self::OrderStatusChanged(_) => ORDER_STATUS_CHANGED_TOPIC,
            Self::ProductCreated(_) => PRODUCT_CREATED_TOPIC,
            Self::ProductUpdated(_) => PRODUCT_UPDATED_TOPIC,
            Self::LowStockAlert(_) => LOW_STOCK_TOPIC,
        }
    }

    /// The JSON body of the event, as it is sent over the bus.
    pub fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            Self::UserRegistered(e) => serde_json::to_vec(e),
            Self::OrderCreated(e) => serde_json::to_vec(e),
            Self::OrderStatusChanged(e) => serde_json::to_vec(e),
            Self::ProductCreated(e) => serde_json::to_vec(e),
            Self::ProductUpdated(e) => serde_json::to_vec(e),
            Self::LowStockAlert(e) => serde_json::to_vec(e),
        }
    }
}

macro_rules! domain_event_from {
    ($event:ty, $variant:ident) => {
        impl From<$event> for DomainEvent {
            fn from(ev: $event) -> Self {
                Self::$variant(ev)
            }
        }
    };
}

domain_event_from!(UserRegisteredEvent, UserRegistered);
domain_event_from!(OrderCreatedEvent, OrderCreated);
domain_event_from!(OrderStatusChangedEvent, OrderStatusChanged);
domain_event_from!(ProductCreatedEvent, ProductCreated);
domain_event_from!(ProductUpdatedEvent, ProductUpdated);
domain_event_from!(LowStockAlertEvent, LowStockAlert);
