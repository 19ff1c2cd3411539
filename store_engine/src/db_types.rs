//! Data types shared by the storage backends and the public engine API.
use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use store_common::Cents;
use thiserror::Error;

macro_rules! entity_id {
    ($name:ident, $label:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
        #[sqlx(transparent)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl FromStr for $name {
            type Err = ConversionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|e| ConversionError(format!("Invalid {} '{s}': {e}", $label)))
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(pub String);

//--------------------------------------      Identifiers      ---------------------------------------------------------
entity_id!(ProductId, "product id");
entity_id!(OrderId, "order id");
entity_id!(UserId, "user id");

//--------------------------------------        Product        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// The current unit price. Existing orders keep the price they were placed at.
    pub price_cents: Cents,
    /// Never negative. Enforced by the schema as well as by every write path.
    pub stock_quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: Cents,
    pub stock_quantity: i64,
}

impl NewProduct {
    pub fn new<S: Into<String>>(name: S, price_cents: Cents, stock_quantity: i64) -> Self {
        Self { name: name.into(), description: String::default(), price_cents, stock_quantity }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    /// Checks the administrative constraints on a product: a name, a price of at least one cent and non-negative
    /// stock.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Product name cannot be empty".to_string());
        }
        if !self.price_cents.is_positive() {
            return Err(format!("Product price must be at least 1 cent, got {}", self.price_cents.value()));
        }
        if self.stock_quantity < 0 {
            return Err(format!("Stock quantity cannot be negative, got {}", self.stock_quantity));
        }
        Ok(())
    }
}

/// The fields of a product that may be changed by an administrator. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<Cents>,
    pub stock_quantity: Option<i64>,
}

impl ProductUpdate {
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_price(mut self, price: Cents) -> Self {
        self.price_cents = Some(price);
        self
    }

    pub fn with_stock(mut self, stock: i64) -> Self {
        self.stock_quantity = Some(stock);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() &&
            self.description.is_none() &&
            self.price_cents.is_none() &&
            self.stock_quantity.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err("Product name cannot be empty".to_string());
        }
        if matches!(self.price_cents, Some(p) if !p.is_positive()) {
            return Err("Product price must be at least 1 cent".to_string());
        }
        if matches!(self.stock_quantity, Some(s) if s < 0) {
            return Err("Stock quantity cannot be negative".to_string());
        }
        Ok(())
    }
}

//--------------------------------------   StockReservation    ---------------------------------------------------------
/// The result of a successful atomic check-and-decrement of a product's stock.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StockReservation {
    pub product_id: ProductId,
    pub product_name: String,
    /// The unit price read in the same statement that decremented the stock
    pub unit_price: Cents,
    /// Stock remaining after the reservation
    pub remaining_stock: i64,
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
/// Order statuses, in lifecycle order. Transitions only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// The order has been placed and stock reserved. No payment has been confirmed.
    Pending,
    /// Payment for the order has been confirmed.
    Paid,
    Shipped,
    Delivered,
}

impl OrderStatusType {
    pub const ALL: [OrderStatusType; 4] = [Self::Pending, Self::Paid, Self::Shipped, Self::Delivered];

    pub fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Paid => 1,
            Self::Shipped => 2,
            Self::Delivered => 3,
        }
    }

    /// True if moving from `self` to `to` goes strictly forward in the lifecycle.
    pub fn can_advance_to(&self, to: OrderStatusType) -> bool {
        to.rank() > self.rank()
    }

    /// All statuses from which a transition to `self` would be forward-moving.
    pub fn predecessors(&self) -> Vec<OrderStatusType> {
        Self::ALL.into_iter().filter(|s| s.rank() < self.rank()).collect()
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "pending"),
            OrderStatusType::Paid => write!(f, "paid"),
            OrderStatusType::Shipped => write!(f, "shipped"),
            OrderStatusType::Delivered => write!(f, "delivered"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------        Order          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i64,
    /// `unit_price × quantity`, frozen when the order was placed
    pub total_cents: Cents,
    pub status: OrderStatusType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       NewOrder        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub total_cents: Cents,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn new(user_id: UserId, product_id: ProductId, quantity: i64, total_cents: Cents) -> Self {
        Self { user_id, product_id, quantity, total_cents, created_at: Utc::now() }
    }

    /// Prices an order from a stock reservation. The total is fixed here and never recomputed.
    ///
    /// Returns `None` if the total overflows.
    pub fn from_reservation(user_id: UserId, reservation: &StockReservation, quantity: i64) -> Option<Self> {
        let total = reservation.unit_price.checked_mul(quantity)?;
        Some(Self::new(user_id, reservation.product_id, quantity, total))
    }
}

//--------------------------------------         User          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    /// Opaque credential produced by the gateway's password hasher
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn new<S: Into<String>>(email: S, password_hash: S) -> Self {
        Self { email: email.into(), password_hash: password_hash.into() }
    }
}
