//! The payloads of the topics the router subscribes to.
use serde::{Deserialize, Serialize};

use crate::db_types::{OrderId, ProductId};

pub const PAYMENT_CONFIRMED_TOPIC: &str = "payment/confirmed";
pub const INVENTORY_UPDATE_TOPIC: &str = "inventory/update";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmed {
    pub order_id: OrderId,
    /// Informational only. A confirmation always moves the order to `paid`.
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryUpdate {
    pub product_id: ProductId,
    pub new_stock: i64,
}
