//! # Store engine public API
//!
//! The `store_api` module exposes the programmatic API for the store engine. The API is modular, so that clients
//! can pick and choose the functionality they want.
//!
//! * [`order_flow_api`] is the order lifecycle engine. It places orders against the catalog, applies externally
//!   delivered payment confirmations and inventory counts, and emits the resulting domain events.
//! * [`catalog_api`] provides the administrative product operations and catalog queries.
//! * [`accounts_api`] stores and looks up user identities.
//!
//! # API usage
//!
//! An API instance is created by supplying a database backend that implements the backend traits required by the
//! API, plus the event producers that should be notified of changes.
//!
//! ```rust,ignore
//! use store_engine::{events::EventProducers, OrderFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/store.db", 5).await?;
//! let api = OrderFlowApi::new(db, EventProducers::default());
//! let order = api.create_order(user_id, product_id, 2).await?;
//! ```

pub mod accounts_api;
pub mod catalog_api;
pub mod errors;
pub mod order_flow_api;

/// A low-stock alert is emitted whenever an operation leaves a product with fewer units than this.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

pub(crate) fn is_low_stock(stock: i64) -> bool {
    stock < LOW_STOCK_THRESHOLD
}
