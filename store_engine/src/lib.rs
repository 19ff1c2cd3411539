//! Store Engine
//!
//! The store engine is the order lifecycle and stock-consistency core of the online store backend. It is
//! transport-agnostic: the HTTP gateway and the message bus both drive it through the same API.
//!
//! The library is divided into these sections:
//! 1. Database management ([`mod@db`]). The storage contracts live in `db::traits`, and SQLite is the supported
//!    backend. The data types used in the database are defined in [`db_types`] and are public.
//! 2. The engine public API ([`mod@store_api`]). [`OrderFlowApi`] places orders and applies externally delivered
//!    status and inventory changes. [`CatalogApi`] and [`AccountApi`] cover products and user identities.
//! 3. Events ([`events`]). Every committed change produces a domain event, delivered to registered hooks through
//!    bounded queues. [`events::EventHooks::publish_to_bus`] forwards all of them to a message bus.
//! 4. The inbound router ([`inbound`]), which turns bus messages into engine operations.
mod db;

pub mod db_types;
pub mod events;
pub mod inbound;
pub mod store_api;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::{SqliteDatabase, SqliteDatabaseError};
pub use db::traits::{CatalogManagement, OrderManagement, StatusUpdate, StoreDatabase, UserManagement};
pub use store_api::{
    accounts_api::AccountApi,
    catalog_api::CatalogApi,
    errors::{AccountApiError, CatalogApiError, ErrorKind, OrderFlowError, StoreError},
    order_flow_api::OrderFlowApi,
    LOW_STOCK_THRESHOLD,
};
