//! # Storage contracts
//!
//! This module defines the behaviour that storage backends need to expose in order to be supported by the engine.
//!
//! * [`CatalogManagement`] is the catalog store. It owns product records and provides the atomic stock reservation
//!   primitive.
//! * [`OrderManagement`] is the order ledger. It owns order records and enforces forward-only status transitions.
//! * [`UserManagement`] stores user identities.
//! * [`StoreDatabase`] is the highest level of behaviour: placing an order touches both the catalog and the ledger
//!   and must be atomic across them.
mod catalog_management;
mod data_objects;
mod order_management;
mod store_database;
mod user_management;

pub use catalog_management::CatalogManagement;
pub use data_objects::StatusUpdate;
pub use order_management::OrderManagement;
pub use store_database::StoreDatabase;
pub use user_management::UserManagement;
