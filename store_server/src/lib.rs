//! # Store server
//! The HTTP gateway for the store engine. It is responsible for:
//! * Authenticating callers (registration, login and bearer tokens) and passing the verified user id to the engine.
//! * Translating engine outcomes into HTTP responses.
//! * Wiring the engine's domain events onto the message bus, and running the inbound router that applies payment
//!   confirmations and inventory updates delivered over the bus.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/register`, `/api/login`: Account creation and token issuance.
//! * `/api/products`, `/api/products/{id}`: The catalog. Reads are public, writes need a token.
//! * `/api/orders`, `/api/orders/{id}`: Placing and viewing your own orders.
//! * `/bus/{topic}`: A webhook, protected by a shared token, that queues the request body for the inbound router
//!   under `topic`. Only mounted when `STORE_BUS_WEBHOOK_TOKEN` is set.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
