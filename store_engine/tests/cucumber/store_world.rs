use std::{collections::HashMap, fmt::Debug};

use cucumber::World;
use store_engine::{
    db_types::{Order, ProductId},
    events::DomainEvent,
    inbound::RouteOutcome,
    OrderFlowError,
    StatusUpdate,
};

use crate::support::TestEngine;

#[derive(Default, World)]
pub struct StoreWorld {
    pub engine: Option<TestEngine>,
    pub products: HashMap<String, ProductId>,
    pub last_order: Option<Order>,
    pub last_error: Option<OrderFlowError>,
    pub last_outcome: Option<RouteOutcome>,
    pub last_status_change: Option<Result<StatusUpdate, OrderFlowError>>,
    pub concurrent_results: Vec<Result<Order, OrderFlowError>>,
    /// Set once the engine has been shut down and its event queues drained
    pub events: Option<Vec<DomainEvent>>,
}

impl Debug for StoreWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreWorld")
            .field("products", &self.products)
            .field("last_order", &self.last_order)
            .field("last_error", &self.last_error)
            .field("last_outcome", &self.last_outcome)
            .finish()
    }
}

impl StoreWorld {
    pub fn engine(&self) -> &TestEngine {
        self.engine.as_ref().expect("The engine is not running. Event checks must come last in a scenario")
    }

    pub fn product_id(&self, name: &str) -> ProductId {
        *self.products.get(name).unwrap_or_else(|| panic!("No product called {name}"))
    }

    pub fn last_order(&self) -> &Order {
        self.last_order.as_ref().expect("No order has been placed")
    }

    /// Stops the engine and collects every event it emitted. Further steps cannot use the engine.
    pub async fn settled_events(&mut self) -> &[DomainEvent] {
        if self.events.is_none() {
            let engine = self.engine.take().expect("The engine was never started");
            self.events = Some(engine.finish().await);
        }
        self.events.as_deref().unwrap_or_default()
    }
}
