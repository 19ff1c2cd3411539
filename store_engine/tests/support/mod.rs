#![allow(dead_code)]
use std::sync::{Arc, Mutex};

use futures_util::{future::BoxFuture, FutureExt};
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};
use store_common::Cents;
use store_engine::{
    db_types::{NewProduct, Product},
    events::{
        DomainEvent,
        EventHandlers,
        EventHooks,
        LowStockAlertEvent,
        OrderCreatedEvent,
        OrderStatusChangedEvent,
        ProductCreatedEvent,
        ProductUpdatedEvent,
        UserRegisteredEvent,
    },
    test_utils::fresh_database,
    CatalogApi,
    OrderFlowApi,
    SqliteDatabase,
    StoreDatabase,
};
use tokio::task::JoinHandle;

/// Records every domain event, in the order the hooks ran.
#[derive(Default, Clone)]
pub struct EventLog {
    events: Arc<Mutex<Vec<DomainEvent>>>,
}

impl EventLog {
    fn recorder<E>(&self) -> impl Fn(E) -> BoxFuture<'static, ()> + Send + Sync + 'static
    where E: Into<DomainEvent> + 'static {
        let events = Arc::clone(&self.events);
        move |ev: E| {
            let ev = ev.into();
            debug!("🪝️ {ev:?}");
            events.lock().unwrap().push(ev);
            async {}.boxed()
        }
    }

    pub fn hooks(&self) -> EventHooks {
        let mut hooks = EventHooks::default();
        hooks
            .on_user_registered(self.recorder::<UserRegisteredEvent>())
            .on_order_created(self.recorder::<OrderCreatedEvent>())
            .on_order_status_changed(self.recorder::<OrderStatusChangedEvent>())
            .on_product_created(self.recorder::<ProductCreatedEvent>())
            .on_product_updated(self.recorder::<ProductUpdatedEvent>())
            .on_low_stock(self.recorder::<LowStockAlertEvent>());
        hooks
    }

    pub fn snapshot(&self) -> Vec<DomainEvent> {
        self.events.lock().unwrap().clone()
    }
}

pub fn topics(events: &[DomainEvent]) -> Vec<&'static str> {
    events.iter().map(DomainEvent::topic).collect()
}

/// An order flow engine and catalog on a fresh database, with every event recorded.
pub struct TestEngine {
    pub api: OrderFlowApi<SqliteDatabase>,
    pub catalog: CatalogApi<SqliteDatabase>,
    pub events: EventLog,
    tasks: Vec<JoinHandle<()>>,
}

impl TestEngine {
    pub async fn new() -> Self {
        let db = fresh_database().await;
        let events = EventLog::default();
        let handlers = EventHandlers::new(64, events.hooks());
        let producers = handlers.producers();
        let tasks = handlers.start_handlers();
        let api = OrderFlowApi::new(db.clone(), producers.clone());
        let catalog = CatalogApi::new(db, producers);
        Self { api, catalog, events, tasks }
    }

    pub fn db_url(&self) -> &str {
        self.api.db().url()
    }

    pub async fn add_product(&self, name: &str, price: i64, stock: i64) -> Product {
        self.catalog
            .create_product(NewProduct::new(name, Cents::from(price), stock))
            .await
            .expect("Error creating product")
    }

    /// Shuts the engine down, waits for every queued event to be handled and deletes the database. Returns the events
    /// emitted after the products were set up.
    pub async fn finish(self) -> Vec<DomainEvent> {
        let Self { mut api, catalog, events, tasks } = self;
        let url = api.db().url().to_string();
        if let Err(e) = api.db_mut().close().await {
            error!("🚀️ Failed to close database: {e}");
        }
        drop(api);
        drop(catalog);
        for task in tasks {
            task.await.expect("Event handler panicked");
        }
        if let Err(e) = Sqlite::drop_database(&url).await {
            warn!("🚀️ Could not delete {url}: {e}");
        }
        events
            .snapshot()
            .into_iter()
            .filter(|e| !matches!(e, DomainEvent::ProductCreated(_)))
            .collect()
    }
}
