use std::{future::Future, pin::Pin, sync::Arc};

use tokio::task::JoinHandle;

use crate::events::{
    EventHandler,
    EventProducer,
    Handler,
    LowStockAlertEvent,
    OrderCreatedEvent,
    OrderStatusChangedEvent,
    ProductCreatedEvent,
    ProductUpdatedEvent,
    UserRegisteredEvent,
};

type HookFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Cloneable publishing handles for every registered hook. The engine APIs receive these in their constructors.
#[derive(Default, Clone)]
pub struct EventProducers {
    pub user_registered_producer: Vec<EventProducer<UserRegisteredEvent>>,
    pub order_created_producer: Vec<EventProducer<OrderCreatedEvent>>,
    pub order_status_changed_producer: Vec<EventProducer<OrderStatusChangedEvent>>,
    pub product_created_producer: Vec<EventProducer<ProductCreatedEvent>>,
    pub product_updated_producer: Vec<EventProducer<ProductUpdatedEvent>>,
    pub low_stock_producer: Vec<EventProducer<LowStockAlertEvent>>,
}

fn publish_all<E: Clone + Send + Sync>(producers: &[EventProducer<E>], event: E) {
    for producer in producers {
        producer.publish_event(event.clone());
    }
}

impl EventProducers {
    pub fn publish_user_registered(&self, event: UserRegisteredEvent) {
        publish_all(&self.user_registered_producer, event);
    }

    pub fn publish_order_created(&self, event: OrderCreatedEvent) {
        publish_all(&self.order_created_producer, event);
    }

    pub fn publish_order_status_changed(&self, event: OrderStatusChangedEvent) {
        publish_all(&self.order_status_changed_producer, event);
    }

    pub fn publish_product_created(&self, event: ProductCreatedEvent) {
        publish_all(&self.product_created_producer, event);
    }

    pub fn publish_product_updated(&self, event: ProductUpdatedEvent) {
        publish_all(&self.product_updated_producer, event);
    }

    pub fn publish_low_stock(&self, event: LowStockAlertEvent) {
        publish_all(&self.low_stock_producer, event);
    }
}

pub struct EventHandlers {
    pub on_user_registered: Vec<EventHandler<UserRegisteredEvent>>,
    pub on_order_created: Vec<EventHandler<OrderCreatedEvent>>,
    pub on_order_status_changed: Vec<EventHandler<OrderStatusChangedEvent>>,
    pub on_product_created: Vec<EventHandler<ProductCreatedEvent>>,
    pub on_product_updated: Vec<EventHandler<ProductUpdatedEvent>>,
    pub on_low_stock: Vec<EventHandler<LowStockAlertEvent>>,
}

fn handlers_for<E: Send + Sync + 'static>(buffer_size: usize, hooks: Vec<Handler<E>>) -> Vec<EventHandler<E>> {
    hooks.into_iter().map(|f| EventHandler::new(buffer_size, f)).collect()
}

fn spawn_all<E: Send + Sync + 'static>(handlers: Vec<EventHandler<E>>, tasks: &mut Vec<JoinHandle<()>>) {
    tasks.extend(handlers.into_iter().map(|h| tokio::spawn(h.start_handler())));
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        Self {
            on_user_registered: handlers_for(buffer_size, hooks.on_user_registered),
            on_order_created: handlers_for(buffer_size, hooks.on_order_created),
            on_order_status_changed: handlers_for(buffer_size, hooks.on_order_status_changed),
            on_product_created: handlers_for(buffer_size, hooks.on_product_created),
            on_product_updated: handlers_for(buffer_size, hooks.on_product_updated),
            on_low_stock: handlers_for(buffer_size, hooks.on_low_stock),
        }
    }

    pub fn producers(&self) -> EventProducers {
        EventProducers {
            user_registered_producer: self.on_user_registered.iter().map(EventHandler::subscribe).collect(),
            order_created_producer: self.on_order_created.iter().map(EventHandler::subscribe).collect(),
            order_status_changed_producer: self.on_order_status_changed.iter().map(EventHandler::subscribe).collect(),
            product_created_producer: self.on_product_created.iter().map(EventHandler::subscribe).collect(),
            product_updated_producer: self.on_product_updated.iter().map(EventHandler::subscribe).collect(),
            low_stock_producer: self.on_low_stock.iter().map(EventHandler::subscribe).collect(),
        }
    }

    /// Spawns a task per handler. Each task finishes once every producer for its queue has been dropped and its
    /// pending events have been handled.
    pub fn start_handlers(self) -> Vec<JoinHandle<()>> {
        let mut tasks = Vec::new();
        spawn_all(self.on_user_registered, &mut tasks);
        spawn_all(self.on_order_created, &mut tasks);
        spawn_all(self.on_order_status_changed, &mut tasks);
        spawn_all(self.on_product_created, &mut tasks);
        spawn_all(self.on_product_updated, &mut tasks);
        spawn_all(self.on_low_stock, &mut tasks);
        tasks
    }
}

/// Async callbacks per event type. Several hooks may be registered for the same event; each gets its own queue.
#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_user_registered: Vec<Handler<UserRegisteredEvent>>,
    pub on_order_created: Vec<Handler<OrderCreatedEvent>>,
    pub on_order_status_changed: Vec<Handler<OrderStatusChangedEvent>>,
    pub on_product_created: Vec<Handler<ProductCreatedEvent>>,
    pub on_product_updated: Vec<Handler<ProductUpdatedEvent>>,
    pub on_low_stock: Vec<Handler<LowStockAlertEvent>>,
}

impl EventHooks {
    pub fn on_user_registered<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(UserRegisteredEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_user_registered.push(Arc::new(f));
        self
    }

    pub fn on_order_created<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderCreatedEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_order_created.push(Arc::new(f));
        self
    }

    pub fn on_order_status_changed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderStatusChangedEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_order_status_changed.push(Arc::new(f));
        self
    }

    pub fn on_product_created<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(ProductCreatedEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_product_created.push(Arc::new(f));
        self
    }

    pub fn on_product_updated<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(ProductUpdatedEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_product_updated.push(Arc::new(f));
        self
    }

    pub fn on_low_stock<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(LowStockAlertEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_low_stock.push(Arc::new(f));
        self
    }
}
