use cucumber::{then, when};
use store_engine::{
    db_types::{OrderId, OrderStatusType, UserId},
    inbound::{InboundRouter, RouteOutcome},
    CatalogManagement,
    ErrorKind,
    OrderManagement,
};

use crate::cucumber::StoreWorld;

#[when(expr = "user {int} orders {int} of {string}")]
async fn place_order(world: &mut StoreWorld, user: i64, quantity: i64, product: String) {
    let product_id = world.product_id(&product);
    let result = world.engine().api.create_order(UserId(user), product_id, quantity).await;
    match result {
        Ok(order) => world.last_order = Some(order),
        Err(e) => world.last_error = Some(e),
    }
}

#[when(expr = "users {int} and {int} each order {int} of {string} at the same time")]
async fn concurrent_orders(world: &mut StoreWorld, user_a: i64, user_b: i64, quantity: i64, product: String) {
    let product_id = world.product_id(&product);
    let api = &world.engine().api;
    let (a, b) = tokio::join!(
        api.create_order(UserId(user_a), product_id, quantity),
        api.create_order(UserId(user_b), product_id, quantity)
    );
    world.concurrent_results = vec![a, b];
}

async fn deliver(world: &mut StoreWorld, topic: &str, payload: String) {
    let router = InboundRouter::new(&world.engine().api);
    let outcome = router.route(topic, payload.as_bytes()).await;
    world.last_outcome = Some(outcome);
}

#[when("a payment confirmation for the last order is delivered")]
async fn confirm_last_order(world: &mut StoreWorld) {
    let payload = format!(r#"{{"order_id": {}, "status": "success"}}"#, world.last_order().id.value());
    deliver(world, "payment/confirmed", payload).await;
}

#[when(expr = "a payment confirmation for order {int} is delivered")]
async fn confirm_order(world: &mut StoreWorld, order_id: i64) {
    let payload = format!(r#"{{"order_id": {order_id}, "status": "success"}}"#);
    deliver(world, "payment/confirmed", payload).await;
}

#[when(expr = "an inventory update for {string} with {int} units is delivered")]
async fn inventory_update(world: &mut StoreWorld, product: String, units: i64) {
    let payload = format!(r#"{{"product_id": {}, "new_stock": {units}}}"#, world.product_id(&product).value());
    deliver(world, "inventory/update", payload).await;
}

#[when(expr = "a {string} message with payload {string} is delivered")]
async fn raw_message(world: &mut StoreWorld, topic: String, payload: String) {
    deliver(world, &topic, payload).await;
}

#[when(expr = "the last order is moved to {word}")]
async fn move_order(world: &mut StoreWorld, status: String) {
    let status = status.parse::<OrderStatusType>().expect("Not a valid status");
    let id = world.last_order().id;
    let result = world.engine().api.advance_order_status(id, status).await;
    world.last_status_change = Some(result);
}

#[then(expr = "the order total is {int} cents")]
async fn order_total(world: &mut StoreWorld, total: i64) {
    assert_eq!(world.last_order().total_cents.value(), total);
}

#[then(expr = "the order status is {word}")]
async fn order_status(world: &mut StoreWorld, status: String) {
    let expected = status.parse::<OrderStatusType>().expect("Not a valid status");
    let id = world.last_order().id;
    let order = world.engine().api.db().fetch_order(id).await.unwrap().expect("Order has disappeared");
    assert_eq!(order.status, expected);
}

#[then(expr = "order {int} does not exist")]
async fn order_does_not_exist(world: &mut StoreWorld, id: i64) {
    let order = world.engine().api.db().fetch_order(OrderId(id)).await.unwrap();
    assert!(order.is_none());
}

#[then(expr = "{string} has {int} in stock")]
async fn stock_level(world: &mut StoreWorld, product: String, stock: i64) {
    let id = world.product_id(&product);
    let product = world.engine().api.db().fetch_product(id).await.unwrap().expect("Product has disappeared");
    assert_eq!(product.stock_quantity, stock);
}

#[then("the order fails with insufficient stock")]
async fn insufficient_stock(world: &mut StoreWorld) {
    let err = world.last_error.as_ref().expect("The order did not fail");
    assert_eq!(err.kind(), ErrorKind::InsufficientStock);
}

#[then(expr = "user {int} has {int} order(s)")]
async fn order_count(world: &mut StoreWorld, user: i64, count: usize) {
    let orders = world.engine().api.fetch_orders(UserId(user)).await.unwrap();
    assert_eq!(orders.len(), count);
}

#[then("exactly one of the orders succeeds")]
async fn one_success(world: &mut StoreWorld) {
    let ok = world.concurrent_results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(ok, 1, "{:?}", world.concurrent_results);
    let failure = world.concurrent_results.iter().find_map(|r| r.as_ref().err()).expect("No order failed");
    assert_eq!(failure.kind(), ErrorKind::InsufficientStock);
}

#[then("the status change is rejected")]
async fn status_change_rejected(world: &mut StoreWorld) {
    let result = world.last_status_change.as_ref().expect("No status change was attempted");
    let err = result.as_ref().expect_err("The status change was accepted");
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[then(expr = "the message is {word}")]
async fn message_outcome(world: &mut StoreWorld, outcome: String) {
    let expected = match outcome.as_str() {
        "applied" => RouteOutcome::Applied,
        "ignored" => RouteOutcome::Ignored,
        "discarded" => RouteOutcome::Discarded,
        s => panic!("Unknown outcome {s}"),
    };
    assert_eq!(world.last_outcome, Some(expected));
}

#[then(regex = r#"^(\d+) "([^"]+)" events? (?:is|are) emitted$"#)]
async fn events_emitted(world: &mut StoreWorld, count: usize, topic: String) {
    let events = world.settled_events().await;
    let n = events.iter().filter(|e| e.topic() == topic).count();
    assert_eq!(n, count, "Events: {events:?}");
}

#[then("no events are emitted")]
async fn no_events(world: &mut StoreWorld) {
    let events = world.settled_events().await;
    assert!(events.is_empty(), "Events: {events:?}");
}
