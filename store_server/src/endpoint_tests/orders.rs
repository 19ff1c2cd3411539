use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use mockall::predicate::eq;
use serde_json::{json, Value};
use store_common::Cents;
use store_engine::{
    db_types::{OrderId, ProductId, StockReservation, UserId},
    events::EventProducers,
    OrderFlowApi,
    StoreError,
};

use super::{
    helpers::{issue_token, sample_order, send_request},
    mocks::MockStore,
};
use crate::routes::{CreateOrderRoute, MyOrdersRoute, OrderByIdRoute};

fn configure(store: MockStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = OrderFlowApi::new(store, EventProducers::default());
        cfg.app_data(web::Data::new(api))
            .service(CreateOrderRoute::<MockStore>::new())
            .service(MyOrdersRoute::<MockStore>::new())
            .service(OrderByIdRoute::<MockStore>::new());
    }
}

fn order_request(product_id: i64, quantity: i64) -> TestRequest {
    TestRequest::post().uri("/orders").set_json(json!({ "product_id": product_id, "quantity": quantity }))
}

#[actix_web::test]
async fn place_order_for_the_token_owner() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_reserve_stock().with(eq(ProductId(1)), eq(2)).times(1).returning(|id, _| {
        Ok(StockReservation {
            product_id: id,
            product_name: "Go Programming Book".into(),
            unit_price: Cents::from(2999),
            remaining_stock: 48,
        })
    });
    store
        .expect_insert_order()
        .withf(|o| o.user_id == UserId(3) && o.quantity == 2 && o.total_cents == Cents::from(5998))
        .times(1)
        .returning(|_| Ok(sample_order(10, 3, 2)));
    let (status, body) = send_request(order_request(1, 2), &issue_token(3), configure(store)).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["id"], 10);
    assert_eq!(body["user_id"], 3);
    assert_eq!(body["total_cents"], 5998);
    assert_eq!(body["status"], "pending");
}

#[actix_web::test]
async fn place_order_without_enough_stock() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_reserve_stock().returning(|id, quantity| {
        Err(StoreError::InsufficientStock { product_id: id, requested: quantity, available: 1 })
    });
    let (status, body) = send_request(order_request(1, 2), &issue_token(3), configure(store)).await.unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, r##"{"error":"Insufficient stock for product #1. 2 requested, but only 1 available"}"##);
}

#[actix_web::test]
async fn place_order_for_missing_product() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_reserve_stock().returning(|id, _| Err(StoreError::ProductNotFound(id)));
    let (status, _) = send_request(order_request(42, 1), &issue_token(3), configure(store)).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn place_order_with_zero_quantity() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(order_request(1, 0), &issue_token(3), configure(MockStore::new())).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Order quantity must be at least 1, got 0"}"#);
}

#[actix_web::test]
async fn place_order_without_a_token() {
    let _ = env_logger::try_init().ok();
    let (status, _) = send_request(order_request(1, 1), "", configure(MockStore::new())).await.unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn backend_failures_are_unavailable() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_reserve_stock().returning(|_, _| Err(StoreError::DatabaseError("database is locked".into())));
    let (status, _) = send_request(order_request(1, 1), &issue_token(3), configure(store)).await.unwrap();
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn fetch_my_orders() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store
        .expect_fetch_orders_for_user()
        .with(eq(UserId(3)))
        .times(1)
        .returning(|_| Ok(vec![sample_order(11, 3, 1), sample_order(10, 3, 2)]));
    let (status, body) = send_request(TestRequest::get().uri("/orders"), &issue_token(3), configure(store)).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    let ids = body.as_array().unwrap().iter().map(|o| o["id"].as_i64().unwrap()).collect::<Vec<_>>();
    assert_eq!(ids, vec![11, 10]);
}

#[actix_web::test]
async fn fetch_my_order_by_id() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store
        .expect_fetch_order_for_user()
        .with(eq(OrderId(10)), eq(UserId(3)))
        .returning(|_, _| Ok(Some(sample_order(10, 3, 2))));
    let (status, body) =
        send_request(TestRequest::get().uri("/orders/10"), &issue_token(3), configure(store)).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["quantity"], 2);
}

#[actix_web::test]
async fn another_users_order_is_not_found() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_fetch_order_for_user().with(eq(OrderId(10)), eq(UserId(4))).returning(|_, _| Ok(None));
    let (status, body) =
        send_request(TestRequest::get().uri("/orders/10"), &issue_token(4), configure(store)).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r##"{"error":"The data was not found. Order #10 does not exist"}"##);
}
