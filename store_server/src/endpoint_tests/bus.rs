use actix_web::{
    http::{header, Method, StatusCode},
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use serde_json::Value;
use store_common::Secret;
use store_engine::{
    events::BusMessage,
    inbound::{inbound_queue, InboundSender},
};

use super::helpers::send_request;
use crate::{
    auth::WebhookToken,
    routes::{bus_webhook, health},
    server::cors,
};

const WEBHOOK_TOKEN: &str = "bus-webhook-test-token";

fn configure(queue: InboundSender, token: Option<&str>) -> impl FnOnce(&mut ServiceConfig) {
    let token = token.map(|t| WebhookToken::new(Secret::new(t.to_string())));
    move |cfg| {
        cfg.app_data(web::Data::new(queue)).service(bus_webhook);
        if let Some(token) = token {
            cfg.app_data(web::Data::new(token));
        }
    }
}

#[actix_web::test]
async fn webhook_queues_the_body_for_the_router() {
    let _ = env_logger::try_init().ok();
    let (queue, mut rx) = inbound_queue(8);
    let payload = r#"{"order_id": 1, "status": "paid"}"#;
    let req = TestRequest::post().uri("/bus/payment/confirmed").set_payload(payload);
    let (status, body) = send_request(req, WEBHOOK_TOKEN, configure(queue, Some(WEBHOOK_TOKEN))).await.unwrap();
    assert_eq!(status, StatusCode::ACCEPTED);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["success"], true);
    let msg = rx.try_next().unwrap();
    assert_eq!(msg.topic, "payment/confirmed");
    assert_eq!(msg.payload, payload.as_bytes());
}

#[actix_web::test]
async fn webhook_accepts_malformed_messages() {
    let _ = env_logger::try_init().ok();
    let (queue, mut rx) = inbound_queue(8);
    let req = TestRequest::post().uri("/bus/inventory/update").set_payload("not json");
    let (status, _) = send_request(req, WEBHOOK_TOKEN, configure(queue, Some(WEBHOOK_TOKEN))).await.unwrap();
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(rx.try_next().unwrap().payload, b"not json");
}

#[actix_web::test]
async fn anonymous_callers_are_rejected() {
    let _ = env_logger::try_init().ok();
    let (queue, mut rx) = inbound_queue(8);
    let req = TestRequest::post().uri("/bus/payment/confirmed").set_payload(r#"{"order_id": 1}"#);
    let (status, body) = send_request(req, "", configure(queue, Some(WEBHOOK_TOKEN))).await.unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Authentication Error. Authorization header required"}"#);
    assert!(rx.try_next().is_none());
}

#[actix_web::test]
async fn wrong_tokens_are_rejected() {
    let _ = env_logger::try_init().ok();
    let (queue, mut rx) = inbound_queue(8);
    let req = TestRequest::post().uri("/bus/inventory/update").set_payload(r#"{"product_id": 1, "new_stock": 0}"#);
    let (status, body) = send_request(req, "guessed-token", configure(queue, Some(WEBHOOK_TOKEN))).await.unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Authentication Error. Invalid webhook token"}"#);
    assert!(rx.try_next().is_none());
}

#[actix_web::test]
async fn webhook_is_closed_without_a_configured_token() {
    let _ = env_logger::try_init().ok();
    let (queue, mut rx) = inbound_queue(8);
    let req = TestRequest::post().uri("/bus/payment/confirmed").set_payload(r#"{"order_id": 1}"#);
    let (status, body) = send_request(req, WEBHOOK_TOKEN, configure(queue, None)).await.unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Authentication Error. The bus webhook is not enabled"}"#);
    assert!(rx.try_next().is_none());
}

#[actix_web::test]
async fn a_full_queue_is_reported_so_the_sender_retries() {
    let _ = env_logger::try_init().ok();
    let (queue, mut rx) = inbound_queue(1);
    queue.try_enqueue(BusMessage::new("payment/confirmed", b"{\"order_id\": 1}".to_vec())).unwrap();
    let req = TestRequest::post().uri("/bus/payment/confirmed").set_payload(r#"{"order_id": 2}"#);
    let (status, body) = send_request(req, WEBHOOK_TOKEN, configure(queue, Some(WEBHOOK_TOKEN))).await.unwrap();
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert!(body["error"].as_str().unwrap().contains("The inbound queue is full"));
    assert_eq!(rx.try_next().unwrap().payload, b"{\"order_id\": 1}");
    assert!(rx.try_next().is_none());
}

#[actix_web::test]
async fn webhook_fails_when_the_router_has_stopped() {
    let _ = env_logger::try_init().ok();
    let (queue, rx) = inbound_queue(8);
    drop(rx);
    let req = TestRequest::post().uri("/bus/payment/confirmed").set_payload(r#"{"order_id": 2}"#);
    let (status, _) = send_request(req, WEBHOOK_TOKEN, configure(queue, Some(WEBHOOK_TOKEN))).await.unwrap();
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn preflight_requests_are_answered() {
    let app = test::init_service(App::new().wrap(cors()).service(health)).await;
    let req = TestRequest::default()
        .method(Method::OPTIONS)
        .uri("/health")
        .insert_header((header::ORIGIN, "http://shop.example.com"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "GET"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert!(res.status().is_success());
    let allowed = res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).and_then(|v| v.to_str().ok());
    assert_eq!(allowed, Some("http://shop.example.com"));
}
