use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use mockall::predicate::eq;
use serde_json::{json, Value};
use store_engine::{db_types::UserId, events::EventProducers, AccountApi, StoreError};

use super::{
    helpers::{sample_user, send_request, token_issuer},
    mocks::MockStore,
};
use crate::{
    auth::hash_password,
    routes::{LoginRoute, RegisterRoute},
};

fn configure(store: MockStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = AccountApi::new(store, EventProducers::default());
        cfg.app_data(web::Data::new(api))
            .service(RegisterRoute::<MockStore>::new())
            .service(LoginRoute::<MockStore>::new());
    }
}

fn register_request(email: &str, password: &str) -> TestRequest {
    TestRequest::post().uri("/register").set_json(json!({ "email": email, "password": password }))
}

fn login_request(email: &str, password: &str) -> TestRequest {
    TestRequest::post().uri("/login").set_json(json!({ "email": email, "password": password }))
}

#[actix_web::test]
async fn register_new_user() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store
        .expect_insert_user()
        .withf(|u| u.email == "alice@example.com" && u.password_hash.starts_with("$argon2"))
        .times(1)
        .returning(|u| Ok(sample_user(1, &u.password_hash)));
    let (status, body) =
        send_request(register_request(" Alice@Example.com", "password123"), "", configure(store)).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["id"], 1);
    assert_eq!(body["email"], "alice@example.com");
    assert!(body.get("password_hash").is_none());
}

#[actix_web::test]
async fn register_with_short_password() {
    let _ = env_logger::try_init().ok();
    let store = MockStore::new();
    let (status, body) =
        send_request(register_request("alice@example.com", "12345"), "", configure(store)).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Password must be at least 6 characters long"}"#);
}

#[actix_web::test]
async fn register_with_invalid_email() {
    let _ = env_logger::try_init().ok();
    let store = MockStore::new();
    let (status, _) = send_request(register_request("alice", "password123"), "", configure(store)).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn register_duplicate_email() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_insert_user().returning(|u| Err(StoreError::UserAlreadyExists(u.email)));
    let (status, body) =
        send_request(register_request("alice@example.com", "password123"), "", configure(store)).await.unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, r#"{"error":"A user with email alice@example.com already exists"}"#);
}

#[actix_web::test]
async fn register_with_malformed_body() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri("/register").set_json(json!({ "email": "alice@example.com" }));
    let (status, body) = send_request(req, "", configure(MockStore::new())).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with(r#"{"error":"Could not read request body"#));
}

#[actix_web::test]
async fn login_issues_a_token() {
    let _ = env_logger::try_init().ok();
    let hash = hash_password("password123").unwrap();
    let mut store = MockStore::new();
    store
        .expect_fetch_user_by_email()
        .with(eq("alice@example.com"))
        .times(1)
        .returning(move |_| Ok(Some(sample_user(7, &hash))));
    let (status, body) =
        send_request(login_request("alice@example.com", "password123"), "", configure(store)).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["user"]["id"], 7);
    let token = body["token"].as_str().unwrap();
    let claims = token_issuer().verify_token(token).unwrap();
    assert_eq!(claims.user_id, UserId(7));
    assert_eq!(claims.email, "alice@example.com");
}

#[actix_web::test]
async fn login_with_wrong_password() {
    let _ = env_logger::try_init().ok();
    let hash = hash_password("password123").unwrap();
    let mut store = MockStore::new();
    store.expect_fetch_user_by_email().returning(move |_| Ok(Some(sample_user(7, &hash))));
    let (status, body) =
        send_request(login_request("alice@example.com", "password321"), "", configure(store)).await.unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Authentication Error. Invalid email or password"}"#);
}

#[actix_web::test]
async fn login_with_unknown_email() {
    let _ = env_logger::try_init().ok();
    let mut store = MockStore::new();
    store.expect_fetch_user_by_email().returning(|_| Ok(None));
    let (status, body) =
        send_request(login_request("bob@example.com", "password123"), "", configure(store)).await.unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Authentication Error. Invalid email or password"}"#);
}
