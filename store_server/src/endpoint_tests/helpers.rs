use actix_web::{
    body::MessageBody,
    http::{header, StatusCode},
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::{Duration, TimeZone, Utc};
use log::debug;
use store_common::Cents;
use store_engine::db_types::{Order, OrderId, OrderStatusType, Product, ProductId, User, UserId};

use crate::{
    auth::{JwtClaims, TokenIssuer},
    config::AuthConfig,
    server::json_config,
};

// Only for signing tokens in these tests. DO NOT re-use this secret anywhere.
const TEST_JWT_SECRET: &str = "endpoint-tests-signing-secret";

pub fn token_issuer() -> TokenIssuer {
    TokenIssuer::new(&AuthConfig::new(TEST_JWT_SECRET, Duration::hours(1)))
}

pub fn issue_token(user_id: i64) -> String {
    let now = Utc::now().timestamp();
    let claims =
        JwtClaims { user_id: UserId(user_id), email: format!("user{user_id}@example.com"), iat: now, exp: now + 3600 };
    token_issuer().sign(&claims).expect("Failed to sign token")
}

/// Sends `req` to an app configured by `configure`, optionally with a bearer token, and returns the status and body.
pub async fn send_request<F>(req: TestRequest, token: &str, configure: F) -> Result<(StatusCode, String), String>
where F: FnOnce(&mut ServiceConfig) {
    let mut req = req;
    if !token.is_empty() {
        req = req.insert_header((header::AUTHORIZATION, format!("Bearer {token}")));
    }
    let req = req.to_request();
    let app = App::new().app_data(json_config()).app_data(web::Data::new(token_issuer())).configure(configure);

    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}

pub fn timestamp() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn sample_product(id: i64, stock: i64) -> Product {
    Product {
        id: ProductId(id),
        name: "Go Programming Book".into(),
        description: "Learn Go programming".into(),
        price_cents: Cents::from(2999),
        stock_quantity: stock,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub fn sample_order(id: i64, user_id: i64, quantity: i64) -> Order {
    Order {
        id: OrderId(id),
        user_id: UserId(user_id),
        product_id: ProductId(1),
        quantity,
        total_cents: Cents::from(2999 * quantity),
        status: OrderStatusType::Pending,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub fn sample_user(id: i64, password_hash: &str) -> User {
    User { id: UserId(id), email: "alice@example.com".into(), password_hash: password_hash.into(), created_at: timestamp() }
}
