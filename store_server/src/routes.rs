//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Password hashing is deliberately slow, so it runs on the blocking
//! thread pool via [`web::block`]. Everything else (I/O, database operations, etc.) is expressed as futures.
use std::str::FromStr;

use actix_web::{get, post, web, HttpResponse, Responder};
use log::*;
use store_engine::{
    db_types::{NewProduct, OrderId, ProductId, ProductUpdate},
    events::BusMessage,
    inbound::InboundSender,
    AccountApi,
    AccountApiError,
    CatalogApi,
    CatalogManagement,
    OrderFlowApi,
    StoreDatabase,
    UserManagement,
};

use crate::{
    auth::{hash_password, verify_password, JwtClaims, TokenIssuer, WebhookCaller},
    data_objects::{Credentials, JsonResponse, LoginResponse, OrderRequest, UserResponse},
    errors::{AuthError, ServerError},
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

fn parse_path_id<T>(raw: &str) -> Result<T, ServerError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ServerError::InvalidRequestPath(e.to_string()))
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Accounts  ----------------------------------------------------
route!(register => Post "/register" impl UserManagement);
/// Route handler for the register endpoint
///
/// Creates a new account from an email and a password of at least six characters. The password is hashed before it
/// reaches the engine. Emails are unique, so registering the same address twice is a conflict.
pub async fn register<B: UserManagement>(
    body: web::Json<Credentials>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let credentials = body.into_inner();
    trace!("💻️ Received registration request for {}", credentials.email);
    credentials.validate_new_password().map_err(ServerError::InvalidInput)?;
    let password = credentials.password;
    let hash = web::block(move || hash_password(&password)).await.map_err(|e| ServerError::Unspecified(e.to_string()))??;
    let user = api.register_user(&credentials.email, &hash).await?;
    debug!("💻️ Registered user {}", user.id);
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

route!(login => Post "/login" impl UserManagement);
/// Route handler for the login endpoint
///
/// Checks the caller's email and password and issues an access token. The token must be supplied as
/// `Authorization: Bearer <token>` on protected routes. It is valid for a fixed period and will NOT refresh.
///
/// An unknown email and a wrong password give the same response.
pub async fn login<B: UserManagement>(
    body: web::Json<Credentials>,
    api: web::Data<AccountApi<B>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError> {
    let credentials = body.into_inner();
    trace!("💻️ Received login request for {}", credentials.email);
    let user = match api.user_by_email(&credentials.email).await {
        Ok(Some(user)) => user,
        Ok(None) | Err(AccountApiError::InvalidEmail(_)) => {
            debug!("💻️ Login failed. No account for {}", credentials.email);
            return Err(AuthError::InvalidCredentials.into());
        },
        Err(e) => return Err(e.into()),
    };
    let password = credentials.password;
    let hash = user.password_hash.clone();
    let valid = web::block(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ServerError::Unspecified(e.to_string()))?;
    if !valid {
        debug!("💻️ Login failed. Wrong password for user {}", user.id);
        return Err(AuthError::InvalidCredentials.into());
    }
    let token = signer.issue_token(&user)?;
    trace!("💻️ Issued access token for user {}", user.id);
    Ok(HttpResponse::Ok().json(LoginResponse { token, user: user.into() }))
}

//----------------------------------------------   Products  ----------------------------------------------------
route!(products => Get "/products" impl CatalogManagement);
/// The whole catalog, newest first. No authentication is needed.
pub async fn products<B: CatalogManagement>(api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET products");
    let products = api.products().await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(product_by_id => Get "/products/{id}" impl CatalogManagement);
pub async fn product_by_id<B: CatalogManagement>(
    path: web::Path<String>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = parse_path_id::<ProductId>(&path.into_inner())?;
    trace!("💻️ GET product {id}");
    let product = api.product(id).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(create_product => Post "/products" impl CatalogManagement);
pub async fn create_product<B: CatalogManagement>(
    claims: JwtClaims,
    body: web::Json<NewProduct>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST product by user {}", claims.user_id);
    let product = api.create_product(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(product))
}

route!(update_product => Put "/products/{id}" impl CatalogManagement);
/// Applies a partial update. Fields that are absent from the body are left as they are.
pub async fn update_product<B: CatalogManagement>(
    claims: JwtClaims,
    path: web::Path<String>,
    body: web::Json<ProductUpdate>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = parse_path_id::<ProductId>(&path.into_inner())?;
    debug!("💻️ PUT product {id} by user {}", claims.user_id);
    let update = body.into_inner();
    if update.is_empty() {
        return Err(ServerError::InvalidInput("The update does not change anything".into()));
    }
    let product = api.update_product(id, update).await?;
    Ok(HttpResponse::Ok().json(product))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl StoreDatabase);
/// Route handler for placing an order
///
/// The order is placed on behalf of the user in the access token. Stock is reserved as part of the same operation,
/// so a successful response means the units are set aside at the price shown in `total_cents`.
///
/// * `400` if the quantity is less than 1.
/// * `404` if the product does not exist.
/// * `409` if there is not enough stock. Nothing is reserved in this case.
pub async fn create_order<B: StoreDatabase>(
    claims: JwtClaims,
    body: web::Json<OrderRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let OrderRequest { product_id, quantity } = body.into_inner();
    debug!("💻️ POST order for {quantity} x product {product_id} by user {}", claims.user_id);
    let order = api.create_order(claims.user_id, product_id, quantity).await?;
    Ok(HttpResponse::Created().json(order))
}

route!(my_orders => Get "/orders" impl StoreDatabase);
/// Authenticated users can fetch their own orders, newest first, using this endpoint.
pub async fn my_orders<B: StoreDatabase>(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_orders for user {}", claims.user_id);
    let orders = api.fetch_orders(claims.user_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{id}" impl StoreDatabase);
/// Orders that belong to somebody else are reported as not found.
pub async fn order_by_id<B: StoreDatabase>(
    claims: JwtClaims,
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = parse_path_id::<OrderId>(&path.into_inner())?;
    debug!("💻️ GET order {id} for user {}", claims.user_id);
    let order = api.fetch_order(claims.user_id, id).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Bus webhook  ----------------------------------------------------
/// Route handler for the inbound bus webhook
///
/// Callers authenticate with the shared webhook token as `Authorization: Bearer <token>`. The request body is queued,
/// unchanged, for the inbound router under the topic in the path (e.g. `POST /bus/payment/confirmed`).
///
/// * `202` once the message is queued. It will be applied. Malformed messages, unknown topics and unknown ids are
///   logged and dropped by the router, never reported back to the sender.
/// * `401` if the token is missing or wrong, or the webhook is not enabled.
/// * `503` if the queue is full. Nothing was queued, and the sender should retry later.
#[post("/bus/{topic:.*}")]
pub async fn bus_webhook(
    _caller: WebhookCaller,
    path: web::Path<String>,
    body: web::Bytes,
    queue: web::Data<InboundSender>,
) -> Result<HttpResponse, ServerError> {
    let topic = path.into_inner();
    debug!("💻️ Received {} bytes for bus topic {topic}", body.len());
    queue.try_enqueue(BusMessage::new(topic.as_str(), body.to_vec())).map_err(|e| {
        warn!("💻️ Could not queue a {topic} message. {e}");
        ServerError::ServiceBusy(e.to_string())
    })?;
    Ok(HttpResponse::Accepted().json(JsonResponse::success(format!("Message accepted for {topic}"))))
}
