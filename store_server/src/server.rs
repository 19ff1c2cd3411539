use std::{path::Path, sync::Arc, time::Duration};

use actix_cors::Cors;
use actix_web::{
    dev::Server,
    error::InternalError,
    http::{header, KeepAlive},
    middleware::Logger,
    web,
    App,
    HttpServer,
    ResponseError,
};
use log::*;
use store_engine::{
    events::{EventHandlers, EventHooks, EventProducers, LocalBus},
    inbound::{bus_deliveries, inbound_queue, InboundReceiver, InboundRouter, InboundSender},
    AccountApi,
    CatalogApi,
    OrderFlowApi,
    SqliteDatabase,
};

use crate::{
    auth::{TokenIssuer, WebhookToken},
    config::ServerConfig,
    errors::ServerError,
    routes::{
        bus_webhook,
        health,
        CreateOrderRoute,
        CreateProductRoute,
        LoginRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        ProductByIdRoute,
        ProductsRoute,
        RegisterRoute,
        UpdateProductRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    ensure_database_dir(&config.database_url)?;
    let db = SqliteDatabase::new_with_url(&config.database_url, config.db_max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.seed_sample_data {
        match db.seed_sample_products().await {
            Ok(0) => info!("🌱️ The catalog already has products. Not adding sample data"),
            Ok(n) => info!("🌱️ Added {n} sample products to the catalog"),
            Err(e) => warn!("🌱️ Could not add the sample products. {e}"),
        }
    }
    let bus = LocalBus::new(config.event_buffer_size);
    let producers = start_event_handlers(config.event_buffer_size, &bus);
    let (inbound, queue) = inbound_queue(config.inbound_queue_size);
    start_inbound_router(db.clone(), producers.clone(), queue, &bus, config.router_concurrency);
    let srv = create_server_instance(config, db, producers, inbound)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Every domain event is forwarded to the bus. Returns the producers that the engine APIs publish through.
pub fn start_event_handlers(buffer_size: usize, bus: &LocalBus) -> EventProducers {
    let mut hooks = EventHooks::default();
    hooks.publish_to_bus(Arc::new(bus.clone()));
    let handlers = EventHandlers::new(buffer_size, hooks);
    let producers = handlers.producers();
    let tasks = handlers.start_handlers();
    info!("🚌️ {} event handlers are forwarding domain events to the bus", tasks.len());
    producers
}

/// Runs the inbound router on the current actix system. It applies everything on the inbound queue, and also watches
/// the bus so that echoed alerts are logged. Only the bus side may skip messages if it falls behind.
pub fn start_inbound_router(
    db: SqliteDatabase,
    producers: EventProducers,
    queue: InboundReceiver,
    bus: &LocalBus,
    concurrency: usize,
) {
    let bus_receiver = bus.subscribe();
    let router = InboundRouter::new(OrderFlowApi::new(db, producers));
    actix_web::rt::spawn(async move {
        futures::join!(
            router.run(queue.into_stream(), concurrency),
            router.run(bus_deliveries(bus_receiver), concurrency)
        );
    });
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
    inbound: InboundSender,
) -> Result<Server, ServerError> {
    let webhook_token = config.bus_webhook_token.clone().map(WebhookToken::new);
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), producers.clone());
        let catalog_api = CatalogApi::new(db.clone(), producers.clone());
        let accounts_api = AccountApi::new(db.clone(), producers.clone());
        let jwt_signer = TokenIssuer::new(&config.auth);
        let api_scope = web::scope("/api")
            .service(RegisterRoute::<SqliteDatabase>::new())
            .service(LoginRoute::<SqliteDatabase>::new())
            .service(ProductsRoute::<SqliteDatabase>::new())
            .service(ProductByIdRoute::<SqliteDatabase>::new())
            .service(CreateProductRoute::<SqliteDatabase>::new())
            .service(UpdateProductRoute::<SqliteDatabase>::new())
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new());
        let webhook_token = webhook_token.clone();
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("store::access_log"))
            .wrap(cors())
            .app_data(json_config())
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(jwt_signer))
            .app_data(web::Data::new(inbound.clone()))
            .configure(move |cfg| {
                if let Some(token) = webhook_token {
                    cfg.app_data(web::Data::new(token)).service(bus_webhook);
                }
            })
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Browser clients may call the API from any origin.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(3600)
}

/// Malformed JSON bodies get the same `{"error": ...}` response as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let e = ServerError::InvalidRequestBody(err.to_string());
        let res = e.error_response();
        InternalError::from_response(err, res).into()
    })
}

fn ensure_database_dir(url: &str) -> Result<(), ServerError> {
    let path = url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
    if path.is_empty() || path.starts_with(":memory:") {
        return Ok(());
    }
    let path = path.split('?').next().unwrap_or(path);
    match Path::new(path).parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
            info!("🗃️ Creating database directory {}", dir.display());
            std::fs::create_dir_all(dir)?;
            Ok(())
        },
        _ => Ok(()),
    }
}
