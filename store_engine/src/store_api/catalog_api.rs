use std::fmt::Debug;

use log::*;

use crate::{
    db::traits::CatalogManagement,
    db_types::{NewProduct, Product, ProductId, ProductUpdate},
    events::{EventProducers, LowStockAlertEvent, ProductCreatedEvent, ProductUpdatedEvent},
    store_api::{
        errors::{CatalogApiError, StoreError},
        is_low_stock,
        order_flow_api::log_store_error,
    },
};

/// Catalog queries and the administrative product operations.
pub struct CatalogApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

impl<B> CatalogApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    /// The whole catalog, newest products first.
    pub async fn products(&self) -> Result<Vec<Product>, CatalogApiError> {
        let products = self.db.fetch_products().await?;
        Ok(products)
    }

    pub async fn product(&self, id: ProductId) -> Result<Product, CatalogApiError> {
        let product = self.db.fetch_product(id).await?;
        product.ok_or(CatalogApiError::StoreError(StoreError::ProductNotFound(id)))
    }

    pub async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogApiError> {
        product.validate().map_err(CatalogApiError::InvalidProduct)?;
        let product = self.db.insert_product(product).await.map_err(|e| {
            log_store_error("creating a product", &e);
            e
        })?;
        info!("📋️ Product {} ({}) added to the catalog", product.id, product.name);
        self.producers.publish_product_created(ProductCreatedEvent::new(&product));
        Ok(product)
    }

    /// Applies an administrative update. Changing the price never affects existing orders.
    pub async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product, CatalogApiError> {
        update.validate().map_err(CatalogApiError::InvalidProduct)?;
        let stock_changed = update.stock_quantity.is_some();
        let product = self.db.update_product(id, update).await.map_err(|e| {
            log_store_error("updating a product", &e);
            e
        })?;
        info!("📋️ Product {} ({}) updated", product.id, product.name);
        self.producers.publish_product_updated(ProductUpdatedEvent::new(&product));
        if stock_changed && is_low_stock(product.stock_quantity) {
            self.producers.publish_low_stock(LowStockAlertEvent::new(product.id, &product.name, product.stock_quantity));
        }
        Ok(product)
    }
}
