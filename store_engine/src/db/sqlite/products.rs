use chrono::Utc;
use log::{debug, trace};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{NewProduct, Product, ProductId, ProductUpdate, StockReservation},
};

const PRODUCT_COLUMNS: &str = "id, name, description, price_cents, stock_quantity, created_at, updated_at";

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, SqliteDatabaseError> {
    let now = Utc::now();
    let sql = format!(
        "INSERT INTO products (name, description, price_cents, stock_quantity, created_at, updated_at) VALUES (?, ?, \
         ?, ?, ?, ?) RETURNING {PRODUCT_COLUMNS}"
    );
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(product.name)
        .bind(product.description)
        .bind(product.price_cents)
        .bind(product.stock_quantity)
        .bind(now)
        .bind(now)
        .fetch_one(conn)
        .await?;
    debug!("🗃️ Product {} ({}) has been saved in the DB", product.id, product.name);
    Ok(product)
}

pub async fn fetch_product(id: ProductId, conn: &mut SqliteConnection) -> Result<Option<Product>, SqliteDatabaseError> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?");
    let product = sqlx::query_as::<_, Product>(&sql).bind(id).fetch_optional(conn).await?;
    Ok(product)
}

pub async fn fetch_products(conn: &mut SqliteConnection) -> Result<Vec<Product>, SqliteDatabaseError> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id DESC");
    let products = sqlx::query_as::<_, Product>(&sql).fetch_all(conn).await?;
    trace!("🗃️ Fetched {} products", products.len());
    Ok(products)
}

pub async fn count_products(conn: &mut SqliteConnection) -> Result<i64, SqliteDatabaseError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products").fetch_one(conn).await?;
    Ok(count)
}

/// Applies the non-empty fields of `update` to the product. An empty update returns the product unchanged.
pub async fn update_product(
    id: ProductId,
    update: ProductUpdate,
    conn: &mut SqliteConnection,
) -> Result<Product, SqliteDatabaseError> {
    if update.is_empty() {
        return fetch_product(id, conn).await?.ok_or(SqliteDatabaseError::ProductNotFound(id));
    }
    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE products SET updated_at = ");
    builder.push_bind(Utc::now());
    if let Some(name) = update.name {
        builder.push(", name = ");
        builder.push_bind(name);
    }
    if let Some(description) = update.description {
        builder.push(", description = ");
        builder.push_bind(description);
    }
    if let Some(price) = update.price_cents {
        builder.push(", price_cents = ");
        builder.push_bind(price);
    }
    if let Some(stock) = update.stock_quantity {
        if stock < 0 {
            return Err(SqliteDatabaseError::QueryError(format!("Stock quantity cannot be negative, got {stock}")));
        }
        builder.push(", stock_quantity = ");
        builder.push_bind(stock);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(format!(" RETURNING {PRODUCT_COLUMNS}"));
    trace!("🗃️ Executing query: {}", builder.sql());
    let product = builder
        .build_query_as::<Product>()
        .fetch_optional(conn)
        .await?
        .ok_or(SqliteDatabaseError::ProductNotFound(id))?;
    debug!("🗃️ Product {} has been updated", product.id);
    Ok(product)
}

/// Decrements the product's stock by `quantity` if, and only if, at least `quantity` units are in stock.
///
/// The check and the decrement happen in a single statement, so two concurrent reservations can never both succeed
/// against the same units. The unit price returned is the one in force at the moment of the decrement.
pub async fn reserve_stock(
    id: ProductId,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<StockReservation, SqliteDatabaseError> {
    if quantity < 1 {
        return Err(SqliteDatabaseError::QueryError(format!("Cannot reserve {quantity} units")));
    }
    let reservation = sqlx::query_as::<_, StockReservation>(
        r#"
            UPDATE products SET stock_quantity = stock_quantity - ?, updated_at = ?
            WHERE id = ? AND stock_quantity >= ?
            RETURNING id AS product_id, name AS product_name, price_cents AS unit_price, stock_quantity AS remaining_stock
        "#,
    )
    .bind(quantity)
    .bind(Utc::now())
    .bind(id)
    .bind(quantity)
    .fetch_optional(&mut *conn)
    .await?;
    match reservation {
        Some(r) => {
            trace!("🗃️ Reserved {quantity} units of product {id}. {} left", r.remaining_stock);
            Ok(r)
        },
        None => match fetch_product(id, conn).await? {
            None => Err(SqliteDatabaseError::ProductNotFound(id)),
            Some(p) => Err(SqliteDatabaseError::InsufficientStock {
                product_id: id,
                requested: quantity,
                available: p.stock_quantity,
            }),
        },
    }
}

/// Returns previously reserved units to stock.
pub async fn release_stock(
    id: ProductId,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<Product, SqliteDatabaseError> {
    if quantity < 1 {
        return Err(SqliteDatabaseError::QueryError(format!("Cannot release {quantity} units")));
    }
    let sql = format!(
        "UPDATE products SET stock_quantity = stock_quantity + ?, updated_at = ? WHERE id = ? RETURNING \
         {PRODUCT_COLUMNS}"
    );
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(quantity)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or(SqliteDatabaseError::ProductNotFound(id))?;
    debug!("🗃️ Released {quantity} units of product {id}. Stock is now {}", product.stock_quantity);
    Ok(product)
}

/// Overwrites the stock level with an absolute value.
pub async fn set_stock(id: ProductId, new_stock: i64, conn: &mut SqliteConnection) -> Result<Product, SqliteDatabaseError> {
    if new_stock < 0 {
        return Err(SqliteDatabaseError::QueryError(format!("Stock quantity cannot be negative, got {new_stock}")));
    }
    let sql =
        format!("UPDATE products SET stock_quantity = ?, updated_at = ? WHERE id = ? RETURNING {PRODUCT_COLUMNS}");
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(new_stock)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or(SqliteDatabaseError::ProductNotFound(id))?;
    debug!("🗃️ Stock for product {id} set to {new_stock}");
    Ok(product)
}
