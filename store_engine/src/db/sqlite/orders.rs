use chrono::Utc;
use log::{debug, trace};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db::{sqlite::SqliteDatabaseError, traits::StatusUpdate},
    db_types::{NewOrder, Order, OrderId, OrderStatusType, UserId},
};

const ORDER_COLUMNS: &str = "id, user_id, product_id, quantity, total_cents, status, created_at, updated_at";

/// Inserts a new order into the database using the given connection. This is not atomic. You can embed this call
/// inside a transaction if you need to ensure atomicity, and pass `&mut tx` as the connection argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, SqliteDatabaseError> {
    let sql = format!(
        "INSERT INTO orders (user_id, product_id, quantity, total_cents, status, created_at, updated_at) VALUES (?, \
         ?, ?, ?, ?, ?, ?) RETURNING {ORDER_COLUMNS}"
    );
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(order.user_id)
        .bind(order.product_id)
        .bind(order.quantity)
        .bind(order.total_cents)
        .bind(OrderStatusType::Pending)
        .bind(order.created_at)
        .bind(order.created_at)
        .fetch_one(conn)
        .await?;
    debug!("🗃️ Order {} for {} x product {} has been saved in the DB", order.id, order.quantity, order.product_id);
    Ok(order)
}

pub async fn fetch_order(id: OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, SqliteDatabaseError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?");
    let order = sqlx::query_as::<_, Order>(&sql).bind(id).fetch_optional(conn).await?;
    Ok(order)
}

/// Fetches an order only if it belongs to `user_id`.
pub async fn fetch_order_for_user(
    id: OrderId,
    user_id: UserId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ? AND user_id = ?");
    let order = sqlx::query_as::<_, Order>(&sql).bind(id).bind(user_id).fetch_optional(conn).await?;
    Ok(order)
}

/// All orders for the user, newest first.
pub async fn fetch_orders_for_user(
    user_id: UserId,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, SqliteDatabaseError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ? ORDER BY created_at DESC, id DESC");
    let orders = sqlx::query_as::<_, Order>(&sql).bind(user_id).fetch_all(conn).await?;
    trace!("🗃️ Fetched {} orders for user {user_id}", orders.len());
    Ok(orders)
}

/// Moves the order to `status` if its current status precedes `status` in the lifecycle.
///
/// The guard on the current status is part of the `UPDATE` itself, so concurrent updates cannot move an order
/// backwards. If no row matched, the order is re-read to tell apart a missing order, a repeat of the current status
/// and a backwards move.
pub async fn update_order_status(
    id: OrderId,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<StatusUpdate, SqliteDatabaseError> {
    let predecessors = status.predecessors();
    if !predecessors.is_empty() {
        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE orders SET status = ");
        builder.push_bind(status);
        builder.push(", updated_at = ");
        builder.push_bind(Utc::now());
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" AND status IN (");
        {
            let mut statuses = builder.separated(", ");
            for s in predecessors {
                statuses.push_bind(s);
            }
            statuses.push_unseparated(")");
        }
        builder.push(format!(" RETURNING {ORDER_COLUMNS}"));
        trace!("🗃️ Executing query: {}", builder.sql());
        if let Some(order) = builder.build_query_as::<Order>().fetch_optional(&mut *conn).await? {
            debug!("🗃️ Order {id} is now {status}");
            return Ok(StatusUpdate::Changed(order));
        }
    }
    match fetch_order(id, conn).await? {
        None => Err(SqliteDatabaseError::OrderNotFound(id)),
        Some(order) if order.status == status => {
            trace!("🗃️ Order {id} is already {status}. Nothing to do");
            Ok(StatusUpdate::Unchanged(order))
        },
        Some(order) => Err(SqliteDatabaseError::ForbiddenStatusTransition { order_id: id, from: order.status, to: status }),
    }
}
