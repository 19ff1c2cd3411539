use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{NewUser, User, UserId},
};

const USER_COLUMNS: &str = "id, email, password_hash, created_at";

pub async fn insert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<User, SqliteDatabaseError> {
    let sql = format!("INSERT INTO users (email, password_hash, created_at) VALUES (?, ?, ?) RETURNING {USER_COLUMNS}");
    let result = sqlx::query_as::<_, User>(&sql)
        .bind(&user.email)
        .bind(user.password_hash)
        .bind(Utc::now())
        .fetch_one(conn)
        .await;
    match result {
        Ok(user) => {
            debug!("🗃️ User {} registered as {}", user.email, user.id);
            Ok(user)
        },
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(SqliteDatabaseError::DuplicateEmail(user.email)),
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_user(id: UserId, conn: &mut SqliteConnection) -> Result<Option<User>, SqliteDatabaseError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
    let user = sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn fetch_user_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Option<User>, SqliteDatabaseError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
    let user = sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(conn).await?;
    Ok(user)
}
