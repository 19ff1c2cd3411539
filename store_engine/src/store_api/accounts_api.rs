use std::fmt::Debug;

use log::*;

use crate::{
    db::traits::UserManagement,
    db_types::{NewUser, User, UserId},
    events::{EventProducers, UserRegisteredEvent},
    store_api::errors::{AccountApiError, StoreError},
};

/// Stores and looks up user identities. Credentials are opaque here: the password hash is produced and checked by
/// the caller.
pub struct AccountApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi")
    }
}

impl<B> AccountApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

/// Emails are compared case-insensitively, so they are stored trimmed and lowercased.
pub fn normalize_email(email: &str) -> Result<String, AccountApiError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.contains('@') => Ok(email),
        _ => Err(AccountApiError::InvalidEmail(email)),
    }
}

impl<B> AccountApi<B>
where B: UserManagement
{
    pub async fn register_user(&self, email: &str, password_hash: &str) -> Result<User, AccountApiError> {
        let email = normalize_email(email)?;
        let user = self.db.insert_user(NewUser::new(email.as_str(), password_hash)).await?;
        info!("👤️ User {} registered as {}", user.email, user.id);
        self.producers.publish_user_registered(UserRegisteredEvent::new(&user));
        Ok(user)
    }

    pub async fn user_by_email(&self, email: &str) -> Result<Option<User>, AccountApiError> {
        let email = normalize_email(email)?;
        let user = self.db.fetch_user_by_email(&email).await?;
        Ok(user)
    }

    pub async fn user(&self, id: UserId) -> Result<User, AccountApiError> {
        let user = self.db.fetch_user(id).await?;
        user.ok_or_else(|| AccountApiError::StoreError(StoreError::UserNotFound(id.to_string())))
    }
}
