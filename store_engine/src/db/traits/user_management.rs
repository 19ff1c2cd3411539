use crate::{
    db_types::{NewUser, User, UserId},
    store_api::errors::StoreError,
};

/// Storage for user identities. Credentials are opaque to the engine; hashing and verification belong to the
/// gateway.
#[allow(async_fn_in_trait)]
pub trait UserManagement {
    /// Stores a new user. Emails are unique; a duplicate fails with [`StoreError::UserAlreadyExists`].
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn fetch_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn fetch_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}
