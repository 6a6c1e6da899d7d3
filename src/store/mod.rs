//! Persistence seam between handlers and the database.
//!
//! Handlers only talk to [`Store`]. [`PgStore`] is the production
//! implementation over sqlx; [`MemoryStore`] keeps the same invariants
//! (unique email, owner must exist, cascade on user delete) in process.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::contacts::repo_types::{Contact, NewContact};
use crate::diary::repo_types::Diary;
use crate::users::repo_types::{NewUser, PreferencesPatch, User};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    /// A dependent row referenced a user that does not exist.
    #[error("owning user does not exist")]
    MissingUser,
    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn create_user(&self, new: NewUser) -> StoreResult<User>;
    /// Create a password-less account for `email`, or return the existing one.
    async fn upsert_oauth_user(&self, email: &str, nickname: &str) -> StoreResult<User>;
    async fn touch_last_active(&self, id: Uuid) -> StoreResult<()>;
    async fn update_nickname(&self, id: Uuid, nickname: &str) -> StoreResult<Option<User>>;
    async fn update_preferences(&self, id: Uuid, patch: PreferencesPatch) -> StoreResult<Option<User>>;
    /// Removes contacts, diaries and the user atomically.
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;

    async fn list_diaries(&self, user_id: Uuid, limit: i64, offset: i64) -> StoreResult<Vec<Diary>>;
    async fn find_diary(&self, id: Uuid) -> StoreResult<Option<Diary>>;
    async fn create_diary(&self, user_id: Uuid, content: &str) -> StoreResult<Diary>;
    async fn update_diary(&self, id: Uuid, content: &str) -> StoreResult<Option<Diary>>;
    async fn delete_diary(&self, id: Uuid) -> StoreResult<bool>;

    async fn list_contacts(&self, user_id: Uuid) -> StoreResult<Vec<Contact>>;
    async fn replace_contacts(&self, user_id: Uuid, contacts: Vec<NewContact>) -> StoreResult<Vec<Contact>>;
}
