use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::contacts::repo_types::{Contact, NewContact};
use crate::diary::repo_types::Diary;
use crate::users::repo_types::{NewUser, PreferencesPatch, User};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() && db_err.constraint() == Some("users_email_key") {
                return StoreError::DuplicateEmail;
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::MissingUser;
            }
        }
        StoreError::Database(anyhow::Error::new(e))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.db, email).await?)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.db, id).await?)
    }

    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        Ok(User::create(&self.db, &new).await?)
    }

    async fn upsert_oauth_user(&self, email: &str, nickname: &str) -> StoreResult<User> {
        Ok(User::upsert_oauth(&self.db, email, nickname).await?)
    }

    async fn touch_last_active(&self, id: Uuid) -> StoreResult<()> {
        Ok(User::touch_last_active(&self.db, id).await?)
    }

    async fn update_nickname(&self, id: Uuid, nickname: &str) -> StoreResult<Option<User>> {
        Ok(User::update_nickname(&self.db, id, nickname).await?)
    }

    async fn update_preferences(&self, id: Uuid, patch: PreferencesPatch) -> StoreResult<Option<User>> {
        Ok(User::update_preferences(&self.db, id, patch).await?)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        Ok(User::delete_cascade(&self.db, id).await?)
    }

    async fn list_diaries(&self, user_id: Uuid, limit: i64, offset: i64) -> StoreResult<Vec<Diary>> {
        Ok(Diary::list_by_user(&self.db, user_id, limit, offset).await?)
    }

    async fn find_diary(&self, id: Uuid) -> StoreResult<Option<Diary>> {
        Ok(Diary::find(&self.db, id).await?)
    }

    async fn create_diary(&self, user_id: Uuid, content: &str) -> StoreResult<Diary> {
        Ok(Diary::create(&self.db, user_id, content).await?)
    }

    async fn update_diary(&self, id: Uuid, content: &str) -> StoreResult<Option<Diary>> {
        Ok(Diary::update_content(&self.db, id, content).await?)
    }

    async fn delete_diary(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Diary::delete(&self.db, id).await?)
    }

    async fn list_contacts(&self, user_id: Uuid) -> StoreResult<Vec<Contact>> {
        Ok(Contact::list_by_user(&self.db, user_id).await?)
    }

    async fn replace_contacts(&self, user_id: Uuid, contacts: Vec<NewContact>) -> StoreResult<Vec<Contact>> {
        Ok(Contact::replace_all(&self.db, user_id, &contacts).await?)
    }
}
