use sqlx::PgPool;
use uuid::Uuid;

use crate::users::repo_types::{NewUser, PreferencesPatch, User};

const USER_COLUMNS: &str = "id, email, nickname, password_hash, timer_status, \
     timer_idle_threshold_sec, created_at, last_active_at";

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(db)
            .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Create a new user; `password_hash` is NULL for OAuth-only accounts.
    pub async fn create(db: &PgPool, new: &NewUser) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, nickname, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.email)
        .bind(&new.nickname)
        .bind(&new.password_hash)
        .fetch_one(db)
        .await
    }

    /// Insert-or-touch keyed by email. An existing account keeps its
    /// nickname and password hash.
    pub async fn upsert_oauth(db: &PgPool, email: &str, nickname: &str) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, nickname, password_hash)
            VALUES ($1, $2, NULL)
            ON CONFLICT (email) DO UPDATE SET last_active_at = now()
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(nickname)
        .fetch_one(db)
        .await
    }

    pub async fn touch_last_active(db: &PgPool, id: Uuid) -> sqlx::Result<()> {
        sqlx::query("UPDATE users SET last_active_at = now() WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn update_nickname(db: &PgPool, id: Uuid, nickname: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET nickname = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(nickname)
        .fetch_optional(db)
        .await
    }

    pub async fn update_preferences(
        db: &PgPool,
        id: Uuid,
        patch: PreferencesPatch,
    ) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET timer_status = COALESCE($2, timer_status),
                   timer_idle_threshold_sec = COALESCE($3, timer_idle_threshold_sec)
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.timer_status)
        .bind(patch.timer_idle_threshold_sec)
        .fetch_optional(db)
        .await
    }

    /// Delete the account and everything it owns in one transaction.
    /// Returns false when the user did not exist.
    pub async fn delete_cascade(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
        let mut tx = db.begin().await?;
        sqlx::query("DELETE FROM contacts WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM diaries WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(deleted > 0)
    }
}
