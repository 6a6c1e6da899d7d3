use sqlx::PgPool;
use uuid::Uuid;

use crate::diary::repo_types::Diary;

impl Diary {
    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> sqlx::Result<Vec<Diary>> {
        sqlx::query_as::<_, Diary>(
            r#"
            SELECT id, user_id, content, created_at, updated_at
            FROM diaries
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
    }

    /// Lookup without an owner filter; callers perform the ownership check.
    pub async fn find(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Diary>> {
        sqlx::query_as::<_, Diary>(
            r#"
            SELECT id, user_id, content, created_at, updated_at
            FROM diaries
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(db: &PgPool, user_id: Uuid, content: &str) -> sqlx::Result<Diary> {
        sqlx::query_as::<_, Diary>(
            r#"
            INSERT INTO diaries (user_id, content)
            VALUES ($1, $2)
            RETURNING id, user_id, content, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(content)
        .fetch_one(db)
        .await
    }

    pub async fn update_content(db: &PgPool, id: Uuid, content: &str) -> sqlx::Result<Option<Diary>> {
        sqlx::query_as::<_, Diary>(
            r#"
            UPDATE diaries
               SET content = $2, updated_at = now()
             WHERE id = $1
            RETURNING id, user_id, content, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_optional(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
        let res = sqlx::query("DELETE FROM diaries WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
