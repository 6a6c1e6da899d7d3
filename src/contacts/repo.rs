use sqlx::PgPool;
use uuid::Uuid;

use crate::contacts::repo_types::{Contact, NewContact};

impl Contact {
    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<Contact>> {
        sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, user_id, email, phone
            FROM contacts
            WHERE user_id = $1
            ORDER BY position
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    /// Delete-all then insert, inside one transaction.
    pub async fn replace_all(
        db: &PgPool,
        user_id: Uuid,
        contacts: &[NewContact],
    ) -> sqlx::Result<Vec<Contact>> {
        let mut tx = db.begin().await?;

        sqlx::query("DELETE FROM contacts WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let mut saved = Vec::with_capacity(contacts.len());
        for (position, c) in contacts.iter().enumerate() {
            let row = sqlx::query_as::<_, Contact>(
                r#"
                INSERT INTO contacts (id, user_id, email, phone, position)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, user_id, email, phone
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&c.email)
            .bind(&c.phone)
            .bind(position as i32)
            .fetch_one(&mut *tx)
            .await?;
            saved.push(row);
        }

        tx.commit().await?;
        Ok(saved)
    }
}
