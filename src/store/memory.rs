use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::contacts::repo_types::{Contact, NewContact};
use crate::diary::repo_types::Diary;
use crate::users::repo_types::{NewUser, PreferencesPatch, TimerStatus, User, DEFAULT_IDLE_THRESHOLD_SEC};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    // insertion order doubles as the tie-breaker for equal timestamps
    diaries: Vec<Diary>,
    contacts: Vec<Contact>,
}

/// In-process [`Store`] with the same constraints as the SQL schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn new_user_row(email: &str, nickname: &str, password_hash: Option<String>) -> User {
    let now = OffsetDateTime::now_utc();
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        nickname: nickname.to_string(),
        password_hash,
        timer_status: TimerStatus::default(),
        timer_idle_threshold_sec: DEFAULT_IDLE_THRESHOLD_SEC,
        created_at: now,
        last_active_at: now,
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        if t.users.values().any(|u| u.email == new.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let user = new_user_row(&new.email, &new.nickname, new.password_hash);
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn upsert_oauth_user(&self, email: &str, nickname: &str) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        if let Some(existing) = t.users.values_mut().find(|u| u.email == email) {
            existing.last_active_at = OffsetDateTime::now_utc();
            return Ok(existing.clone());
        }
        let user = new_user_row(email, nickname, None);
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn touch_last_active(&self, id: Uuid) -> StoreResult<()> {
        if let Some(u) = self.tables.write().await.users.get_mut(&id) {
            u.last_active_at = OffsetDateTime::now_utc();
        }
        Ok(())
    }

    async fn update_nickname(&self, id: Uuid, nickname: &str) -> StoreResult<Option<User>> {
        let mut t = self.tables.write().await;
        Ok(t.users.get_mut(&id).map(|u| {
            u.nickname = nickname.to_string();
            u.clone()
        }))
    }

    async fn update_preferences(&self, id: Uuid, patch: PreferencesPatch) -> StoreResult<Option<User>> {
        let mut t = self.tables.write().await;
        Ok(t.users.get_mut(&id).map(|u| {
            if let Some(status) = patch.timer_status {
                u.timer_status = status;
            }
            if let Some(threshold) = patch.timer_idle_threshold_sec {
                u.timer_idle_threshold_sec = threshold;
            }
            u.clone()
        }))
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        t.contacts.retain(|c| c.user_id != id);
        t.diaries.retain(|d| d.user_id != id);
        Ok(t.users.remove(&id).is_some())
    }

    async fn list_diaries(&self, user_id: Uuid, limit: i64, offset: i64) -> StoreResult<Vec<Diary>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Diary> = t
            .diaries
            .iter()
            .rev()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn find_diary(&self, id: Uuid) -> StoreResult<Option<Diary>> {
        let t = self.tables.read().await;
        Ok(t.diaries.iter().find(|d| d.id == id).cloned())
    }

    async fn create_diary(&self, user_id: Uuid, content: &str) -> StoreResult<Diary> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&user_id) {
            return Err(StoreError::MissingUser);
        }
        let now = OffsetDateTime::now_utc();
        let diary = Diary {
            id: Uuid::new_v4(),
            user_id,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        t.diaries.push(diary.clone());
        Ok(diary)
    }

    async fn update_diary(&self, id: Uuid, content: &str) -> StoreResult<Option<Diary>> {
        let mut t = self.tables.write().await;
        Ok(t.diaries.iter_mut().find(|d| d.id == id).map(|d| {
            d.content = content.to_string();
            d.updated_at = OffsetDateTime::now_utc();
            d.clone()
        }))
    }

    async fn delete_diary(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.diaries.len();
        t.diaries.retain(|d| d.id != id);
        Ok(t.diaries.len() != before)
    }

    async fn list_contacts(&self, user_id: Uuid) -> StoreResult<Vec<Contact>> {
        let t = self.tables.read().await;
        Ok(t.contacts.iter().filter(|c| c.user_id == user_id).cloned().collect())
    }

    async fn replace_contacts(&self, user_id: Uuid, contacts: Vec<NewContact>) -> StoreResult<Vec<Contact>> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&user_id) {
            return Err(StoreError::MissingUser);
        }
        t.contacts.retain(|c| c.user_id != user_id);
        let saved: Vec<Contact> = contacts
            .into_iter()
            .map(|c| Contact {
                id: Uuid::new_v4(),
                user_id,
                email: c.email,
                phone: c.phone,
            })
            .collect();
        t.contacts.extend(saved.iter().cloned());
        Ok(saved)
    }
}
