use std::collections::BTreeMap;
use std::sync::Mutex;

use axum::async_trait;

use super::repo::{StoreError, UserStore};
use super::repo_types::{Role, User, UserChanges};

/// `UserStore` held in process memory, with the same uniqueness rule and
/// id sequence behaviour as the `users` table.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    last_id: i64,
    users: BTreeMap<i64, User>,
}

impl Inner {
    fn email_owner(&self, email: &str) -> Option<i64> {
        self.users.values().find(|u| u.email == email).map(|u| u.id)
    }
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().users.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .email_owner(email)
            .and_then(|id| inner.users.get(&id).cloned()))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.lock().users.values().rev().cloned().collect())
    }

    async fn insert(&self, email: &str, password_hash: &str, role: Role) -> Result<User, StoreError> {
        let mut inner = self.lock();
        if inner.email_owner(email).is_some() {
            return Err(StoreError::EmailTaken);
        }
        inner.last_id += 1;
        let user = User {
            id: inner.last_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: i64, changes: &UserChanges) -> Result<bool, StoreError> {
        let mut inner = self.lock();
        if matches!(inner.email_owner(&changes.email), Some(owner) if owner != id) {
            return Err(StoreError::EmailTaken);
        }
        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(false);
        };
        user.email = changes.email.clone();
        user.role = changes.role;
        if let Some(hash) = &changes.password_hash {
            user.password_hash = hash.clone();
        }
        Ok(true)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.lock().users.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<i32, StoreError> {
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryUserStore::new();
        let a = store.insert("a@x.com", "h", Role::Standard).await.unwrap();
        assert!(store.delete(a.id).await.unwrap());
        let b = store.insert("b@x.com", "h", Role::Standard).await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn unique_email_is_enforced() {
        let store = MemoryUserStore::new();
        store.insert("a@x.com", "h", Role::Standard).await.unwrap();
        let err = store.insert("a@x.com", "h", Role::Admin).await.unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn update_may_keep_own_email_but_not_take_another() {
        let store = MemoryUserStore::new();
        let a = store.insert("a@x.com", "h", Role::Admin).await.unwrap();
        store.insert("b@x.com", "h", Role::Standard).await.unwrap();

        let keep = UserChanges {
            email: "a@x.com".into(),
            password_hash: None,
            role: Role::Admin,
        };
        assert!(store.update(a.id, &keep).await.unwrap());

        let steal = UserChanges {
            email: "b@x.com".into(),
            ..keep
        };
        assert!(matches!(
            store.update(a.id, &steal).await.unwrap_err(),
            StoreError::EmailTaken
        ));
    }
}
