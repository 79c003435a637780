//! In-memory credential store.
//!
//! Backs tests and local runs without PostgreSQL. Credentials and refresh
//! token records live in DashMaps; the username/email indexes give the same
//! uniqueness guarantees as the database's unique indexes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Mutex;

use super::models::{RefreshTokenRecord, UserCredential};
use super::store::{CredentialStore, StoreError};
use crate::core_types::UserId;

/// Thread-safe in-memory credential store.
#[derive(Default)]
pub struct MemoryCredentialStore {
    credentials: DashMap<UserId, UserCredential>,
    /// username -> user id
    usernames: DashMap<String, UserId>,
    /// email -> user id
    emails: DashMap<String, UserId>,
    /// Keyed by user id: one record per user.
    refresh_tokens: DashMap<UserId, RefreshTokenRecord>,
    /// Serializes credential inserts and deletes so both unique indexes
    /// change together.
    write_lock: Mutex<()>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored credentials.
    pub fn credential_count(&self) -> usize {
        self.credentials.len()
    }

    /// Number of stored refresh token records.
    pub fn refresh_token_count(&self) -> usize {
        self.refresh_tokens.len()
    }

    /// Number of refresh token records belonging to `user_id` (0 or 1).
    pub fn refresh_tokens_for(&self, user_id: UserId) -> usize {
        self.refresh_tokens
            .iter()
            .filter(|r| r.value().user_id == user_id)
            .count()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn create_credential(&self, credential: &UserCredential) -> Result<(), StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Internal("credential write lock poisoned".into()))?;

        if self.usernames.contains_key(&credential.username) {
            return Err(StoreError::Duplicate("username"));
        }
        if self.emails.contains_key(&credential.email) {
            return Err(StoreError::Duplicate("email"));
        }
        if self.credentials.contains_key(&credential.id) {
            return Err(StoreError::Duplicate("id"));
        }

        self.usernames
            .insert(credential.username.clone(), credential.id);
        self.emails.insert(credential.email.clone(), credential.id);
        self.credentials.insert(credential.id, credential.clone());
        Ok(())
    }

    async fn get_credential(&self, user_id: UserId) -> Result<Option<UserCredential>, StoreError> {
        Ok(self.credentials.get(&user_id).map(|c| c.value().clone()))
    }

    async fn find_by_username_or_email(
        &self,
        login: &str,
    ) -> Result<Vec<UserCredential>, StoreError> {
        let by_username = self.usernames.get(login).map(|id| *id.value());
        let by_email = self.emails.get(login).map(|id| *id.value());

        let mut ids: Vec<UserId> = by_username.into_iter().chain(by_email).collect();
        ids.dedup();

        Ok(ids
            .into_iter()
            .filter_map(|id| self.credentials.get(&id).map(|c| c.value().clone()))
            .collect())
    }

    async fn delete_credential(&self, user_id: UserId) -> Result<bool, StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Internal("credential write lock poisoned".into()))?;

        self.refresh_tokens.remove(&user_id);
        match self.credentials.remove(&user_id) {
            Some((_, cred)) => {
                self.usernames.remove(&cred.username);
                self.emails.remove(&cred.email);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_refresh_token(
        &self,
        user_id: UserId,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        Ok(self.refresh_tokens.get(&user_id).map(|r| r.value().clone()))
    }

    async fn upsert_refresh_token(
        &self,
        user_id: UserId,
        token: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<RefreshTokenRecord, StoreError> {
        let record = match self.refresh_tokens.entry(user_id) {
            Entry::Occupied(mut existing) => {
                let rec = existing.get_mut();
                rec.token = token.to_string();
                rec.issued_at = issued_at;
                rec.clone()
            }
            Entry::Vacant(slot) => slot
                .insert(RefreshTokenRecord::new(user_id, token.to_string(), issued_at))
                .clone(),
        };
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cred(username: &str, email: &str) -> UserCredential {
        UserCredential::new(username.into(), email.into(), "hash".into())
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = MemoryCredentialStore::new();
        store.create_credential(&cred("alice", "a@x.com")).await.unwrap();

        let err = store
            .create_credential(&cred("alice", "other@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate("username")));
        assert_eq!(store.credential_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryCredentialStore::new();
        store.create_credential(&cred("alice", "a@x.com")).await.unwrap();

        let err = store
            .create_credential(&cred("bob", "a@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate("email")));
        // Rejected insert must not leak into the username index
        assert!(store.create_credential(&cred("bob", "b@x.com")).await.is_ok());
    }

    #[tokio::test]
    async fn test_find_by_username_or_email() {
        let store = MemoryCredentialStore::new();
        let alice = cred("alice", "a@x.com");
        store.create_credential(&alice).await.unwrap();
        store.create_credential(&cred("bob", "b@x.com")).await.unwrap();

        let by_name = store.find_by_username_or_email("alice").await.unwrap();
        let by_mail = store.find_by_username_or_email("a@x.com").await.unwrap();
        assert_eq!(by_name, vec![alice.clone()]);
        assert_eq!(by_mail, vec![alice]);
        assert!(store.find_by_username_or_email("carol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_returns_each_match_once() {
        let store = MemoryCredentialStore::new();
        let alice = cred("alice", "a@x.com");
        // username equal to another user's email
        let other = cred("a@x.com", "o@x.com");
        // username equal to own email
        let same = cred("s@x.com", "s@x.com");
        for c in [&alice, &other, &same] {
            store.create_credential(c).await.unwrap();
        }

        let found = store.find_by_username_or_email("a@x.com").await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.contains(&alice) && found.contains(&other));

        let found = store.find_by_username_or_email("s@x.com").await.unwrap();
        assert_eq!(found, vec![same]);
        assert!(store.find_by_username_or_email("Alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_keeps_one_record_per_user() {
        let store = MemoryCredentialStore::new();
        let user = UserId::new_v4();
        let t0 = Utc::now();

        let first = store.upsert_refresh_token(user, "tok-1", t0).await.unwrap();
        let second = store
            .upsert_refresh_token(user, "tok-2", t0 + chrono::Duration::seconds(5))
            .await
            .unwrap();

        assert_eq!(first.id, second.id, "record is updated in place");
        assert_eq!(store.refresh_tokens_for(user), 1);
        let stored = store.get_refresh_token(user).await.unwrap().unwrap();
        assert_eq!(stored.token, "tok-2");
        assert_eq!(stored.issued_at, t0 + chrono::Duration::seconds(5));
    }

    #[tokio::test]
    async fn test_delete_removes_credential_and_refresh_token() {
        let store = MemoryCredentialStore::new();
        let alice = cred("alice", "a@x.com");
        store.create_credential(&alice).await.unwrap();
        store
            .upsert_refresh_token(alice.id, "tok", Utc::now())
            .await
            .unwrap();

        assert!(store.delete_credential(alice.id).await.unwrap());
        assert!(!store.delete_credential(alice.id).await.unwrap());
        assert!(store.get_credential(alice.id).await.unwrap().is_none());
        assert!(store.get_refresh_token(alice.id).await.unwrap().is_none());
        // Username and email are free again
        assert!(store.create_credential(&cred("alice", "a@x.com")).await.is_ok());
    }
}
