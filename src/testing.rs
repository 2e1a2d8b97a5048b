//! Test Support
//!
//! An in-memory [`UserDirectory`] so service and handler tests run without
//! a database. Matches the Postgres implementation's observable behavior,
//! including the unique-email constraint and the profile side effect of
//! account creation (tracked as a counter here).

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::directory::{DirectoryError, NewUser, UserDirectory, UserRecord};

/// In-memory user store for tests.
#[derive(Default)]
pub struct MemoryDirectory {
    users: RwLock<HashMap<Uuid, UserRecord>>,
    profiles_created: AtomicUsize,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of profile rows that would have been created alongside users.
    pub fn profile_count(&self) -> usize {
        self.profiles_created.load(Ordering::SeqCst)
    }

    /// Direct access to a stored record, for assertions.
    pub fn get(&self, id: Uuid) -> Option<UserRecord> {
        self.users.read().unwrap().get(&id).cloned()
    }

    /// Force a reset token into place, bypassing generation. Lets tests
    /// exercise expired and mismatched tokens.
    pub fn force_reset_token(&self, id: Uuid, token: &str, expires_at: DateTime<Utc>) {
        let mut users = self.users.write().unwrap();
        if let Some(user) = users.get_mut(&id) {
            user.reset_token = Some(token.to_string());
            user.reset_token_expires_at = Some(expires_at);
        }
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DirectoryError> {
        let users = self.users.read().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, DirectoryError> {
        Ok(self.users.read().unwrap().get(&id).cloned())
    }

    async fn find_by_reset_token(
        &self,
        token: &str,
    ) -> Result<Option<UserRecord>, DirectoryError> {
        let users = self.users.read().unwrap();
        Ok(users
            .values()
            .find(|u| u.reset_token.as_deref() == Some(token))
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, DirectoryError> {
        let mut users = self.users.write().unwrap();
        if users.values().any(|u| u.email == user.email) {
            return Err(DirectoryError::DuplicateEmail);
        }

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            last_login: None,
            reset_token: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(record.id, record.clone());
        self.profiles_created.fetch_add(1, Ordering::SeqCst);
        Ok(record)
    }

    async fn touch_last_login(&self, id: Uuid) -> Result<(), DirectoryError> {
        let mut users = self.users.write().unwrap();
        if let Some(user) = users.get_mut(&id) {
            user.last_login = Some(Utc::now());
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DirectoryError> {
        let mut users = self.users.write().unwrap();
        if let Some(user) = users.get_mut(&id) {
            user.reset_token = Some(token.to_string());
            user.reset_token_expires_at = Some(expires_at);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), DirectoryError> {
        let mut users = self.users.write().unwrap();
        if let Some(user) = users.get_mut(&id) {
            user.password_hash = password_hash.to_string();
            user.reset_token = None;
            user.reset_token_expires_at = None;
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}
