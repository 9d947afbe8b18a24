//! User lookup consumed by sign-in and refresh.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use warden_core::result::AppResult;
use warden_entity::user::User;

/// Read-only access to the user directory.
///
/// Implemented by the persistence layer; the session subsystem never
/// mutates users.
#[async_trait]
pub trait UserDirectory: Send + Sync + std::fmt::Debug + 'static {
    /// Look up a user by id.
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Look up a user by exact username.
    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// All users of a tenant, ordered by username.
    async fn list_by_tenant(&self, tenant_id: Uuid) -> AppResult<Vec<User>>;
}

/// In-process directory, used for tests and single-node demos.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserDirectory {
    users: Arc<DashMap<Uuid, User>>,
}

impl MemoryUserDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user.
    pub fn insert(&self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Flip a user's active flag. Returns `false` if the user is unknown.
    pub fn set_active(&self, id: Uuid, active: bool) -> bool {
        match self.users.get_mut(&id) {
            Some(mut user) => {
                user.is_active = active;
                true
            }
            None => false,
        }
    }

    /// Remove a user.
    pub fn remove(&self, id: Uuid) {
        self.users.remove(&id);
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.value().username == username)
            .map(|entry| entry.value().clone()))
    }

    async fn list_by_tenant(&self, tenant_id: Uuid) -> AppResult<Vec<User>> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|entry| entry.value().tenant_id == Some(tenant_id))
            .map(|entry| entry.value().clone())
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }
}
