//! Client-side cache of servers and users.
//!
//! Integrations never hold their server directly; they keep the server ID and
//! resolve it here, so the server -> integration direction is the only owning one.

pub mod server;

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::model::{User, UserPayload};

pub use server::ServerState;

/// Central registry shared by every handle cloned from one [`crate::Client`].
#[derive(Debug, Default)]
pub struct Cache {
    /// All known servers, keyed by server ID.
    servers: DashMap<String, Arc<ServerState>>,
    /// All known users, keyed by user ID.
    users: DashMap<String, Arc<User>>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a server, replacing any previous state with the same ID.
    pub fn insert_server(&self, server: ServerState) -> Arc<ServerState> {
        let server = Arc::new(server);
        self.servers.insert(server.id.clone(), Arc::clone(&server));
        server
    }

    pub fn server(&self, server_id: &str) -> Option<Arc<ServerState>> {
        self.servers.get(server_id).map(|s| Arc::clone(s.value()))
    }

    pub fn remove_server(&self, server_id: &str) -> Option<Arc<ServerState>> {
        self.servers.remove(server_id).map(|(_, s)| s)
    }

    /// Insert or refresh a user from a payload and return the canonical handle.
    ///
    /// If the stored record already matches the payload the existing `Arc` is
    /// returned, so repeated upserts of the same data share one allocation.
    pub fn upsert_user(&self, payload: UserPayload) -> Arc<User> {
        let user = User::from(payload);
        let mut entry = self
            .users
            .entry(user.id.clone())
            .or_insert_with(|| Arc::new(user.clone()));
        if **entry.value() != user {
            debug!(user_id = %user.id, "refreshing cached user");
            *entry.value_mut() = Arc::new(user);
        }
        Arc::clone(entry.value())
    }

    pub fn user(&self, user_id: &str) -> Option<Arc<User>> {
        self.users.get(user_id).map(|u| Arc::clone(u.value()))
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, username: &str) -> UserPayload {
        UserPayload {
            id: id.into(),
            username: username.into(),
            global_name: None,
            avatar: None,
            bot: false,
        }
    }

    #[test]
    fn test_upsert_dedupes_by_id() {
        let cache = Cache::new();
        let a = cache.upsert_user(user("u1", "alice"));
        let b = cache.upsert_user(user("u1", "alice"));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.user_count(), 1);
    }

    #[test]
    fn test_upsert_refreshes_changed_user() {
        let cache = Cache::new();
        let old = cache.upsert_user(user("u1", "alice"));
        let new = cache.upsert_user(user("u1", "alice2"));
        assert_eq!(old.username, "alice");
        assert_eq!(new.username, "alice2");
        assert_eq!(cache.user("u1").unwrap().username, "alice2");
    }

    #[test]
    fn test_server_registry() {
        let cache = Cache::new();
        cache.insert_server(ServerState::new("s1".into(), "One".into()));
        assert_eq!(cache.server("s1").unwrap().name, "One");
        assert!(cache.server("s2").is_none());
        assert!(cache.remove_server("s1").is_some());
        assert!(cache.server("s1").is_none());
    }
}
