use std::sync::Arc;

use dashmap::DashMap;

use crate::model::{Role, RolePayload};

/// In-memory state for a server (guild) as seen by the client.
#[derive(Debug)]
pub struct ServerState {
    pub id: String,
    pub name: String,
    /// Roles belonging to this server, keyed by role ID.
    roles: DashMap<String, Arc<Role>>,
}

impl ServerState {
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            roles: DashMap::new(),
        }
    }

    /// Look up a single role by ID.
    pub fn role(&self, role_id: &str) -> Option<Arc<Role>> {
        self.roles.get(role_id).map(|r| Arc::clone(r.value()))
    }

    /// All current roles matching `pred`, ordered by position descending.
    pub fn roles_where(&self, pred: impl Fn(&Role) -> bool) -> Vec<Arc<Role>> {
        let mut roles: Vec<Arc<Role>> = self
            .roles
            .iter()
            .filter(|r| pred(r.value()))
            .map(|r| Arc::clone(r.value()))
            .collect();
        roles.sort_by(|a, b| b.position.cmp(&a.position).then_with(|| a.id.cmp(&b.id)));
        roles
    }

    /// Insert or replace a role. Holders of the previous `Arc` keep the old value.
    pub fn insert_role(&self, payload: RolePayload) -> Arc<Role> {
        let role = Arc::new(Role::from(payload));
        self.roles.insert(role.id.clone(), Arc::clone(&role));
        role
    }

    pub fn remove_role(&self, role_id: &str) -> Option<Arc<Role>> {
        self.roles.remove(role_id).map(|(_, r)| r)
    }

    pub fn role_count(&self) -> usize {
        self.roles.len()
    }
}
