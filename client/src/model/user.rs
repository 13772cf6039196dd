use serde::{Deserialize, Serialize};

/// A user object as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserPayload {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

/// Canonical user record held by the user registry.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub global_name: Option<String>,
    pub avatar: Option<String>,
    pub bot: bool,
}

impl From<UserPayload> for User {
    fn from(p: UserPayload) -> Self {
        Self {
            id: p.id,
            username: p.username,
            global_name: p.global_name,
            avatar: p.avatar,
            bot: p.bot,
        }
    }
}

impl User {
    /// The name shown in clients: global display name if set, username otherwise.
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }
}
