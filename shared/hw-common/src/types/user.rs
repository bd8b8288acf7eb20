//! User Types

use serde::{Deserialize, Serialize};

use crate::Snowflake;

/// A platform user (public fields only).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub id: Snowflake,
    /// Username.
    #[serde(default)]
    pub username: String,
    /// Display name, if the user set one.
    #[serde(default)]
    pub global_name: Option<String>,
    /// Avatar hash.
    #[serde(default)]
    pub avatar: Option<String>,
    /// Whether the account belongs to a bot.
    #[serde(default)]
    pub bot: bool,
}

impl User {
    /// Name to show in messages: display name when set, username otherwise.
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }
}

/// A user's membership in a guild.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// The member's user object (absent in some partial payloads).
    #[serde(default)]
    pub user: Option<User>,
    /// Guild nickname.
    #[serde(default)]
    pub nick: Option<String>,
    /// Role ids.
    #[serde(default)]
    pub roles: Vec<Snowflake>,
    /// ISO-8601 join timestamp.
    #[serde(default)]
    pub joined_at: Option<String>,
    /// Computed permissions string (only present on interaction payloads).
    #[serde(default)]
    pub permissions: Option<String>,
}
