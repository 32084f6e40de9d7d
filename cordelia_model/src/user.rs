//! Types related to Discord users.

use crate::serde::*;
use crate::types::*;

/// A user on Discord.
#[derive(Serialize, Deserialize, Clone, Ord, PartialOrd, Eq, PartialEq, Debug, Hash)]
#[non_exhaustive]
pub struct User {
    /// The user's ID.
    pub id: UserId,
    /// The user's name.
    pub username: String,
    /// The user's four-digit discriminator tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
    /// The hash of the user's avatar, if one is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Whether this user is a bot.
    #[serde(default)]
    pub bot: bool,
}
