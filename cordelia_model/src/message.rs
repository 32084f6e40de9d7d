//! Types related to Discord messages.

use crate::serde::*;
use crate::types::*;
use crate::user::*;

/// A message on Discord.
#[derive(Serialize, Deserialize, Clone, Ord, PartialOrd, Eq, PartialEq, Debug, Hash)]
#[non_exhaustive]
pub struct Message {
    /// The message's ID.
    pub id: MessageId,
    /// The channel the message was sent in.
    pub channel_id: ChannelId,
    /// The guild the message was sent in, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<GuildId>,
    /// The user that sent this message.
    pub author: User,
    /// The text contents of this message.
    #[serde(default)]
    pub content: String,
    /// Whether this message was sent with text-to-speech enabled.
    #[serde(default)]
    pub tts: bool,
    /// Whether this message is pinned in its channel.
    #[serde(default)]
    pub pinned: bool,
}
