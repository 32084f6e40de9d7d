//! Types related to Discord channels.

use crate::serde::*;
use crate::types::*;

/// The type of a Discord channel.
#[derive(Serialize_repr, Deserialize_repr, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Debug, Hash)]
#[repr(u8)]
#[non_exhaustive]
pub enum ChannelType {
    /// A normal text channel in a guild.
    GuildText = 0,
    /// A direct message channel.
    Dm = 1,
    /// A voice channel in a guild.
    GuildVoice = 2,
    /// A direct message channel with multiple users.
    GroupDm = 3,
    /// A category in a guild.
    GuildCategory = 4,
    /// A news channel in a guild.
    GuildNews = 5,
}

/// A channel on Discord.
#[derive(Serialize, Deserialize, Clone, Ord, PartialOrd, Eq, PartialEq, Debug, Hash)]
#[non_exhaustive]
pub struct Channel {
    /// The channel's ID.
    pub id: ChannelId,
    /// The channel's type.
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
    /// The guild this channel belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<GuildId>,
    /// The channel's name. Not present for DM channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The channel's topic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// The ID of the last message sent in this channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_id: Option<MessageId>,
}
