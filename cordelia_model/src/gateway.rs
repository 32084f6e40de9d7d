//! Types related to gateway discovery.

use crate::serde::*;
use std::time::Duration;

/// How many gateway sessions a bot may still start, and when the allowance resets.
///
/// Discord meters session starts separately from HTTP rate limits; a bot that runs
/// out has to wait out `reset_after` before identifying again.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
#[non_exhaustive]
pub struct SessionStartLimit {
    /// Session starts left in the current window.
    pub remaining: u32,
    /// Session starts allowed per window.
    pub total: u32,
    /// Time until `remaining` is restored to `total`.
    #[serde(with = "utils::duration_millis")]
    pub reset_after: Duration,
    /// How many shards may identify concurrently within a five second window.
    #[serde(default = "default_concurrency")]
    pub max_concurrency: u32,
}
impl SessionStartLimit {
    /// Returns `true` if no further sessions can be started until the window resets.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

fn default_concurrency() -> u32 {
    1
}

/// The response to a `Get Gateway` call.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
#[non_exhaustive]
pub struct GetGateway {
    /// The websocket URL clients connect to.
    pub url: String,
}

/// The response to a `Get Gateway Bot` call.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug)]
#[non_exhaustive]
pub struct GetGatewayBot {
    /// The websocket URL the bot connects to.
    pub url: String,
    /// The shard count Discord recommends for this bot.
    pub shards: u32,
    /// The bot's remaining session start allowance.
    pub session_start_limit: SessionStartLimit,
}
impl GetGatewayBot {
    /// Returns `true` if the bot has enough session starts left to bring up every
    /// recommended shard.
    pub fn can_start_recommended_shards(&self) -> bool {
        self.session_start_limit.remaining >= self.shards
    }
}
