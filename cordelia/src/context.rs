//! The top-level handle tying a bot's credentials and HTTP pipeline together.

use crate::errors::*;
use crate::http::{HttpConfig, HttpHandler, Routes};
use crate::model::types::{DiscordToken, Snowflake};
use crate::serde::*;
use derive_setters::*;
use reqwest::header::HeaderValue;
use std::borrow::Cow;
use std::sync::Arc;

/// An ID that uniquely represents a Discord context.
#[derive(Serialize, Deserialize, Default, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Debug, Hash)]
#[serde(transparent)]
pub struct DiscordContextId(pub Snowflake);

#[derive(Debug)]
pub(crate) struct DiscordContextData {
    pub context_id: DiscordContextId,
    pub unique_context_id: DiscordContextId,

    pub library_name: Cow<'static, str>,
    pub http_user_agent: Cow<'static, str>,

    pub http: HttpHandler,
}

const DEFAULT_USER_AGENT: &str = concat!(
    "DiscordBot (https://github.com/cordelia-rs/cordelia, ",
    env!("CARGO_PKG_VERSION"),
    ")",
);

/// Handles all features relating to a particular Discord bot.
///
/// The [`Clone`] implementation creates a new handle to the same context.
#[derive(Clone, Debug)]
pub struct DiscordContext {
    pub(crate) data: Arc<DiscordContextData>,
}
impl DiscordContext {
    /// Creates a new Discord context using the default settings.
    pub fn new(client_token: DiscordToken) -> Result<Self> {
        DiscordContextBuilder::new(client_token).build()
    }

    /// Returns a builder that allows configuring the Discord context's settings.
    pub fn builder(client_token: DiscordToken) -> DiscordContextBuilder {
        DiscordContextBuilder::new(client_token)
    }

    /// Returns the HTTP handler for this bot.
    pub fn http(&self) -> &HttpHandler {
        &self.data.http
    }

    /// Returns a handle that allows making raw requests to the Discord API.
    pub fn raw(&self) -> Routes<'_> {
        self.data.http.routes()
    }

    /// Returns an ID for this context. Used to distinguish one Discord context from another.
    pub fn id(&self) -> DiscordContextId {
        self.data.context_id
    }

    /// Returns an unique ID for this context. Unlike [`DiscordContext::id`], this should be
    /// entirely unique in normal usage, as it cannot be manually set.
    pub fn unique_id(&self) -> DiscordContextId {
        self.data.unique_context_id
    }

    /// Returns the library name reported to the Discord API.
    pub fn library_name(&self) -> &str {
        &self.data.library_name
    }

    /// Returns the user agent used in HTTP requests made by the bot.
    pub fn user_agent(&self) -> &str {
        &self.data.http_user_agent
    }
}

/// A builder for a [`DiscordContext`].
#[derive(Debug, Setters)]
#[setters(strip_option)]
pub struct DiscordContextBuilder {
    /// Sets the client token for this builder.
    client_token: DiscordToken,
    /// Sets the context ID for the bot.
    ///
    /// This allows [`DiscordContext::id`] to represent a particular bot token in a
    /// multi-process bot, and [`DiscordContext::unique_id`] to represent a particular
    /// process of a particular bot.
    context_id: Option<DiscordContextId>,
    /// Sets the library name reported to the Discord API.
    library_name: Option<String>,
    /// Sets the user agent used in HTTP requests made by the bot.
    http_user_agent: Option<String>,
    /// Configures how the bot will make HTTP requests.
    http_config: HttpConfig,
}
impl DiscordContextBuilder {
    fn new(client_token: DiscordToken) -> Self {
        DiscordContextBuilder {
            client_token,
            context_id: None,
            library_name: None,
            http_user_agent: None,
            http_config: HttpConfig::default(),
        }
    }

    pub fn build(self) -> Result<DiscordContext> {
        let context_id = match self.context_id {
            Some(id) => id,
            None => DiscordContextId(Snowflake::random()),
        };
        let library_name: Cow<str> = match self.library_name {
            Some(lib) => lib.into(),
            None => "cordelia".into(),
        };
        let http_user_agent: Cow<str> = match self.http_user_agent {
            Some(ua) => ua.into(),
            None => DEFAULT_USER_AGENT.into(),
        };
        let user_agent = HeaderValue::from_str(&http_user_agent)
            .invalid_input("User agent contains non-ASCII characters.")?;
        let http = HttpHandler::new(
            self.http_config, user_agent, Some(self.client_token.to_header_value()),
        )?;

        let data = Arc::new(DiscordContextData {
            context_id,
            unique_context_id: DiscordContextId(Snowflake::random()),
            library_name, http_user_agent,
            http,
        });
        Ok(DiscordContext { data })
    }
}
