//! A module for making raw requests to Discord's API.
//!
//! The heart of this module is the request pipeline in [`HttpHandler`]: every API call
//! acquires the global rate limit for its credential and the rate limit for its route
//! before touching the network, folds the response headers back into both, and retries
//! transient failures. Discord only reveals which routes share a rate limit bucket in
//! response headers, so the pipeline discovers bucket identities as responses come
//! back and merges route limits that turn out to share one.

use crate::errors::*;
use crate::serde::*;
use derive_setters::*;
use parking_lot::Mutex;
use reqwest::{Client, ClientBuilder, StatusCode};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::multipart::Form;
use std::error::{Error as StdError};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::time::Duration;
use tracing_futures::*;
use url::Url;

mod limits;
mod model;
pub mod routing;

use self::limits::{AcquireError, RateLimits, UpdateError};
pub use self::model::*;
pub use self::routing::{Method, Route};

use crate::model::channel::*;
use crate::model::gateway::*;
use crate::model::message::*;
use crate::model::types::*;
use crate::model::user::*;

/// The API version used when none is configured.
pub const DEFAULT_API_VERSION: u8 = 10;

const AVAILABLE_API_VERSIONS: &[u8] = &[9, 10];

static API_CALL_COUNT: AtomicUsize = AtomicUsize::new(0);

/// A notification that an API call was rejected with status 429.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct RateLimitEvent {
    /// The limit of the bucket the call was made on.
    pub limit: u32,
    /// The remaining request count of the bucket the call was made on.
    pub remaining: u32,
    /// The number of seconds until the bucket resets.
    pub reset_after: f64,
    /// The name of the bucket the call was made on, if it is known.
    pub bucket: Option<String>,
    /// The value of the `X-RateLimit-Scope` header, if one was present.
    pub scope: Option<String>,
}

/// An observer invoked whenever an API call is rejected with status 429.
///
/// The observer is run on a separate task, so API calls never block on it.
pub type RateLimitCallback = Arc<dyn Fn(RateLimitEvent) + Send + Sync>;

/// Stores settings for how HTTP requests are made.
#[derive(Clone, Derivative, Setters)]
#[derivative(Debug)]
#[setters(strip_option)]
#[non_exhaustive]
pub struct HttpConfig {
    /// The maximum number of requests per second per authorization credential.
    ///
    /// Discord by default only allows 50 requests per second. Only increase this if
    /// your bot has had its limit raised.
    pub max_requests_per_second: u32,
    /// The number of seconds added to every rate limit timer for lag compensation.
    ///
    /// Increasing this protects against erroneous 429s at the cost of slower bucket
    /// resets. Decreasing it below zero hastens resets but is likely to cause 429s.
    pub time_offset: f64,
    /// The number of times a request is attempted before giving up.
    pub max_retries: u32,
    /// The Discord API version to make requests against. Versions 9 and 10 are
    /// available; using anything but the default is unsupported.
    pub api_version: u8,
    /// Overrides the base URL used for API requests, e.g. to route them through a
    /// Discord-compatible API proxy. The default is `https://discord.com/api/v{version}`.
    #[setters(into)]
    pub api_base: Option<String>,
    /// The proxy requests are made through, if any. Use
    /// [`reqwest::Proxy::basic_auth`] to pass proxy credentials.
    pub proxy: Option<reqwest::Proxy>,
    /// An observer invoked whenever a request is rejected with status 429.
    #[derivative(Debug = "ignore")]
    pub on_rate_limited: Option<RateLimitCallback>,
}
impl HttpConfig {
    /// Creates a default http configuration.
    pub fn new() -> Self {
        Default::default()
    }
}
impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            max_requests_per_second: 50,
            time_offset: 0.0,
            max_retries: 5,
            api_version: DEFAULT_API_VERSION,
            api_base: None,
            proxy: None,
            on_rate_limited: None,
        }
    }
}

/// A single logical call to the Discord API.
///
/// Carries the route, the body in one of its shapes, and the per-call options the
/// pipeline folds into the request headers.
#[derive(Clone, Debug)]
pub struct Request {
    route: Route,
    json: Option<JsonValue>,
    query: Option<JsonValue>,
    files: Vec<UploadFile>,
    reason: Option<String>,
    auth: Option<HeaderValue>,
    headers: HeaderMap,
}
impl Request {
    /// Creates a new request for the given route.
    pub fn new(route: Route) -> Request {
        Request {
            route,
            json: None,
            query: None,
            files: Vec::new(),
            reason: None,
            auth: None,
            headers: HeaderMap::new(),
        }
    }

    /// Sets the JSON body of the request.
    pub fn json(mut self, value: &impl Serialize) -> Result<Request> {
        self.json = Some(serde_json::to_value(value).unexpected()?);
        Ok(self)
    }

    /// Sets the query string of the request.
    pub fn query(mut self, value: &impl Serialize) -> Result<Request> {
        self.query = Some(serde_json::to_value(value).unexpected()?);
        Ok(self)
    }

    /// Adds files to be uploaded as a multipart form. The JSON body, if any, is sent
    /// as the form's `payload_json` field.
    pub fn files(mut self, files: impl IntoIterator<Item = UploadFile>) -> Request {
        self.files.extend(files);
        self
    }

    /// Sets the audit log reason for the request.
    pub fn reason(mut self, reason: impl Into<String>) -> Request {
        self.reason = Some(reason.into());
        self
    }

    /// Overrides the authorization credential used for the request.
    pub fn auth(mut self, auth: HeaderValue) -> Request {
        self.auth = Some(auth);
        self
    }

    /// Adds an extra header to the request.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Request {
        self.headers.insert(name, value);
        self
    }
}

/// Makes requests to Discord's API, handling rate limits and transient failures.
///
/// Instances can be obtained from [`DiscordContext::http`](`crate::DiscordContext::http`).
#[derive(Debug)]
pub struct HttpHandler {
    config: HttpConfig,
    user_agent: HeaderValue,
    default_auth: Option<HeaderValue>,
    api_version: AtomicU8,
    session: Mutex<Option<Client>>,
    rate_limits: RateLimits,
}
impl HttpHandler {
    /// Creates a new handler with the given configuration.
    pub fn new(
        config: HttpConfig, user_agent: HeaderValue, default_auth: Option<HeaderValue>,
    ) -> Result<HttpHandler> {
        check_api_version(config.api_version)?;
        Ok(HttpHandler {
            api_version: AtomicU8::new(config.api_version),
            rate_limits: RateLimits::new(config.max_requests_per_second, config.time_offset),
            session: Mutex::new(None),
            user_agent, default_auth, config,
        })
    }

    /// Returns the API version requests are currently made against.
    pub fn api_version(&self) -> u8 {
        self.api_version.load(Ordering::Relaxed)
    }

    /// Changes the API version requests are made against.
    ///
    /// Versions 9 and 10 are available. Using anything but the default is unsupported
    /// and logs a warning.
    pub fn set_api_version(&self, version: u8) -> Result<()> {
        check_api_version(version)?;
        self.api_version.store(version, Ordering::Relaxed);
        Ok(())
    }

    fn base_url(&self) -> String {
        match &self.config.api_base {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://discord.com/api/v{}", self.api_version()),
        }
    }

    /// Returns the HTTPS client, constructing it if this is the first request.
    fn session(&self) -> Result<Client> {
        let mut session = self.session.lock();
        if let Some(client) = &*session {
            return Ok(client.clone());
        }
        let mut builder = ClientBuilder::new()
            .use_rustls_tls()
            .referer(false);
        if let Some(proxy) = &self.config.proxy {
            builder = builder.proxy(proxy.clone());
        }
        let client = builder.build().internal_err("Failed to create HTTP client.")?;
        *session = Some(client.clone());
        Ok(client)
    }

    /// Releases the HTTPS client and cancels all pending rate limit resets.
    ///
    /// This may be called any number of times; a later request lazily recreates the
    /// client.
    pub fn close(&self) {
        *self.session.lock() = None;
        self.rate_limits.shutdown();
    }

    /// Returns a handle for making raw API calls through this handler.
    pub fn routes(&self) -> Routes<'_> {
        Routes {
            handler: self,
            auth: None,
            reason: None,
        }
    }

    /// Performs a logical API call, enforcing rate limits and retrying transient
    /// failures, and returns the decoded response body.
    pub async fn request(&self, request: Request) -> Result<ResponseValue> {
        let span = info_span!(
            "request",
            id = API_CALL_COUNT.fetch_add(1, Ordering::Relaxed),
            route = %request.route,
        );
        self.request_0(request).instrument(span).await
    }

    async fn request_0(&self, request: Request) -> Result<ResponseValue> {
        let call_name = request.route.path;

        let mut headers = request.headers.clone();
        if !headers.contains_key(USER_AGENT) {
            headers.insert(USER_AGENT, self.user_agent.clone());
        }
        if !headers.contains_key(AUTHORIZATION) {
            let auth = request.auth.clone().or_else(|| self.default_auth.clone());
            if let Some(auth) = auth {
                headers.insert(AUTHORIZATION, auth);
            }
        }
        if let Some(reason) = &request.reason {
            let reason = routing::quote_audit_log_reason(reason);
            headers.insert(
                HeaderName::from_static("x-audit-log-reason"),
                HeaderValue::from_str(&reason)
                    .invalid_input("Audit log reason contains invalid characters.")?,
            );
        }

        let auth = headers.get(AUTHORIZATION).cloned();
        let global_limit = self.rate_limits.global_for(auth.as_ref());
        let route_key = request.route.bucket();
        let method = request.route.method;
        let mut url_limit = self.rate_limits.route_for(method, &route_key, auth.as_ref());
        let url = format!("{}{}", self.base_url(), request.route.url_path);

        let max_retries = self.config.max_retries.max(1);
        let mut retry_count = 0;
        let mut last_response: Option<ResponseInfo> = None;

        // The loop restarts without consuming an attempt when the stored rate limit
        // for the route was swapped out under us, or when our limit was deprecated in
        // favor of its bucket's canonical one.
        loop {
            if global_limit.acquire().await.is_err() {
                bail!("Global rate limit unexpectedly rejected acquisition.");
            }
            match url_limit.acquire().await {
                Ok(()) => { }
                Err(AcquireError::Migrating(bucket)) => {
                    debug!("Route {} migrating to bucket {}, retrying.", route_key, bucket);
                    url_limit = self.rate_limits.bucket_limit(&bucket)
                        .internal_err("Rate limit migrated to an unknown bucket.")?;
                    continue;
                }
                Err(AcquireError::Denied) => bail!(RouteDenied, call_name),
            }

            // A gathered request may have rebound the stored limit since we looked it
            // up. Adopt the new one before sending anything.
            if let Some(current) = self.rate_limits.get_route(method, &route_key, auth.as_ref()) {
                if !Arc::ptr_eq(&current, &url_limit) {
                    debug!("Route {} had its rate limit changed, retrying.", route_key);
                    url_limit = current;
                    continue;
                }
            }

            let client = self.session()?;
            let mut builder = client.request(method.to_reqwest(), url.as_str())
                .headers(headers.clone());
            if !request.files.is_empty() {
                // The form is rebuilt from scratch on every attempt so retried uploads
                // start from the beginning of each file.
                let mut form = Form::new();
                if request.files.len() == 1 {
                    form = form.part("file", request.files[0].to_part()?);
                } else {
                    for (i, file) in request.files.iter().enumerate() {
                        form = form.part(format!("file{}", i), file.to_part()?);
                    }
                }
                if let Some(json) = &request.json {
                    form = form.text("payload_json", serde_json::to_string(json).unexpected()?);
                }
                builder = builder.multipart(form);
            } else if let Some(json) = &request.json {
                builder = builder.json(json);
            }
            if let Some(query) = &request.query {
                builder = builder.query(query);
            }

            trace!("Sending request...");
            let response = match builder.send().await {
                Ok(response) => response,
                Err(error) => {
                    if is_connection_reset(&error) && retry_count + 1 < max_retries {
                        debug!("Connection reset on {}, retrying.", route_key);
                        tokio::time::sleep(backoff(retry_count)).await;
                        retry_count += 1;
                        continue;
                    }
                    return Err(Error::new_with_cause(
                        ErrorKind::IoError("Failed to make API request."), error.into(),
                    ));
                }
            };

            let status = response.status();
            let response_headers = response.headers().clone();
            debug!("{} {} has returned {}.", method, url, status);
            let text = response.text().await.io_err("Failed to receive API response.")?;
            let value = json_or_text(response_headers.get(CONTENT_TYPE), text)?;

            global_limit.update_global(status, &response_headers, value.as_json())?;
            match url_limit.update(status, &response_headers) {
                Ok(()) => { }
                Err(UpdateError::Failed(error)) => return Err(error),
                Err(UpdateError::IncorrectBucket(header_bucket)) => {
                    // Another gathered request may have already bound this route's
                    // bucket. If the bucket is known, rebind to its canonical limit;
                    // otherwise mint a fresh one.
                    let existing = header_bucket.as_deref()
                        .and_then(|bucket| self.rate_limits.bucket_limit(bucket));
                    url_limit = match existing {
                        Some(limit) => {
                            debug!("Route {} was given a different bucket, found it.", route_key);
                            self.rate_limits.set_route(
                                method, &route_key, auth.as_ref(), limit.clone(),
                            );
                            limit
                        }
                        None => {
                            debug!(
                                "Route {} was given a different bucket, making a new one.",
                                route_key,
                            );
                            self.rate_limits.make_route(method, &route_key, auth.as_ref())
                        }
                    };
                    replay_update(&url_limit, status, &response_headers)?;
                }
            }

            // Bucket reconciliation: if the bucket this limit resolved to already has a
            // canonical owner, rebind the route there and deprecate our limit; if not,
            // our limit becomes the canonical owner.
            if let Some(bucket) = url_limit.bucket() {
                match self.rate_limits.bucket_limit(&bucket) {
                    Some(canonical) if !Arc::ptr_eq(&canonical, &url_limit) => {
                        debug!(
                            "Route {} with bucket {} already exists, migrating requests there.",
                            route_key, bucket,
                        );
                        self.rate_limits.set_route(
                            method, &route_key, auth.as_ref(), canonical.clone(),
                        );
                        url_limit.migrate_to(&bucket);
                        replay_update(&canonical, status, &response_headers)?;
                        url_limit = canonical;
                    }
                    Some(_) => { }
                    None => self.rate_limits.register_bucket(bucket, url_limit.clone()),
                }
            }

            if status.as_u16() < 400 {
                return Ok(value);
            }
            let info = ResponseInfo {
                name: call_name,
                status,
                error: value.discord_error(),
            };
            match status.as_u16() {
                500 | 502 | 504 => {
                    info!("Route {} encountered a Discord server issue, retrying.", route_key);
                    last_response = Some(info);
                    tokio::time::sleep(backoff(retry_count)).await;
                }
                401 => {
                    warn!("Route {} resulted in error 401, rejected authorization?", route_key);
                    bail!(Unauthorized, info);
                }
                403 => {
                    warn!("Route {} resulted in error 403, check your permissions?", route_key);
                    bail!(Forbidden, info);
                }
                404 => {
                    warn!("Route {} resulted in error 404, check your path?", route_key);
                    bail!(NotFound, info);
                }
                429 => {
                    warn!("Route {} resulted in error 429, rate limit exceeded. Retrying.", route_key);
                    self.dispatch_rate_limited(&url_limit, &response_headers);
                    last_response = Some(info);
                }
                status if status >= 500 => bail!(ServerError, info),
                _ => bail!(RequestFailed, info),
            }

            retry_count += 1;
            if retry_count >= max_retries {
                error!(
                    "Hit retry {}/{} on {} {}, either something is wrong with Discord or with us.",
                    retry_count, max_retries, method, route_key,
                );
                let info = last_response
                    .internal_err("Request retries exhausted without a response.")?;
                if info.status.is_server_error() {
                    bail!(ServerError, info);
                } else {
                    bail!(RequestFailed, info);
                }
            }
        }
    }

    /// Retrieves an asset from Discord's CDN.
    pub async fn get_from_cdn(&self, url: &str) -> Result<Vec<u8>> {
        let client = self.session()?;
        let response = client.get(url)
            .header(USER_AGENT, self.user_agent.clone())
            .send().await
            .io_err("Failed to retrieve CDN asset.")?;
        let status = response.status();
        let info = ResponseInfo {
            name: "get_from_cdn",
            status,
            error: DiscordError::default(),
        };
        match status.as_u16() {
            200 => {
                let bytes = response.bytes().await.io_err("Failed to receive CDN asset.")?;
                Ok(bytes.to_vec())
            }
            404 => bail!(NotFound, info),
            403 => bail!(Forbidden, info),
            _ => bail!(RequestFailed, info),
        }
    }

    /// Adds the query parameters Discord expects to a gateway URL.
    pub fn format_gateway_url(&self, url: &str, encoding: &str, zlib: bool) -> Result<String> {
        let mut url = Url::parse(url).bad_response("Gateway URL is invalid.")?;
        let pairs: Vec<(String, String)> = url.query_pairs()
            .filter(|(name, _)| name != "v" && name != "encoding" && name != "compress")
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();
        {
            let mut query = url.query_pairs_mut();
            query.clear();
            for (name, value) in &pairs {
                query.append_pair(name, value);
            }
            query.append_pair("v", &self.api_version().to_string());
            query.append_pair("encoding", encoding);
            if zlib {
                query.append_pair("compress", "zlib-stream");
            }
        }
        Ok(url.into())
    }

    fn dispatch_rate_limited(&self, limit: &Arc<limits::RateLimit>, headers: &HeaderMap) {
        if let Some(callback) = &self.config.on_rate_limited {
            let (limit, remaining, reset_after, bucket) = limit.snapshot();
            let scope = headers.get("x-ratelimit-scope")
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);
            let event = RateLimitEvent { limit, remaining, reset_after, bucket, scope };
            let callback = callback.clone();
            tokio::spawn(async move { callback(event) });
        }
    }
}

fn check_api_version(version: u8) -> Result<()> {
    ensure!(
        AVAILABLE_API_VERSIONS.contains(&version),
        InvalidInput, "Only API versions 9 and 10 are available.",
    );
    if version != DEFAULT_API_VERSION {
        warn!("Changing the API version is not supported and may result in unexpected behaviour.");
    }
    Ok(())
}

/// Replays an update on the rate limit a route was rebound to. The new limit is either
/// fresh or canonical for this response's bucket, so a second bucket mismatch means the
/// indexes are corrupt.
fn replay_update(
    limit: &Arc<limits::RateLimit>, status: StatusCode, headers: &HeaderMap,
) -> Result<()> {
    match limit.update(status, headers) {
        Ok(()) => Ok(()),
        Err(UpdateError::Failed(error)) => Err(error),
        Err(UpdateError::IncorrectBucket(_)) =>
            Err(Error::new_with_backtrace(ErrorKind::InternalError(
                "Rebound rate limit rejected the update for its own bucket.",
            ))),
    }
}

fn backoff(retry_count: u32) -> Duration {
    Duration::from_secs((1 + retry_count * 2) as u64)
}

fn is_connection_reset(error: &reqwest::Error) -> bool {
    let mut source = error.source();
    while let Some(inner) = source {
        if let Some(io) = inner.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::ConnectionReset {
                return true;
            }
        }
        source = inner.source();
    }
    false
}

fn json_or_text(content_type: Option<&HeaderValue>, text: String) -> Result<ResponseValue> {
    let is_json = content_type
        .and_then(|value| value.to_str().ok())
        .map_or(false, |value| value.starts_with("application/json"));
    if is_json {
        let value = serde_json::from_str(&text)
            .bad_response("Could not parse API response.")?;
        Ok(ResponseValue::Json(value))
    } else {
        Ok(ResponseValue::Text(text))
    }
}

/// Makes raw API calls to Discord, handling rate limiting.
///
/// Instances can be obtained by calling [`DiscordContext::raw`](`crate::DiscordContext::raw`)
/// or [`HttpHandler::routes`].
#[derive(Clone, Debug)]
pub struct Routes<'a> {
    handler: &'a HttpHandler,
    auth: Option<HeaderValue>,
    reason: Option<String>,
}
impl <'a> Routes<'a> {
    /// Makes the API call using a Bearer token instead of the bot's own credential.
    ///
    /// Rate limits are tracked separately for every credential.
    pub fn bearer_token(mut self, token: DiscordBearerToken) -> Self {
        self.auth = Some(token.to_header_value());
        self
    }

    /// Sets the reason for the API call. This is recorded in the audit log for many calls.
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    fn request(&self, route: Route) -> Request {
        let mut request = Request::new(route);
        if let Some(auth) = &self.auth {
            request = request.auth(auth.clone());
        }
        if let Some(reason) = &self.reason {
            request = request.reason(reason.clone());
        }
        request
    }

    /// Returns the gateway URL, formatted for the given encoding.
    pub async fn get_gateway(self, encoding: &str, zlib: bool) -> Result<String> {
        let route = Route::new(Method::Get, "/gateway");
        let data = self.handler.request(self.request(route)).await
            .map_err(gateway_error)?
            .json::<GetGateway>()?;
        self.handler.format_gateway_url(&data.url, encoding, zlib)
    }

    /// Returns the gateway URL and some additional metadata specific to the bot.
    pub async fn get_gateway_bot(self, encoding: &str, zlib: bool) -> Result<GetGatewayBot> {
        let route = Route::new(Method::Get, "/gateway/bot");
        let mut data = self.handler.request(self.request(route)).await
            .map_err(gateway_error)?
            .json::<GetGatewayBot>()?;
        data.url = self.handler.format_gateway_url(&data.url, encoding, zlib)?;
        Ok(data)
    }

    /// Gets a channel by ID.
    pub async fn get_channel(self, ch: ChannelId) -> Result<Channel> {
        let route = Route::new(Method::Get, "/channels/{channel_id}")
            .id_param("channel_id", ch);
        self.handler.request(self.request(route)).await?.json()
    }

    /// Deletes a channel or closes a private message.
    pub async fn delete_channel(self, ch: ChannelId) -> Result<Channel> {
        let route = Route::new(Method::Delete, "/channels/{channel_id}")
            .id_param("channel_id", ch);
        self.handler.request(self.request(route)).await?.json()
    }

    /// Gets messages from a channel.
    pub async fn get_channel_messages(
        self, ch: ChannelId, params: GetChannelMessagesParams,
    ) -> Result<Vec<Message>> {
        let route = Route::new(Method::Get, "/channels/{channel_id}/messages")
            .id_param("channel_id", ch);
        self.handler.request(self.request(route).query(&params)?).await?.json()
    }

    /// Gets a message from a channel.
    pub async fn get_channel_message(self, ch: ChannelId, msg: MessageId) -> Result<Message> {
        let route = Route::new(Method::Get, "/channels/{channel_id}/messages/{message_id}")
            .id_param("channel_id", ch)
            .id_param("message_id", msg);
        self.handler.request(self.request(route)).await?.json()
    }

    /// Posts a message to a channel.
    pub async fn create_message(
        self, ch: ChannelId, params: CreateMessageParams, files: Vec<UploadFile>,
    ) -> Result<Message> {
        let route = Route::new(Method::Post, "/channels/{channel_id}/messages")
            .id_param("channel_id", ch);
        self.handler.request(self.request(route).json(&params)?.files(files)).await?.json()
    }

    /// Edits a message.
    pub async fn edit_message(
        self, ch: ChannelId, msg: MessageId, params: EditMessageParams,
    ) -> Result<Message> {
        let route = Route::new(Method::Patch, "/channels/{channel_id}/messages/{message_id}")
            .id_param("channel_id", ch)
            .id_param("message_id", msg);
        self.handler.request(self.request(route).json(&params)?).await?.json()
    }

    /// Deletes a message.
    pub async fn delete_message(self, ch: ChannelId, msg: MessageId) -> Result<()> {
        let route = Route::new(Method::Delete, "/channels/{channel_id}/messages/{message_id}")
            .id_param("channel_id", ch)
            .id_param("message_id", msg);
        self.handler.request(self.request(route)).await?;
        Ok(())
    }

    /// Triggers the typing indicator.
    pub async fn trigger_typing_indicator(self, ch: ChannelId) -> Result<()> {
        let route = Route::new(Method::Post, "/channels/{channel_id}/typing")
            .id_param("channel_id", ch);
        self.handler.request(self.request(route)).await?;
        Ok(())
    }

    /// Gets information relating to a user.
    pub async fn get_user(self, user: UserId) -> Result<User> {
        let route = Route::new(Method::Get, "/users/{user_id}")
            .id_param("user_id", user);
        self.handler.request(self.request(route)).await?.json()
    }

    /// Gets information about the current user.
    pub async fn get_current_user(self) -> Result<User> {
        let route = Route::new(Method::Get, "/users/@me");
        self.handler.request(self.request(route)).await?.json()
    }

    /// Leaves a guild.
    pub async fn leave_guild(self, guild: GuildId) -> Result<()> {
        let route = Route::new(Method::Delete, "/users/@me/guilds/{guild_id}")
            .id_param("guild_id", guild);
        self.handler.request(self.request(route)).await?;
        Ok(())
    }
}

/// Converts HTTP failures of the gateway discovery routes into `GatewayNotFound`.
fn gateway_error(error: Error) -> Error {
    if error.response_info().is_some() {
        Error::new_with_cause(ErrorKind::GatewayNotFound, error.into())
    } else {
        error
    }
}
