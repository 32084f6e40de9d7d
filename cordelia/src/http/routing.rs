//! Identifies the endpoint an API call is made to, for rate limiting purposes.
//!
//! Discord rate limits requests by path template rather than by concrete URL, with a few
//! "major" path parameters (`channel_id`, `guild_id`, `webhook_id` and `webhook_token`)
//! also taken into account. Two calls that only differ in a minor parameter such as a
//! message ID therefore share their limits, while calls to the same template in two
//! different channels do not.

use crate::model::types::Snowflake;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::fmt;

/// Characters that survive `uri_quote` unescaped, mirroring the conventional URI rules
/// for path segments.
const PATH_SEGMENT_QUOTE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_').remove(b'.').remove(b'-').remove(b'~').remove(b'/');

/// The escape set used for the `X-Audit-Log-Reason` header. In addition to the path
/// characters, the space character is deliberately left unescaped; this matches what
/// Discord accepts in practice and what existing clients send.
const AUDIT_LOG_REASON_QUOTE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_').remove(b'.').remove(b'-').remove(b'~').remove(b'/').remove(b' ');

/// Percent-encodes a path parameter.
pub(crate) fn uri_quote(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT_QUOTE).to_string()
}

/// Percent-encodes an audit log reason for use in the `X-Audit-Log-Reason` header.
pub(crate) fn quote_audit_log_reason(value: &str) -> String {
    utf8_percent_encode(value, AUDIT_LOG_REASON_QUOTE).to_string()
}

/// The HTTP method used for an API call.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}
impl Method {
    /// Returns the name of this method.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}
impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logical endpoint of the Discord API.
///
/// A route is built from a method and a path template containing `{name}` placeholders,
/// which are substituted with [`Route::id_param`] and [`Route::str_param`]. The template
/// itself (rather than the substituted path) identifies the endpoint family for rate
/// limiting, and the major parameters contribute to [`Route::bucket`].
#[derive(Clone, Debug)]
pub struct Route {
    /// The HTTP method of this route.
    pub method: Method,
    /// The path template of this route, e.g. `/channels/{channel_id}/messages`.
    pub path: &'static str,
    /// The path with all parameters substituted, relative to the API base URL.
    pub url_path: String,
    /// The channel targeted by this route, if any.
    pub channel_id: Option<Snowflake>,
    /// The guild targeted by this route, if any.
    pub guild_id: Option<Snowflake>,
    /// The webhook targeted by this route, if any.
    pub webhook_id: Option<Snowflake>,
    /// The webhook token used by this route, if any.
    pub webhook_token: Option<String>,
}
impl Route {
    /// Creates a new route for the given method and path template.
    pub fn new(method: Method, path: &'static str) -> Route {
        Route {
            method, path,
            url_path: path.to_string(),
            channel_id: None,
            guild_id: None,
            webhook_id: None,
            webhook_token: None,
        }
    }

    fn substitute(&mut self, name: &str, value: &str) {
        let placeholder = format!("{{{}}}", name);
        self.url_path = self.url_path.replace(&placeholder, value);
    }

    /// Substitutes an ID parameter into the path template.
    ///
    /// `channel_id`, `guild_id` and `webhook_id` parameters are recorded as major
    /// parameters in addition to being substituted.
    pub fn id_param(mut self, name: &'static str, id: impl Into<Snowflake>) -> Route {
        let id = id.into();
        match name {
            "channel_id" => self.channel_id = Some(id),
            "guild_id" => self.guild_id = Some(id),
            "webhook_id" => self.webhook_id = Some(id),
            _ => { }
        }
        self.substitute(name, &id.to_string());
        self
    }

    /// Substitutes a string parameter into the path template, percent-encoding it.
    ///
    /// A `webhook_token` parameter is recorded as a major parameter in addition to
    /// being substituted.
    pub fn str_param(mut self, name: &'static str, value: &str) -> Route {
        if name == "webhook_token" {
            self.webhook_token = Some(value.to_string());
        }
        let quoted = uri_quote(value);
        self.substitute(name, &quoted);
        self
    }

    /// Returns the key this route's rate limits are stored under.
    ///
    /// Routes with the same method and bucket key share a rate limit until the server
    /// reveals their actual bucket names.
    pub fn bucket(&self) -> String {
        format!(
            "{}:{}:{}",
            DisplayOption(self.channel_id), DisplayOption(self.guild_id), self.path,
        )
    }
}
impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url_path)
    }
}

struct DisplayOption(Option<Snowflake>);
impl fmt::Display for DisplayOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => fmt::Display::fmt(&v, f),
            None => f.write_str("None"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_parameters() {
        let route = Route::new(Method::Get, "/channels/{channel_id}/messages/{message_id}")
            .id_param("channel_id", 111u64)
            .id_param("message_id", 222u64);
        assert_eq!(route.url_path, "/channels/111/messages/222");
        assert_eq!(route.channel_id, Some(111u64.into()));
        assert_eq!(route.guild_id, None);
    }

    #[test]
    fn encodes_string_parameters() {
        let route = Route::new(
            Method::Put,
            "/channels/{channel_id}/messages/{message_id}/reactions/{emoji}/@me",
        )
            .id_param("channel_id", 1u64)
            .id_param("message_id", 2u64)
            .str_param("emoji", "💖");
        assert_eq!(
            route.url_path,
            "/channels/1/messages/2/reactions/%F0%9F%92%96/@me",
        );
    }

    #[test]
    fn bucket_uses_major_parameters_only() {
        let a = Route::new(Method::Get, "/channels/{channel_id}/messages/{message_id}")
            .id_param("channel_id", 10u64)
            .id_param("message_id", 11u64);
        let b = Route::new(Method::Get, "/channels/{channel_id}/messages/{message_id}")
            .id_param("channel_id", 10u64)
            .id_param("message_id", 12u64);
        let c = Route::new(Method::Get, "/channels/{channel_id}/messages/{message_id}")
            .id_param("channel_id", 20u64)
            .id_param("message_id", 11u64);
        assert_eq!(a.bucket(), "10:None:/channels/{channel_id}/messages/{message_id}");
        assert_eq!(a.bucket(), b.bucket());
        assert_ne!(a.bucket(), c.bucket());
    }

    #[test]
    fn audit_log_reason_keeps_slashes_and_spaces() {
        assert_eq!(quote_audit_log_reason("spam in /general, again"),
                   "spam in /general%2C again");
    }
}
