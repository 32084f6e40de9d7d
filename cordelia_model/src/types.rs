//! Basic types common to all API calls.

use crate::serde::*;
use cordelia_errors::*;
use fxhash::FxHasher;
use http::header::HeaderValue;
use lazy_static::*;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Checks that a token has the shape Discord issues bot tokens in: three non-empty
/// sections of base64url data separated by periods. The format is Discord's, not
/// ours; this only catches obviously mangled tokens before they hit the API.
fn check_bot_token_format(raw: &str) -> Result<()> {
    let mut sections = 0;
    for section in raw.split('.') {
        ensure!(!section.is_empty(), InvalidInput, "Discord tokens cannot have empty sections.");
        for byte in section.bytes() {
            match byte {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'-' => { }
                _ => bail!(InvalidInput, "Discord tokens contain only base64url characters."),
            }
        }
        sections += 1;
    }
    ensure!(sections == 3, InvalidInput, "Discord tokens have three '.'-separated sections.");
    Ok(())
}

/// Builds the header value for a token whose constructor already checked that it only
/// contains header-safe characters.
fn sensitive_header_value(token: &str) -> HeaderValue {
    let mut value = HeaderValue::from_str(token)
        .expect("token was validated as header-safe");
    value.set_sensitive(true);
    value
}

/// A type containing a bot token.
///
/// The token is stored in the form the `Authorization` header expects, so the `Bot `
/// prefix may be included or left off when constructing one.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Hash)]
#[serde(transparent)]
#[repr(transparent)]
pub struct DiscordToken(Arc<str>);
impl DiscordToken {
    /// Creates a bot token, checking it for validity.
    pub fn new(token: impl ToString) -> Result<DiscordToken> {
        let token = token.to_string();
        let raw = token.strip_prefix("Bot ").unwrap_or(&token);
        check_bot_token_format(raw)?;
        Ok(DiscordToken(format!("Bot {}", raw).into()))
    }

    /// Returns the value this token uses in the `Authorization` header.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the token to a header value. The value is marked sensitive so logging
    /// layers do not print it.
    pub fn to_header_value(&self) -> HeaderValue {
        sensitive_header_value(&self.0)
    }
}
impl fmt::Debug for DiscordToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DiscordToken(<redacted>)")
    }
}

/// A type containing an OAuth bearer token.
///
/// Bearer tokens are opaque to clients, so unlike [`DiscordToken`] no particular
/// shape is enforced beyond what can be sent in a header.
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Hash)]
#[serde(transparent)]
#[repr(transparent)]
pub struct DiscordBearerToken(Arc<str>);
impl DiscordBearerToken {
    /// Creates a bearer token. The `Bearer ` prefix may be included or left off.
    pub fn new(token: impl ToString) -> Result<DiscordBearerToken> {
        let token = token.to_string();
        let raw = token.strip_prefix("Bearer ").unwrap_or(&token);
        ensure!(!raw.is_empty(), InvalidInput, "Bearer tokens cannot be empty.");
        for byte in raw.bytes() {
            ensure!(
                byte.is_ascii_graphic(),
                InvalidInput, "Bearer tokens contain only printable ASCII.",
            );
        }
        Ok(DiscordBearerToken(format!("Bearer {}", raw).into()))
    }

    /// Returns the value this token uses in the `Authorization` header.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the token to a header value. The value is marked sensitive so logging
    /// layers do not print it.
    pub fn to_header_value(&self) -> HeaderValue {
        sensitive_header_value(&self.0)
    }
}
impl fmt::Debug for DiscordBearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DiscordBearerToken(<redacted>)")
    }
}

/// An untyped Discord snowflake used for IDs and some related things.
#[derive(Default, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Snowflake(pub u64);
impl Serialize for Snowflake {
    fn serialize<S>(&self, serializer: S) -> StdResult<S::Ok, S::Error> where S: Serializer {
        serializer.collect_str(&self.0)
    }
}
impl <'de> Deserialize<'de> for Snowflake {
    fn deserialize<D>(deserializer: D) -> StdResult<Self, D::Error> where D: Deserializer<'de> {
        deserializer.deserialize_any(SnowflakeVisitor)
    }
}
struct SnowflakeVisitor;
impl <'de> Visitor<'de> for SnowflakeVisitor {
    type Value = Snowflake;
    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("snowflake")
    }
    fn visit_str<E>(self, v: &str) -> StdResult<Snowflake, E> where E: DeError {
        v.parse::<u64>().map(Snowflake).map_err(|_| E::custom("could not parse snowflake"))
    }
    snowflake_visitor_common!(Snowflake);
}

impl fmt::Debug for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
impl From<u64> for Snowflake {
    fn from(i: u64) -> Self {
        Snowflake(i)
    }
}
impl From<Snowflake> for u64 {
    fn from(i: Snowflake) -> Self {
        i.0
    }
}
impl Snowflake {
    /// Create a snowflake from its various parts.
    ///
    /// # Panics
    ///
    /// If any component is out of range, this function will panic.
    pub fn from_parts(timestamp: u64, worker: u8, process: u8, increment: u16) -> Snowflake {
        if timestamp >= (1 << 42) {
            panic!("timestamp is larger than 2^42");
        }
        if worker >= (1 << 5) {
            panic!("worker is larger than 2^5");
        }
        if process >= (1 << 5) {
            panic!("process is larger than 2^5");
        }
        if increment >= (1 << 12) {
            panic!("increment is larger than 2^12");
        }
        Snowflake(
            (timestamp << 22) | ((worker as u64) << 17) | ((process as u64) << 12) |
                increment as u64
        )
    }

    /// Creates a random snowflake.
    pub fn random() -> Snowflake {
        lazy_static! {
            static ref PROCESS_ID: u32 = std::process::id();
        }
        static COUNTER: AtomicUsize = AtomicUsize::new(0);

        let id = std::thread::current().id();
        let mut hasher = FxHasher::default();
        PROCESS_ID.hash(&mut hasher);
        id.hash(&mut hasher);
        let thread_hash = hasher.finish();
        let hash_a = thread_hash as u8 & 0x1F;
        let hash_b = (thread_hash >> 5) as u8 & 0x1F;

        let time = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(duration) => duration.as_millis() as u64 & 0x3FFFFFFFFFF,
            Err(_) => 0,
        };
        let ctr = COUNTER.fetch_add(1, Ordering::Relaxed);

        Self::from_parts(time, hash_a, hash_b, ctr as u16 & 0xFFF)
    }

    /// Retrieves the raw timestamp component of this snowflake.
    pub fn timestamp_raw(self) -> u64 {
        self.0 >> 22
    }

    /// Retrieves the timestamp of this snowflake.
    pub fn timestamp(self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.timestamp_raw() + 1420070400000)
    }
}

macro_rules! id_structs {
    ($($(#[$meta:meta])* $name:ident;)*) => {$(
        $(#[$meta])*
        #[derive(Serialize, Deserialize, Default, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
        #[serde(transparent)]
        #[repr(transparent)]
        pub struct $name(pub Snowflake);

        impl From<Snowflake> for $name {
            fn from(s: Snowflake) -> $name {
                $name(s)
            }
        }
        impl From<$name> for Snowflake {
            fn from(id: $name) -> Snowflake {
                id.0
            }
        }
        impl From<u64> for $name {
            fn from(s: u64) -> $name {
                $name(s.into())
            }
        }
        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0.into()
            }
        }
        impl PartialEq<Snowflake> for $name {
            fn eq(&self, other: &Snowflake) -> bool {
                self.0 == *other
            }
        }
        impl PartialEq<$name> for Snowflake {
            fn eq(&self, other: &$name) -> bool {
                *self == other.0
            }
        }
        impl fmt::Debug for $name {
            fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, fmt)
            }
        }
        impl fmt::Display for $name {
            fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(fmt, "#{}", self.0)
            }
        }
    )*};
}

id_structs! {
    /// Identifies an application.
    ApplicationId;
    /// Identifies a channel.
    ChannelId;
    /// Identifies a guild.
    GuildId;
    /// Identifies a message.
    MessageId;
    /// Identifies a user.
    UserId;
    /// Identifies a webhook.
    WebhookId;
}
