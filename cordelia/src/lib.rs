#![deny(unused_must_use)]

//! An asynchronous client library for the Discord API.
//!
//! The core of the library is the HTTP request pipeline in the [`http`] module, which
//! enforces Discord's global and per-route rate limits, discovers rate limit buckets
//! from response headers, and retries transient failures. [`DiscordContext`] ties a
//! bot's credentials and configuration to a pipeline instance.

#[macro_use] extern crate cordelia_errors;
#[macro_use] extern crate derivative;
#[macro_use] extern crate tracing;

pub mod http;

mod context;
mod errors;
mod serde;

#[doc(inline)] pub use context::*;
#[doc(inline)] pub use cordelia_errors::{
    DiscordError, DiscordErrorCode, Error, ErrorKind, HttpStatusCode, ResponseInfo, Result,
};

/// Types used to interact with the Discord API.
pub use cordelia_model as model;

/// A set of reexports for more conveniently using the library.
pub mod prelude {
    #[doc(no_inline)] pub use crate::context::DiscordContext;
    pub use crate::model::types::DiscordToken;
}
