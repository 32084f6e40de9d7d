//! Types used to interact with the Discord API.
//!
//! This is reexposed in `cordelia`, and that should be preferred over this crate.

#[macro_use] mod serde;

pub mod channel;
pub mod gateway;
pub mod message;
pub mod types;
pub mod user;
