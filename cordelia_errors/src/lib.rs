#![deny(unused_must_use)]

//! Defines the error type used by Cordelia.

use backtrace::Backtrace;
use futures::FutureExt;
use std::any::Any;
use std::borrow::Cow;
use std::error::{Error as StdError};
use std::fmt;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use thiserror::*;

pub use std::result::{Result as StdResult};

mod status;
pub use status::{DiscordError, DiscordErrorCode};

#[doc(inline)]
pub use http::{StatusCode as HttpStatusCode};

#[derive(Debug)]
pub struct LibError(Box<dyn StdError + Send + 'static>);
impl <T: StdError + Send + 'static> From<T> for LibError {
    #[inline(never)] #[cold]
    fn from(t: T) -> Self {
        LibError(Box::new(t))
    }
}

/// The response that caused an API call to fail.
///
/// Carried by every error variant that originates from an HTTP response, so
/// callers can inspect the status code and whatever error envelope Discord
/// attached to it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResponseInfo {
    /// The name of the API call that failed.
    pub name: &'static str,
    /// The HTTP status code of the response.
    pub status: HttpStatusCode,
    /// The error information Discord returned, if any could be parsed.
    pub error: DiscordError,
}
impl fmt::Display for ResponseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed with {} ({})", self.name, self.status, self.error)
    }
}

/// Represents the kind of error that occurred.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Invalid input was provided to the library.
    ///
    /// This generally indicates a bug in an user of the library.
    #[error("Invalid API usage: {0}")]
    InvalidInput(&'static str),
    /// An IO error occurred.
    ///
    /// This generally occurs because Discord is experiencing issues.
    #[error("IO Error: {0}")]
    IoError(&'static str),
    /// An internal error has occurred.
    ///
    /// This generally indicates a bug in the library.
    #[error("Internal error: {0}")]
    InternalError(&'static str),
    /// Used to convey information about a panic to event receivers.
    ///
    /// This should not be returned from other methods in normal circumstances, and panics in
    /// most library code will directly propagate to the caller.
    #[error("{0}")]
    Panicked(Cow<'static, str>),

    /// Discord returned an unexpected or invalid response.
    ///
    /// This may happen if Discord is experiencing issues or the library hasn't been updated
    /// for a change in Discord's protocol.
    #[error("Discord returned bad response: {0}")]
    DiscordBadResponse(&'static str),
    /// The request was rejected with status 401.
    ///
    /// The authorization credential is likely invalid or expired.
    #[error("{0}")]
    Unauthorized(ResponseInfo),
    /// The request was rejected with status 403.
    #[error("{0}")]
    Forbidden(ResponseInfo),
    /// The request was rejected with status 404.
    #[error("{0}")]
    NotFound(ResponseInfo),
    /// Discord responded with a server error that could not be recovered by retrying.
    #[error("{0}")]
    ServerError(ResponseInfo),
    /// Discord returned an error status code not covered by a more specific variant, or the
    /// request exhausted its retry budget.
    #[error("{0}")]
    RequestFailed(ResponseInfo),
    /// A previous request to this path returned 404, and all further requests to it are
    /// rejected without touching the network.
    #[error("Request path denied: {0}")]
    RouteDenied(&'static str),
    /// The gateway endpoint could not be retrieved.
    #[error("Could not retrieve gateway URL from Discord.")]
    GatewayNotFound,
}

struct ErrorData {
    kind: ErrorKind,
    backtrace: Option<Backtrace>,
    cause: Option<LibError>,
}

/// An error type used throughout the library.
pub struct Error(Box<ErrorData>);
impl Error {
    #[inline(never)] #[cold]
    pub fn new(kind: ErrorKind) -> Self {
        Error(Box::new(ErrorData {
            kind, backtrace: None, cause: None,
        }))
    }

    #[inline(never)] #[cold]
    pub fn new_with_cause(kind: ErrorKind, cause: LibError) -> Self {
        let mut err = Error::new(kind);
        err.0.cause = Some(cause);
        err
    }

    #[inline(never)] #[cold]
    pub fn new_with_backtrace(kind: ErrorKind) -> Self {
        Error::new(kind).with_backtrace()
    }

    fn with_backtrace(mut self) -> Self {
        if self.backtrace().is_none() {
            self.0.backtrace = Some(Backtrace::new());
        }
        self
    }

    #[inline(never)] #[cold]
    fn wrap_panic(panic: Box<dyn Any + Send + 'static>) -> Error {
        let panic: Cow<'static, str> = if let Some(s) = panic.downcast_ref::<&'static str>() {
            (*s).into()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone().into()
        } else {
            "<non-string panic info>".into()
        };
        Error::new(ErrorKind::Panicked(panic))
    }

    /// Returns the type of error contained in this object.
    pub fn error_kind(&self) -> &ErrorKind {
        &self.0.kind
    }

    /// Returns the backtrace, if one was recorded.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.0.backtrace.as_ref()
    }

    /// Returns the response that caused this error, if one exists.
    pub fn response_info(&self) -> Option<&ResponseInfo> {
        match self.error_kind() {
            ErrorKind::Unauthorized(info) | ErrorKind::Forbidden(info) |
            ErrorKind::NotFound(info) | ErrorKind::ServerError(info) |
            ErrorKind::RequestFailed(info) => Some(info),
            _ => None,
        }
    }

    /// Returns `true` if this error was likely due to a bug in either user code or Cordelia.
    pub fn is_error(&self) -> bool {
        match self.error_kind() {
            ErrorKind::InternalError(_) | ErrorKind::InvalidInput(_) | ErrorKind::Panicked(_) =>
                true,
            _ => false,
        }
    }

    /// Returns `true` if this error was due to an IO or network problem.
    pub fn is_io(&self) -> bool {
        match self.error_kind() {
            ErrorKind::IoError(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this error originated from Discord.
    pub fn is_discord(&self) -> bool {
        match self.error_kind() {
            ErrorKind::DiscordBadResponse(_) | ErrorKind::Unauthorized(_) |
            ErrorKind::Forbidden(_) | ErrorKind::NotFound(_) | ErrorKind::ServerError(_) |
            ErrorKind::RequestFailed(_) | ErrorKind::GatewayNotFound => true,
            _ => false,
        }
    }
}
impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self.0.cause.as_ref() {
            Some(x) => Some(&*x.0),
            None => None,
        }
    }
}
impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Error")
            .field(&self.0.kind)
            .field(&self.0.cause)
            .finish()
    }
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.kind, f)?;
        Ok(())
    }
}

/// The result type used throughout the library.
pub type Result<T> = StdResult<T, Error>;

pub type LibResult<T> = StdResult<T, LibError>;

// Helpers for error handling
pub trait ErrorExt<T>: Sized {
    fn context(self, kind: ErrorKind) -> Result<T>;

    fn io_err(self, text: &'static str) -> Result<T> {
        self.context(ErrorKind::IoError(text))
    }
    fn bad_response(self, text: &'static str) -> Result<T> {
        self.context(ErrorKind::DiscordBadResponse(text))
    }
    fn internal_err(self, text: &'static str) -> Result<T> {
        self.context(ErrorKind::InternalError(text))
    }
    fn invalid_input(self, text: &'static str) -> Result<T> {
        self.context(ErrorKind::InvalidInput(text))
    }

    fn unexpected(self) -> Result<T> {
        self.internal_err("Unexpected error encountered.")
    }
}
impl <T> ErrorExt<T> for Option<T> {
    #[inline(always)]
    fn context(self, kind: ErrorKind) -> Result<T> {
        match self {
            Some(x) => Ok(x),
            None => Err(Error::new_with_backtrace(kind)),
        }
    }
}
impl <T, E: Into<LibError>> ErrorExt<T> for StdResult<T, E> {
    #[inline(always)]
    fn context(self, kind: ErrorKind) -> Result<T> {
        match self {
            Ok(x) => Ok(x),
            Err(e) => Err(Error::new_with_cause(kind, e.into())),
        }
    }
}

pub fn catch_panic<T>(func: impl FnOnce() -> Result<T>) -> Result<T> {
    match catch_unwind(AssertUnwindSafe(func)) {
        Ok(r) => r,
        Err(e) => Err(Error::wrap_panic(e)),
    }
}

pub async fn catch_panic_async<T>(fut: impl Future<Output = Result<T>>) -> Result<T> {
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(v) => v,
        Err(panic) => Err(Error::wrap_panic(panic)),
    }
}

#[macro_export]
macro_rules! error_kind {
    ($error:literal $(,)?) => {
        $crate::ErrorKind::InternalError($error)
    };
    ($variant:ident, $($body:expr),* $(,)?) => {
        $crate::ErrorKind::$variant($($body,)*)
    };
}

#[macro_export]
macro_rules! bail {
    ($($tt:tt)*) => {
        return Err($crate::Error::new_with_backtrace($crate::error_kind!($($tt)*)))
    }
}

#[macro_export]
macro_rules! ensure {
    ($check:expr, $($tt:tt)*) => {
        if !$check {
            $crate::bail!($($tt)*);
        }
    }
}
