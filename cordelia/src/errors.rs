//! The error type used throughout the library. Reexposed from `cordelia_errors`.

pub use cordelia_errors::*;
