//! Error types for the value object layer.
//!
//! Mirrors the reference implementation's split between recoverable failures (parse/range/
//! syntax, surfaced to a client as an error reply) and fatal ones (programmer error: an
//! unreachable `(type, encoding)` pair, a decrement at zero, destruction of an unknown type),
//! which abort the process rather than return a `Result`.

use std::fmt;

use thiserror::Error;

/// Default reply text for a failed integer parse.
pub const DEFAULT_NOT_AN_INTEGER: &str = "value is not an integer or out of range";
/// Default reply text for a failed float parse.
pub const DEFAULT_NOT_A_FLOAT: &str = "value is not a valid float";
/// Default reply text for a value that parsed but didn't fit the target width.
pub const DEFAULT_OUT_OF_RANGE: &str = "value is out of range";

#[derive(Debug, Error)]
pub enum Error {
    /// Input bytes could not be parsed as the requested numeric type at all.
    #[error("{message}")]
    Parse { message: String },

    /// Input parsed but the value doesn't fit the target width.
    #[error("{message}")]
    Range { message: String },

    /// `OBJECT idletime` under frequency eviction, or `OBJECT freq` under recency eviction.
    #[error("An LFU maxmemory policy is not selected, access frequency not tracked. Please note that when switching between maxmemory policies at runtime LFU and LRU data will take some time to adjust.")]
    WrongEvictionModeFreq,
    #[error("An LFU maxmemory policy is selected, idle time not tracked. Please note that when switching between maxmemory policies at runtime LFU and LRU data will take some time to adjust.")]
    WrongEvictionModeIdle,

    /// Unknown `MEMORY USAGE` option, or a negative sample count.
    #[error("syntax error")]
    Syntax,

    /// Programmer error: violates an invariant this layer guarantees. The caller is expected
    /// to abort the process rather than attempt recovery.
    #[error("fatal: {0}")]
    Fatal(String),
}

impl Error {
    pub fn parse(message: impl Into<String>) -> Self {
        Error::Parse { message: message.into() }
    }

    pub fn range(message: impl Into<String>) -> Self {
        Error::Range { message: message.into() }
    }

    pub fn not_an_integer() -> Self {
        Error::parse(DEFAULT_NOT_AN_INTEGER)
    }

    pub fn not_a_float() -> Self {
        Error::parse(DEFAULT_NOT_A_FLOAT)
    }

    pub fn out_of_range() -> Self {
        Error::range(DEFAULT_OUT_OF_RANGE)
    }

    pub fn fatal(message: impl fmt::Display) -> Self {
        log::warn!("fatal condition: {}", message);
        Error::Fatal(message.to_string())
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Fatal(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse { .. })
    }

    pub fn is_range(&self) -> bool {
        matches!(self, Error::Range { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Aborts the process with a diagnostic, matching the reference's `serverPanic`/`serverAssert`
/// behaviour for unreachable `(type, encoding)` states. Never returns.
#[track_caller]
pub fn fatal(message: impl fmt::Display) -> ! {
    let err = Error::fatal(message);
    panic!("{err}");
}
