//! Error values reported at the crate's boundaries: configuration
//! validation and message decoding. Per-cycle control failures
//! (transmission loss, physical hazard) are never reported through
//! this type -- they are state transitions, handled entirely inside
//! `boilerd::Controller`.

use core::fmt;

/// Enumerates the errors this crate can report. Kept small and
/// generic on purpose: a new variant should only be added if it's
/// useful outside of one specific caller.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Error {
    /// A configuration record failed the invariants in `Config::validate`.
    ConfigError(&'static str),

    /// A pump or controller index fell outside `0..MAX_PUMPS`.
    InvalidPumpIndex(usize),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigError(msg) => write!(f, "config error: {msg}"),
            Error::InvalidPumpIndex(i) => write!(f, "invalid pump index {i}"),
        }
    }
}
