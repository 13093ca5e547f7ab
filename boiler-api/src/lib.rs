//! Types shared between the boiler controller core (`boilerd`) and
//! anything that drives it: the message codec, the configuration
//! record, the mode enumeration, and the error type.
//!
//! This crate carries no control logic of its own -- it only defines
//! the vocabulary the controller and its external collaborators (the
//! plant simulator, the transport, the configuration loader) agree on.

pub mod config;
pub mod error;
pub mod message;
pub mod mode;

pub use config::Config;
pub use error::Error;
pub use message::{Mailbox, Message, OutboundSink, MAX_OUTBOUND};
pub use mode::Mode;

/// Upper bound on the number of pumps a boiler can have. Fixed so that
/// every per-pump array in the crate can be stack-allocated.
pub const MAX_PUMPS: usize = 6;

/// A `Result` type where the error value is `boiler_api::Error`.
pub type Result<T> = core::result::Result<T, Error>;
