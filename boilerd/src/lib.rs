//! The boiler controller core: a single `Controller` that consumes one
//! cycle's inbound [`boiler_api::Message`] batch and produces that
//! cycle's outbound batch, with no I/O and no allocation in its steady
//! state.

pub mod controller;
pub mod diagnosis;
pub mod extract;
pub mod prediction;
pub mod repair;
pub mod scenario;

pub use controller::Controller;
pub use diagnosis::FailureType;
pub use repair::FailState;
