//! Shared foundation for the Sloth SLO rules generator.
//!
//! This crate carries the pieces every other crate in the workspace needs
//! but that have nothing to do with SLO compilation itself: the error
//! catalog, small label/window newtypes, the `tracing` bootstrap helper, and
//! the CLI-facing configuration layer.

pub mod config;
pub mod errors;
pub mod logging;
pub mod types;

pub use errors::{ErrorCategory, ErrorCode, ErrorEntry};
pub use types::{Labels, SloId};
