//! SLI plugin registry and discovery for the Sloth rules generator.
//!
//! A producer has signature `(ctx, options, sloMeta) -> Sli`. Rather than
//! load producers from dynamically-compiled sources, this crate holds a
//! fixed catalogue of built-in producer *kinds* (`builtin`), discovered via
//! small manifest files (`manifest`) that a real operator drops into a
//! plugin directory, and held in a [`registry::Registry`] keyed by id.

pub mod builtin;
pub mod discovery;
pub mod errors;
pub mod manifest;
pub mod registry;

pub use errors::PluginError;
pub use registry::{Registry, SliProducer};
