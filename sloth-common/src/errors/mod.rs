//! Error catalog and definitions for the Sloth rules generator.
//!
//! Catalogs the generator's six error kinds with a stable numeric code, a
//! human message, and remediation steps, so the CLI can print actionable
//! diagnostics without the core crates needing to log anything themselves.
//!
//! # Error Code Ranges
//!
//! | Range      | Category    | Description                          |
//! |------------|-------------|---------------------------------------|
//! | E001-E099  | Parse       | Spec loader / YAML schema errors     |
//! | E100-E199  | Validation  | Normalized-model invariant violations |
//! | E200-E299  | Compile     | SLI compilation failures              |
//! | E300-E399  | Generation  | Rules generator failures              |
//! | E400-E499  | Encoding    | Output encoder failures               |
//! | E500-E599  | Plugin      | Plugin discovery/invocation failures   |

pub mod catalog;

pub use catalog::{ErrorCategory, ErrorCode, ErrorEntry};
