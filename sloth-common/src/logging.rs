//! `tracing` bootstrap shared by every Sloth binary.
//!
//! Only binaries call [`init`] — library crates (`sloth-core`,
//! `sloth-plugins`) only emit `tracing` events and never install a
//! subscriber themselves, same layering as `rchd`/`rch-wkr`/`rch-telemetry`.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs a `tracing_subscriber` registry using `level` as the default
/// filter, overridable via the standard `RUST_LOG` environment variable.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
