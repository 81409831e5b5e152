//! # docqa-telemetry
//!
//! Logging for the docqa service.
//!
//! [`init_telemetry`] installs a human-readable `tracing` subscriber,
//! [`init_json_telemetry`] a JSON one. Both read `RUST_LOG` and default to
//! `info`. Installation is attempted once per process; later calls are no-ops.
//!
//! [`capture`] holds an in-memory layer used by tests to assert on events.

pub mod capture;

pub use capture::{CapturedEvent, LogCaptureLayer, SharedLogStorage, capturing_subscriber};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a plain-text subscriber for `service_name`.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_telemetry(service_name: &str) -> bool {
    let installed =
        tracing_subscriber::registry().with(env_filter()).with(fmt::layer()).try_init().is_ok();
    if installed {
        tracing::info!(service.name = service_name, "telemetry initialized");
    }
    installed
}

/// Install a JSON subscriber for `service_name`, one object per line.
pub fn init_json_telemetry(service_name: &str) -> bool {
    let installed = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().json().with_current_span(true))
        .try_init()
        .is_ok();
    if installed {
        tracing::info!(service.name = service_name, "telemetry initialized");
    }
    installed
}
