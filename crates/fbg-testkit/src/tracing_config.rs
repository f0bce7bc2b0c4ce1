//! Tracing configuration for test output.

use std::sync::Once;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

const DEFAULT_FILTER: &str = "info,fbg_core=debug,fbg_http=debug";

/// Initialize tracing for tests.
///
/// Safe to call from every test; only the first call installs a subscriber.
/// Honors `RUST_LOG`, falling back to debug output for the fbg crates.
///
/// ```rust
/// fbg_testkit::init_test_tracing();
/// ```
pub fn init_test_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .compact(),
            )
            .try_init()
            .ok();
    });
}

/// Initialize tracing with an explicit filter directive.
pub fn init_test_tracing_with_filter(filter: &str) {
    INIT.call_once(|| {
        tracing_subscriber::registry()
            .with(EnvFilter::new(filter))
            .with(tracing_subscriber::fmt::layer().with_test_writer().compact())
            .try_init()
            .ok();
    });
}

/// Initialize tracing with JSON lines, for inspecting structured fields.
pub fn init_test_tracing_json() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_test_writer().json())
            .try_init()
            .ok();
    });
}
