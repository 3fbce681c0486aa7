//! Tracing setup for hosts and tools that do not install their own subscriber.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static TRACING_INIT: Once = Once::new();

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "loottables=info";

/// Install a compact fmt subscriber. Idempotent; the first call wins and
/// `RUST_LOG` takes precedence over `filter`.
pub fn init_tracing(filter: &str) {
    let filter = filter.to_owned();
    TRACING_INIT.call_once(move || {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .compact();

        // a host may already have a global subscriber
        let _ = subscriber.try_init();
    });
}

pub fn init_tracing_default() {
    init_tracing(DEFAULT_FILTER);
}
