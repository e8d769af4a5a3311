//! Opt-in tracing setup for applications embedding `gridplot`.
//!
//! Hosts that already install a subscriber can ignore this module; every
//! event the crate emits uses the `gridplot` target, so plain `RUST_LOG`
//! directives such as `gridplot::api=trace` work with any subscriber.

/// Filter used when `RUST_LOG` is unset: crate events at `info`, with view
/// synchronization and renormalization at `debug`.
pub const DEFAULT_FILTER: &str = "gridplot=info,gridplot::core::transform=debug";

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// [`DEFAULT_FILTER`].
///
/// Returns `false` when the `telemetry` feature is off or a global subscriber
/// is already set.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER));
        return install(filter);
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}

/// Installs the same subscriber with an explicit filter directive, ignoring
/// `RUST_LOG`. Invalid directives install nothing and return `false`.
#[must_use]
pub fn init_tracing_with_filter(directives: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        return match tracing_subscriber::EnvFilter::try_new(directives) {
            Ok(filter) => install(filter),
            Err(_) => false,
        };
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = directives;
        false
    }
}

// Periodic callbacks run on named worker threads, so thread names are kept.
#[cfg(feature = "telemetry")]
fn install(filter: tracing_subscriber::EnvFilter) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .compact()
        .try_init()
        .is_ok()
}
