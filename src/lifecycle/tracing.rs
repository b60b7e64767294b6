//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the `tracing-subscriber` formatter used by the
//! binary. Library code only emits events; it never installs a subscriber.
//!
//! ## Configuration
//!
//! Verbosity comes from `RUST_LOG`:
//!
//! ```bash
//! # Boot trace: module starts, signal receipt, teardown
//! RUST_LOG=info cargo run
//!
//! # Barrier and trigger transitions too
//! RUST_LOG=debug cargo run
//! ```
//!
//! ## What Gets Traced
//!
//! - **Start sequencing**: one `[service] starting` event per module, in registry order
//! - **Shutdown source**: `[service] got signal` or `[service] app stop`
//! - **Teardown**: one `[service] stopping` event per started module, in reverse order
//! - **Failures**: panicking start or stop hooks, at `warn`
//!
//! With `RUST_LOG=info` a full cycle reads:
//!
//! ```text
//! INFO [service] starting module=db
//! INFO [service] starting module=api
//! INFO Service started env=production modules=2
//! INFO [service] got signal signal=SIGINT
//! INFO [service] stopping module=api
//! INFO [service] stopping module=db
//! INFO Service stopped
//! ```

/// Initializes the global subscriber with `RUST_LOG` filtering and the
/// compact format.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // every event already carries the [service] tag
        .compact()
        .init();
}
