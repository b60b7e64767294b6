//! # Diagnostic Sink
//!
//! Orchestration milestones (module start, signal receipt, explicit stop,
//! teardown) are reported to a [`DiagnosticSink`]. The sink is fire-and-forget:
//! nothing it does can influence the lifecycle.
//!
//! The default [`TracingSink`] forwards every event to `tracing` with
//! structured fields, so `RUST_LOG=info` is enough to see the boot trace:
//!
//! ```text
//! INFO [service] starting module=db
//! INFO [service] starting module=api
//! INFO [service] got signal signal=SIGTERM
//! INFO [service] stopping module=api
//! INFO [service] stopping module=db
//! ```

use crate::framework::signal::Signal;
use std::fmt;
use tracing::{info, warn};

/// Prefix tag carried by every rendered diagnostic line.
pub const PREFIX: &str = "[service]";

/// A lifecycle milestone emitted by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    Starting { module: String },
    StartFailed { module: String, reason: String },
    GotSignal(Signal),
    AppStop,
    Stopping { module: String },
    StopFailed { module: String, reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Starting { module } => write!(f, "{PREFIX} starting {module}"),
            Diagnostic::StartFailed { module, reason } => {
                write!(f, "{PREFIX} start failed {module}: {reason}")
            }
            Diagnostic::GotSignal(signal) => write!(f, "{PREFIX} got signal: {signal}"),
            Diagnostic::AppStop => write!(f, "{PREFIX} app stop"),
            Diagnostic::Stopping { module } => write!(f, "{PREFIX} stopping {module}"),
            Diagnostic::StopFailed { module, reason } => {
                write!(f, "{PREFIX} stop failed {module}: {reason}")
            }
        }
    }
}

/// Receives lifecycle diagnostics. Implementations must not block.
pub trait DiagnosticSink: Send + Sync + 'static {
    fn emit(&self, event: &Diagnostic);
}

/// Default sink: structured `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, event: &Diagnostic) {
        match event {
            Diagnostic::Starting { module } => info!(%module, "{PREFIX} starting"),
            Diagnostic::StartFailed { module, reason } => {
                warn!(%module, %reason, "{PREFIX} start failed")
            }
            Diagnostic::GotSignal(signal) => info!(%signal, "{PREFIX} got signal"),
            Diagnostic::AppStop => info!("{PREFIX} app stop"),
            Diagnostic::Stopping { module } => info!(%module, "{PREFIX} stopping"),
            Diagnostic::StopFailed { module, reason } => {
                warn!(%module, %reason, "{PREFIX} stop failed")
            }
        }
    }
}
