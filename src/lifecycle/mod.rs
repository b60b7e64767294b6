//! # Service Lifecycle & Orchestration
//!
//! This module drives a process from boot to exit. The [`Service`] builder
//! collects modules; [`Service::setup`] resolves their configuration up front;
//! [`ReadyService::start`] launches the run loop on its own task and returns a
//! [`ServiceHandle`] for the driving code.
//!
//! ## The Run Loop
//!
//! ```text
//!   setup()          start hooks, in order       wait for first of        teardown
//! ──────────▶ ─────────────────────────────▶ ────────────────────────▶ ─────────────▶
//!  configs         started barrier released    OS signal | stop()       running barrier
//!  resolved                                                              completed
//! ```
//!
//! ## Two Barriers
//!
//! - [`ServiceHandle::wait_started`] returns once every start hook has
//!   returned, or with an error if one of them panicked.
//! - [`ServiceHandle::wait_stopped`] returns once the service has gone through
//!   its whole run-to-stop cycle, teardown included.
//!
//! ## Shutdown
//!
//! Shutdown is a race between the process signals (`SIGINT`, `SIGTERM`,
//! `SIGQUIT`) and [`ServiceHandle::stop`]. Whichever comes first wins the
//! diagnostic (`got signal` vs `app stop`); teardown runs exactly once either
//! way, and every later `stop()` is a no-op.
//!
//! ## Known Limitations
//!
//! - Start hooks must not block. There is no deadline, so a stuck hook stalls
//!   every module registered after it.
//! - One service per process. Signal delivery is process-wide.

pub mod service;
pub mod tracing;

pub use self::service::{ReadyService, Service, ServiceHandle};
pub use self::tracing::setup_tracing;
