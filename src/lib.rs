//! # Service Lifecycle
//!
//! > **Boot a fixed set of modules, keep the process alive, unwind on signal.**
//!
//! This crate is a small process-lifecycle orchestrator built on Tokio. A
//! service is an ordered list of named modules, each with optional start and
//! stop hooks. The orchestrator starts them in order, waits until the process
//! receives `SIGINT`/`SIGTERM`/`SIGQUIT` or someone calls `stop()`, then stops
//! them in reverse order.
//!
//! ## 🚀 Core Concepts
//!
//! ### Setup is synchronous, running is not
//! [`Service::setup`](lifecycle::Service::setup) resolves every module's
//! configuration on the caller's task and fails fast. Only then is the run
//! loop spawned, so a misconfigured module never leaves half the process
//! started.
//!
//! ### Two barriers, two questions
//! "Are all modules up?" and "has the service finished?" are different
//! questions asked by different code, so they get different barriers:
//! [`StartedBarrier`](framework::StartedBarrier) and
//! [`RunningBarrier`](framework::RunningBarrier).
//!
//! ### Stop is idempotent
//! Shutdown is a one-shot trigger. A signal handler and any number of `stop()`
//! callers can race; teardown runs exactly once.
//!
//! ### Panics don't deadlock
//! Start hooks run behind a recovery boundary. A panicking hook releases the
//! `started` barrier with an error instead of leaving awaiters hanging.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Building Blocks ([`framework`])
//! - **Role**: modules, barriers, the shutdown trigger, signals, diagnostics, errors.
//! - **Testing**: [`framework::mock`] has doubles for every collaborator.
//!
//! ### 2. The Orchestrator ([`lifecycle`])
//! - **Role**: wires the building blocks into the setup → start → run → teardown cycle.
//! - **Key items**: [`Service`](lifecycle::Service), [`ServiceHandle`](lifecycle::ServiceHandle).
//!
//! ## Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run            # Ctrl-C to stop
//! SERVICE_ENV=production cargo run -- start
//! ```

pub mod framework;
pub mod lifecycle;
