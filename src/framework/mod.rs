//! Building blocks of the service lifecycle.
//!
//! # Main Components
//!
//! - [`Module`] / [`ModuleRegistry`] - named units of functionality and their hooks
//! - [`StartedBarrier`] / [`RunningBarrier`] - one-shot lifecycle barriers
//! - [`ShutdownTrigger`] / [`StopHandle`] - idempotent programmatic stop
//! - [`SignalSource`] / [`OsSignals`] - process termination signals
//! - [`DiagnosticSink`] / [`TracingSink`] - lifecycle milestones
//! - [`SetupError`] / [`ServiceError`] - error types
//!
//! # Testing
//!
//! See [`mock`] for in-memory doubles of the sink, the signal source and modules.

pub mod barrier;
pub mod diagnostic;
pub mod env;
pub mod error;
pub mod mock;
pub mod module;
pub mod shutdown;
pub mod signal;

pub use barrier::{RunOutcome, RunPhase, RunningBarrier, StartState, StartedBarrier};
pub use diagnostic::{Diagnostic, DiagnosticSink, TracingSink};
pub use env::Env;
pub use error::{EnvError, ModuleError, ServiceError, SetupError};
pub use module::{Hook, Module, ModuleConfig, ModuleRegistry, ResolvedModule, SimpleModule};
pub use shutdown::{ShutdownTrigger, StopHandle};
pub use signal::{OsSignals, Signal, SignalFuture, SignalSource};
