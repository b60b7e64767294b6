//! # Framework Errors
//!
//! This module defines the error types used throughout the service lifecycle.
//! Only the setup phase produces recoverable errors; everything that happens
//! after modules start is reported through the lifecycle barriers instead.

/// Error returned by a module that cannot resolve its configuration.
pub type ModuleError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while resolving the module registry, before any module starts.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("module registered twice: {0}")]
    DuplicateModule(String),
    #[error("module {module} failed to configure: {source}")]
    Module {
        module: String,
        #[source]
        source: ModuleError,
    },
}

/// Errors surfaced to the code driving a service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Setup(#[from] SetupError),
    #[error("module {module} failed to start: {reason}")]
    StartFailed { module: String, reason: String },
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("service task failed: {0}")]
    TaskFailed(String),
}

/// Raised when `SERVICE_ENV` names an environment we don't know.
#[derive(Debug, thiserror::Error, PartialEq)]
#[error("unknown environment: {0}")]
pub struct EnvError(pub String);
