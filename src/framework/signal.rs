//! # Process Signals
//!
//! The external half of the shutdown race. A [`SignalSource`] installs its
//! subscriptions when [`SignalSource::listen`] is called and hands back a
//! future that resolves with the first signal delivered afterwards.
//!
//! OS signal registration is process-wide, so one orchestrator per process is
//! the supported setup. Running several services that all use [`OsSignals`]
//! in one process is unsupported: every one of them will observe the signal.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use tracing::warn;

/// A termination notification from the operating environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Ctrl-C / `SIGINT`.
    Interrupt,
    /// `SIGTERM`.
    Terminate,
    /// `SIGQUIT`. `SIGKILL` can't be intercepted, so this is the kill request
    /// a process can still react to.
    Quit,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Signal::Interrupt => "SIGINT",
            Signal::Terminate => "SIGTERM",
            Signal::Quit => "SIGQUIT",
        })
    }
}

/// Future returned by [`SignalSource::listen`].
pub type SignalFuture = Pin<Box<dyn Future<Output = Signal> + Send>>;

/// Something that can deliver termination signals to the orchestrator.
pub trait SignalSource: Send + Sync + 'static {
    /// Installs a fresh subscription. Signals delivered after this call
    /// returns resolve the future.
    fn listen(&self) -> SignalFuture;
}

/// Real process signals via `tokio::signal`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSignals;

impl SignalSource for OsSignals {
    fn listen(&self) -> SignalFuture {
        listen_os()
    }
}

#[cfg(unix)]
fn listen_os() -> SignalFuture {
    use tokio::signal::unix::SignalKind;

    // Ctrl-C goes through the same SIGINT handler machinery
    let mut interrupt = install(SignalKind::interrupt(), Signal::Interrupt);
    let mut terminate = install(SignalKind::terminate(), Signal::Terminate);
    let mut quit = install(SignalKind::quit(), Signal::Quit);

    Box::pin(async move {
        tokio::select! {
            _ = recv(interrupt.as_mut()) => Signal::Interrupt,
            _ = recv(terminate.as_mut()) => Signal::Terminate,
            _ = recv(quit.as_mut()) => Signal::Quit,
        }
    })
}

#[cfg(unix)]
fn install(
    kind: tokio::signal::unix::SignalKind,
    sig: Signal,
) -> Option<tokio::signal::unix::Signal> {
    match tokio::signal::unix::signal(kind) {
        Ok(stream) => Some(stream),
        Err(e) => {
            warn!(signal = %sig, error = %e, "Failed to install signal handler");
            None
        }
    }
}

/// Resolves on the next delivery. A missing or closed stream never resolves.
#[cfg(unix)]
async fn recv(stream: Option<&mut tokio::signal::unix::Signal>) {
    if let Some(stream) = stream {
        if stream.recv().await.is_some() {
            return;
        }
    }
    std::future::pending().await
}

#[cfg(not(unix))]
fn listen_os() -> SignalFuture {
    Box::pin(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Signal::Interrupt,
            Err(e) => {
                warn!(error = %e, "Failed to install Ctrl-C handler");
                std::future::pending().await
            }
        }
    })
}
