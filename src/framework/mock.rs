//! # Test Doubles
//!
//! In-memory stand-ins for the orchestrator's collaborators, so lifecycle
//! behaviour can be tested deterministically without touching real process
//! signals.
//!
//! | Double | Replaces | Lets a test |
//! |--------|----------|-------------|
//! | [`RecordingSink`] | [`TracingSink`](crate::framework::TracingSink) | assert on the exact diagnostic sequence |
//! | [`ManualSignals`] | [`OsSignals`](crate::framework::OsSignals) | deliver a fake `SIGTERM` on demand |
//! | [`MockModule`] | a real module | count hook calls, record their order, inject failures |
//!
//! ```rust
//! use service_lifecycle::framework::mock::{CallLog, ManualSignals, MockModule, RecordingSink};
//! use service_lifecycle::framework::Env;
//! use service_lifecycle::lifecycle::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let sink = RecordingSink::new();
//!     let log = CallLog::new();
//!
//!     let handle = Service::new(Env::Test)
//!         .register(MockModule::new("db", &log))
//!         .with_sink(sink.clone())
//!         .with_signals(ManualSignals::new())
//!         .setup()
//!         .unwrap()
//!         .start();
//!
//!     handle.wait_started().await.unwrap();
//!     handle.stop();
//!     handle.wait_stopped().await;
//!
//!     assert_eq!(log.calls(), ["start:db", "stop:db"]);
//!     assert_eq!(sink.lines()[0], "[service] starting db");
//! }
//! ```

use crate::framework::diagnostic::{Diagnostic, DiagnosticSink};
use crate::framework::env::Env;
use crate::framework::error::ModuleError;
use crate::framework::module::{Module, ModuleConfig};
use crate::framework::signal::{Signal, SignalFuture, SignalSource};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Captures every diagnostic for later inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<Diagnostic>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Diagnostic> {
        self.events.lock().unwrap().clone()
    }

    /// Events rendered the way an operator would read them.
    pub fn lines(&self) -> Vec<String> {
        self.events().iter().map(ToString::to_string).collect()
    }

    pub fn count(&self, pred: impl Fn(&Diagnostic) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&self, event: &Diagnostic) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// A signal source driven by the test.
///
/// Unlike [`OsSignals`](crate::framework::OsSignals), the last signal sent
/// is latched: a subscription installed after [`send`](ManualSignals::send)
/// still resolves with it. A real subscription only sees deliveries that
/// happen after `listen()`, so tests built on this double must not be read
/// as proof that an early OS signal is caught.
#[derive(Debug, Clone)]
pub struct ManualSignals {
    tx: Arc<watch::Sender<Option<Signal>>>,
    listens: Arc<AtomicUsize>,
}

impl ManualSignals {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            tx: Arc::new(tx),
            listens: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Delivers `signal` to current and future listeners.
    pub fn send(&self, signal: Signal) {
        self.tx.send_replace(Some(signal));
    }

    /// How many times a subscription was installed.
    pub fn listens(&self) -> usize {
        self.listens.load(Ordering::SeqCst)
    }
}

impl Default for ManualSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalSource for ManualSignals {
    fn listen(&self) -> SignalFuture {
        self.listens.fetch_add(1, Ordering::SeqCst);
        let mut rx = self.tx.subscribe();
        Box::pin(async move {
            let delivered = match rx.wait_for(Option::is_some).await {
                Ok(signal) => *signal,
                Err(_) => None,
            };
            match delivered {
                Some(signal) => signal,
                None => std::future::pending().await,
            }
        })
    }
}

/// Shared, ordered record of hook calls across several [`MockModule`]s.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    None,
    Configure,
    StartPanic,
    StopPanic,
}

/// A module that records its hook calls into a [`CallLog`] as `start:<name>`
/// and `stop:<name>`.
#[derive(Debug, Clone)]
pub struct MockModule {
    name: String,
    log: CallLog,
    starts: Arc<AtomicUsize>,
    stops: Arc<AtomicUsize>,
    with_start: bool,
    with_stop: bool,
    failure: Failure,
}

impl MockModule {
    pub fn new(name: impl Into<String>, log: &CallLog) -> Self {
        Self {
            name: name.into(),
            log: log.clone(),
            starts: Arc::new(AtomicUsize::new(0)),
            stops: Arc::new(AtomicUsize::new(0)),
            with_start: true,
            with_stop: true,
            failure: Failure::None,
        }
    }

    /// Registers no start hook.
    pub fn without_start(mut self) -> Self {
        self.with_start = false;
        self
    }

    /// Registers no stop hook.
    pub fn without_stop(mut self) -> Self {
        self.with_stop = false;
        self
    }

    /// `configure` returns an error.
    pub fn failing_configure(mut self) -> Self {
        self.failure = Failure::Configure;
        self
    }

    /// The start hook panics.
    pub fn panicking_start(mut self) -> Self {
        self.failure = Failure::StartPanic;
        self
    }

    /// The stop hook panics.
    pub fn panicking_stop(mut self) -> Self {
        self.failure = Failure::StopPanic;
        self
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl Module for MockModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn configure(&self, _env: Env) -> Result<ModuleConfig, ModuleError> {
        if self.failure == Failure::Configure {
            return Err(format!("{} refused to configure", self.name).into());
        }

        let mut config = ModuleConfig::new();
        if self.with_start {
            let (name, log, starts) = (self.name.clone(), self.log.clone(), self.starts.clone());
            let panics = self.failure == Failure::StartPanic;
            config = config.on_start(move || {
                starts.fetch_add(1, Ordering::SeqCst);
                log.push(format!("start:{name}"));
                if panics {
                    panic!("{name} exploded");
                }
            });
        }
        if self.with_stop {
            let (name, log, stops) = (self.name.clone(), self.log.clone(), self.stops.clone());
            let panics = self.failure == Failure::StopPanic;
            config = config.on_stop(move || {
                stops.fetch_add(1, Ordering::SeqCst);
                log.push(format!("stop:{name}"));
                if panics {
                    panic!("{name} failed to stop");
                }
            });
        }
        Ok(config)
    }
}
