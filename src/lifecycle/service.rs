use crate::framework::{
    Diagnostic, DiagnosticSink, Env, EnvError, Module, ModuleRegistry, OsSignals, ResolvedModule,
    RunOutcome, RunPhase, RunningBarrier, ServiceError, SetupError, ShutdownTrigger,
    SignalSource, StartState, StartedBarrier, StopHandle, TracingSink,
};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// The process-lifecycle orchestrator.
///
/// `Service` is the builder half: it collects modules and collaborators, then
/// [`setup`](Service::setup) resolves every module's configuration and hands
/// back a [`ReadyService`] that can be started exactly once.
///
/// # Lifecycle
///
/// 1. **Setup** (synchronous): resolve configs in registry order. Errors stop
///    everything before a single start hook runs.
/// 2. **Start** (spawned task): run start hooks one at a time, in order, then
///    release the `started` barrier.
/// 3. **Run**: wait for the first of an OS signal or a stop request.
/// 4. **Teardown**: run stop hooks in reverse order, then complete the
///    `running` barrier.
///
/// # Example
///
/// ```ignore
/// let handle = Service::new(Env::Production)
///     .register(db_module)
///     .register(api_module)
///     .setup()?
///     .start();
///
/// handle.wait_started().await?;
/// // ... serve traffic until SIGTERM or handle.stop() ...
/// handle.wait_stopped().await;
/// ```
///
/// One service per process: OS signal delivery is process-wide.
pub struct Service {
    env: Env,
    registry: ModuleRegistry,
    sink: Arc<dyn DiagnosticSink>,
    signals: Arc<dyn SignalSource>,
}

impl Service {
    pub fn new(env: Env) -> Self {
        Self {
            env,
            registry: ModuleRegistry::new(),
            sink: Arc::new(TracingSink),
            signals: Arc::new(OsSignals),
        }
    }

    /// Builds a service for the environment named by `SERVICE_ENV`.
    pub fn from_env() -> Result<Self, EnvError> {
        Ok(Self::new(Env::from_env()?))
    }

    /// Appends a module. Registration order is start order.
    pub fn register(mut self, module: impl Module) -> Self {
        self.registry.register(module);
        self
    }

    pub fn with_sink(mut self, sink: impl DiagnosticSink) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn with_signals(mut self, signals: impl SignalSource) -> Self {
        self.signals = Arc::new(signals);
        self
    }

    pub fn env(&self) -> Env {
        self.env
    }

    /// Resolves every module's configuration. No hook runs here.
    pub fn setup(self) -> Result<ReadyService, SetupError> {
        let modules = self.registry.resolve(self.env)?;
        debug!(env = %self.env, modules = modules.len(), "Service set up");

        Ok(ReadyService {
            env: self.env,
            modules,
            sink: self.sink,
            signals: self.signals,
            started: StartedBarrier::new(),
            running: RunningBarrier::new(),
            trigger: ShutdownTrigger::new(),
        })
    }

    /// Sets up, starts, waits for the start phase and returns the stop entry
    /// point. The run task keeps going in the background.
    pub async fn provide(self) -> Result<StopHandle, ServiceError> {
        let handle = self.setup()?.start();
        handle.wait_started().await?;
        Ok(handle.stopper())
    }

    /// Like [`provide`](Service::provide) but forces [`Env::Test`] and keeps
    /// the full handle.
    pub async fn start_for_test(mut self) -> Result<ServiceHandle, ServiceError> {
        self.env = Env::Test;
        let handle = self.setup()?.start();
        handle.wait_started().await?;
        Ok(handle)
    }

    /// Runs a lifecycle command. Only `start` exists: set up, start, and block
    /// until the service has fully stopped.
    pub async fn run_command(self, command: &str) -> Result<(), ServiceError> {
        match command {
            "start" => {
                let handle = self.setup()?.start();
                handle.wait_started().await?;
                info!("Service running; waiting for shutdown");
                handle.join().await?;
                Ok(())
            }
            other => Err(ServiceError::UnknownCommand(other.to_string())),
        }
    }

    /// Shorthand for `run_command("start")`.
    pub async fn serve(self) -> Result<(), ServiceError> {
        self.run_command("start").await
    }
}

/// A service whose modules are resolved and ready to start.
pub struct ReadyService {
    env: Env,
    modules: Vec<ResolvedModule>,
    sink: Arc<dyn DiagnosticSink>,
    signals: Arc<dyn SignalSource>,
    started: StartedBarrier,
    running: RunningBarrier,
    trigger: ShutdownTrigger,
}

impl ReadyService {
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.name())
    }

    /// Spawns [`run`](ReadyService::run) on the current Tokio runtime and
    /// returns immediately.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(self) -> ServiceHandle {
        let started = self.started.clone();
        let running = self.running.clone();
        let trigger = self.trigger.clone();
        let task = tokio::spawn(self.run());

        ServiceHandle {
            started,
            running,
            trigger,
            task,
        }
    }

    /// The run loop: start modules, wait for shutdown, tear down.
    ///
    /// Start hooks run on this task in registry order. A hook that blocks
    /// stalls every module after it; nothing here enforces a deadline.
    pub async fn run(self) -> RunOutcome {
        let mut launched = 0;

        for module in &self.modules {
            let name = module.name();
            self.sink.emit(&Diagnostic::Starting {
                module: name.to_string(),
            });

            if let Some(start) = &module.config().start {
                if let Err(panic) = catch_unwind(AssertUnwindSafe(|| start())) {
                    let reason = panic_message(panic.as_ref());
                    return self.abort_start(launched, name, reason);
                }
            }
            launched += 1;
        }

        self.started.mark_complete(StartState::Started);
        self.running.begin();
        info!(env = %self.env, modules = launched, "Service started");

        self.wait().await;

        self.teardown(launched);
        self.running.complete(RunOutcome::Stopped);
        info!("Service stopped");
        RunOutcome::Stopped
    }

    /// Blocks until an OS signal arrives or the trigger is resolved.
    async fn wait(&self) {
        let signal = self.signals.listen();

        tokio::select! {
            sig = signal => {
                // Later stop() calls become no-ops.
                self.trigger.trigger();
                self.sink.emit(&Diagnostic::GotSignal(sig));
            }
            _ = self.trigger.triggered() => {
                self.sink.emit(&Diagnostic::AppStop);
            }
        }
    }

    fn abort_start(&self, launched: usize, module: &str, reason: String) -> RunOutcome {
        warn!(module, %reason, "Start hook panicked; aborting start");
        self.sink.emit(&Diagnostic::StartFailed {
            module: module.to_string(),
            reason: reason.clone(),
        });
        self.started.mark_complete(StartState::Failed {
            module: module.to_string(),
            reason: reason.clone(),
        });
        self.trigger.trigger();

        self.teardown(launched);

        let outcome = RunOutcome::Failed {
            module: module.to_string(),
            reason,
        };
        self.running.complete(outcome.clone());
        outcome
    }

    /// Stops the first `launched` modules, last started first.
    fn teardown(&self, launched: usize) {
        for module in self.modules[..launched].iter().rev() {
            let name = module.name();
            self.sink.emit(&Diagnostic::Stopping {
                module: name.to_string(),
            });

            if let Some(stop) = &module.config().stop {
                if let Err(panic) = catch_unwind(AssertUnwindSafe(|| stop())) {
                    self.sink.emit(&Diagnostic::StopFailed {
                        module: name.to_string(),
                        reason: panic_message(panic.as_ref()),
                    });
                }
            }
        }
    }
}

/// Handle to a started service.
pub struct ServiceHandle {
    started: StartedBarrier,
    running: RunningBarrier,
    trigger: ShutdownTrigger,
    task: JoinHandle<RunOutcome>,
}

impl ServiceHandle {
    /// Waits until every start hook has returned.
    pub async fn wait_started(&self) -> Result<(), ServiceError> {
        match self.started.wait().await {
            StartState::Failed { module, reason } => {
                Err(ServiceError::StartFailed { module, reason })
            }
            _ => Ok(()),
        }
    }

    /// Requests shutdown. Idempotent; safe from any thread or task.
    pub fn stop(&self) {
        self.trigger.trigger();
    }

    /// A cloneable stop entry point that outlives this handle.
    pub fn stopper(&self) -> StopHandle {
        self.trigger.stop_handle()
    }

    pub fn phase(&self) -> RunPhase {
        self.running.phase()
    }

    /// Waits until the run cycle has completed, teardown included.
    pub async fn wait_stopped(&self) -> RunOutcome {
        self.running.wait().await
    }

    /// Awaits the run task itself.
    pub async fn join(self) -> Result<RunOutcome, ServiceError> {
        self.task
            .await
            .map_err(|e| ServiceError::TaskFailed(e.to_string()))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{CallLog, ManualSignals, MockModule, RecordingSink};
    use crate::framework::Signal;

    fn ready(modules: Vec<MockModule>, sink: &RecordingSink, signals: &ManualSignals) -> ReadyService {
        let mut service = Service::new(Env::Test)
            .with_sink(sink.clone())
            .with_signals(signals.clone());
        for module in modules {
            service = service.register(module);
        }
        service.setup().unwrap()
    }

    #[tokio::test]
    async fn run_can_be_driven_without_spawning() {
        let sink = RecordingSink::new();
        let signals = ManualSignals::new();
        let log = CallLog::new();
        let service = ready(vec![MockModule::new("db", &log)], &sink, &signals);

        signals.send(Signal::Interrupt);
        let outcome = service.run().await;

        assert_eq!(outcome, RunOutcome::Stopped);
        assert_eq!(log.calls(), ["start:db", "stop:db"]);
        assert_eq!(signals.listens(), 1);
    }

    #[tokio::test]
    async fn signal_resolves_the_trigger() {
        let sink = RecordingSink::new();
        let signals = ManualSignals::new();
        let handle = ready(vec![], &sink, &signals).start();
        handle.wait_started().await.unwrap();

        signals.send(Signal::Terminate);
        handle.wait_stopped().await;

        assert!(handle.stopper().is_stopped());
        handle.stop();
        assert_eq!(handle.join().await.unwrap(), RunOutcome::Stopped);
    }

    #[tokio::test]
    async fn modules_without_hooks_are_still_announced() {
        let sink = RecordingSink::new();
        let signals = ManualSignals::new();
        let log = CallLog::new();
        let module = MockModule::new("quiet", &log).without_start().without_stop();
        let handle = ready(vec![module], &sink, &signals).start();

        handle.wait_started().await.unwrap();
        handle.stop();
        handle.wait_stopped().await;

        assert!(log.calls().is_empty());
        assert_eq!(
            sink.lines(),
            ["[service] starting quiet", "[service] app stop", "[service] stopping quiet"]
        );
    }

    #[test]
    fn panic_message_reads_common_payloads() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(42);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
