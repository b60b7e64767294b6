//! # Lifecycle Barriers
//!
//! Two one-shot barriers answer two different questions:
//!
//! - [`StartedBarrier`]: have all start hooks returned (or has one of them failed)?
//! - [`RunningBarrier`]: has the service finished its run-until-stopped cycle?
//!
//! Both are backed by a `tokio::sync::watch` channel. Each transition happens
//! at most once; later attempts are ignored and reported through the `bool`
//! return value. Any number of tasks may wait, any number of times.

use std::sync::Arc;
use tokio::sync::watch;

/// State of the start phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartState {
    Pending,
    Started,
    Failed { module: String, reason: String },
}

/// Released once every module's start hook has returned.
#[derive(Debug, Clone)]
pub struct StartedBarrier {
    tx: Arc<watch::Sender<StartState>>,
}

impl StartedBarrier {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(StartState::Pending);
        Self { tx: Arc::new(tx) }
    }

    /// Releases the barrier with `outcome`. Returns `false` if it was already
    /// released, in which case nothing changes.
    pub fn mark_complete(&self, outcome: StartState) -> bool {
        if outcome == StartState::Pending {
            return false;
        }
        self.tx.send_if_modified(|state| {
            if *state == StartState::Pending {
                *state = outcome;
                true
            } else {
                false
            }
        })
    }

    pub fn state(&self) -> StartState {
        self.tx.borrow().clone()
    }

    /// Waits until the barrier is released and returns the final state.
    pub async fn wait(&self) -> StartState {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel can't close under us.
        let _ = rx.wait_for(|state| *state != StartState::Pending).await;
        self.state()
    }
}

impl Default for StartedBarrier {
    fn default() -> Self {
        Self::new()
    }
}

/// How the run cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Stopped after an OS signal or a stop request.
    Stopped,
    /// A start hook failed; the service never entered the running phase.
    Failed { module: String, reason: String },
}

/// Phase of the run cycle: idle, then running, then stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Running,
    Stopped(RunOutcome),
}

/// Completed once the service has gone through its full run-to-stop cycle.
#[derive(Debug, Clone)]
pub struct RunningBarrier {
    tx: Arc<watch::Sender<RunPhase>>,
}

impl RunningBarrier {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(RunPhase::Idle);
        Self { tx: Arc::new(tx) }
    }

    /// `Idle -> Running`. Returns `false` from any other phase.
    pub fn begin(&self) -> bool {
        self.tx.send_if_modified(|phase| {
            if *phase == RunPhase::Idle {
                *phase = RunPhase::Running;
                true
            } else {
                false
            }
        })
    }

    /// Moves to `Stopped(outcome)` from `Idle` or `Running`. Returns `false`
    /// if the cycle was already complete.
    pub fn complete(&self, outcome: RunOutcome) -> bool {
        self.tx.send_if_modified(|phase| match phase {
            RunPhase::Stopped(_) => false,
            _ => {
                *phase = RunPhase::Stopped(outcome);
                true
            }
        })
    }

    pub fn phase(&self) -> RunPhase {
        self.tx.borrow().clone()
    }

    /// Waits for the terminal phase and returns its outcome.
    pub async fn wait(&self) -> RunOutcome {
        let mut rx = self.tx.subscribe();
        loop {
            if let RunPhase::Stopped(outcome) = &*rx.borrow_and_update() {
                return outcome.clone();
            }
            if rx.changed().await.is_err() {
                return match self.phase() {
                    RunPhase::Stopped(outcome) => outcome,
                    _ => std::future::pending().await,
                };
            }
        }
    }
}

impl Default for RunningBarrier {
    fn default() -> Self {
        Self::new()
    }
}
