//! Runtime threads.
//!
//! Two periodic loops share nothing but [`SharedState`]:
//!
//! - **evaluation** ([`EvaluationTask`]): drains queued commands, runs the
//!   evaluation tick, prints diagnostics on its own cadence.
//! - **signaling** ([`SignalTask`]): reads the latest published hazard and
//!   advances the buzzer pattern.
//!
//! Each loop owns a [`Scheduler`] and is driven by [`TaskLoop`], which
//! sleeps until the next task is due and feeds the watchdog every pass.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::adapters::console::CommandQueue;
use crate::app::ports::{
    ActuatorPort, BuzzerPort, DisplayPort, EventSink, SchedulerDelegate, SensorPort, TaskKind,
};
use crate::app::service::{AppService, SharedState, TickReport};
use crate::config::SystemConfig;
use crate::diagnostics;
use crate::drivers::watchdog::Watchdog;
use crate::scheduler::{PeriodicTask, Scheduler};
use crate::signaler::AlertSignaler;

/// Longest single sleep, so the watchdog is fed even when idle.
const MAX_SLEEP_MS: u32 = 1000;

/// Scheduler for the evaluation thread.
pub fn evaluation_schedule(config: &SystemConfig) -> Scheduler {
    let mut s = Scheduler::new();
    s.add(PeriodicTask {
        label: "evaluate",
        kind: TaskKind::Evaluate,
        interval_ms: config.eval_interval_ms,
        enabled: true,
    });
    s.add(PeriodicTask {
        label: "diagnostics",
        kind: TaskKind::Diagnostics,
        interval_ms: config.diagnostics_interval_ms,
        enabled: true,
    });
    s
}

/// Scheduler for the signaling thread.
pub fn signal_schedule(config: &SystemConfig) -> Scheduler {
    let mut s = Scheduler::new();
    s.add(PeriodicTask {
        label: "signal",
        kind: TaskKind::Signal,
        interval_ms: config.signal_interval_ms,
        enabled: true,
    });
    s
}

// ───────────────────────────────────────────────────────────────
// Evaluation
// ───────────────────────────────────────────────────────────────

pub struct EvaluationTask<'a, H, D, S> {
    app: AppService,
    hw: H,
    display: D,
    sink: S,
    commands: &'a CommandQueue,
    last: Option<TickReport>,
}

impl<'a, H, D, S> EvaluationTask<'a, H, D, S>
where
    H: SensorPort + ActuatorPort,
    D: DisplayPort,
    S: EventSink,
{
    pub fn new(app: AppService, hw: H, display: D, sink: S, commands: &'a CommandQueue) -> Self {
        Self {
            app,
            hw,
            display,
            sink,
            commands,
            last: None,
        }
    }

    /// Apply pending commands, then run one evaluation tick.  Alerts go to
    /// the shared outbox; the worker thread does the slow send.
    pub fn evaluate(&mut self) -> TickReport {
        let applied = self
            .commands
            .drain(|cmd| self.app.handle_command(cmd, &mut self.sink));
        if applied > 0 {
            debug!("Evaluate: applied {} command(s)", applied);
        }

        let shared = Arc::clone(self.app.shared());
        let mut alerts = shared.outbox.sender();
        let report = self
            .app
            .evaluation_tick(&mut self.hw, &mut self.display, &mut alerts, &mut self.sink);
        self.last = Some(report);
        report
    }

    pub fn last_report(&self) -> Option<TickReport> {
        self.last
    }

    pub fn app(&self) -> &AppService {
        &self.app
    }

    pub fn hardware(&self) -> &H {
        &self.hw
    }
}

impl<H, D, S> SchedulerDelegate for EvaluationTask<'_, H, D, S>
where
    H: SensorPort + ActuatorPort,
    D: DisplayPort,
    S: EventSink,
{
    fn on_task_due(&mut self, label: &str, task: TaskKind) {
        match task {
            TaskKind::Evaluate => {
                self.evaluate();
            }
            TaskKind::Diagnostics => diagnostics::log_report(&self.app.diagnostics_report()),
            TaskKind::Signal => warn!("Evaluate: '{}' does not belong on this thread", label),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Signaling
// ───────────────────────────────────────────────────────────────

pub struct SignalTask<B> {
    signaler: AlertSignaler,
    buzzer: B,
    shared: Arc<SharedState>,
}

impl<B: BuzzerPort> SignalTask<B> {
    pub fn new(buzzer: B, shared: Arc<SharedState>) -> Self {
        Self {
            signaler: AlertSignaler::new(),
            buzzer,
            shared,
        }
    }

    /// One signaling tick against the latest published hazard.
    pub fn signal(&mut self) -> bool {
        let hazard = self.shared.hazard.latest();
        self.signaler.drive(&hazard, &mut self.buzzer)
    }

    pub fn signaler(&self) -> &AlertSignaler {
        &self.signaler
    }
}

impl<B: BuzzerPort> SchedulerDelegate for SignalTask<B> {
    fn on_task_due(&mut self, label: &str, task: TaskKind) {
        match task {
            TaskKind::Signal => {
                self.signal();
            }
            _ => warn!("Signal: '{}' does not belong on this thread", label),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Loop driver
// ───────────────────────────────────────────────────────────────

/// Sleep-until-due loop around one [`Scheduler`].
pub struct TaskLoop {
    scheduler: Scheduler,
    last: Instant,
}

impl TaskLoop {
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            scheduler,
            last: Instant::now(),
        }
    }

    /// Sleep until the next task is due, then advance the scheduler by the
    /// time that actually passed.
    pub fn step(&mut self, delegate: &mut dyn SchedulerDelegate) {
        let wait = self
            .scheduler
            .next_due_ms()
            .unwrap_or(MAX_SLEEP_MS)
            .min(MAX_SLEEP_MS);
        if wait > 0 {
            std::thread::sleep(Duration::from_millis(u64::from(wait)));
        }
        let now = Instant::now();
        let elapsed = now.duration_since(self.last).as_millis();
        self.last = now;
        self.scheduler
            .tick(u32::try_from(elapsed).unwrap_or(u32::MAX), delegate);
    }

    /// Run forever, feeding `watchdog` after every pass.
    pub fn run(mut self, delegate: &mut dyn SchedulerDelegate, watchdog: &Watchdog) -> ! {
        loop {
            self.step(delegate);
            watchdog.feed();
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }
}
