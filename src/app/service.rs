//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the sampler, actuation controller and notification
//! dispatcher, and runs the evaluation tick.  All I/O flows through port
//! traits injected at call sites, making the entire service testable with
//! mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │          AppService           │ ──▶ AlertPort
//! ActuatorPort ◀──│ sample · evaluate · actuate   │ ──▶ DisplayPort
//!                 └──────────────────────────────┘
//!                        │ publishes HazardState
//!                        ▼
//!                    HazardCell ──▶ signaling task
//! ```
//!
//! State shared with the other tasks lives in [`SharedState`]: the override
//! registry (written by the command listener), the hazard cell (read by the
//! signaling task) and the alert outbox (drained by the alert worker).

use std::sync::Arc;

use log::{info, warn};

use crate::actuation::{ActuationController, ActuatorOutputs};
use crate::config::SystemConfig;
use crate::diagnostics::{self, Counters, DiagnosticsReport};
use crate::hazard::{self, HazardCell, HazardState};
use crate::notify::{AlertOutbox, DispatchOutcome, NotificationDispatcher};
use crate::overrides::OverrideRegistry;
use crate::sensors::{Reading, SensorSampler};

use super::commands::{AppCommand, OverrideCommand};
use super::events::{AppEvent, SignalId, TelemetryData};
use super::ports::{ActuatorId, ActuatorPort, AlertPort, DisplayPort, EventSink, SensorPort};

/// Cross-task state.  Every member is safe to touch from any thread.
pub struct SharedState {
    pub overrides: OverrideRegistry,
    pub hazard: HazardCell,
    pub outbox: AlertOutbox,
}

impl SharedState {
    pub const fn new() -> Self {
        Self {
            overrides: OverrideRegistry::new(),
            hazard: HazardCell::new(),
            outbox: AlertOutbox::new(),
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

/// What one evaluation tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Fresh values for healthy channels, last good values for faulted ones.
    pub reading: Reading,
    pub sensor_ok: bool,
    pub hazard: HazardState,
    pub outputs: ActuatorOutputs,
    pub alerts: DispatchOutcome,
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: SystemConfig,
    shared: Arc<SharedState>,
    sampler: SensorSampler,
    controller: ActuationController,
    dispatcher: NotificationDispatcher,
    last_reading: Reading,
    last_hazard: HazardState,
    last_outputs: Option<ActuatorOutputs>,
    sensor_ok: bool,
    counters: Counters,
}

impl AppService {
    /// Construct the service from configuration.
    pub fn new(config: SystemConfig, shared: Arc<SharedState>) -> Self {
        let dispatcher = NotificationDispatcher::new(&config);
        Self::with_dispatcher(config, shared, dispatcher)
    }

    /// Construct with a pre-built dispatcher (custom rate-limit clock).
    pub fn with_dispatcher(
        config: SystemConfig,
        shared: Arc<SharedState>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            sampler: SensorSampler::new(&config),
            config,
            shared,
            controller: ActuationController::new(),
            dispatcher,
            last_reading: Reading::default(),
            last_hazard: HazardState::CLEAR,
            last_outputs: None,
            sensor_ok: true,
            counters: Counters::default(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started);
        info!(
            "AppService started: eval every {} ms, signal every {} ms",
            self.config.eval_interval_ms, self.config.signal_interval_ms
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one evaluation tick, fully serialized:
    /// sample → evaluate → read overrides → actuate → render → notify →
    /// publish.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`], which avoids a double mutable borrow while keeping
    /// the port boundary explicit.
    pub fn evaluation_tick(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        display: &mut impl DisplayPort,
        alerts: &mut impl AlertPort,
        sink: &mut impl EventSink,
    ) -> TickReport {
        self.counters.eval_ticks += 1;

        // 1–2. Sample and derive.  A faulted channel holds its own flag;
        // every healthy channel is judged fresh.
        let sample = self.sampler.sample(hw);
        sample.merge_into(&mut self.last_reading);
        let hazard = hazard::evaluate_sample(&sample, &self.config.thresholds, &self.last_hazard);

        let sensor_ok = sample.is_healthy();
        if !sensor_ok {
            self.counters.sensor_faults += 1;
        }
        for (channel, error) in sample.faults() {
            warn!("Sensor fault on {:?}, holding its hazard flag: {}", channel, error);
            sink.emit(&AppEvent::SensorFault { channel, error });
        }
        if sensor_ok != self.sensor_ok {
            sink.emit(&AppEvent::SignalChanged {
                signal: SignalId::SensorHealthy,
                on: sensor_ok,
            });
        }
        self.sensor_ok = sensor_ok;

        // 3–4. Overrides, then actuation.
        let overrides = self.shared.overrides.snapshot();
        let outputs = self.controller.apply(&hazard, &overrides, hw);
        for id in ActuatorId::ALL {
            let level = outputs.level(id);
            if self.last_outputs.map(|o| o.level(id)) != Some(level) {
                sink.emit(&AppEvent::SignalChanged {
                    signal: id.into(),
                    on: level,
                });
            }
        }
        self.last_outputs = Some(outputs);

        display.render(&self.last_reading, &hazard);

        // 5. Notifications.
        let sent = self
            .dispatcher
            .dispatch(&hazard, &self.last_reading, alerts, sink);
        self.counters.alerts_sent += u32::from(sent.sent);
        self.counters.alerts_failed += u32::from(sent.failed);

        // Publish last so the signaling task never sees a half-done tick.
        self.shared.hazard.publish(hazard);
        self.last_hazard = hazard;

        sink.emit(&AppEvent::Telemetry(TelemetryData {
            tick: self.counters.eval_ticks,
            reading: self.last_reading,
            sensor_ok,
            hazard,
            overrides,
            outputs,
        }));

        TickReport {
            reading: self.last_reading,
            sensor_ok,
            hazard,
            outputs,
            alerts: sent,
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command.  Overrides take effect on the next
    /// evaluation tick.
    pub fn handle_command(&mut self, cmd: AppCommand, sink: &mut impl EventSink) {
        match cmd {
            AppCommand::Override(OverrideCommand { actuator, value }) => {
                self.shared.overrides.set_override(actuator, value);
                sink.emit(&AppEvent::OverrideChanged { actuator, value });
            }
            AppCommand::GetDiagnostics => diagnostics::log_report(&self.diagnostics_report()),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Snapshot for the periodic diagnostics print.  Reuses the cached
    /// reading; never samples.
    pub fn diagnostics_report(&self) -> DiagnosticsReport {
        DiagnosticsReport {
            uptime_secs: crate::adapters::time::uptime().as_secs(),
            reading: self.last_reading,
            flame_detected: self.last_hazard.fire_alert,
            sensor_ok: self.sensor_ok,
            counters: self.counters,
            outbox: self.shared.outbox.stats(),
            heap_free: diagnostics::heap_free(),
        }
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn last_hazard(&self) -> HazardState {
        self.last_hazard
    }

    pub fn last_reading(&self) -> Reading {
        self.last_reading
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn shared(&self) -> &Arc<SharedState> {
        &self.shared
    }
}
