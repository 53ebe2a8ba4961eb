//! Mock hardware and sinks for integration tests.
//!
//! [`MockHardware`] plays back scripted sensor values and records every
//! actuator write, so tests can assert on the full command history
//! without touching real GPIO.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use firewatch::app::events::AppEvent;
use firewatch::app::ports::{
    ActuatorId, ActuatorPort, AlertPort, DisplayPort, EventSink, SensorPort,
};
use firewatch::app::service::{AppService, SharedState};
use firewatch::config::SystemConfig;
use firewatch::error::{SendError, SensorError};
use firewatch::hazard::HazardState;
use firewatch::notify::NotificationDispatcher;
use firewatch::sensors::Reading;

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub gas: u16,
    pub temperature_c: f32,
    pub humidity_pct: f32,
    /// Raw flame line levels, consumed one per read; `idle_flame_line`
    /// once empty.  The line is active-low.
    pub flame_script: VecDeque<bool>,
    pub idle_flame_line: bool,
    /// Fails both climate reads, as a dead probe does.
    pub fail_climate: Option<SensorError>,
    pub fail_flame: Option<SensorError>,
    pub writes: Vec<(ActuatorId, bool)>,
    pub settle_ms: u32,
}

#[allow(dead_code)]
impl MockHardware {
    /// Quiet room: nothing above threshold, flame line idle HIGH.
    pub fn quiet() -> Self {
        Self {
            gas: 300,
            temperature_c: 22.0,
            humidity_pct: 45.0,
            flame_script: VecDeque::new(),
            idle_flame_line: true,
            fail_climate: None,
            fail_flame: None,
            writes: Vec::new(),
            settle_ms: 0,
        }
    }

    /// Flame line held LOW (flame seen on every read).
    pub fn burning(mut self) -> Self {
        self.idle_flame_line = false;
        self
    }

    /// Level most recently written to `id`.
    pub fn level(&self, id: ActuatorId) -> Option<bool> {
        self.writes
            .iter()
            .rev()
            .find(|(w, _)| *w == id)
            .map(|(_, on)| *on)
    }
}

impl SensorPort for MockHardware {
    fn read_gas_raw(&mut self) -> Result<u16, SensorError> {
        Ok(self.gas)
    }

    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        match self.fail_climate {
            Some(e) => Err(e),
            None => Ok(self.temperature_c),
        }
    }

    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        match self.fail_climate {
            Some(e) => Err(e),
            None => Ok(self.humidity_pct),
        }
    }

    fn read_flame_digital(&mut self) -> Result<bool, SensorError> {
        if let Some(e) = self.fail_flame {
            return Err(e);
        }
        Ok(self.flame_script.pop_front().unwrap_or(self.idle_flame_line))
    }

    fn settle(&mut self, ms: u32) {
        self.settle_ms += ms;
    }
}

impl ActuatorPort for MockHardware {
    fn set_output(&mut self, id: ActuatorId, on: bool) {
        self.writes.push((id, on));
    }
}

// ── Sinks ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

#[derive(Default)]
pub struct RecordingAlerts {
    pub sent: Vec<(String, String)>,
    pub fail_with: Option<SendError>,
}

impl AlertPort for RecordingAlerts {
    fn send(&mut self, recipient: &str, body: &str) -> Result<(), SendError> {
        if let Some(e) = self.fail_with {
            return Err(e);
        }
        self.sent.push((recipient.to_string(), body.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct MockDisplay {
    pub frames: Vec<(Reading, HazardState)>,
}

impl DisplayPort for MockDisplay {
    fn render(&mut self, reading: &Reading, hazard: &HazardState) {
        self.frames.push((*reading, *hazard));
    }
}

// ── Construction helpers ──────────────────────────────────────

/// Rate-limit clock that refills the bucket between any two calls.
pub fn racing_clock() -> Duration {
    static NOW: AtomicU64 = AtomicU64::new(0);
    Duration::from_secs(NOW.fetch_add(3600, Ordering::Relaxed))
}

/// Service with a rate limiter that never throttles.
#[allow(dead_code)]
pub fn service(config: SystemConfig) -> (AppService, Arc<SharedState>) {
    let shared = Arc::new(SharedState::new());
    let dispatcher = NotificationDispatcher::with_clock(&config, racing_clock);
    let app = AppService::with_dispatcher(config, Arc::clone(&shared), dispatcher);
    (app, shared)
}
