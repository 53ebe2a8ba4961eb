//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, display, status channel, SMS modem,
//! storage) implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly and every hazard path can be exercised with mocks.

use serde::Serialize;

use crate::config::SystemConfig;
use crate::error::{SendError, SensorError};
use crate::hazard::HazardState;
use crate::sensors::Reading;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Raw sensor access.  Averaging and debounce live in
/// [`SensorSampler`](crate::sensors::SensorSampler), not here.
pub trait SensorPort {
    /// One raw gas ADC conversion (12-bit).
    fn read_gas_raw(&mut self) -> Result<u16, SensorError>;

    /// Ambient temperature in °C.
    fn read_temperature(&mut self) -> Result<f32, SensorError>;

    /// Relative humidity in %.
    fn read_humidity(&mut self) -> Result<f32, SensorError>;

    /// Raw flame sensor line level (`true` = HIGH).  Polarity is applied
    /// by the sampler from `SystemConfig::flame_active_low`.
    fn read_flame_digital(&mut self) -> Result<bool, SensorError>;

    /// Block for the fixed inter-read settling delay.
    fn settle(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Actuator ports (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Physical outputs driven by the evaluation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorId {
    /// Water pump.
    Pump,
    /// CO2 suppression valve (and its indicator LED).
    Suppression,
    /// HVAC ventilation.
    Ventilation,
}

impl ActuatorId {
    pub const ALL: [ActuatorId; 3] = [Self::Pump, Self::Suppression, Self::Ventilation];
}

/// Write-side port for the evaluation tick.
///
/// Implementations must be idempotent: writing the level an output already
/// has must not produce a physical transition.
pub trait ActuatorPort {
    fn set_output(&mut self, id: ActuatorId, on: bool);
}

/// Write-side port for the signaling tick.  Owned by the signaling task
/// alone so it never contends with the evaluation tick.
pub trait BuzzerPort {
    fn set_buzzer(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Display port
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget local display.
pub trait DisplayPort {
    fn render(&mut self, reading: &Reading, hazard: &HazardState);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → remote status channel)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log, JSON
/// dashboard feed, etc.).  Delivery is best-effort.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

/// Fan one event stream out to two sinks, e.g. serial log plus dashboard.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: &super::events::AppEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Text alert port (driven adapter: domain → SMS)
// ───────────────────────────────────────────────────────────────

/// Short-message channel.  One bounded attempt per call, no retry.
pub trait AlertPort {
    fn send(&mut self, recipient: &str, body: &str) -> Result<(), SendError>;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST call [`SystemConfig::validate`] before persisting.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`ConfigError::NotFound`] if nothing has been stored yet.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from the runtime)
// ───────────────────────────────────────────────────────────────

/// Callback the [`Scheduler`](crate::scheduler::Scheduler) invokes when a
/// periodic task is due.  The scheduler itself knows nothing about sensors,
/// actuators, or threads.
pub trait SchedulerDelegate {
    fn on_task_due(&mut self, label: &str, task: TaskKind);
}

/// Periodic tasks known to the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Sample → evaluate → actuate → notify.
    Evaluate,
    /// Advance the buzzer pattern.
    Signal,
    /// Print the cached reading for observability.
    Diagnostics,
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
