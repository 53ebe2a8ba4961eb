//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  This is the remote status
//! channel: `SignalChanged` is the dashboard `publish(signal, level)` and
//! `HazardLogged` is its `logEvent(kind, message)`.  Adapters on the other
//! side decide what to do with them: serial log, JSON dashboard feed, etc.

use serde::Serialize;

use crate::actuation::ActuatorOutputs;
use crate::app::ports::ActuatorId;
use crate::error::{SendError, SensorError};
use crate::hazard::HazardState;
use crate::notify::AlertKind;
use crate::overrides::OverrideState;
use crate::sensors::{Reading, SensorChannel};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// The application service has started.
    Started,

    /// Per-tick snapshot for logging or dashboards.
    Telemetry(TelemetryData),

    /// A dashboard status signal changed level.
    SignalChanged { signal: SignalId, on: bool },

    /// A hazard condition was newly raised.
    HazardLogged {
        kind: AlertKind,
        message: &'static str,
    },

    /// A hazard condition cleared.
    HazardCleared { kind: AlertKind },

    /// An operator override was applied or cleared.
    OverrideChanged {
        actuator: ActuatorId,
        value: Option<bool>,
    },

    /// One input channel failed; its hazard flag is held.
    SensorFault {
        channel: SensorChannel,
        error: SensorError,
    },

    /// A text alert was handed to the alert port.
    AlertDispatched { kind: AlertKind },

    /// A text alert could not be handed off.  Never retried.
    AlertFailed { kind: AlertKind, error: SendError },
}

/// Dashboard signals, one virtual pin each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalId {
    Ventilation,
    Suppression,
    Pump,
    SensorHealthy,
}

impl SignalId {
    /// Dashboard virtual pin number.
    pub fn virtual_pin(self) -> u8 {
        match self {
            Self::Ventilation => 1,
            Self::Suppression => 2,
            Self::Pump => 3,
            Self::SensorHealthy => 4,
        }
    }
}

impl From<ActuatorId> for SignalId {
    fn from(id: ActuatorId) -> Self {
        match id {
            ActuatorId::Pump => Self::Pump,
            ActuatorId::Suppression => Self::Suppression,
            ActuatorId::Ventilation => Self::Ventilation,
        }
    }
}

/// A point-in-time snapshot of one evaluation tick.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TelemetryData {
    pub tick: u64,
    /// Last known-good value per channel (stale for faulted channels).
    pub reading: Reading,
    pub sensor_ok: bool,
    pub hazard: HazardState,
    pub overrides: OverrideState,
    pub outputs: ActuatorOutputs,
}
