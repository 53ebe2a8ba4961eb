//! Manual override registry.
//!
//! Holds one optional forced level per actuator.  `None` returns the
//! actuator to automatic control; `Some(v)` forces it to `v` until the next
//! explicit command.  Overrides never expire.
//!
//! Pump and suppression valve are a linked pair: a command for either one
//! sets both, so the two are always driven identically.
//!
//! The registry is shared between the command listener and the evaluation
//! task.  Each access copies the whole [`OverrideState`] inside a critical
//! section, so a reader never observes a half-applied command.

use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::info;
use serde::Serialize;

use crate::app::ports::ActuatorId;

/// Per-actuator manual overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OverrideState {
    pub pump: Option<bool>,
    pub suppression: Option<bool>,
    pub ventilation: Option<bool>,
}

impl OverrideState {
    /// Everything under automatic control.
    pub const AUTOMATIC: Self = Self {
        pump: None,
        suppression: None,
        ventilation: None,
    };

    pub fn get(&self, actuator: ActuatorId) -> Option<bool> {
        match actuator {
            ActuatorId::Pump => self.pump,
            ActuatorId::Suppression => self.suppression,
            ActuatorId::Ventilation => self.ventilation,
        }
    }

    /// Apply one command, honouring the pump/suppression link.
    pub fn with(mut self, actuator: ActuatorId, value: Option<bool>) -> Self {
        match actuator {
            ActuatorId::Pump | ActuatorId::Suppression => {
                self.pump = value;
                self.suppression = value;
            }
            ActuatorId::Ventilation => self.ventilation = value,
        }
        self
    }
}

/// Thread-safe holder of the current [`OverrideState`].
pub struct OverrideRegistry {
    state: Mutex<CriticalSectionRawMutex, Cell<OverrideState>>,
}

impl OverrideRegistry {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(OverrideState::AUTOMATIC)),
        }
    }

    /// Set or clear the override for `actuator`.  Takes effect on the next
    /// evaluation tick.  Returns the state after the change.
    pub fn set_override(&self, actuator: ActuatorId, value: Option<bool>) -> OverrideState {
        let next = self.state.lock(|cell| {
            let next = cell.get().with(actuator, value);
            cell.set(next);
            next
        });
        match value {
            Some(on) => info!("Override: {:?} forced {}", actuator, if on { "ON" } else { "OFF" }),
            None => info!("Override: {:?} returned to automatic", actuator),
        }
        next
    }

    /// Current override for one actuator.
    pub fn get(&self, actuator: ActuatorId) -> Option<bool> {
        self.snapshot().get(actuator)
    }

    /// Consistent copy of every override, taken once per evaluation tick.
    pub fn snapshot(&self) -> OverrideState {
        self.state.lock(Cell::get)
    }
}

impl Default for OverrideRegistry {
    fn default() -> Self {
        Self::new()
    }
}
