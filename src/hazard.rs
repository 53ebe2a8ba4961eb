//! Hazard evaluation.
//!
//! [`evaluate`] is a pure function from the latest [`Reading`] and the fixed
//! [`Thresholds`] to a [`HazardState`].  It has no memory of prior cycles;
//! the only cross-tick state in the system lives in the override registry,
//! the alert signaler, and the notification dispatcher.
//!
//! The ambient hazard is always the grouped OR of the three warnings.  It
//! is computed before any override gate is applied, so an override on one
//! actuator can never mask a warning for another.
//!
//! [`HazardCell`] is the single-slot, last-writer-wins handoff from the
//! evaluation task to the signaling task.

use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use serde::Serialize;

use crate::config::Thresholds;
use crate::sensors::{Reading, Sample};

/// Derived hazard flags for one evaluation tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HazardState {
    pub gas_warning: bool,
    pub temp_warning: bool,
    pub humidity_warning: bool,
    /// Set only from a debounce-confirmed flame reading.
    pub fire_alert: bool,
}

impl HazardState {
    /// No hazard of any kind.
    pub const CLEAR: Self = Self {
        gas_warning: false,
        temp_warning: false,
        humidity_warning: false,
        fire_alert: false,
    };

    /// `gas_warning OR temp_warning OR humidity_warning`.
    pub fn ambient(&self) -> bool {
        self.gas_warning || self.temp_warning || self.humidity_warning
    }

    /// True if any warning or the fire alert is active.
    pub fn any(&self) -> bool {
        self.ambient() || self.fire_alert
    }
}

/// Apply fixed thresholds to a reading.  Strictly-greater comparisons.
pub fn evaluate(reading: &Reading, thresholds: &Thresholds) -> HazardState {
    HazardState {
        gas_warning: reading.gas_level > thresholds.gas_max,
        temp_warning: reading.temperature_c > thresholds.temp_max_c,
        humidity_warning: reading.humidity_pct > thresholds.humidity_max_pct,
        fire_alert: reading.flame_present,
    }
}

/// Evaluate a per-channel [`Sample`].  A healthy channel is judged on
/// its fresh value; a faulted channel holds its flag from `held`.
pub fn evaluate_sample(sample: &Sample, thresholds: &Thresholds, held: &HazardState) -> HazardState {
    HazardState {
        gas_warning: sample
            .gas_level
            .map_or(held.gas_warning, |g| g > thresholds.gas_max),
        temp_warning: sample
            .temperature_c
            .map_or(held.temp_warning, |t| t > thresholds.temp_max_c),
        humidity_warning: sample
            .humidity_pct
            .map_or(held.humidity_warning, |h| h > thresholds.humidity_max_pct),
        fire_alert: sample.flame_present.unwrap_or(held.fire_alert),
    }
}

/// Last-writer-wins cell holding the most recently published [`HazardState`].
///
/// Reads and writes take a critical section for a copy of four bytes, so
/// neither side ever waits on the other's tick.
pub struct HazardCell {
    inner: Mutex<CriticalSectionRawMutex, Cell<HazardState>>,
}

impl HazardCell {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Cell::new(HazardState::CLEAR)),
        }
    }

    /// Replace the published state.
    pub fn publish(&self, state: HazardState) {
        self.inner.lock(|cell| cell.set(state));
    }

    /// Copy of the most recently published state.
    pub fn latest(&self) -> HazardState {
        self.inner.lock(Cell::get)
    }
}

impl Default for HazardCell {
    fn default() -> Self {
        Self::new()
    }
}
