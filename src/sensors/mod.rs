//! Sensor sampling: turns raw, noisy port reads into one [`Reading`].
//!
//! ```text
//!  read_gas_raw ×N ──▶ mean ───────────────┐
//!  read_temperature / read_humidity ───────┼──▶ Reading
//!  read_flame_digital ×M ──▶ K-of-M vote ──┘
//! ```
//!
//! Averaging smooths transient gas spikes.  The flame vote is a debounce
//! filter: a single flickering sample can never assert presence.  Neither
//! filter carries memory between invocations.
//!
//! Every channel is read on every pass.  A fault on one channel is recorded
//! in the [`Sample`] and never stops the others from being read, so a dead
//! climate probe cannot hide a flame.

use serde::Serialize;

use crate::app::ports::SensorPort;
use crate::config::SystemConfig;
use crate::error::SensorError;

/// Full scale of the 12-bit gas ADC.
pub const GAS_ADC_MAX: u16 = 4095;

/// Plausible range for the climate probe.
const TEMP_RANGE_C: core::ops::RangeInclusive<f32> = -40.0..=125.0;
const HUMIDITY_RANGE_PCT: core::ops::RangeInclusive<f32> = 0.0..=100.0;

/// A point-in-time capture of every hazard input.
///
/// Produced once per evaluation tick and superseded by the next one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Reading {
    /// Mean of `gas_samples` raw ADC conversions.
    pub gas_level: u16,
    pub temperature_c: f32,
    pub humidity_pct: f32,
    /// Debounce-confirmed flame presence.
    pub flame_present: bool,
}

/// Hazard input channels, in sampling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorChannel {
    Gas,
    Temperature,
    Humidity,
    Flame,
}

/// Per-channel outcome of one sampling pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub gas_level: Result<u16, SensorError>,
    pub temperature_c: Result<f32, SensorError>,
    pub humidity_pct: Result<f32, SensorError>,
    pub flame_present: Result<bool, SensorError>,
}

impl Sample {
    /// The full reading, or the first channel fault.
    pub fn reading(&self) -> Result<Reading, SensorError> {
        Ok(Reading {
            gas_level: self.gas_level?,
            temperature_c: self.temperature_c?,
            humidity_pct: self.humidity_pct?,
            flame_present: self.flame_present?,
        })
    }

    /// Copy every healthy channel into `last`; faulted channels keep their
    /// last good value.
    pub fn merge_into(&self, last: &mut Reading) {
        if let Ok(v) = self.gas_level {
            last.gas_level = v;
        }
        if let Ok(v) = self.temperature_c {
            last.temperature_c = v;
        }
        if let Ok(v) = self.humidity_pct {
            last.humidity_pct = v;
        }
        if let Ok(v) = self.flame_present {
            last.flame_present = v;
        }
    }

    /// Faulted channels, in sampling order.
    pub fn faults(&self) -> impl Iterator<Item = (SensorChannel, SensorError)> {
        [
            (SensorChannel::Gas, self.gas_level.err()),
            (SensorChannel::Temperature, self.temperature_c.err()),
            (SensorChannel::Humidity, self.humidity_pct.err()),
            (SensorChannel::Flame, self.flame_present.err()),
        ]
        .into_iter()
        .filter_map(|(channel, err)| err.map(|e| (channel, e)))
    }

    pub fn is_healthy(&self) -> bool {
        self.faults().next().is_none()
    }
}

/// Stateless sampler parameterised from [`SystemConfig`].
#[derive(Debug, Clone)]
pub struct SensorSampler {
    gas_samples: u8,
    gas_settle_ms: u32,
    flame_samples: u8,
    flame_votes: u8,
    flame_settle_ms: u32,
    flame_active_low: bool,
}

impl SensorSampler {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            gas_samples: config.gas_samples.max(1),
            gas_settle_ms: config.gas_settle_ms,
            flame_samples: config.flame_samples.max(1),
            flame_votes: config.flame_votes,
            flame_settle_ms: config.flame_settle_ms,
            flame_active_low: config.flame_active_low,
        }
    }

    /// Read every channel once.  Each channel succeeds or fails on its own.
    pub fn sample(&self, port: &mut impl SensorPort) -> Sample {
        Sample {
            gas_level: self.average_gas(port),
            temperature_c: port
                .read_temperature()
                .and_then(|t| checked(t, TEMP_RANGE_C)),
            humidity_pct: port
                .read_humidity()
                .and_then(|h| checked(h, HUMIDITY_RANGE_PCT)),
            flame_present: self.confirm_flame(port),
        }
    }

    /// Arithmetic mean of `gas_samples` reads, each followed by the
    /// settling delay.
    pub fn average_gas(&self, port: &mut impl SensorPort) -> Result<u16, SensorError> {
        let mut total: u32 = 0;
        for _ in 0..self.gas_samples {
            let raw = port.read_gas_raw()?;
            if raw > GAS_ADC_MAX {
                return Err(SensorError::OutOfRange);
            }
            total += u32::from(raw);
            port.settle(self.gas_settle_ms);
        }
        Ok((total / u32::from(self.gas_samples)) as u16)
    }

    /// Majority vote over `flame_samples` digital reads.
    pub fn confirm_flame(&self, port: &mut impl SensorPort) -> Result<bool, SensorError> {
        let mut detections: u8 = 0;
        for _ in 0..self.flame_samples {
            let high = port.read_flame_digital()?;
            if high != self.flame_active_low {
                detections += 1;
            }
            port.settle(self.flame_settle_ms);
        }
        Ok(detections >= self.flame_votes)
    }
}

/// Reject NaN and physically implausible values.
fn checked(value: f32, range: core::ops::RangeInclusive<f32>) -> Result<f32, SensorError> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(SensorError::OutOfRange)
    }
}
