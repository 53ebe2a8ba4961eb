//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! [`HardwareAdapter`] owns the gas ADC, the climate probe, the flame input,
//! the three actuator outputs and the settle delay, and exposes them
//! through [`SensorPort`] and [`ActuatorPort`].  The buzzer is a separate
//! [`BuzzerAdapter`] so the signaling thread can own it outright.
//!
//! Everything is generic over `embedded-hal` traits plus two small
//! capability traits ([`AnalogInput`], [`ClimateSource`]) so the same
//! adapter runs against ESP-IDF drivers on target and fakes on the host.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::{ActuatorId, ActuatorPort, BuzzerPort, SensorPort};
use crate::drivers::dht11::{ClimateSample, Dht11};
use crate::drivers::output_latch::OutputLatch;
use crate::error::SensorError;

/// One-shot analog conversion.
pub trait AnalogInput {
    fn read_raw(&mut self) -> Result<u16, SensorError>;
}

/// Any conversion closure, e.g. one wrapping an ESP-IDF ADC channel.
impl<F> AnalogInput for F
where
    F: FnMut() -> Result<u16, SensorError>,
{
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        self()
    }
}

/// A combined temperature / humidity probe.
pub trait ClimateSource {
    fn measure(&mut self) -> Result<ClimateSample, SensorError>;
}

impl<P, D> ClimateSource for Dht11<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn measure(&mut self) -> Result<ClimateSample, SensorError> {
        self.read()
    }
}

/// Concrete adapter that combines all evaluation-side hardware.
pub struct HardwareAdapter<A, C, F, O, D>
where
    O: OutputPin,
{
    gas: A,
    climate: C,
    flame: F,
    pump: OutputLatch<O>,
    co2: OutputLatch<O>,
    hvac: OutputLatch<O>,
    delay: D,
    /// Temperature and humidity come from one probe measurement; the
    /// humidity read consumes the outcome the temperature read took.
    pending_climate: Option<Result<ClimateSample, SensorError>>,
}

impl<A, C, F, O, D> HardwareAdapter<A, C, F, O, D>
where
    A: AnalogInput,
    C: ClimateSource,
    F: InputPin,
    O: OutputPin,
    D: DelayNs,
{
    pub fn new(gas: A, climate: C, flame: F, pump: O, co2: O, hvac: O, delay: D) -> Self {
        Self {
            gas,
            climate,
            flame,
            pump: OutputLatch::new(pump, "pump"),
            co2: OutputLatch::new(co2, "co2"),
            hvac: OutputLatch::new(hvac, "hvac"),
            delay,
            pending_climate: None,
        }
    }

    fn latch(&mut self, id: ActuatorId) -> &mut OutputLatch<O> {
        match id {
            ActuatorId::Pump => &mut self.pump,
            ActuatorId::Suppression => &mut self.co2,
            ActuatorId::Ventilation => &mut self.hvac,
        }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<A, C, F, O, D> SensorPort for HardwareAdapter<A, C, F, O, D>
where
    A: AnalogInput,
    C: ClimateSource,
    F: InputPin,
    O: OutputPin,
    D: DelayNs,
{
    fn read_gas_raw(&mut self) -> Result<u16, SensorError> {
        self.gas.read_raw()
    }

    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        let outcome = self.climate.measure();
        self.pending_climate = Some(outcome);
        outcome.map(|s| s.temperature_c)
    }

    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        let outcome = match self.pending_climate.take() {
            Some(outcome) => outcome,
            None => self.climate.measure(),
        };
        outcome.map(|s| s.humidity_pct)
    }

    fn read_flame_digital(&mut self) -> Result<bool, SensorError> {
        self.flame.is_high().map_err(|_| SensorError::GpioReadFailed)
    }

    fn settle(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<A, C, F, O, D> ActuatorPort for HardwareAdapter<A, C, F, O, D>
where
    A: AnalogInput,
    C: ClimateSource,
    F: InputPin,
    O: OutputPin,
    D: DelayNs,
{
    fn set_output(&mut self, id: ActuatorId, on: bool) {
        self.latch(id).set(on);
    }
}

/// Buzzer line owned by the signaling thread.
pub struct BuzzerAdapter<P: OutputPin> {
    line: OutputLatch<P>,
}

impl<P: OutputPin> BuzzerAdapter<P> {
    pub fn new(pin: P) -> Self {
        Self {
            line: OutputLatch::new(pin, "buzzer"),
        }
    }
}

impl<P: OutputPin> BuzzerPort for BuzzerAdapter<P> {
    fn set_buzzer(&mut self, on: bool) {
        self.line.set(on);
    }
}
