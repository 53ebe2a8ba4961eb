//! DHT11 single-wire temperature / humidity probe.
//!
//! Bit-banged over one open-drain GPIO using `embedded-hal` traits:
//!
//! ```text
//! host:   ‾‾‾\___18ms___/‾‾‾ (release)
//! probe:                     \_80us_/‾80us‾\ 40 × [ \_50us_/‾26us (0) | ‾70us (1) ]
//! ```
//!
//! Frame: `RH int, RH dec, T int, T dec, checksum` where the checksum is
//! the low byte of the sum of the first four.
//!
//! Phase lengths are measured against a monotonic clock, so GPIO read
//! overhead in the polling loop does not skew the bit decision.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::adapters::time::uptime;
use crate::error::SensorError;

/// Start-signal low time.
const START_LOW_MS: u32 = 18;
/// Longest any single phase may last before the read is abandoned.
const PHASE_TIMEOUT_US: u32 = 100;
/// A high phase longer than this is a `1` bit.
const ONE_THRESHOLD_US: u32 = 40;

/// One decoded measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateSample {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Decode and verify a raw 5-byte frame.
pub fn decode_frame(frame: [u8; 5]) -> Result<ClimateSample, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::ChecksumMismatch);
    }
    let humidity_pct = f32::from(frame[0]) + f32::from(frame[1]) / 10.0;
    let magnitude = f32::from(frame[2]) + f32::from(frame[3] & 0x7f) / 10.0;
    let temperature_c = if frame[3] & 0x80 != 0 {
        -magnitude
    } else {
        magnitude
    };
    Ok(ClimateSample {
        temperature_c,
        humidity_pct,
    })
}

pub struct Dht11<P, D> {
    pin: P,
    delay: D,
    clock: fn() -> Duration,
}

impl<P, D> Dht11<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    /// `pin` must be configured open-drain with a pull-up.
    pub fn new(pin: P, delay: D) -> Self {
        Self::with_clock(pin, delay, uptime)
    }

    /// As [`new`](Self::new), timing phases with `clock`.
    pub fn with_clock(pin: P, delay: D, clock: fn() -> Duration) -> Self {
        Self { pin, delay, clock }
    }

    /// Run one full measurement.
    pub fn read(&mut self) -> Result<ClimateSample, SensorError> {
        decode_frame(self.read_frame()?)
    }

    fn read_frame(&mut self) -> Result<[u8; 5], SensorError> {
        self.pin.set_low().map_err(|_| SensorError::GpioReadFailed)?;
        self.delay.delay_ms(START_LOW_MS);
        self.pin.set_high().map_err(|_| SensorError::GpioReadFailed)?;

        // Response: low then high, then the first bit's low phase.
        self.wait_while(true)?;
        self.wait_while(false)?;
        self.wait_while(true)?;

        let mut frame = [0u8; 5];
        for bit in 0..40 {
            self.wait_while(false)?;
            let high_us = self.wait_while(true)?;
            if high_us > ONE_THRESHOLD_US {
                frame[bit / 8] |= 0x80 >> (bit % 8);
            }
        }
        Ok(frame)
    }

    /// Spin while the line reads `level`.  Returns the time spent in µs.
    fn wait_while(&mut self, level: bool) -> Result<u32, SensorError> {
        let start = (self.clock)();
        loop {
            let high = self.pin.is_high().map_err(|_| SensorError::GpioReadFailed)?;
            let elapsed = (self.clock)().saturating_sub(start).as_micros() as u32;
            if high != level {
                return Ok(elapsed);
            }
            if elapsed >= PHASE_TIMEOUT_US {
                return Err(SensorError::ClimateTimeout);
            }
        }
    }
}
