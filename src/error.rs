//! Error types for the Firewatch firmware.
//!
//! All variants are `Copy`: errors are logged, counted and carried inside
//! [`AppEvent`](crate::app::events::AppEvent)s by value.  Configuration
//! errors live with their port in [`crate::app::ports`].
//!
//! No error is fatal.  A sensor error holds one channel's hazard flag for
//! one tick; a send error drops one alert.  The scheduler keeps running.

use core::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SensorError {
    /// ADC read returned an error.
    AdcReadFailed,
    /// GPIO read returned an error.
    GpioReadFailed,
    /// The climate probe did not answer within its response window.
    ClimateTimeout,
    /// The climate probe frame failed its checksum.
    ChecksumMismatch,
    /// Reading is outside the physically plausible range (or NaN).
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
            Self::ClimateTimeout => write!(f, "climate probe timed out"),
            Self::ChecksumMismatch => write!(f, "climate frame checksum mismatch"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl core::error::Error for SensorError {}

// ---------------------------------------------------------------------------
// Send errors
// ---------------------------------------------------------------------------

/// Outbound alert failures.  Never retried; the caller logs and moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SendError {
    /// The bounded outbox is full; the alert was dropped.
    QueueFull,
    /// The alert token bucket is empty.
    RateLimited,
    /// The modem link rejected a write.
    LinkFailed,
    /// The send exceeded its time budget.
    Timeout,
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueFull => write!(f, "alert outbox full"),
            Self::RateLimited => write!(f, "alert rate limit reached"),
            Self::LinkFailed => write!(f, "modem link write failed"),
            Self::Timeout => write!(f, "send budget exceeded"),
        }
    }
}

impl core::error::Error for SendError {}
