//! Monotonic time.
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()` (µs since
//!   boot).
//! - otherwise: `std::time::Instant` from first use, for host tests.

use core::time::Duration;

/// Time since boot.
#[cfg(target_os = "espidf")]
pub fn uptime() -> Duration {
    // SAFETY: reads the high-resolution timer; no preconditions.
    let us = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
    Duration::from_micros(us as u64)
}

/// Time since first call.
#[cfg(not(target_os = "espidf"))]
pub fn uptime() -> Duration {
    use std::time::Instant;
    static START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
    START.get_or_init(Instant::now).elapsed()
}

/// Uptime with one "second" per real minute.  Drives the alert token
/// bucket so its refill rate reads as alerts per minute.
pub fn alert_clock() -> Duration {
    Duration::from_micros((uptime().as_micros() / 60) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_clock_runs_sixty_times_slower() {
        let scaled = alert_clock();
        assert!(scaled.as_micros() * 60 <= uptime().as_micros());
    }
}
