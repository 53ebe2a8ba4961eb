//! Runtime diagnostics.
//!
//! The diagnostics task prints the last captured [`Reading`] and the flame
//! flag cached by the most recent evaluation tick.  It never samples the
//! sensors itself, so the printed flag is always the one hazard derivation
//! used.
//!
//! Heap figures are collected on demand; on the host they are synthetic.

use core::fmt;

use serde::Serialize;

use crate::notify::OutboxStats;
use crate::sensors::Reading;

/// Monotonic counters maintained by the application service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub eval_ticks: u64,
    pub sensor_faults: u32,
    pub alerts_sent: u32,
    pub alerts_failed: u32,
}

/// One diagnostics print.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DiagnosticsReport {
    pub uptime_secs: u64,
    pub reading: Reading,
    /// Flame flag from the latest evaluation tick, not a fresh sample.
    pub flame_detected: bool,
    pub sensor_ok: bool,
    pub counters: Counters,
    pub outbox: OutboxStats,
    pub heap_free: u32,
}

impl fmt::Display for DiagnosticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sensor Values:")?;
        writeln!(f, "Gas Level: {}", self.reading.gas_level)?;
        writeln!(f, "Temperature: {:.2}", self.reading.temperature_c)?;
        writeln!(f, "Humidity: {:.2}", self.reading.humidity_pct)?;
        writeln!(
            f,
            "Flame Detected: {}",
            if self.flame_detected { "Yes" } else { "No" }
        )?;
        if !self.sensor_ok {
            writeln!(f, "(sensor fault: values above are the last good reading)")?;
        }
        write!(
            f,
            "uptime={}s ticks={} faults={} alerts={}/{} outbox sent={} failed={} dropped={} heap={}",
            self.uptime_secs,
            self.counters.eval_ticks,
            self.counters.sensor_faults,
            self.counters.alerts_sent,
            self.counters.alerts_failed,
            self.outbox.sent,
            self.outbox.failed,
            self.outbox.dropped,
            self.heap_free,
        )
    }
}

/// Log a report, one record per line.
pub fn log_report(report: &DiagnosticsReport) {
    for line in report.to_string().lines() {
        log::info!("{line}");
    }
}

/// Free heap in bytes.
#[cfg(target_os = "espidf")]
pub fn heap_free() -> u32 {
    unsafe { esp_idf_svc::sys::esp_get_free_heap_size() }
}

/// Free heap in bytes.  Synthetic on the host so the same report paths run.
#[cfg(not(target_os = "espidf"))]
pub fn heap_free() -> u32 {
    300 * 1024
}

/// Install a panic hook that logs the reason before the default abort.
pub fn install_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        let reason = if let Some(msg) = info.payload().downcast_ref::<&str>() {
            *msg
        } else if let Some(msg) = info.payload().downcast_ref::<String>() {
            msg.as_str()
        } else {
            "unknown panic"
        };
        match info.location() {
            Some(loc) => log::error!("PANIC at {}:{}: {}", loc.file(), loc.line(), reason),
            None => log::error!("PANIC: {}", reason),
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(flame: bool, ok: bool) -> DiagnosticsReport {
        DiagnosticsReport {
            uptime_secs: 12,
            reading: Reading {
                gas_level: 812,
                temperature_c: 24.5,
                humidity_pct: 40.0,
                flame_present: flame,
            },
            flame_detected: flame,
            sensor_ok: ok,
            counters: Counters {
                eval_ticks: 6,
                ..Counters::default()
            },
            outbox: OutboxStats::default(),
            heap_free: heap_free(),
        }
    }

    #[test]
    fn report_prints_cached_fields() {
        let text = report(true, true).to_string();
        assert!(text.starts_with("Sensor Values:\nGas Level: 812\n"));
        assert!(text.contains("Temperature: 24.50"));
        assert!(text.contains("Flame Detected: Yes"));
        assert!(text.contains("ticks=6"));
        assert!(!text.contains("sensor fault"));
    }

    #[test]
    fn stale_reading_is_flagged() {
        let text = report(false, false).to_string();
        assert!(text.contains("Flame Detected: No"));
        assert!(text.contains("sensor fault"));
    }
}
