//! System configuration parameters
//!
//! All tunable parameters for the Firewatch controller.  Defaults match the
//! installed board; values can be overridden from NVS.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Averaged gas ADC level above which the gas warning is raised.
pub const GAS_MAX: u16 = 4000;
/// Temperature (°C) above which the temperature warning is raised.
pub const TEMP_MAX_C: f32 = 30.0;
/// Relative humidity (%) above which the humidity warning is raised.
pub const HUMIDITY_MAX_PCT: f32 = 100.0;

/// Phone number alerts are sent to unless NVS says otherwise.
pub const DEFAULT_RECIPIENT: &str = "+1234567890";

/// Fixed text-alert recipient.
pub type Recipient = heapless::String<20>;

/// Fixed hazard thresholds consumed by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub gas_max: u16,
    pub temp_max_c: f32,
    pub humidity_max_pct: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            gas_max: GAS_MAX,
            temp_max_c: TEMP_MAX_C,
            humidity_max_pct: HUMIDITY_MAX_PCT,
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Hazard thresholds ---
    pub thresholds: Thresholds,

    // --- Sampling ---
    /// Raw gas reads averaged per evaluation tick
    pub gas_samples: u8,
    /// Settling delay between gas reads (milliseconds)
    pub gas_settle_ms: u32,
    /// Flame digital reads per vote
    pub flame_samples: u8,
    /// Reads that must report flame for the vote to pass
    pub flame_votes: u8,
    /// Settling delay between flame reads (milliseconds)
    pub flame_settle_ms: u32,
    /// Flame sensor pulls its output LOW when it sees a flame
    pub flame_active_low: bool,

    // --- Timing ---
    /// Evaluation tick period (milliseconds)
    pub eval_interval_ms: u32,
    /// Buzzer signaling tick period (milliseconds)
    pub signal_interval_ms: u32,
    /// Diagnostic print period (milliseconds)
    pub diagnostics_interval_ms: u32,
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,

    // --- Alerts ---
    /// SMS recipient for hazard alerts
    pub alert_recipient: Recipient,
    /// Re-send interval while a condition persists (seconds, 0 = never)
    pub alert_repeat_secs: u32,
    /// Token bucket capacity for outbound alerts
    pub alert_burst: u8,
    /// Token bucket refill rate (alerts per minute)
    pub alert_per_minute: u8,
    /// Upper bound on a single modem send (milliseconds)
    pub send_budget_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut alert_recipient = Recipient::new();
        let _ = alert_recipient.push_str(DEFAULT_RECIPIENT);

        Self {
            thresholds: Thresholds::default(),

            // Sampling
            gas_samples: 10,
            gas_settle_ms: 50, // 10 × 50 ms ≈ 500 ms averaging window
            flame_samples: 5,
            flame_votes: 3,
            flame_settle_ms: 50,
            flame_active_low: true,

            // Timing
            eval_interval_ms: 2000,
            signal_interval_ms: 1000,
            diagnostics_interval_ms: 5000,
            watchdog_timeout_ms: 10_000,

            // Alerts
            alert_recipient,
            alert_repeat_secs: 300,
            alert_burst: 3,
            alert_per_minute: 1,
            send_budget_ms: 2000,
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        if !(1..=4095).contains(&t.gas_max) {
            return Err(ConfigError::ValidationFailed("gas_max must be 1–4095"));
        }
        if !(0.0..=80.0).contains(&t.temp_max_c) {
            return Err(ConfigError::ValidationFailed("temp_max_c must be 0.0–80.0"));
        }
        if !(1.0..=100.0).contains(&t.humidity_max_pct) {
            return Err(ConfigError::ValidationFailed(
                "humidity_max_pct must be 1.0–100.0",
            ));
        }
        if !(1..=32).contains(&self.gas_samples) {
            return Err(ConfigError::ValidationFailed("gas_samples must be 1–32"));
        }
        if !(1..=15).contains(&self.flame_samples) {
            return Err(ConfigError::ValidationFailed("flame_samples must be 1–15"));
        }
        if u16::from(self.flame_votes) * 2 <= u16::from(self.flame_samples)
            || self.flame_votes > self.flame_samples
        {
            return Err(ConfigError::ValidationFailed(
                "flame_votes must be a strict majority of flame_samples",
            ));
        }
        if self.gas_settle_ms > 200 || self.flame_settle_ms > 200 {
            return Err(ConfigError::ValidationFailed("settle delays must be ≤ 200 ms"));
        }
        if !(500..=60_000).contains(&self.eval_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "eval_interval_ms must be 500–60000",
            ));
        }
        if !(50..=10_000).contains(&self.signal_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "signal_interval_ms must be 50–10000",
            ));
        }
        if self.diagnostics_interval_ms < self.eval_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "diagnostics_interval_ms must be ≥ eval_interval_ms",
            ));
        }
        if self.watchdog_timeout_ms <= self.eval_interval_ms + self.sampling_budget_ms() {
            return Err(ConfigError::ValidationFailed(
                "watchdog_timeout_ms must exceed one evaluation cycle",
            ));
        }
        if self.alert_recipient.is_empty() {
            return Err(ConfigError::ValidationFailed("alert_recipient must not be empty"));
        }
        if self.alert_burst == 0 || self.alert_per_minute == 0 {
            return Err(ConfigError::ValidationFailed(
                "alert_burst and alert_per_minute must be > 0",
            ));
        }
        if !(100..=10_000).contains(&self.send_budget_ms) {
            return Err(ConfigError::ValidationFailed("send_budget_ms must be 100–10000"));
        }
        Ok(())
    }

    /// Worst-case time spent in fixed settle delays per evaluation tick.
    pub fn sampling_budget_ms(&self) -> u32 {
        u32::from(self.gas_samples) * self.gas_settle_ms
            + u32::from(self.flame_samples) * self.flame_settle_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SystemConfig::default().validate().is_ok());
    }

    #[test]
    fn defaults_match_installation_constants() {
        let c = SystemConfig::default();
        assert_eq!(c.thresholds.gas_max, 4000);
        assert_eq!(c.gas_samples, 10);
        assert_eq!((c.flame_samples, c.flame_votes), (5, 3));
        assert_eq!(c.eval_interval_ms, 2000);
        assert_eq!(c.signal_interval_ms, 1000);
        assert_eq!(c.diagnostics_interval_ms, 5000);
        assert_eq!(c.alert_recipient.as_str(), DEFAULT_RECIPIENT);
    }

    #[test]
    fn timing_ratios_make_sense() {
        let c = SystemConfig::default();
        assert!(
            c.signal_interval_ms < c.eval_interval_ms,
            "signaling should tick faster than evaluation"
        );
        assert!(c.sampling_budget_ms() < c.eval_interval_ms);
    }

    #[test]
    fn non_majority_vote_is_rejected() {
        let c = SystemConfig {
            flame_votes: 2,
            ..SystemConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::ValidationFailed(_))));
    }

    #[test]
    fn out_of_range_threshold_is_rejected_not_clamped() {
        let mut c = SystemConfig::default();
        c.thresholds.temp_max_c = f32::MAX;
        assert!(c.validate().is_err());
        assert_eq!(c.thresholds.temp_max_c, f32::MAX);
    }

    #[test]
    fn serde_roundtrip() {
        let c = SystemConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: SystemConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c, c2);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = SystemConfig::default();
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: SystemConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c.alert_recipient, c2.alert_recipient);
        assert!((c.thresholds.temp_max_c - c2.thresholds.temp_max_c).abs() < 0.001);
    }
}
