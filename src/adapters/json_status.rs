//! JSON status-channel adapter.
//!
//! Renders every [`AppEvent`] as one JSON object per line and hands the
//! line to a publish callback (UART dashboard bridge on target, a buffer
//! in tests).  Per-tick telemetry can be thinned with `telemetry_every`.
//!
//! ```text
//! {"event":"signal_changed","signal":"ventilation","on":true}
//! {"event":"hazard_logged","kind":"gas_warning","message":"Gas levels exceeded threshold"}
//! ```

use log::warn;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

pub struct JsonStatusSink<F: FnMut(&str)> {
    publish: F,
    telemetry_every: u64,
}

impl<F: FnMut(&str)> JsonStatusSink<F> {
    pub fn new(publish: F) -> Self {
        Self {
            publish,
            telemetry_every: 1,
        }
    }

    /// Only forward every `n`th telemetry snapshot (`0` drops them all).
    pub fn telemetry_every(mut self, n: u64) -> Self {
        self.telemetry_every = n;
        self
    }
}

impl<F: FnMut(&str)> EventSink for JsonStatusSink<F> {
    fn emit(&mut self, event: &AppEvent) {
        if let AppEvent::Telemetry(t) = event {
            if self.telemetry_every == 0 || t.tick % self.telemetry_every != 0 {
                return;
            }
        }
        match serde_json::to_string(event) {
            Ok(line) => (self.publish)(&line),
            Err(e) => warn!("status: event not serialisable: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuation::ActuatorOutputs;
    use crate::app::events::{SignalId, TelemetryData};
    use crate::app::ports::ActuatorId;
    use crate::error::SensorError;
    use crate::hazard::HazardState;
    use crate::notify::AlertKind;
    use crate::overrides::OverrideState;
    use crate::sensors::{Reading, SensorChannel};

    fn collect(events: &[AppEvent], every: u64) -> Vec<String> {
        let mut lines = Vec::new();
        {
            let mut sink = JsonStatusSink::new(|l: &str| lines.push(l.to_string())).telemetry_every(every);
            for e in events {
                sink.emit(e);
            }
        }
        lines
    }

    #[test]
    fn events_are_tagged_snake_case() {
        let lines = collect(
            &[
                AppEvent::SignalChanged {
                    signal: SignalId::Ventilation,
                    on: true,
                },
                AppEvent::HazardLogged {
                    kind: AlertKind::GasWarning,
                    message: AlertKind::GasWarning.log_message(),
                },
                AppEvent::OverrideChanged {
                    actuator: ActuatorId::Pump,
                    value: None,
                },
                AppEvent::SensorFault {
                    channel: SensorChannel::Temperature,
                    error: SensorError::ChecksumMismatch,
                },
            ],
            1,
        );
        assert_eq!(
            lines[0],
            r#"{"event":"signal_changed","signal":"ventilation","on":true}"#
        );
        assert_eq!(
            lines[1],
            r#"{"event":"hazard_logged","kind":"gas_warning","message":"Gas levels exceeded threshold"}"#
        );
        assert_eq!(
            lines[2],
            r#"{"event":"override_changed","actuator":"pump","value":null}"#
        );
        assert_eq!(
            lines[3],
            r#"{"event":"sensor_fault","channel":"temperature","error":"ChecksumMismatch"}"#
        );
    }

    #[test]
    fn telemetry_is_thinned() {
        let tick = |n| {
            AppEvent::Telemetry(TelemetryData {
                tick: n,
                reading: Reading::default(),
                sensor_ok: true,
                hazard: HazardState::CLEAR,
                overrides: OverrideState::AUTOMATIC,
                outputs: ActuatorOutputs::SAFE,
            })
        };
        let events: Vec<AppEvent> = (1..=6).map(tick).collect();
        assert_eq!(collect(&events, 3).len(), 2);
        assert_eq!(collect(&events, 0).len(), 0);
        let line = &collect(&events[..1], 1)[0];
        assert!(line.starts_with(r#"{"event":"telemetry","tick":1,"#));
    }
}
