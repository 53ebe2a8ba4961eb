//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! Raised hazards and failures log at `warn`/`error`, everything else at
//! `info`.  Per-tick telemetry goes out at `debug` so the console is not
//! flooded every two seconds.

use log::{debug, error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                debug!(
                    "TELEM | #{} | G={} T={:.1}\u{00b0}C H={:.1}% flame={} | ok={} | \
                     pump={} co2={} hvac={} buzzer={:?}",
                    t.tick,
                    t.reading.gas_level,
                    t.reading.temperature_c,
                    t.reading.humidity_pct,
                    t.reading.flame_present,
                    t.sensor_ok,
                    t.outputs.pump_on,
                    t.outputs.suppression_on,
                    t.outputs.ventilation_on,
                    t.outputs.buzzer,
                );
            }
            AppEvent::Started => info!("START | firewatch"),
            AppEvent::SignalChanged { signal, on } => {
                info!("SIGNAL | V{} {:?} = {}", signal.virtual_pin(), signal, u8::from(*on));
            }
            AppEvent::HazardLogged { kind, message } => {
                error!("EVENT | {} | {}", kind.event_name(), message);
            }
            AppEvent::HazardCleared { kind } => info!("EVENT | {} cleared", kind.event_name()),
            AppEvent::OverrideChanged { actuator, value } => match value {
                Some(on) => info!("OVERRIDE | {:?} forced {}", actuator, u8::from(*on)),
                None => info!("OVERRIDE | {:?} automatic", actuator),
            },
            AppEvent::SensorFault { channel, error } => {
                warn!("FAULT | sensor {:?}: {}", channel, error)
            }
            AppEvent::AlertDispatched { kind } => info!("ALERT | {} queued", kind.event_name()),
            AppEvent::AlertFailed { kind, error } => {
                warn!("ALERT | {} dropped: {}", kind.event_name(), error);
            }
        }
    }
}
