//! Notification dispatcher and alert outbox.
//!
//! Text alerts are edge-triggered: a kind is sent when its condition
//! becomes true, then re-sent as a reminder every `alert_repeat_secs` while
//! it holds.  Ambient kinds draw from one global token bucket; fire alerts
//! are never rate limited.
//!
//! Sends are handed to [`AlertOutbox`], a bounded channel drained by a
//! worker thread that owns the modem.  A full outbox drops the alert with
//! [`SendError::QueueFull`].  Nothing is ever retried.

use core::fmt::Write;
use core::sync::atomic::{AtomicU32, Ordering};
use core::time::Duration;

use burster::Limiter;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::String;
use log::{error, info, warn};
use serde::Serialize;

use crate::app::events::AppEvent;
use crate::app::ports::{AlertPort, EventSink};
use crate::config::{Recipient, SystemConfig};
use crate::error::SendError;
use crate::hazard::HazardState;
use crate::sensors::Reading;

/// Short-message body.
pub type AlertBody = String<160>;

/// Qualifying alert conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    GasWarning,
    TempWarning,
    HumidityWarning,
    #[serde(rename = "fire_alert")]
    Fire,
}

impl AlertKind {
    pub const ALL: [AlertKind; 4] = [
        Self::GasWarning,
        Self::TempWarning,
        Self::HumidityWarning,
        Self::Fire,
    ];

    /// Status-channel event name.
    pub fn event_name(self) -> &'static str {
        match self {
            Self::GasWarning => "gas_warning",
            Self::TempWarning => "temp_warning",
            Self::HumidityWarning => "humidity_warning",
            Self::Fire => "fire_alert",
        }
    }

    /// Status-channel log text.
    pub fn log_message(self) -> &'static str {
        match self {
            Self::GasWarning => "Gas levels exceeded threshold",
            Self::TempWarning => "Temperature exceeded threshold!",
            Self::HumidityWarning => "Humidity exceeded threshold!",
            Self::Fire => "Fire detected! Immediate action required!",
        }
    }

    /// Leading tag of the text alert.
    pub fn tag(self) -> &'static str {
        match self {
            Self::GasWarning => "GAS WARNING",
            Self::TempWarning => "TEMP WARNING",
            Self::HumidityWarning => "HUMIDITY WARNING",
            Self::Fire => "FIRE",
        }
    }

    pub fn active(self, hazard: &HazardState) -> bool {
        match self {
            Self::GasWarning => hazard.gas_warning,
            Self::TempWarning => hazard.temp_warning,
            Self::HumidityWarning => hazard.humidity_warning,
            Self::Fire => hazard.fire_alert,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Format the text alert for `kind`.  Over-long bodies are truncated.
pub fn compose(kind: AlertKind, reading: &Reading) -> AlertBody {
    let mut body = AlertBody::new();
    let _ = write!(
        body,
        "{} detected! Take action immediately. G:{} T:{:.1}C H:{:.1}%",
        kind.tag(),
        reading.gas_level,
        reading.temperature_c,
        reading.humidity_pct
    );
    body
}

/// What one [`NotificationDispatcher::dispatch`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub sent: u8,
    pub failed: u8,
}

/// Per-kind edge detection, reminders and rate limiting.
pub struct NotificationDispatcher {
    recipient: Recipient,
    tick: u64,
    repeat_ticks: u64,
    active: [bool; 4],
    last_sent: [u64; 4],
    bucket: burster::TokenBucket<fn() -> Duration>,
}

impl NotificationDispatcher {
    pub fn new(config: &SystemConfig) -> Self {
        Self::with_clock(config, crate::adapters::time::alert_clock)
    }

    /// Build with a custom bucket clock.  One clock second is one refill
    /// period, so `alert_per_minute` maps onto a minute-scaled clock.
    pub fn with_clock(config: &SystemConfig, clock: fn() -> Duration) -> Self {
        let repeat_ticks = if config.alert_repeat_secs == 0 {
            0
        } else {
            (u64::from(config.alert_repeat_secs) * 1000)
                .div_ceil(u64::from(config.eval_interval_ms))
                .max(1)
        };
        Self {
            recipient: config.alert_recipient.clone(),
            tick: 0,
            repeat_ticks,
            active: [false; 4],
            last_sent: [0; 4],
            bucket: burster::TokenBucket::new_with_time_provider(
                u64::from(config.alert_per_minute),
                u64::from(config.alert_burst),
                clock,
            ),
        }
    }

    /// Run once per evaluation tick, after actuation.
    pub fn dispatch(
        &mut self,
        hazard: &HazardState,
        reading: &Reading,
        alerts: &mut impl AlertPort,
        sink: &mut impl EventSink,
    ) -> DispatchOutcome {
        self.tick += 1;
        let mut outcome = DispatchOutcome::default();

        for kind in AlertKind::ALL {
            let idx = kind.index();
            let now_active = kind.active(hazard);
            let was_active = self.active[idx];
            self.active[idx] = now_active;

            let due = if now_active && !was_active {
                error!("{}: {}", kind.event_name(), kind.log_message());
                sink.emit(&AppEvent::HazardLogged {
                    kind,
                    message: kind.log_message(),
                });
                true
            } else if now_active {
                self.repeat_ticks != 0 && self.tick - self.last_sent[idx] >= self.repeat_ticks
            } else {
                if was_active {
                    info!("{} cleared", kind.event_name());
                    sink.emit(&AppEvent::HazardCleared { kind });
                }
                false
            };

            if !due {
                continue;
            }
            self.last_sent[idx] = self.tick;
            let body = compose(kind, reading);
            match self.notify(kind, &body, alerts) {
                Ok(()) => {
                    outcome.sent += 1;
                    sink.emit(&AppEvent::AlertDispatched { kind });
                }
                Err(e) => {
                    outcome.failed += 1;
                    warn!("Alert {} dropped: {}", kind.event_name(), e);
                    sink.emit(&AppEvent::AlertFailed { kind, error: e });
                }
            }
        }
        outcome
    }

    /// One best-effort send.  No retry.
    pub fn notify(
        &mut self,
        kind: AlertKind,
        message: &str,
        alerts: &mut impl AlertPort,
    ) -> Result<(), SendError> {
        if kind != AlertKind::Fire && self.bucket.try_consume(1).is_err() {
            return Err(SendError::RateLimited);
        }
        alerts.send(&self.recipient, message)
    }
}

// ───────────────────────────────────────────────────────────────
// Outbox
// ───────────────────────────────────────────────────────────────

/// Depth of the alert outbox.
pub const OUTBOX_DEPTH: usize = 4;

/// One queued text alert.
#[derive(Debug, Clone)]
pub struct OutboundAlert {
    pub recipient: Recipient,
    pub body: AlertBody,
}

/// Bounded handoff from the evaluation task to the alert worker.
pub struct AlertOutbox {
    channel: Channel<CriticalSectionRawMutex, OutboundAlert, OUTBOX_DEPTH>,
    sent: AtomicU32,
    failed: AtomicU32,
    dropped: AtomicU32,
}

impl AlertOutbox {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            sent: AtomicU32::new(0),
            failed: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// An [`AlertPort`] that enqueues instead of sending.
    pub fn sender(&self) -> OutboxPort<'_> {
        OutboxPort { outbox: self }
    }

    pub fn pending(&self) -> usize {
        self.channel.len()
    }

    /// Send everything queued right now.  Returns the number handled.
    pub fn drain_into(&self, port: &mut impl AlertPort) -> usize {
        let mut handled = 0;
        while let Ok(alert) = self.channel.try_receive() {
            self.deliver(&alert, port, None);
            handled += 1;
        }
        handled
    }

    /// Worker loop: block on the outbox and send each alert in turn.
    /// A send that overruns `budget` is logged as a timeout.
    pub fn run_worker(&self, port: &mut impl AlertPort, budget: Duration) -> ! {
        info!("Alert worker started (budget {} ms)", budget.as_millis());
        loop {
            let alert = futures_lite::future::block_on(self.channel.receive());
            self.deliver(&alert, port, Some(budget));
        }
    }

    fn deliver(&self, alert: &OutboundAlert, port: &mut impl AlertPort, budget: Option<Duration>) {
        let started = std::time::Instant::now();
        let result = port.send(&alert.recipient, &alert.body);
        let elapsed = started.elapsed();
        match result {
            Ok(()) => {
                self.sent.fetch_add(1, Ordering::Relaxed);
                if budget.is_some_and(|b| elapsed > b) {
                    warn!("Alert send {}: {} ms", SendError::Timeout, elapsed.as_millis());
                } else {
                    info!("Alert sent to {} in {} ms", alert.recipient, elapsed.as_millis());
                }
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                warn!("Alert send failed: {e}");
            }
        }
    }

    pub fn stats(&self) -> OutboxStats {
        OutboxStats {
            sent: self.sent.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

impl Default for AlertOutbox {
    fn default() -> Self {
        Self::new()
    }
}

/// Outbox delivery counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutboxStats {
    pub sent: u32,
    pub failed: u32,
    pub dropped: u32,
}

/// Enqueuing [`AlertPort`] handed to the dispatcher.
pub struct OutboxPort<'a> {
    outbox: &'a AlertOutbox,
}

impl AlertPort for OutboxPort<'_> {
    fn send(&mut self, recipient: &str, body: &str) -> Result<(), SendError> {
        let alert = OutboundAlert {
            recipient: Recipient::try_from(recipient).map_err(|_| SendError::LinkFailed)?,
            body: AlertBody::try_from(body).map_err(|_| SendError::LinkFailed)?,
        };
        self.outbox.channel.try_send(alert).map_err(|_| {
            self.outbox.dropped.fetch_add(1, Ordering::Relaxed);
            SendError::QueueFull
        })
    }
}
