//! Edge-only GPIO output.
//!
//! [`OutputLatch`] remembers the level it last drove and only touches the
//! pin when asked for a different one, so re-applying the same outputs on
//! every evaluation tick never produces a physical transition.

use embedded_hal::digital::OutputPin;
use log::warn;

pub struct OutputLatch<P: OutputPin> {
    pin: P,
    name: &'static str,
    level: Option<bool>,
}

impl<P: OutputPin> OutputLatch<P> {
    /// Wrap `pin`.  The first [`set`](Self::set) always writes.
    pub fn new(pin: P, name: &'static str) -> Self {
        Self {
            pin,
            name,
            level: None,
        }
    }

    /// Drive the pin to `on`.  Returns `true` if the pin was written.
    pub fn set(&mut self, on: bool) -> bool {
        if self.level == Some(on) {
            return false;
        }
        let result = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match result {
            Ok(()) => {
                self.level = Some(on);
                true
            }
            Err(_) => {
                // Leave the level unknown so the next tick retries.
                warn!("{}: GPIO write failed", self.name);
                self.level = None;
                false
            }
        }
    }
}
