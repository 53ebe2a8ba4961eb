//! Audible alert signaler.
//!
//! Runs on its own signaling tick, independent of evaluation, and maps the
//! latest published [`HazardState`] to a buzzer level:
//!
//! | Hazard          | Pattern        | Buzzer                     |
//! |-----------------|----------------|----------------------------|
//! | fire alert      | `Continuous`   | held on                    |
//! | ambient hazard  | `Intermittent` | toggled every signal tick  |
//! | none            | `Off`          | held off, toggle reset     |
//!
//! Precedence is fixed: fire dominates ambient dominates quiet.
//!
//! Every Intermittent phase starts with the buzzer ON on its first tick,
//! whether it is entered from Off or from Continuous.

use serde::Serialize;

use crate::app::ports::BuzzerPort;
use crate::hazard::HazardState;

/// Buzzer pattern derived from the hazard state alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignalPattern {
    Off,
    Intermittent,
    Continuous,
}

impl SignalPattern {
    pub fn for_hazard(hazard: &HazardState) -> Self {
        if hazard.fire_alert {
            Self::Continuous
        } else if hazard.ambient() {
            Self::Intermittent
        } else {
            Self::Off
        }
    }
}

/// Buzzer level on the first tick of an Intermittent phase.
pub const INTERMITTENT_START: bool = true;

/// Pattern state machine.  One [`tick`](Self::tick) per signaling period.
#[derive(Debug)]
pub struct AlertSignaler {
    pattern: SignalPattern,
    /// Level the next Intermittent tick will output.
    next_toggle: bool,
    level: bool,
}

impl AlertSignaler {
    pub fn new() -> Self {
        Self {
            pattern: SignalPattern::Off,
            next_toggle: INTERMITTENT_START,
            level: false,
        }
    }

    /// Advance one signaling tick and return the buzzer level.
    pub fn tick(&mut self, hazard: &HazardState) -> bool {
        let pattern = SignalPattern::for_hazard(hazard);
        if pattern != self.pattern {
            log::info!("Buzzer: {:?} -> {:?}", self.pattern, pattern);
            if pattern == SignalPattern::Intermittent {
                self.next_toggle = INTERMITTENT_START;
            }
            self.pattern = pattern;
        }

        self.level = match pattern {
            SignalPattern::Continuous => true,
            SignalPattern::Intermittent => {
                let level = self.next_toggle;
                self.next_toggle = !level;
                level
            }
            SignalPattern::Off => {
                self.next_toggle = INTERMITTENT_START;
                false
            }
        };
        self.level
    }

    /// Advance one tick and drive the buzzer.
    pub fn drive(&mut self, hazard: &HazardState, buzzer: &mut impl BuzzerPort) -> bool {
        let level = self.tick(hazard);
        buzzer.set_buzzer(level);
        level
    }

    pub fn pattern(&self) -> SignalPattern {
        self.pattern
    }
}

impl Default for AlertSignaler {
    fn default() -> Self {
        Self::new()
    }
}
