//! Actuation controller.
//!
//! Resolves each output as `override.unwrap_or(automatic)`:
//!
//! | Output       | Automatic decision | Override         |
//! |--------------|--------------------|------------------|
//! | pump         | fire alert         | pump/suppression |
//! | suppression  | fire alert         | pump/suppression |
//! | ventilation  | ambient hazard     | ventilation      |
//!
//! The buzzer pattern derives from the hazard state alone and ignores
//! overrides.  Outputs are recomputed and rewritten every tick; the port
//! is responsible for suppressing writes that would not change a level.

use serde::Serialize;

use crate::app::ports::{ActuatorId, ActuatorPort};
use crate::hazard::HazardState;
use crate::overrides::OverrideState;
use crate::signaler::SignalPattern;

/// Every output level for one tick.  Fully determined by
/// `(HazardState, OverrideState)`; carries no latched memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActuatorOutputs {
    pub pump_on: bool,
    pub suppression_on: bool,
    pub ventilation_on: bool,
    pub buzzer: SignalPattern,
}

impl ActuatorOutputs {
    /// Everything off.
    pub const SAFE: Self = Self {
        pump_on: false,
        suppression_on: false,
        ventilation_on: false,
        buzzer: SignalPattern::Off,
    };

    pub fn level(&self, id: ActuatorId) -> bool {
        match id {
            ActuatorId::Pump => self.pump_on,
            ActuatorId::Suppression => self.suppression_on,
            ActuatorId::Ventilation => self.ventilation_on,
        }
    }
}

/// Pure resolution of hazard + overrides into output levels.
pub fn resolve(hazard: &HazardState, overrides: &OverrideState) -> ActuatorOutputs {
    let ambient = hazard.ambient();
    ActuatorOutputs {
        pump_on: overrides.pump.unwrap_or(hazard.fire_alert),
        suppression_on: overrides.suppression.unwrap_or(hazard.fire_alert),
        ventilation_on: overrides.ventilation.unwrap_or(ambient),
        buzzer: SignalPattern::for_hazard(hazard),
    }
}

/// Applies resolved outputs to an [`ActuatorPort`] and remembers what it
/// wrote for observability.
#[derive(Debug, Default)]
pub struct ActuationController {
    last: Option<ActuatorOutputs>,
}

impl ActuationController {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Resolve and write every output.  Returns what was written.
    pub fn apply(
        &mut self,
        hazard: &HazardState,
        overrides: &OverrideState,
        hw: &mut impl ActuatorPort,
    ) -> ActuatorOutputs {
        let outputs = resolve(hazard, overrides);
        for id in ActuatorId::ALL {
            hw.set_output(id, outputs.level(id));
        }
        if self.last != Some(outputs) {
            log::info!(
                "Outputs: pump={} suppression={} ventilation={} buzzer={:?}",
                outputs.pump_on, outputs.suppression_on, outputs.ventilation_on, outputs.buzzer
            );
        }
        self.last = Some(outputs);
        outputs
    }

    /// Outputs written by the most recent [`apply`](Self::apply).
    pub fn last_applied(&self) -> Option<ActuatorOutputs> {
        self.last
    }
}
