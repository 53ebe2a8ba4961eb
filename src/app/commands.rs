//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (dashboard
//! buttons, serial console) that the [`AppService`](super::service::AppService)
//! interprets and acts upon.
//!
//! Text forms accepted by [`parse_command`]:
//!
//! | Input                     | Command                                  |
//! |---------------------------|------------------------------------------|
//! | `pump on\|off\|auto`      | pump + suppression override              |
//! | `co2 …` / `suppression …` | pump + suppression override              |
//! | `hvac …` / `vent …`       | ventilation override                     |
//! | `V1=0\|1`                 | ventilation: `1` forces on, `0` = auto   |
//! | `V2=0\|1`, `V3=0\|1`      | suppression / pump, same button rules    |
//! | `status`                  | diagnostics report                       |

use core::fmt;

use crate::app::ports::ActuatorId;

/// A single override request: `None` returns the actuator to automatic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverrideCommand {
    pub actuator: ActuatorId,
    pub value: Option<bool>,
}

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Force or release an actuator.
    Override(OverrideCommand),

    /// Log the diagnostics report immediately.
    GetDiagnostics,
}

/// Why a text command was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    UnknownTarget,
    BadValue,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty command"),
            Self::UnknownTarget => write!(f, "unknown target"),
            Self::BadValue => write!(f, "expected on, off or auto"),
        }
    }
}

/// Parse one line of console or dashboard input.
pub fn parse_command(line: &str) -> Result<AppCommand, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(CommandError::Empty);
    }

    if let Some((pin, level)) = line.split_once('=') {
        let actuator = match pin.trim() {
            "V1" | "v1" => ActuatorId::Ventilation,
            "V2" | "v2" => ActuatorId::Suppression,
            "V3" | "v3" => ActuatorId::Pump,
            _ => return Err(CommandError::UnknownTarget),
        };
        // Dashboard buttons: pressed forces on, released hands back control.
        let value = match level.trim() {
            "1" => Some(true),
            "0" => None,
            _ => return Err(CommandError::BadValue),
        };
        return Ok(AppCommand::Override(OverrideCommand { actuator, value }));
    }

    let mut words = line.split_whitespace();
    let target = words.next().ok_or(CommandError::Empty)?;
    if target.eq_ignore_ascii_case("status") || target.eq_ignore_ascii_case("diag") {
        return Ok(AppCommand::GetDiagnostics);
    }

    let actuator = parse_target(target)?;
    let value = match words.next().map(str::to_ascii_lowercase).as_deref() {
        Some("on") => Some(true),
        Some("off") => Some(false),
        Some("auto") => None,
        _ => return Err(CommandError::BadValue),
    };
    if words.next().is_some() {
        return Err(CommandError::BadValue);
    }
    Ok(AppCommand::Override(OverrideCommand { actuator, value }))
}

fn parse_target(word: &str) -> Result<ActuatorId, CommandError> {
    match word.to_ascii_lowercase().as_str() {
        "pump" => Ok(ActuatorId::Pump),
        "suppression" | "co2" => Ok(ActuatorId::Suppression),
        "vent" | "ventilation" | "hvac" => Ok(ActuatorId::Ventilation),
        _ => Err(CommandError::UnknownTarget),
    }
}
