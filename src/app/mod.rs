//! Application core: pure domain logic, zero I/O.
//!
//! The evaluation tick, command handling and the outbound event model for
//! the Firewatch controller.  All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
