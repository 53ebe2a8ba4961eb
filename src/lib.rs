//! Firewatch firmware library.
//!
//! Exposes the pure-logic modules for integration testing and host
//! simulation. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod actuation;
pub mod app;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod hazard;
pub mod notify;
pub mod overrides;
pub mod pins;
pub mod runtime;
pub mod scheduler;
pub mod sensors;
pub mod signaler;

pub mod adapters;
pub mod drivers;
