//! Peripheral drivers built on `embedded-hal` traits, plus the task
//! watchdog and core-pinned thread helpers.

pub mod dht11;
pub mod lcd1602;
pub mod output_latch;
pub mod task_pin;
pub mod watchdog;
