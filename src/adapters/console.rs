//! Command intake.
//!
//! Text commands arrive on the serial console (and, through the same
//! parser, from the dashboard bridge).  A reader thread parses each line
//! and parks the result in a bounded [`CommandQueue`]; the evaluation task
//! drains the queue at the start of every tick, so overrides are applied
//! by exactly one thread.
//!
//! ```text
//! ┌─────────────┐   submit_line   ┌──────────────┐   drain   ┌───────────┐
//! │ stdin lines │───────────────▶│ CommandQueue │─────────▶│ Evaluate  │
//! └─────────────┘                 └──────────────┘           └───────────┘
//! ```

use std::io::BufRead;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{info, warn};

use crate::app::commands::{parse_command, AppCommand, CommandError};

/// Pending commands between two evaluation ticks.
pub const COMMAND_QUEUE_DEPTH: usize = 8;

/// Why a line did not make it into the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    Parse(CommandError),
    Full,
}

impl core::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "{}", e),
            Self::Full => write!(f, "command queue full"),
        }
    }
}

pub struct CommandQueue {
    channel: Channel<CriticalSectionRawMutex, AppCommand, COMMAND_QUEUE_DEPTH>,
}

impl CommandQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    pub fn submit(&self, cmd: AppCommand) -> Result<(), SubmitError> {
        self.channel.try_send(cmd).map_err(|_| SubmitError::Full)
    }

    /// Parse and enqueue one line of text.
    pub fn submit_line(&self, line: &str) -> Result<AppCommand, SubmitError> {
        let cmd = parse_command(line).map_err(SubmitError::Parse)?;
        self.submit(cmd)?;
        Ok(cmd)
    }

    /// Hand every queued command to `f`, oldest first.
    pub fn drain(&self, mut f: impl FnMut(AppCommand)) -> usize {
        let mut n = 0;
        while let Ok(cmd) = self.channel.try_receive() {
            f(cmd);
            n += 1;
        }
        n
    }

    pub fn pending(&self) -> usize {
        self.channel.len()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Read lines from `input` until EOF, feeding each into `queue`.
/// Bad lines are logged and skipped.
pub fn listen(input: impl BufRead, queue: &CommandQueue) {
    for line in input.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!("console: read error: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match queue.submit_line(&line) {
            Ok(cmd) => info!("console: accepted {:?}", cmd),
            Err(e) => warn!("console: '{}' rejected: {}", line.trim(), e),
        }
    }
    info!("console: input closed");
}
