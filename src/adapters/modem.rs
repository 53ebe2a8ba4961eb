//! SIM800L text-alert adapter.
//!
//! Implements [`AlertPort`] by driving the modem's AT command set over a
//! byte link (UART1 on target):
//!
//! ```text
//! AT+CMGF=1\r             text mode
//! AT+CMGS="<number>"\r    start message
//! <body>\r
//! 0x1A                    Ctrl+Z, submit
//! ```
//!
//! Each line is followed by a fixed 100 ms pause.  The modem's replies are
//! not parsed; a send is one bounded attempt and is never retried.

use core::fmt::Write;

use embedded_hal::delay::DelayNs;
use heapless::String;
use log::debug;

use crate::app::ports::AlertPort;
use crate::error::SendError;

/// Pause after each AT step.
pub const STEP_DELAY_MS: u32 = 100;
const CTRL_Z: u8 = 0x1A;

/// `AT+CMGS="` + a 20-digit recipient + `"\r`.
type CmgsCommand = String<32>;

/// Raw byte sink to the modem.
pub trait ModemLink {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SendError>;
}

pub struct Sim800Modem<L, D> {
    link: L,
    delay: D,
}

impl<L: ModemLink, D: DelayNs> Sim800Modem<L, D> {
    pub fn new(link: L, delay: D) -> Self {
        Self { link, delay }
    }

    fn step(&mut self, bytes: &[u8]) -> Result<(), SendError> {
        self.link.write_all(bytes)?;
        self.delay.delay_ms(STEP_DELAY_MS);
        Ok(())
    }
}

impl<L: ModemLink, D: DelayNs> AlertPort for Sim800Modem<L, D> {
    fn send(&mut self, recipient: &str, body: &str) -> Result<(), SendError> {
        debug!("SIM800: sending {} bytes to {}", body.len(), recipient);
        let mut cmgs = CmgsCommand::new();
        write!(cmgs, "AT+CMGS=\"{}\"\r", recipient).map_err(|_| SendError::LinkFailed)?;

        self.step(b"AT+CMGF=1\r")?;
        self.step(cmgs.as_bytes())?;
        self.link.write_all(body.as_bytes())?;
        self.step(b"\r")?;
        self.step(&[CTRL_Z])
    }
}

#[cfg(target_os = "espidf")]
impl ModemLink for esp_idf_hal::uart::UartDriver<'_> {
    fn write_all(&mut self, mut bytes: &[u8]) -> Result<(), SendError> {
        while !bytes.is_empty() {
            let n = self.write(bytes).map_err(|_| SendError::LinkFailed)?;
            if n == 0 {
                return Err(SendError::Timeout);
            }
            bytes = &bytes[n..];
        }
        Ok(())
    }
}
