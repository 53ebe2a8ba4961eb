//! Local display adapter.
//!
//! Two 16-column lines:
//!
//! ```text
//! T:24.5  H:40.0
//! G:812   Warning!      ambient hazard
//! FIRE Detected!        fire alert (replaces the gas line)
//! ```
//!
//! The panel is only rewritten when the text changes.

use core::fmt::Write;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, warn};

use crate::app::ports::DisplayPort;
use crate::drivers::lcd1602::Lcd1602;
use crate::hazard::HazardState;
use crate::sensors::Reading;

pub type LcdLine = heapless::String<16>;

/// Something that can show two lines of text.
pub trait TextDisplay {
    fn show(&mut self, lines: &[LcdLine; 2]);
}

impl<I: I2c, D: DelayNs> TextDisplay for Lcd1602<I, D> {
    fn show(&mut self, lines: &[LcdLine; 2]) {
        for (row, line) in lines.iter().enumerate() {
            if self.write_line(row, line).is_err() {
                warn!("LCD: I2C write failed on row {}", row);
                return;
            }
        }
    }
}

/// Headless fallback: logs the lines instead.
#[derive(Default)]
pub struct LogDisplay;

impl TextDisplay for LogDisplay {
    fn show(&mut self, lines: &[LcdLine; 2]) {
        debug!("LCD | {} | {}", lines[0], lines[1]);
    }
}

/// Format the two display lines for one tick.
pub fn format_lines(reading: &Reading, hazard: &HazardState) -> [LcdLine; 2] {
    let mut top = LcdLine::new();
    let _ = write!(
        top,
        "T:{:<6.1}H:{:.1}",
        reading.temperature_c, reading.humidity_pct
    );

    let mut bottom = LcdLine::new();
    if hazard.fire_alert {
        let _ = bottom.push_str("FIRE Detected!");
    } else if hazard.ambient() {
        let _ = write!(bottom, "G:{:<6}Warning!", reading.gas_level);
    } else {
        let _ = write!(bottom, "G:{}", reading.gas_level);
    }
    [top, bottom]
}

pub struct LcdAdapter<T: TextDisplay> {
    display: T,
    shown: Option<[LcdLine; 2]>,
}

impl<T: TextDisplay> LcdAdapter<T> {
    pub fn new(display: T) -> Self {
        Self {
            display,
            shown: None,
        }
    }
}

impl<T: TextDisplay> DisplayPort for LcdAdapter<T> {
    fn render(&mut self, reading: &Reading, hazard: &HazardState) {
        let lines = format_lines(reading, hazard);
        if self.shown.as_ref() == Some(&lines) {
            return;
        }
        self.display.show(&lines);
        self.shown = Some(lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading() -> Reading {
        Reading {
            gas_level: 812,
            temperature_c: 24.5,
            humidity_pct: 40.0,
            flame_present: false,
        }
    }

    #[test]
    fn quiet_layout() {
        let [top, bottom] = format_lines(&reading(), &HazardState::CLEAR);
        assert_eq!(top.as_str(), "T:24.5  H:40.0");
        assert_eq!(bottom.as_str(), "G:812");
    }

    #[test]
    fn warning_sits_at_column_eight() {
        let hazard = HazardState {
            temp_warning: true,
            ..HazardState::CLEAR
        };
        let [_, bottom] = format_lines(&reading(), &hazard);
        assert_eq!(bottom.as_str(), "G:812   Warning!");
    }

    #[test]
    fn fire_replaces_gas_line() {
        let hazard = HazardState {
            fire_alert: true,
            gas_warning: true,
            ..HazardState::CLEAR
        };
        let [_, bottom] = format_lines(&reading(), &hazard);
        assert_eq!(bottom.as_str(), "FIRE Detected!");
    }

    #[derive(Default)]
    struct Counting(usize);
    impl TextDisplay for Counting {
        fn show(&mut self, _lines: &[LcdLine; 2]) {
            self.0 += 1;
        }
    }

    #[test]
    fn unchanged_text_is_not_redrawn() {
        let mut lcd = LcdAdapter::new(Counting::default());
        lcd.render(&reading(), &HazardState::CLEAR);
        lcd.render(&reading(), &HazardState::CLEAR);
        assert_eq!(lcd.display.0, 1);
        let hotter = Reading {
            temperature_c: 31.0,
            ..reading()
        };
        lcd.render(&hotter, &HazardState::CLEAR);
        assert_eq!(lcd.display.0, 2);
    }
}
