//! 16×2 character LCD behind a PCF8574 I2C backpack.
//!
//! Expander bit layout: `P0=RS P1=RW P2=EN P3=backlight P4..P7=D4..D7`.
//! The controller runs in 4-bit mode; every byte goes out as two nibbles,
//! each latched by an EN pulse.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

/// Default PCF8574 backpack address.
pub const LCD_ADDR: u8 = 0x3F;
pub const LCD_COLS: usize = 16;

const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_LEFT: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;
const ROW_OFFSETS: [u8; 2] = [0x00, 0x40];

pub struct Lcd1602<I, D> {
    i2c: I,
    delay: D,
    addr: u8,
}

impl<I: I2c, D: DelayNs> Lcd1602<I, D> {
    /// Run the HD44780 4-bit init sequence and switch the backlight on.
    pub fn new(i2c: I, delay: D, addr: u8) -> Result<Self, I::Error> {
        let mut lcd = Self { i2c, delay, addr };
        lcd.delay.delay_ms(50);
        for wait_us in [4500, 4500, 150] {
            lcd.write_nibble(0x03 << 4, 0)?;
            lcd.delay.delay_us(wait_us);
        }
        lcd.write_nibble(0x02 << 4, 0)?;
        lcd.command(CMD_FUNCTION_4BIT_2LINE)?;
        lcd.command(CMD_DISPLAY_ON)?;
        lcd.command(CMD_ENTRY_LEFT)?;
        lcd.clear()?;
        Ok(lcd)
    }

    pub fn clear(&mut self) -> Result<(), I::Error> {
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        Ok(())
    }

    /// Overwrite a whole row, padding with spaces so no clear is needed.
    pub fn write_line(&mut self, row: usize, text: &str) -> Result<(), I::Error> {
        let offset = ROW_OFFSETS[row.min(ROW_OFFSETS.len() - 1)];
        self.command(CMD_SET_DDRAM | offset)?;
        let mut bytes = text.bytes().filter(u8::is_ascii).take(LCD_COLS);
        for _ in 0..LCD_COLS {
            self.send(bytes.next().unwrap_or(b' '), RS)?;
        }
        Ok(())
    }

    fn command(&mut self, cmd: u8) -> Result<(), I::Error> {
        self.send(cmd, 0)
    }

    fn send(&mut self, byte: u8, mode: u8) -> Result<(), I::Error> {
        self.write_nibble(byte & 0xF0, mode)?;
        self.write_nibble((byte << 4) & 0xF0, mode)
    }

    fn write_nibble(&mut self, high_nibble: u8, mode: u8) -> Result<(), I::Error> {
        let data = high_nibble | mode | BACKLIGHT;
        self.i2c.write(self.addr, &[data | EN])?;
        self.delay.delay_us(1);
        self.i2c.write(self.addr, &[data])?;
        self.delay.delay_us(50);
        Ok(())
    }
}
