//! GPIO / peripheral pin assignments for the Firewatch controller board.
//!
//! Single source of truth: `main` references this module rather than
//! hard-coding pin numbers.  Assignments follow the controller board wiring.

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// MQ-2 gas sensor, analog output on ADC1 (11 dB attenuation).
pub const GAS_ADC_GPIO: i32 = 33;
/// DHT11 single-wire data line (open-drain, pulled up).
pub const DHT_GPIO: i32 = 23;
/// Flame sensor digital output.  LOW = flame seen.
pub const FLAME_GPIO: i32 = 27;

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Active buzzer, HIGH = sounding.
pub const BUZZER_GPIO: i32 = 14;
/// Water pump relay.
pub const PUMP_GPIO: i32 = 12;
/// CO2 suppression valve indicator LED.
pub const CO2_LED_GPIO: i32 = 5;
/// HVAC ventilation indicator LED.
pub const HVAC_LED_GPIO: i32 = 0;

// ---------------------------------------------------------------------------
// Buses
// ---------------------------------------------------------------------------

/// LCD backpack I2C.
pub const LCD_SDA_GPIO: i32 = 21;
pub const LCD_SCL_GPIO: i32 = 22;
pub const LCD_I2C_HZ: u32 = 100_000;

/// SIM800L modem on UART1.  The modem's TXD goes to our RX.
pub const MODEM_RX_GPIO: i32 = 16;
pub const MODEM_TX_GPIO: i32 = 17;
pub const MODEM_BAUD: u32 = 9600;
