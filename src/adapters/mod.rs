//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                    |
//! |----------------|--------------------|--------------------------------|
//! | `console`      | (command intake)   | Serial console lines           |
//! | `hardware`     | SensorPort         | Gas ADC, DHT11, flame GPIO     |
//! |                | ActuatorPort       | Pump, CO2, HVAC GPIO           |
//! |                | BuzzerPort         | Buzzer GPIO                    |
//! | `json_status`  | EventSink          | JSON dashboard feed            |
//! | `lcd`          | DisplayPort        | 16x2 I2C character LCD         |
//! | `log_sink`     | EventSink          | Serial log output              |
//! | `modem`        | AlertPort          | SIM800L over UART              |
//! | `nvs`          | ConfigPort         | NVS / in-memory store          |
//! | `time`         | (clock)            | ESP32 system timer             |

pub mod console;
pub mod hardware;
pub mod json_status;
pub mod lcd;
pub mod log_sink;
pub mod modem;
pub mod nvs;
pub mod time;
