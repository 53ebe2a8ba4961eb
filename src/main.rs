//! Firewatch firmware entry point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LcdAdapter    LogEventSink + JsonStatusSink │
//! │  (Sensor+Actuator) (Display)     (EventSink)                   │
//! │  BuzzerAdapter     Sim800Modem   NvsAdapter    CommandQueue    │
//! │  (Buzzer)          (Alert)       (Config)      (console)       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Sampler · Hazard · Overrides · Actuation · Notify     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  eval (APP_CPU) · signal (APP_CPU) · alerts · console (PRO)    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use log::{info, warn};

use esp_idf_hal::adc::attenuation::DB_11;
use esp_idf_hal::adc::oneshot::config::AdcChannelConfig;
use esp_idf_hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::{AnyIOPin, AnyInputPin, AnyOutputPin, PinDriver};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{config::Config as UartConfig, UartDriver};
use esp_idf_hal::units::Hertz;

use firewatch::adapters::console::{self, CommandQueue};
use firewatch::adapters::hardware::{BuzzerAdapter, HardwareAdapter};
use firewatch::adapters::json_status::JsonStatusSink;
use firewatch::adapters::lcd::LcdAdapter;
use firewatch::adapters::log_sink::LogEventSink;
use firewatch::adapters::modem::Sim800Modem;
use firewatch::adapters::nvs::NvsAdapter;
use firewatch::app::service::{AppService, SharedState};
use firewatch::config::SystemConfig;
use firewatch::diagnostics;
use firewatch::drivers::dht11::Dht11;
use firewatch::drivers::lcd1602::{Lcd1602, LCD_ADDR};
use firewatch::drivers::task_pin::{spawn_on_core, Core, TaskSpec};
use firewatch::drivers::watchdog::Watchdog;
use firewatch::error::SensorError;
use firewatch::pins;
use firewatch::runtime::{evaluation_schedule, signal_schedule, EvaluationTask, SignalTask, TaskLoop};

/// Console commands waiting for the next evaluation tick.
static COMMANDS: CommandQueue = CommandQueue::new();

/// Forward every n-th telemetry snapshot to the dashboard feed.
const STATUS_TELEMETRY_EVERY: u64 = 5;

const EVAL_TASK: TaskSpec = TaskSpec {
    name: "eval\0",
    core: Core::App,
    priority: 5,
    stack_kb: 12,
};
const SIGNAL_TASK: TaskSpec = TaskSpec {
    name: "signal\0",
    core: Core::App,
    priority: 6,
    stack_kb: 4,
};
const ALERT_TASK: TaskSpec = TaskSpec {
    name: "alerts\0",
    core: Core::Pro,
    priority: 4,
    stack_kb: 6,
};
const CONSOLE_TASK: TaskSpec = TaskSpec {
    name: "console\0",
    core: Core::Pro,
    priority: 3,
    stack_kb: 4,
};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Firewatch v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");
    diagnostics::install_panic_handler();

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let config = match NvsAdapter::new() {
        Ok(nvs) => nvs.load_or_default(),
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults", e);
            SystemConfig::default()
        }
    };
    config
        .validate()
        .map_err(|e| anyhow!("config rejected: {}", e))?;

    // ── 3. Peripherals ────────────────────────────────────────
    let p = Peripherals::take()?;

    // Gas: one-shot ADC1 conversion on the MQ-2 analog line.
    let adc = AdcDriver::new(p.adc1)?;
    let adc_cfg = AdcChannelConfig {
        attenuation: DB_11,
        ..Default::default()
    };
    let mut gas_channel = AdcChannelDriver::new(adc, p.pins.gpio33, &adc_cfg)?;
    let gas = move || gas_channel.read_raw().map_err(|_| SensorError::AdcReadFailed);
    info!("Gas ADC on GPIO{}", pins::GAS_ADC_GPIO);

    // SAFETY: every raw pin number below comes from `pins`, which assigns
    // each GPIO exactly once, and none of them is taken through `p.pins`.
    let (dht_pin, flame_pin, pump_pin, co2_pin, hvac_pin, buzzer_pin) = unsafe {
        (
            AnyIOPin::new(pins::DHT_GPIO),
            AnyInputPin::new(pins::FLAME_GPIO),
            AnyOutputPin::new(pins::PUMP_GPIO),
            AnyOutputPin::new(pins::CO2_LED_GPIO),
            AnyOutputPin::new(pins::HVAC_LED_GPIO),
            AnyOutputPin::new(pins::BUZZER_GPIO),
        )
    };
    let climate = Dht11::new(PinDriver::input_output_od(dht_pin)?, Ets);
    let flame = PinDriver::input(flame_pin)?;

    let hw = HardwareAdapter::new(
        gas,
        climate,
        flame,
        PinDriver::output(pump_pin)?,
        PinDriver::output(co2_pin)?,
        PinDriver::output(hvac_pin)?,
        FreeRtos,
    );
    let buzzer = BuzzerAdapter::new(PinDriver::output(buzzer_pin)?);

    // SAFETY: as above.
    let (sda, scl) = unsafe {
        (
            AnyIOPin::new(pins::LCD_SDA_GPIO),
            AnyIOPin::new(pins::LCD_SCL_GPIO),
        )
    };
    let i2c = I2cDriver::new(
        p.i2c0,
        sda,
        scl,
        &I2cConfig::new().baudrate(Hertz(pins::LCD_I2C_HZ)),
    )?;
    let lcd = Lcd1602::new(i2c, Ets, LCD_ADDR).map_err(|e| anyhow!("LCD init failed: {:?}", e))?;
    let display = LcdAdapter::new(lcd);

    // Modem on UART1.
    // SAFETY: as above.
    let (modem_tx, modem_rx) = unsafe {
        (
            AnyIOPin::new(pins::MODEM_TX_GPIO),
            AnyIOPin::new(pins::MODEM_RX_GPIO),
        )
    };
    let uart = UartDriver::new(
        p.uart1,
        modem_tx,
        modem_rx,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::new().baudrate(Hertz(pins::MODEM_BAUD)),
    )?;
    let mut modem = Sim800Modem::new(uart, FreeRtos);

    // ── 4. App service ────────────────────────────────────────
    let shared = Arc::new(SharedState::new());
    let mut sink = (
        LogEventSink::new(),
        JsonStatusSink::new(|line: &str| println!("{line}"))
            .telemetry_every(STATUS_TELEMETRY_EVERY),
    );
    let mut app = AppService::new(config.clone(), Arc::clone(&shared));
    app.start(&mut sink);

    // ── 5. Threads ────────────────────────────────────────────
    let eval_config = config.clone();
    let eval = spawn_on_core(EVAL_TASK, move || {
        let watchdog = Watchdog::new(eval_config.watchdog_timeout_ms);
        let mut task = EvaluationTask::new(app, hw, display, sink, &COMMANDS);
        TaskLoop::new(evaluation_schedule(&eval_config)).run(&mut task, &watchdog)
    })?;

    let signal_config = config.clone();
    let signal_shared = Arc::clone(&shared);
    spawn_on_core(SIGNAL_TASK, move || {
        let watchdog = Watchdog::new(signal_config.watchdog_timeout_ms);
        let mut task = SignalTask::new(buzzer, signal_shared);
        TaskLoop::new(signal_schedule(&signal_config)).run(&mut task, &watchdog)
    })?;

    let budget = Duration::from_millis(u64::from(config.send_budget_ms));
    let alert_shared = Arc::clone(&shared);
    spawn_on_core(ALERT_TASK, move || alert_shared.outbox.run_worker(&mut modem, budget))?;

    spawn_on_core(CONSOLE_TASK, || {
        console::listen(std::io::stdin().lock(), &COMMANDS);
    })?;

    info!("System ready.");

    // The evaluation loop never returns; joining only surfaces a panic.
    eval.join()
        .map_err(|_| anyhow!("evaluation thread terminated"))?;
    Ok(())
}
