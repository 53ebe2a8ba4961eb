//! AppService evaluation tick against mock hardware.

use std::collections::VecDeque;

use firewatch::actuation::ActuatorOutputs;
use firewatch::app::events::{AppEvent, SignalId};
use firewatch::app::ports::ActuatorId;
use firewatch::config::SystemConfig;
use firewatch::error::{SendError, SensorError};
use firewatch::notify::AlertKind;
use firewatch::sensors::SensorChannel;
use firewatch::signaler::SignalPattern;

use crate::mock_hw::{service, MockDisplay, MockHardware, RecordingAlerts, RecordingSink};

#[test]
fn quiet_room_keeps_everything_off() {
    let (mut app, shared) = service(SystemConfig::default());
    let mut hw = MockHardware::quiet();
    let mut alerts = RecordingAlerts::default();
    let mut sink = RecordingSink::default();

    for _ in 0..3 {
        let report = app.evaluation_tick(&mut hw, &mut MockDisplay::default(), &mut alerts, &mut sink);
        assert_eq!(report.outputs, ActuatorOutputs::SAFE);
    }
    assert!(alerts.sent.is_empty());
    assert!(!shared.hazard.latest().any());
    // Outputs are rewritten every tick; the latch below the port dedups.
    assert_eq!(hw.writes.len(), 9);
    assert_eq!(hw.level(ActuatorId::Pump), Some(false));
}

#[test]
fn one_tick_samples_the_full_window() {
    let config = SystemConfig::default();
    let budget = config.sampling_budget_ms();
    let (mut app, _) = service(config);
    let mut hw = MockHardware::quiet();
    app.evaluation_tick(
        &mut hw,
        &mut MockDisplay::default(),
        &mut RecordingAlerts::default(),
        &mut RecordingSink::default(),
    );
    assert_eq!(hw.settle_ms, budget);
}

#[test]
fn heat_raises_ventilation_and_one_alert() {
    let (mut app, _) = service(SystemConfig::default());
    let mut hw = MockHardware::quiet();
    hw.temperature_c = 35.0;
    let mut alerts = RecordingAlerts::default();
    let mut sink = RecordingSink::default();

    let report = app.evaluation_tick(&mut hw, &mut MockDisplay::default(), &mut alerts, &mut sink);
    assert!(report.hazard.temp_warning);
    assert!(report.outputs.ventilation_on);
    assert!(!report.outputs.pump_on && !report.outputs.suppression_on);
    assert_eq!(report.outputs.buzzer, SignalPattern::Intermittent);

    // Still hot: no repeat inside the reminder window.
    app.evaluation_tick(&mut hw, &mut MockDisplay::default(), &mut alerts, &mut sink);

    assert_eq!(alerts.sent.len(), 1);
    let (to, body) = &alerts.sent[0];
    assert_eq!(to, "+1234567890");
    assert!(body.starts_with("TEMP WARNING detected!"), "{body}");
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::HazardLogged {
                kind: AlertKind::TempWarning,
                ..
            }
        )),
        1
    );
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::SignalChanged {
                signal: SignalId::Ventilation,
                on: true
            }
        )),
        1
    );
}

#[test]
fn confirmed_flame_starts_suppression() {
    let (mut app, shared) = service(SystemConfig::default());
    let mut hw = MockHardware::quiet().burning();
    let mut alerts = RecordingAlerts::default();
    let mut sink = RecordingSink::default();

    let report = app.evaluation_tick(&mut hw, &mut MockDisplay::default(), &mut alerts, &mut sink);
    assert!(report.hazard.fire_alert);
    assert!(report.outputs.pump_on && report.outputs.suppression_on);
    assert!(!report.outputs.ventilation_on);
    assert_eq!(report.outputs.buzzer, SignalPattern::Continuous);
    assert!(shared.hazard.latest().fire_alert);
    assert_eq!(hw.level(ActuatorId::Pump), Some(true));
    assert_eq!(hw.level(ActuatorId::Suppression), Some(true));
    assert!(alerts.sent[0].1.starts_with("FIRE detected!"));
}

#[test]
fn flame_needs_three_of_five() {
    let (mut app, _) = service(SystemConfig::default());
    let mut alerts = RecordingAlerts::default();
    let mut sink = RecordingSink::default();

    // Two LOW reads out of five: flicker, not fire.
    let mut hw = MockHardware::quiet();
    hw.flame_script = VecDeque::from([false, true, false, true, true]);
    let report = app.evaluation_tick(&mut hw, &mut MockDisplay::default(), &mut alerts, &mut sink);
    assert!(!report.reading.flame_present);
    assert!(!report.outputs.pump_on);

    // Three out of five: confirmed.
    hw.flame_script = VecDeque::from([false, true, false, true, false]);
    let report = app.evaluation_tick(&mut hw, &mut MockDisplay::default(), &mut alerts, &mut sink);
    assert!(report.hazard.fire_alert);
}

#[test]
fn clearing_emits_cleared_and_rearms() {
    let (mut app, _) = service(SystemConfig::default());
    let mut hw = MockHardware::quiet();
    let mut alerts = RecordingAlerts::default();
    let mut sink = RecordingSink::default();

    hw.gas = 4095;
    app.evaluation_tick(&mut hw, &mut MockDisplay::default(), &mut alerts, &mut sink);
    hw.gas = 300;
    let report = app.evaluation_tick(&mut hw, &mut MockDisplay::default(), &mut alerts, &mut sink);
    assert!(!report.outputs.ventilation_on);
    hw.gas = 4095;
    app.evaluation_tick(&mut hw, &mut MockDisplay::default(), &mut alerts, &mut sink);

    assert_eq!(alerts.sent.len(), 2);
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::HazardCleared {
                kind: AlertKind::GasWarning
            }
        )),
        1
    );
}

#[test]
fn dead_climate_probe_does_not_blind_flame_detection() {
    let (mut app, shared) = service(SystemConfig::default());
    let mut hw = MockHardware::quiet().burning();
    hw.fail_climate = Some(SensorError::ClimateTimeout);
    let mut alerts = RecordingAlerts::default();
    let mut sink = RecordingSink::default();

    for _ in 0..3 {
        let report = app.evaluation_tick(&mut hw, &mut MockDisplay::default(), &mut alerts, &mut sink);
        assert!(!report.sensor_ok);
        assert!(report.hazard.fire_alert);
        assert!(report.outputs.pump_on && report.outputs.suppression_on);
    }
    assert!(shared.hazard.latest().fire_alert);
    assert_eq!(alerts.sent.len(), 1);
    assert!(alerts.sent[0].1.starts_with("FIRE detected!"));
}

#[test]
fn nan_temperature_does_not_blind_flame_detection() {
    let (mut app, _) = service(SystemConfig::default());
    let mut hw = MockHardware::quiet().burning();
    hw.temperature_c = f32::NAN;
    let mut alerts = RecordingAlerts::default();

    let report = app.evaluation_tick(
        &mut hw,
        &mut MockDisplay::default(),
        &mut alerts,
        &mut RecordingSink::default(),
    );
    assert!(!report.sensor_ok);
    assert!(report.hazard.fire_alert && report.outputs.pump_on);
    assert_eq!(alerts.sent.len(), 1);
}

#[test]
fn flame_going_out_releases_pump_during_climate_fault() {
    let (mut app, _) = service(SystemConfig::default());
    let mut hw = MockHardware::quiet().burning();
    hw.fail_climate = Some(SensorError::ChecksumMismatch);
    let mut alerts = RecordingAlerts::default();
    let mut sink = RecordingSink::default();

    app.evaluation_tick(&mut hw, &mut MockDisplay::default(), &mut alerts, &mut sink);
    hw.idle_flame_line = true;
    let report = app.evaluation_tick(&mut hw, &mut MockDisplay::default(), &mut alerts, &mut sink);
    assert!(!report.hazard.fire_alert);
    assert!(!report.outputs.pump_on && !report.outputs.suppression_on);
}

#[test]
fn faulted_channel_holds_only_its_own_warning() {
    let (mut app, shared) = service(SystemConfig::default());
    let mut hw = MockHardware::quiet();
    hw.temperature_c = 35.0;
    let mut alerts = RecordingAlerts::default();
    let mut sink = RecordingSink::default();

    app.evaluation_tick(&mut hw, &mut MockDisplay::default(), &mut alerts, &mut sink);
    hw.fail_climate = Some(SensorError::ChecksumMismatch);
    hw.gas = 4095;
    let report = app.evaluation_tick(&mut hw, &mut MockDisplay::default(), &mut alerts, &mut sink);

    assert!(!report.sensor_ok);
    assert!(report.hazard.temp_warning, "held from the last good read");
    assert!(report.hazard.gas_warning, "judged fresh");
    assert_eq!(report.reading.temperature_c, 35.0);
    assert_eq!(report.reading.gas_level, 4095);

    hw.gas = 300;
    let report = app.evaluation_tick(&mut hw, &mut MockDisplay::default(), &mut alerts, &mut sink);
    assert!(!report.hazard.gas_warning);
    assert!(report.hazard.temp_warning);
    assert!(shared.hazard.latest().temp_warning);

    assert_eq!(app.counters().sensor_faults, 2);
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::SensorFault {
                channel: SensorChannel::Temperature,
                ..
            }
        )),
        2
    );
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::SensorFault {
                channel: SensorChannel::Humidity,
                ..
            }
        )),
        2
    );
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::SignalChanged {
                signal: SignalId::SensorHealthy,
                on: false
            }
        )),
        1
    );
    // Holding is not a new edge: one heat alert, one gas alert.
    assert_eq!(alerts.sent.len(), 2);

    hw.fail_climate = None;
    hw.temperature_c = 22.0;
    let report = app.evaluation_tick(&mut hw, &mut MockDisplay::default(), &mut alerts, &mut sink);
    assert!(report.sensor_ok);
    assert!(!report.hazard.temp_warning);
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::SignalChanged {
                signal: SignalId::SensorHealthy,
                on: true
            }
        )),
        1
    );
}

#[test]
fn flame_line_fault_holds_fire_alert() {
    let (mut app, _) = service(SystemConfig::default());
    let mut hw = MockHardware::quiet().burning();
    let mut alerts = RecordingAlerts::default();
    let mut sink = RecordingSink::default();

    app.evaluation_tick(&mut hw, &mut MockDisplay::default(), &mut alerts, &mut sink);
    hw.fail_flame = Some(SensorError::GpioReadFailed);
    let report = app.evaluation_tick(&mut hw, &mut MockDisplay::default(), &mut alerts, &mut sink);
    assert!(report.hazard.fire_alert, "fault must not release suppression");
    assert!(report.outputs.pump_on);
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::SensorFault {
                channel: SensorChannel::Flame,
                error: SensorError::GpioReadFailed
            }
        )),
        1
    );
}

#[test]
fn failed_send_is_counted_not_retried() {
    let (mut app, _) = service(SystemConfig::default());
    let mut hw = MockHardware::quiet().burning();
    let mut alerts = RecordingAlerts {
        fail_with: Some(SendError::LinkFailed),
        ..RecordingAlerts::default()
    };
    let mut sink = RecordingSink::default();

    let report = app.evaluation_tick(&mut hw, &mut MockDisplay::default(), &mut alerts, &mut sink);
    assert_eq!(report.alerts.failed, 1);
    // Actuation does not depend on delivery.
    assert!(report.outputs.pump_on);

    app.evaluation_tick(&mut hw, &mut MockDisplay::default(), &mut alerts, &mut sink);
    assert_eq!(app.counters().alerts_failed, 1);
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::AlertFailed {
                kind: AlertKind::Fire,
                error: SendError::LinkFailed
            }
        )),
        1
    );
}

#[test]
fn display_gets_every_tick() {
    let (mut app, _) = service(SystemConfig::default());
    let mut hw = MockHardware::quiet();
    let mut display = MockDisplay::default();
    for _ in 0..4 {
        app.evaluation_tick(
            &mut hw,
            &mut display,
            &mut RecordingAlerts::default(),
            &mut RecordingSink::default(),
        );
    }
    assert_eq!(display.frames.len(), 4);
    assert_eq!(display.frames[3].0.gas_level, 300);
}

#[test]
fn reminders_follow_repeat_interval() {
    let config = SystemConfig {
        alert_repeat_secs: 4, // two evaluation periods
        ..SystemConfig::default()
    };
    let (mut app, _) = service(config);
    let mut hw = MockHardware::quiet().burning();
    let mut alerts = RecordingAlerts::default();
    let mut sink = RecordingSink::default();
    for _ in 0..5 {
        app.evaluation_tick(&mut hw, &mut MockDisplay::default(), &mut alerts, &mut sink);
    }
    // Ticks 1, 3, 5.
    assert_eq!(alerts.sent.len(), 3);
}
