//! Operator overrides through the command path.

use firewatch::app::commands::{parse_command, AppCommand};
use firewatch::app::events::AppEvent;
use firewatch::app::ports::ActuatorId;
use firewatch::config::SystemConfig;
use firewatch::signaler::SignalPattern;

use crate::mock_hw::{service, MockDisplay, MockHardware, RecordingAlerts, RecordingSink};

fn cmd(line: &str) -> AppCommand {
    parse_command(line).expect("valid command")
}

#[test]
fn forced_off_pump_wins_over_fire() {
    let (mut app, _) = service(SystemConfig::default());
    let mut hw = MockHardware::quiet().burning();
    let mut sink = RecordingSink::default();

    app.handle_command(cmd("pump off"), &mut sink);
    let report = app.evaluation_tick(
        &mut hw,
        &mut MockDisplay::default(),
        &mut RecordingAlerts::default(),
        &mut sink,
    );
    assert!(report.hazard.fire_alert);
    assert!(!report.outputs.pump_on);
    assert!(!report.outputs.suppression_on, "pump and suppression are linked");
    // The buzzer ignores overrides.
    assert_eq!(report.outputs.buzzer, SignalPattern::Continuous);
}

#[test]
fn dashboard_release_returns_to_automatic() {
    let (mut app, shared) = service(SystemConfig::default());
    let mut hw = MockHardware::quiet();
    let mut sink = RecordingSink::default();
    let tick = |app: &mut firewatch::app::service::AppService, hw: &mut MockHardware| {
        app.evaluation_tick(
            hw,
            &mut MockDisplay::default(),
            &mut RecordingAlerts::default(),
            &mut RecordingSink::default(),
        )
    };

    app.handle_command(cmd("V1=1"), &mut sink);
    assert!(tick(&mut app, &mut hw).outputs.ventilation_on);

    app.handle_command(cmd("V1=0"), &mut sink);
    assert_eq!(shared.overrides.get(ActuatorId::Ventilation), None);
    assert!(!tick(&mut app, &mut hw).outputs.ventilation_on);

    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::OverrideChanged { .. })),
        2
    );
}

#[test]
fn override_survives_hazard_changes() {
    let (mut app, _) = service(SystemConfig::default());
    let mut hw = MockHardware::quiet();
    let mut sink = RecordingSink::default();

    app.handle_command(cmd("co2 on"), &mut sink);
    for gas in [300, 4095, 300] {
        hw.gas = gas;
        let report = app.evaluation_tick(
            &mut hw,
            &mut MockDisplay::default(),
            &mut RecordingAlerts::default(),
            &mut sink,
        );
        assert!(report.outputs.pump_on && report.outputs.suppression_on);
        assert_eq!(report.outputs.ventilation_on, gas == 4095);
    }
}

#[test]
fn repeated_override_is_idempotent() {
    let (mut app, shared) = service(SystemConfig::default());
    let mut sink = RecordingSink::default();
    app.handle_command(cmd("hvac on"), &mut sink);
    let first = shared.overrides.snapshot();
    app.handle_command(cmd("hvac on"), &mut sink);
    assert_eq!(shared.overrides.snapshot(), first);
}
