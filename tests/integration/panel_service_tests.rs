//! Control-loop scenarios: PanelService → scheduler, router, power, report.
//!
//! Every test boots the service against mocks with a valid stored
//! calibration, clears the boot call history, then drives `poll` with an
//! explicit clock.

use crate::mock_hw::{HwCall, MockBoard, MockConsole, MockRadio, MockStore, RecordingSink};

use relaypanel::app::commands::TouchAction;
use relaypanel::app::events::AppEvent;
use relaypanel::app::service::PanelService;
use relaypanel::config::PanelConfig;
use relaypanel::touch::calibration::{CalibrationBlob, TouchCalibration};
use relaypanel::touch::debounce::DebounceState;

const OUTPUT_BTN: (u16, u16) = (62, 280);
const SLEEP_BTN: (u16, u16) = (177, 280);
const STATUS: (u16, u16) = (210, 20);

struct Rig {
    app: PanelService,
    hw: MockBoard,
    radio: MockRadio,
    console: MockConsole,
    sink: RecordingSink,
}

impl Rig {
    fn booted() -> Self {
        let mut app = PanelService::new(PanelConfig::default());
        let mut hw = MockBoard::new();
        let mut radio = MockRadio::new();
        let mut sink = RecordingSink::default();
        let cal = TouchCalibration::from_coefficients([200, 3700, 200, 3700, 0]);
        let mut store = MockStore::with_bytes(CalibrationBlob::from(&cal).as_bytes());

        app.attach_wireless(&mut radio);
        app.boot(&mut hw, &mut store, &mut sink);
        hw.clear_calls();
        sink.events.clear();

        Self {
            app,
            hw,
            radio,
            console: MockConsole::default(),
            sink,
        }
    }

    fn poll(&mut self) {
        self.app
            .poll(&mut self.hw, &mut self.radio, &mut self.console, &mut self.sink);
    }

    fn poll_at(&mut self, now: u64) {
        self.hw.now = now;
        self.poll();
    }

    /// Press, release and wait out the settle window.
    fn tap(&mut self, (x, y): (u16, u16)) {
        self.hw.tap(x, y);
        self.poll();
        self.poll();
        self.hw.advance(400);
        self.poll();
    }

    fn touches(&self) -> Vec<TouchAction> {
        self.sink
            .events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Touch(a) => Some(*a),
                _ => None,
            })
            .collect()
    }
}

// ── Periodic tasks ────────────────────────────────────────────

#[test]
fn sensor_poll_fires_on_two_second_interval() {
    let mut r = Rig::booted();
    r.poll_at(1999);
    assert_eq!(r.hw.conversions(), 0);

    r.poll_at(2000);
    assert_eq!(r.hw.conversions(), 1);
    assert!(r.hw.has_text("21.5 C"));
    assert!(r.hw.has_text("19.0 C"));

    r.poll_at(3999);
    assert_eq!(r.hw.conversions(), 1);
    r.poll_at(4000);
    assert_eq!(r.hw.conversions(), 2);
}

#[test]
fn relay_tick_at_2999_does_not_fire() {
    let mut r = Rig::booted();
    r.poll_at(2999);
    assert!(r.hw.outputs().is_empty());

    r.poll_at(3000);
    assert_eq!(r.hw.outputs(), vec![true]);
    assert!(r.app.state().relay_phase());

    r.poll_at(5999);
    assert_eq!(r.hw.outputs(), vec![true]);

    r.poll_at(6000);
    assert_eq!(r.hw.outputs(), vec![true, false]);
    let outs = r.app.state().relay_outputs();
    assert_ne!(outs.relay1, outs.relay2);
}

#[test]
fn sensor_task_runs_before_relay_task() {
    let mut r = Rig::booted();
    r.poll_at(6000);

    let sensor = r
        .sink
        .events
        .iter()
        .position(|e| matches!(e, AppEvent::SensorsPolled(_)));
    let relay = r
        .sink
        .events
        .iter()
        .position(|e| matches!(e, AppEvent::RelaysToggled { .. }));
    assert!(sensor.unwrap() < relay.unwrap());
}

#[test]
fn late_tick_does_not_burst() {
    let mut r = Rig::booted();
    r.poll_at(20_000);
    assert_eq!(r.hw.conversions(), 1);
    assert_eq!(r.hw.outputs().len(), 1);

    // The new baseline is "now", not a multiple of the interval.
    r.poll_at(21_999);
    assert_eq!(r.hw.conversions(), 1);
    r.poll_at(22_000);
    assert_eq!(r.hw.conversions(), 2);
}

#[test]
fn unchanged_readings_are_not_repainted() {
    let mut r = Rig::booted();
    r.poll_at(2000);
    let first = r.hw.texts().len();
    assert!(first > 0);

    r.hw.clear_calls();
    r.poll_at(4000);
    assert_eq!(r.hw.conversions(), 1);
    assert!(r.hw.texts().is_empty());

    r.hw.temperatures[1] = None;
    r.poll_at(6000);
    assert_eq!(r.hw.texts(), vec!["--.- C", " STATE: OFF", " STATE: ON "]);
}

// ── Touch routing & power ─────────────────────────────────────

#[test]
fn output_button_toggles_and_reports() {
    let mut r = Rig::booted();
    r.tap(OUTPUT_BTN);

    assert!(r.app.state().touch_output_enabled);
    assert_eq!(r.touches(), vec![TouchAction::ToggleOutput]);
    assert!(r.hw.has_text("OUTPUT ON"));
    assert_eq!(r.console.written.len(), 1);
    assert!(r.console.written[0].contains("Output: ON"));
}

#[test]
fn held_touch_fires_once() {
    let mut r = Rig::booted();
    for _ in 0..10 {
        r.hw.tap(OUTPUT_BTN.0, OUTPUT_BTN.1);
    }
    for _ in 0..10 {
        r.hw.advance(20);
        r.poll();
    }
    assert_eq!(r.touches(), vec![TouchAction::ToggleOutput]);
    assert!(r.app.state().touch_output_enabled);
    assert_eq!(r.app.debounce_state(), DebounceState::Pressed);
}

#[test]
fn touch_outside_buttons_does_nothing() {
    let mut r = Rig::booted();
    let before = *r.app.state();
    r.tap((120, 100));
    assert!(r.touches().is_empty());
    assert_eq!(*r.app.state(), before);
    assert!(r.console.written.is_empty());
}

#[test]
fn sleep_then_wake_cycles_power_and_clock() {
    let mut r = Rig::booted();
    r.tap(SLEEP_BTN);
    assert!(!r.app.state().display_awake);
    assert_eq!(r.app.cpu_mhz(), 80);

    let backlight_off = r.hw.position(&HwCall::Backlight(false)).unwrap();
    let panel_off = r.hw.position(&HwCall::PanelPower(false)).unwrap();
    let cpu_low = r.hw.position(&HwCall::Cpu(80)).unwrap();
    assert!(backlight_off < panel_off && panel_off < cpu_low);

    r.hw.clear_calls();
    r.tap(SLEEP_BTN);
    assert!(r.app.state().display_awake);
    assert_eq!(r.app.cpu_mhz(), 240);

    let cpu_high = r.hw.position(&HwCall::Cpu(240)).unwrap();
    let panel_on = r.hw.position(&HwCall::PanelPower(true)).unwrap();
    let settle = r.hw.position(&HwCall::Delay(120)).unwrap();
    let backlight_on = r.hw.position(&HwCall::Backlight(true)).unwrap();
    assert!(cpu_high < panel_on && panel_on < settle && settle < backlight_on);
    // Full redraw after wake.
    assert!(r.hw.has_text("CONTROL PANEL"));
    assert_eq!(
        r.touches(),
        vec![TouchAction::SleepDisplay, TouchAction::WakeDisplay]
    );
}

#[test]
fn asleep_ignores_output_button() {
    let mut r = Rig::booted();
    r.tap(SLEEP_BTN);
    r.tap(OUTPUT_BTN);
    assert!(!r.app.state().touch_output_enabled);
    assert_eq!(r.touches(), vec![TouchAction::SleepDisplay]);
}

#[test]
fn asleep_polls_sensors_without_drawing() {
    let mut r = Rig::booted();
    r.tap(SLEEP_BTN);
    r.hw.clear_calls();

    r.poll_at(4000);
    assert_eq!(r.hw.conversions(), 1);
    assert_eq!(r.hw.outputs().len(), 1);
    assert_eq!(r.hw.draw_count(), 0);
}

#[test]
fn status_region_toggles_wireless_while_asleep() {
    let mut r = Rig::booted();
    r.tap(SLEEP_BTN);
    r.hw.clear_calls();

    r.tap(STATUS);
    assert!(r.app.state().wireless_enabled);
    assert!(!r.app.state().display_awake);
    assert_eq!(r.radio.start_calls, vec!["ESP32_TFT_PANEL".to_owned()]);
    // Radio bring-up at the active tier, then back down to the radio tier.
    assert_eq!(r.hw.cpu_history(), vec![240, 160]);
    assert_eq!(r.hw.draw_count(), 0);

    r.tap(STATUS);
    assert!(!r.app.state().wireless_enabled);
    assert_eq!(r.radio.stop_calls, 1);
    assert_eq!(r.app.cpu_mhz(), 80);
}

#[test]
fn wireless_indicator_follows_state() {
    let mut r = Rig::booted();
    r.tap(STATUS);
    assert!(r.hw.has_text("BT ON"));
    assert_eq!(r.app.cpu_mhz(), 240);
    assert!(r.sink
        .events
        .contains(&AppEvent::WirelessChanged { enabled: true }));
}

#[test]
fn failed_radio_start_leaves_wireless_off() {
    let mut r = Rig::booted();
    r.radio.fail_start = true;
    r.tap(STATUS);
    assert!(!r.app.state().wireless_enabled);
    assert!(r.sink
        .events
        .contains(&AppEvent::WirelessChanged { enabled: false }));
}

// ── Wireless reporting ────────────────────────────────────────

#[test]
fn client_connect_triggers_delayed_report() {
    let mut r = Rig::booted();
    r.tap(STATUS);
    let t0 = r.hw.now;

    r.radio.connect_client();
    r.poll();
    assert_eq!(r.app.pending_report_at(), Some(t0 + 200));
    assert!(r.radio.sent.is_empty());

    r.poll_at(t0 + 199);
    assert!(r.radio.sent.is_empty());

    r.poll_at(t0 + 200);
    assert_eq!(r.radio.sent.len(), 1);
    assert_eq!(r.console.written.len(), 1);
    assert_eq!(r.radio.sent[0], r.app.format_report());
    assert_eq!(r.app.pending_report_at(), None);
    assert!(r.sink
        .events
        .contains(&AppEvent::ReportEmitted { wireless: true }));
}

#[test]
fn repeated_connects_collapse_into_one_report() {
    let mut r = Rig::booted();
    r.tap(STATUS);
    r.radio.connect_client();
    r.radio.connect_client();
    r.radio.connect_client();
    r.poll();
    r.hw.advance(500);
    r.poll();
    r.hw.advance(500);
    r.poll();
    assert_eq!(r.radio.sent.len(), 1);
}

#[test]
fn disabling_wireless_cancels_pending_report() {
    let mut r = Rig::booted();
    r.tap(STATUS);
    r.radio.connect_client();
    r.poll();
    assert!(r.app.pending_report_at().is_some());

    // Disable before the delay elapses.
    r.hw.tap(STATUS.0, STATUS.1);
    r.poll();
    assert!(!r.app.state().wireless_enabled);
    assert_eq!(r.app.pending_report_at(), None);

    r.hw.advance(1000);
    r.poll();
    assert!(r.console.written.is_empty());
}

#[test]
fn output_report_goes_to_client_when_connected() {
    let mut r = Rig::booted();
    r.tap(STATUS);
    r.radio.connect_client();
    r.poll();
    r.hw.advance(300);
    r.poll();
    assert_eq!(r.radio.sent.len(), 1);

    r.tap(OUTPUT_BTN);
    assert_eq!(r.radio.sent.len(), 2);
    assert!(r.radio.sent[1].contains("Output: ON"));
}

#[test]
fn report_without_client_goes_to_console_only() {
    let mut r = Rig::booted();
    r.tap(OUTPUT_BTN);
    assert_eq!(r.console.written.len(), 1);
    assert!(r.radio.sent.is_empty());
    assert!(r.sink
        .events
        .contains(&AppEvent::ReportEmitted { wireless: false }));
}

#[test]
fn disconnected_sensor_reports_error_marker() {
    let mut r = Rig::booted();
    r.hw.temperatures[0] = None;
    r.poll_at(2000);
    let report = r.app.format_report();
    assert!(report.contains("S1: ERR\n"));
    assert!(report.contains("S2: 19.0 C\n"));
}

#[test]
fn received_lines_surface_only_while_enabled() {
    let mut r = Rig::booted();
    r.radio.incoming.push_back("hello".into());
    r.poll();
    assert!(!r
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::LineReceived(_))));

    r.tap(STATUS);
    r.poll();
    let lines: Vec<&str> = r
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::LineReceived(l) => Some(l.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(lines, vec!["hello"]);
}
