//! Boot flow: calibration restore/acquire and the power-up ordering.

use crate::mock_hw::{HwCall, MockBoard, MockConsole, MockNvs, MockStore, RecordingSink};

use relaypanel::adapters::calibration_store::NvsCalibrationStore;
use relaypanel::app::events::{AppEvent, CalibrationSource};
use relaypanel::app::ports::CalibrationPort;
use relaypanel::app::service::PanelService;
use relaypanel::config::PanelConfig;
use relaypanel::touch::calibration::{CalibrationBlob, RawPoint, TouchCalibration};

fn stored_calibration() -> TouchCalibration {
    TouchCalibration::from_coefficients([200, 3700, 200, 3700, 0])
}

/// Script one press per corner: a few held samples, then release.
fn script_corner_presses(hw: &mut MockBoard) {
    let corners = [
        RawPoint { x: 400, y: 350 },
        RawPoint { x: 400, y: 3600 },
        RawPoint { x: 3500, y: 350 },
        RawPoint { x: 3500, y: 3600 },
    ];
    for c in corners {
        for _ in 0..3 {
            hw.raw_touches.push_back(Some(c));
        }
        // One sample ends the averaging, one confirms the release.
        hw.raw_touches.push_back(None);
        hw.raw_touches.push_back(None);
    }
}

fn boot(
    hw: &mut MockBoard,
    store: &mut impl CalibrationPort,
) -> (PanelService, RecordingSink, CalibrationSource) {
    let mut app = PanelService::new(PanelConfig::default());
    let mut sink = RecordingSink::default();
    let source = app.boot(hw, store, &mut sink);
    (app, sink, source)
}

#[test]
fn valid_blob_skips_acquisition() {
    let mut hw = MockBoard::new();
    let cal = stored_calibration();
    let mut store = MockStore::with_bytes(CalibrationBlob::from(&cal).as_bytes());

    let (_, sink, source) = boot(&mut hw, &mut store);

    assert_eq!(source, CalibrationSource::Restored);
    assert_eq!(hw.calibration, Some(cal));
    assert_eq!(store.saves, 0);
    assert!(!hw.has_text("Touch the corners"));
    assert_eq!(
        sink.events,
        vec![
            AppEvent::Calibration(CalibrationSource::Restored),
            AppEvent::Started
        ]
    );
}

#[test]
fn missing_blob_acquires_and_persists() {
    let mut hw = MockBoard::new();
    script_corner_presses(&mut hw);
    let mut store = MockStore::empty();

    let (_, sink, source) = boot(&mut hw, &mut store);

    assert_eq!(source, CalibrationSource::Acquired);
    assert!(hw.has_text("Touch the corners"));
    assert!(hw.raw_touches.is_empty());
    assert_eq!(store.saves, 1);

    let applied = hw.calibration.expect("calibration applied");
    let saved = store.blob.as_deref().expect("blob saved");
    assert_eq!(saved.len(), 14);
    assert_eq!(CalibrationBlob::from(&applied).as_bytes(), saved);
    assert_eq!(
        sink.events[0],
        AppEvent::Calibration(CalibrationSource::Acquired)
    );
}

#[test]
fn acquired_calibration_survives_next_boot() {
    let mut hw = MockBoard::new();
    script_corner_presses(&mut hw);
    let mut store = MockStore::empty();
    boot(&mut hw, &mut store);
    let first = hw.calibration;

    let mut hw2 = MockBoard::new();
    let (_, _, source) = boot(&mut hw2, &mut store);
    assert_eq!(source, CalibrationSource::Restored);
    assert_eq!(hw2.calibration, first);
}

#[test]
fn short_blob_is_treated_as_corrupt() {
    let mut hw = MockBoard::new();
    script_corner_presses(&mut hw);
    let mut store = MockStore::with_bytes(&[0u8; 10]);

    let (_, _, source) = boot(&mut hw, &mut store);

    assert_eq!(source, CalibrationSource::Acquired);
    assert_eq!(store.blob.as_ref().map(Vec::len), Some(14));
}

#[test]
fn unavailable_storage_still_acquires() {
    let mut hw = MockBoard::new();
    script_corner_presses(&mut hw);
    let mut store = MockStore::unavailable();

    let (_, sink, source) = boot(&mut hw, &mut store);

    assert_eq!(source, CalibrationSource::Acquired);
    assert!(hw.calibration.is_some());
    assert_eq!(store.saves, 0);
    assert_eq!(sink.events.last(), Some(&AppEvent::Started));
}

#[test]
fn nvs_backed_store_round_trips_across_boots() {
    let mut hw = MockBoard::new();
    script_corner_presses(&mut hw);
    let mut store = NvsCalibrationStore::new(MockNvs::default());

    let (_, _, source) = boot(&mut hw, &mut store);
    assert_eq!(source, CalibrationSource::Acquired);

    let mut hw2 = MockBoard::new();
    let (_, _, source) = boot(&mut hw2, &mut store);
    assert_eq!(source, CalibrationSource::Restored);
    assert_eq!(hw2.calibration, hw.calibration);

    store.clear().unwrap();
    let mut hw3 = MockBoard::new();
    script_corner_presses(&mut hw3);
    let (_, _, source) = boot(&mut hw3, &mut store);
    assert_eq!(source, CalibrationSource::Acquired);
}

#[test]
fn console_input_at_boot_forces_recalibration() {
    let mut hw = MockBoard::new();
    script_corner_presses(&mut hw);
    let stale = stored_calibration();
    let mut store = NvsCalibrationStore::new(MockNvs::default());
    store.save(&CalibrationBlob::from(&stale)).unwrap();
    let mut console = MockConsole {
        typed: true,
        ..MockConsole::default()
    };

    let mut app = PanelService::new(PanelConfig::default());
    assert!(app.check_recalibration_request(&mut console));
    let source = app.boot(&mut hw, &mut store, &mut RecordingSink::default());

    assert_eq!(source, CalibrationSource::Acquired);
    assert!(hw.has_text("Touch the corners"));
    let fresh = hw.calibration.expect("calibration applied");
    assert_ne!(fresh, stale);
    assert_eq!(store.load(), Ok(CalibrationBlob::from(&fresh)));

    // One-shot: the following boot restores the new blob.
    let mut hw2 = MockBoard::new();
    let (_, _, source) = boot(&mut hw2, &mut store);
    assert_eq!(source, CalibrationSource::Restored);
    assert_eq!(hw2.calibration, Some(fresh));
}

#[test]
fn quiet_console_keeps_stored_calibration() {
    let mut hw = MockBoard::new();
    let cal = stored_calibration();
    let mut store = MockStore::with_bytes(CalibrationBlob::from(&cal).as_bytes());
    let mut console = MockConsole::default();

    let mut app = PanelService::new(PanelConfig::default());
    assert!(!app.check_recalibration_request(&mut console));
    let source = app.boot(&mut hw, &mut store, &mut RecordingSink::default());

    assert_eq!(source, CalibrationSource::Restored);
    assert_eq!(hw.calibration, Some(cal));
}

#[test]
fn recalibration_with_unavailable_storage_still_acquires() {
    let mut hw = MockBoard::new();
    script_corner_presses(&mut hw);
    let mut store = MockStore::unavailable();
    let mut console = MockConsole {
        typed: true,
        ..MockConsole::default()
    };

    let mut app = PanelService::new(PanelConfig::default());
    app.check_recalibration_request(&mut console);
    let source = app.boot(&mut hw, &mut store, &mut RecordingSink::default());

    assert_eq!(source, CalibrationSource::Acquired);
    assert!(hw.calibration.is_some());
    assert_eq!(store.saves, 0);
}

#[test]
fn boot_powers_up_in_order() {
    let mut hw = MockBoard::new();
    let mut store = MockStore::with_bytes(CalibrationBlob::from(&stored_calibration()).as_bytes());

    let (app, _, _) = boot(&mut hw, &mut store);

    let cpu = hw.position(&HwCall::Cpu(240)).unwrap();
    let relays = hw.position(&HwCall::Outputs(false)).unwrap();
    let conversion = hw.position(&HwCall::RequestConversion).unwrap();
    let dark = hw.position(&HwCall::Backlight(false)).unwrap();
    let title = hw
        .calls
        .iter()
        .position(|c| *c == HwCall::Text("CONTROL PANEL".into()))
        .unwrap();
    let lit = hw.position(&HwCall::Backlight(true)).unwrap();

    assert!(cpu < relays);
    assert!(relays < conversion);
    assert!(conversion < dark);
    assert!(dark < title);
    assert!(title < lit);
    assert_eq!(lit, hw.calls.len() - 1);

    let state = app.state();
    assert!(state.display_awake);
    assert!(!state.wireless_enabled);
    assert!(!state.touch_output_enabled);
    assert_eq!(app.cpu_mhz(), 240);
    assert!(hw.has_text("BT OFF"));
    assert!(hw.has_text("OUTPUT OFF"));
}
