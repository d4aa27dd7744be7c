//! Fuzz target: `CalibrationBlob::from_bytes`
//!
//! Whatever NVS hands back, parsing must either reject it or yield a
//! calibration that maps every raw sample onto the screen.
//!
//! cargo fuzz run fuzz_calibration_blob

#![no_main]

use libfuzzer_sys::fuzz_target;
use relaypanel::touch::calibration::{CalibrationBlob, RawPoint, TouchCalibration};
use relaypanel::ui::layout::{SCREEN_HEIGHT, SCREEN_WIDTH};

fuzz_target!(|data: &[u8]| {
    let Ok(blob) = CalibrationBlob::from_bytes(data) else {
        assert_ne!(data.len(), 14);
        return;
    };
    assert_eq!(blob.as_bytes(), data);

    let cal = TouchCalibration::from(&blob);
    assert_eq!(CalibrationBlob::from(&cal), blob);

    for raw in [(0, 0), (4095, 4095), (0, 4095), (2048, 2048), (u16::MAX, u16::MAX)] {
        let p = cal.map(RawPoint { x: raw.0, y: raw.1 }, SCREEN_WIDTH, SCREEN_HEIGHT);
        assert!(p.x < SCREEN_WIDTH && p.y < SCREEN_HEIGHT);
    }
});
