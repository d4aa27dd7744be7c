//! Hardware adapter: bridges the board's peripherals to the domain ports.
//!
//! Owns the panel (display plus touch), the temperature bus, the relay
//! driver and the platform services, and exposes them as one value that
//! satisfies [`Board`](crate::app::ports::Board) and
//! [`TouchCalibrationPort`].  Every method is a straight delegation.  On
//! host targets the underlying drivers use their simulation backends.

use crate::app::ports::{
    DisplayPort, PlatformPort, RelayPort, SensorBusPort, TouchCalibrationPort,
};
use crate::adapters::platform::Esp32Platform;
use crate::drivers::relay::RelayDriver;
use crate::touch::TouchPoint;
use crate::touch::calibration::{RawPoint, TouchCalibration};
use crate::ui::layout::{Rect, TextStyle};

pub struct HardwareAdapter<P, S> {
    panel: P,
    sensors: S,
    relays: RelayDriver,
    platform: Esp32Platform,
}

impl<P, S> HardwareAdapter<P, S> {
    pub fn new(panel: P, sensors: S, relays: RelayDriver, platform: Esp32Platform) -> Self {
        Self {
            panel,
            sensors,
            relays,
            platform,
        }
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn relays(&self) -> &RelayDriver {
        &self.relays
    }

    pub fn platform(&self) -> &Esp32Platform {
        &self.platform
    }
}

// ── DisplayPort ───────────────────────────────────────────────

impl<P: DisplayPort, S> DisplayPort for HardwareAdapter<P, S> {
    fn fill_screen(&mut self, color: u16) {
        self.panel.fill_screen(color);
    }

    fn fill_rect(&mut self, rect: Rect, color: u16) {
        self.panel.fill_rect(rect, color);
    }

    fn fill_round_rect(&mut self, rect: Rect, radius: u16, color: u16) {
        self.panel.fill_round_rect(rect, radius, color);
    }

    fn draw_round_rect(&mut self, rect: Rect, radius: u16, color: u16) {
        self.panel.draw_round_rect(rect, radius, color);
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32, style: TextStyle) {
        self.panel.draw_text(text, x, y, style);
    }

    fn poll_touch(&mut self, timeout_ms: u32) -> Option<TouchPoint> {
        self.panel.poll_touch(timeout_ms)
    }

    fn set_power_state(&mut self, awake: bool) {
        self.panel.set_power_state(awake);
    }

    fn set_backlight(&mut self, on: bool) {
        self.panel.set_backlight(on);
    }
}

impl<P: TouchCalibrationPort, S> TouchCalibrationPort for HardwareAdapter<P, S> {
    fn read_raw_touch(&mut self, timeout_ms: u32) -> Option<RawPoint> {
        self.panel.read_raw_touch(timeout_ms)
    }

    fn apply_calibration(&mut self, calibration: &TouchCalibration) {
        self.panel.apply_calibration(calibration);
    }
}

// ── SensorBusPort ─────────────────────────────────────────────

impl<P, S: SensorBusPort> SensorBusPort for HardwareAdapter<P, S> {
    fn request_conversion(&mut self) {
        self.sensors.request_conversion();
    }

    fn read_channel(&mut self, index: usize) -> Option<f32> {
        self.sensors.read_channel(index)
    }
}

// ── RelayPort / PlatformPort ──────────────────────────────────

impl<P, S> RelayPort for HardwareAdapter<P, S> {
    fn set_outputs(&mut self, phase: bool) {
        self.relays.set_outputs(phase);
    }
}

impl<P, S> PlatformPort for HardwareAdapter<P, S> {
    fn now_ms(&self) -> u64 {
        self.platform.now_ms()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.platform.delay_ms(ms);
    }

    fn set_cpu_mhz(&mut self, mhz: u32) {
        self.platform.set_cpu_mhz(mhz);
    }
}
