//! Mock adapters for integration tests.
//!
//! Records every hardware call so tests can assert on the full command
//! history without touching real GPIO, SPI or the Bluetooth stack.  Time
//! is a plain counter: tests advance it explicitly, and `delay_ms` moves
//! it forward like a real blocking wait would.

use std::collections::{HashMap, VecDeque};

use relaypanel::app::events::AppEvent;
use relaypanel::app::ports::{
    CalibrationPort, ConsolePort, DisplayPort, EventSink, PlatformPort, ReceivedLine, RelayPort,
    SensorBusPort, StorageError, StoragePort, TouchCalibrationPort, WirelessPort,
};
use relaypanel::error::{CalibrationError, CommsError};
use relaypanel::events::EventFlag;
use relaypanel::touch::TouchPoint;
use relaypanel::touch::calibration::{CalibrationBlob, RawPoint, TouchCalibration};
use relaypanel::ui::layout::{Rect, TextStyle};

// ── Hardware call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HwCall {
    FillScreen(u16),
    FillRect(Rect, u16),
    FillRoundRect(Rect, u16),
    DrawRoundRect(Rect, u16),
    Text(String),
    PanelPower(bool),
    Backlight(bool),
    Cpu(u32),
    Outputs(bool),
    RequestConversion,
    Delay(u32),
    ApplyCalibration([u16; 5]),
}

// ── MockBoard ─────────────────────────────────────────────────

pub struct MockBoard {
    pub calls: Vec<HwCall>,
    pub now: u64,
    pub temperatures: [Option<f32>; 2],
    /// Scripted `poll_touch` results, one per call; empty means no contact.
    pub touches: VecDeque<Option<TouchPoint>>,
    /// Scripted `read_raw_touch` results; empty means no contact.
    pub raw_touches: VecDeque<Option<RawPoint>>,
    pub calibration: Option<TouchCalibration>,
}

#[allow(dead_code)]
impl MockBoard {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            now: 0,
            temperatures: [Some(21.5), Some(19.0)],
            touches: VecDeque::new(),
            raw_touches: VecDeque::new(),
            calibration: None,
        }
    }

    pub fn advance(&mut self, ms: u64) {
        self.now += ms;
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Queue one contact at `(x, y)` followed by a release.
    pub fn tap(&mut self, x: u16, y: u16) {
        self.touches.push_back(Some(TouchPoint { x, y }));
    }

    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn has_text(&self, text: &str) -> bool {
        self.texts().contains(&text)
    }

    pub fn draw_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    HwCall::FillScreen(_)
                        | HwCall::FillRect(..)
                        | HwCall::FillRoundRect(..)
                        | HwCall::DrawRoundRect(..)
                        | HwCall::Text(_)
                )
            })
            .count()
    }

    pub fn outputs(&self) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::Outputs(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    pub fn cpu_history(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::Cpu(m) => Some(*m),
                _ => None,
            })
            .collect()
    }

    pub fn conversions(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == HwCall::RequestConversion)
            .count()
    }

    pub fn position(&self, call: &HwCall) -> Option<usize> {
        self.calls.iter().position(|c| c == call)
    }
}

impl Default for MockBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayPort for MockBoard {
    fn fill_screen(&mut self, color: u16) {
        self.calls.push(HwCall::FillScreen(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: u16) {
        self.calls.push(HwCall::FillRect(rect, color));
    }

    fn fill_round_rect(&mut self, rect: Rect, _radius: u16, color: u16) {
        self.calls.push(HwCall::FillRoundRect(rect, color));
    }

    fn draw_round_rect(&mut self, rect: Rect, _radius: u16, color: u16) {
        self.calls.push(HwCall::DrawRoundRect(rect, color));
    }

    fn draw_text(&mut self, text: &str, _x: i32, _y: i32, _style: TextStyle) {
        self.calls.push(HwCall::Text(text.to_owned()));
    }

    fn poll_touch(&mut self, _timeout_ms: u32) -> Option<TouchPoint> {
        self.touches.pop_front().flatten()
    }

    fn set_power_state(&mut self, awake: bool) {
        self.calls.push(HwCall::PanelPower(awake));
    }

    fn set_backlight(&mut self, on: bool) {
        self.calls.push(HwCall::Backlight(on));
    }
}

impl TouchCalibrationPort for MockBoard {
    fn read_raw_touch(&mut self, _timeout_ms: u32) -> Option<RawPoint> {
        self.raw_touches.pop_front().flatten()
    }

    fn apply_calibration(&mut self, calibration: &TouchCalibration) {
        self.calibration = Some(*calibration);
        self.calls
            .push(HwCall::ApplyCalibration(calibration.coefficients()));
    }
}

impl SensorBusPort for MockBoard {
    fn request_conversion(&mut self) {
        self.calls.push(HwCall::RequestConversion);
    }

    fn read_channel(&mut self, index: usize) -> Option<f32> {
        self.temperatures.get(index).copied().flatten()
    }
}

impl RelayPort for MockBoard {
    fn set_outputs(&mut self, phase: bool) {
        self.calls.push(HwCall::Outputs(phase));
    }
}

impl PlatformPort for MockBoard {
    fn now_ms(&self) -> u64 {
        self.now
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls.push(HwCall::Delay(ms));
        self.now += u64::from(ms);
    }

    fn set_cpu_mhz(&mut self, mhz: u32) {
        self.calls.push(HwCall::Cpu(mhz));
    }
}

// ── MockRadio ─────────────────────────────────────────────────

pub struct MockRadio {
    pub started: bool,
    pub start_calls: Vec<String>,
    pub stop_calls: usize,
    pub connected: bool,
    pub fail_start: bool,
    pub sent: Vec<String>,
    pub incoming: VecDeque<String>,
    pub notifier: Option<EventFlag>,
}

#[allow(dead_code)]
impl MockRadio {
    pub fn new() -> Self {
        Self {
            started: false,
            start_calls: Vec::new(),
            stop_calls: 0,
            connected: false,
            fail_start: false,
            sent: Vec::new(),
            incoming: VecDeque::new(),
            notifier: None,
        }
    }

    /// A client connects: raise the flag the way the stack callback does.
    pub fn connect_client(&mut self) {
        self.connected = true;
        if let Some(flag) = &self.notifier {
            flag.raise();
        }
    }
}

impl Default for MockRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl WirelessPort for MockRadio {
    fn start(&mut self, name: &str) -> Result<(), CommsError> {
        self.start_calls.push(name.to_owned());
        if self.fail_start {
            return Err(CommsError::StackInitFailed);
        }
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.stop_calls += 1;
        self.started = false;
        self.connected = false;
    }

    fn is_client_connected(&self) -> bool {
        self.started && self.connected
    }

    fn send(&mut self, text: &str) -> Result<(), CommsError> {
        if !self.is_client_connected() {
            return Err(CommsError::NotConnected);
        }
        self.sent.push(text.to_owned());
        Ok(())
    }

    fn try_receive_line(&mut self) -> Option<ReceivedLine> {
        let line = self.incoming.pop_front()?;
        let mut out = ReceivedLine::new();
        out.push_str(&line).ok()?;
        Some(out)
    }

    fn set_connect_notifier(&mut self, flag: EventFlag) {
        self.notifier = Some(flag);
    }
}

// ── MockConsole ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockConsole {
    pub written: Vec<String>,
    /// Bytes typed before boot; consumed by the first peek.
    pub typed: bool,
}

impl ConsolePort for MockConsole {
    fn write_text(&mut self, text: &str) {
        self.written.push(text.to_owned());
    }

    fn input_pending(&mut self) -> bool {
        std::mem::take(&mut self.typed)
    }
}

// ── MockStore (calibration) ───────────────────────────────────

pub struct MockStore {
    pub blob: Option<Vec<u8>>,
    pub available: bool,
    pub saves: usize,
}

#[allow(dead_code)]
impl MockStore {
    pub fn empty() -> Self {
        Self {
            blob: None,
            available: true,
            saves: 0,
        }
    }

    pub fn with_bytes(bytes: &[u8]) -> Self {
        Self {
            blob: Some(bytes.to_vec()),
            available: true,
            saves: 0,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            blob: None,
            available: false,
            saves: 0,
        }
    }
}

impl CalibrationPort for MockStore {
    fn load(&self) -> Result<CalibrationBlob, CalibrationError> {
        if !self.available {
            return Err(CalibrationError::StorageUnavailable);
        }
        match &self.blob {
            Some(bytes) => CalibrationBlob::from_bytes(bytes),
            None => Err(CalibrationError::NotFound),
        }
    }

    fn save(&mut self, blob: &CalibrationBlob) -> Result<(), CalibrationError> {
        if !self.available {
            return Err(CalibrationError::StorageUnavailable);
        }
        self.blob = Some(blob.as_bytes().to_vec());
        self.saves += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), CalibrationError> {
        if !self.available {
            return Err(CalibrationError::StorageUnavailable);
        }
        self.blob = None;
        Ok(())
    }
}

// ── MockNvs (raw storage) ─────────────────────────────────────

#[derive(Default)]
pub struct MockNvs {
    store: HashMap<String, Vec<u8>>,
}

impl StoragePort for MockNvs {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        match self.store.get(&format!("{}::{}", namespace, key)) {
            Some(v) if v.len() > buf.len() => Err(StorageError::BufferTooSmall),
            Some(v) => {
                buf[..v.len()].copy_from_slice(v);
                Ok(v.len())
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.store
            .insert(format!("{}::{}", namespace, key), data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.store.remove(&format!("{}::{}", namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.store.contains_key(&format!("{}::{}", namespace, key))
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
