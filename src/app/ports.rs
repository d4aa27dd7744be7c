//! Port traits: the hexagonal boundary between the control loop and the board.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ PanelService (domain)
//! ```
//!
//! Driven adapters (panel, sensor bus, relays, radio, storage) implement
//! these traits.  [`PanelService`](super::service::PanelService) consumes
//! them via generics, so the loop never touches a register directly and
//! every test runs against recording mocks.
//!
//! Hardware ports are fire-and-forget: a failed SPI or GPIO write is not
//! observable here.  Ports that can meaningfully fail return `Option` or a
//! typed error that the caller resolves locally.

use crate::error::{CalibrationError, CommsError};
use crate::events::EventFlag;
use crate::touch::calibration::{CalibrationBlob, RawPoint, TouchCalibration};
use crate::touch::TouchPoint;
use crate::ui::layout::{Rect, TextStyle};

// ───────────────────────────────────────────────────────────────
// Display surface (domain → panel)
// ───────────────────────────────────────────────────────────────

/// Drawing and touch sampling for the TFT panel.
///
/// Colours are raw RGB565 words.  Text is centred on `(x, y)`.
pub trait DisplayPort {
    fn fill_screen(&mut self, color: u16);

    fn fill_rect(&mut self, rect: Rect, color: u16);

    fn fill_round_rect(&mut self, rect: Rect, radius: u16, color: u16);

    fn draw_round_rect(&mut self, rect: Rect, radius: u16, color: u16);

    fn draw_text(&mut self, text: &str, x: i32, y: i32, style: TextStyle);

    /// Sample the touch controller for at most `timeout_ms`.  Returns
    /// calibrated screen coordinates, or `None` when nothing is pressed.
    fn poll_touch(&mut self, timeout_ms: u32) -> Option<TouchPoint>;

    /// Issue the panel's sleep-out (`true`) or sleep-in (`false`) command.
    fn set_power_state(&mut self, awake: bool);

    fn set_backlight(&mut self, on: bool);
}

/// Raw touch access used only while acquiring calibration at boot.
pub trait TouchCalibrationPort {
    /// Uncalibrated controller coordinates, `None` when nothing is pressed.
    fn read_raw_touch(&mut self, timeout_ms: u32) -> Option<RawPoint>;

    /// Install the mapping used by [`DisplayPort::poll_touch`].
    fn apply_calibration(&mut self, calibration: &TouchCalibration);
}

// ───────────────────────────────────────────────────────────────
// Sensor bus (hardware → domain)
// ───────────────────────────────────────────────────────────────

pub trait SensorBusPort {
    /// Start a temperature conversion on every channel.  Never blocks.
    fn request_conversion(&mut self);

    /// Latest reading in °C, `None` when the channel is disconnected.
    fn read_channel(&mut self, index: usize) -> Option<f32>;
}

// ───────────────────────────────────────────────────────────────
// Relays (domain → hardware)
// ───────────────────────────────────────────────────────────────

pub trait RelayPort {
    /// Drive relay 1 with `phase` and relay 2 with `!phase`.
    fn set_outputs(&mut self, phase: bool);
}

// ───────────────────────────────────────────────────────────────
// Platform: clock, delays, CPU frequency
// ───────────────────────────────────────────────────────────────

pub trait PlatformPort {
    /// Monotonic milliseconds since boot.
    fn now_ms(&self) -> u64;

    /// Short intentional settle wait.
    fn delay_ms(&mut self, ms: u32);

    fn set_cpu_mhz(&mut self, mhz: u32);
}

/// Everything the control loop drives on each pass.
pub trait Board: DisplayPort + SensorBusPort + RelayPort + PlatformPort {}

impl<T: DisplayPort + SensorBusPort + RelayPort + PlatformPort> Board for T {}

// ───────────────────────────────────────────────────────────────
// Wireless report channel
// ───────────────────────────────────────────────────────────────

/// Received line, newline stripped.
pub type ReceivedLine = heapless::String<128>;

/// Line-oriented serial transport (Bluetooth SPP on the board).
pub trait WirelessPort {
    /// Bring the radio up and start accepting a client under `name`.
    fn start(&mut self, name: &str) -> Result<(), CommsError>;

    /// Drop any client and power the radio down.  Idempotent.
    fn stop(&mut self);

    fn is_client_connected(&self) -> bool;

    /// Send text verbatim to the connected client.
    fn send(&mut self, text: &str) -> Result<(), CommsError>;

    /// Next complete received line, if any.  Never blocks.
    fn try_receive_line(&mut self) -> Option<ReceivedLine>;

    /// Flag raised from the stack's context whenever a client connects.
    fn set_connect_notifier(&mut self, flag: EventFlag);
}

// ───────────────────────────────────────────────────────────────
// Console (domain → UART)
// ───────────────────────────────────────────────────────────────

pub trait ConsolePort {
    fn write_text(&mut self, text: &str);

    /// True when the operator has typed something since boot.  Never blocks.
    fn input_pending(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Calibration store
// ───────────────────────────────────────────────────────────────

/// Load/save contract for the persisted touch calibration blob.
///
/// Every error is handled by the caller as "no calibration": the boot path
/// falls back to interactive acquisition.
pub trait CalibrationPort {
    fn load(&self) -> Result<CalibrationBlob, CalibrationError>;

    fn save(&mut self, blob: &CalibrationBlob) -> Result<(), CalibrationError>;

    /// Forget the stored blob.  Succeeds if nothing was stored.
    fn clear(&mut self) -> Result<(), CalibrationError>;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the panel configuration.
///
/// Implementations MUST validate before persisting and reject out-of-range
/// values with [`ConfigError::ValidationFailed`] instead of clamping.
pub trait ConfigPort {
    /// Returns [`PanelConfig::default()`](crate::config::PanelConfig) if
    /// nothing is stored.
    fn load(&self) -> Result<crate::config::PanelConfig, ConfigError>;

    fn save(&self, config: &crate::config::PanelConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Namespaced key-value blob storage.
///
/// Write operations MUST be atomic; the ESP-IDF NVS commit guarantees this
/// natively.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate
// ───────────────────────────────────────────────────────────────

/// The two periodic jobs of the control loop, in firing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskId {
    SensorPoll,
    RelayToggle,
}

/// Callback the [`Scheduler`](crate::scheduler::Scheduler) invokes for
/// each task that is due on a tick.
pub trait SchedulerDelegate {
    fn on_task_due(&mut self, task: TaskId, now_ms: u64);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    NotFound,
    /// Stored value is larger than the caller's buffer.
    BufferTooSmall,
    Full,
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::BufferTooSmall => write!(f, "value larger than buffer"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
