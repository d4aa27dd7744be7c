//! Error types for the panel firmware.
//!
//! Subsystem errors ([`SensorError`], [`CalibrationError`], [`CommsError`])
//! stay local to the control loop: a failed read becomes a placeholder, a
//! failed store becomes an interactive calibration.  Bring-up failures in
//! `main` convert into [`Error`] and from there into `anyhow`.

use core::fmt;

use crate::app::ports::{ConfigError, StorageError};
use crate::drivers::hw_init::HwInitError;

// ---------------------------------------------------------------------------
// Bring-up error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// GPIO or panel initialisation failed.
    Init(HwInitError),
    /// The NVS backend failed.
    Storage(StorageError),
    /// Stored configuration is unusable.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(e) => write!(f, "init: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// No device answered, or it reported the disconnected sentinel.
    Disconnected,
    /// Scratchpad CRC did not match.
    CrcMismatch,
    /// Bus reset saw no presence pulse.
    NoPresence,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "sensor disconnected"),
            Self::CrcMismatch => write!(f, "scratchpad CRC mismatch"),
            Self::NoPresence => write!(f, "no presence pulse on bus"),
        }
    }
}

// ---------------------------------------------------------------------------
// Calibration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationError {
    /// No blob stored under the calibration key.
    NotFound,
    /// A blob exists but has the wrong size.
    Corrupt { len: usize },
    /// The backing store failed to initialise or to write.
    StorageUnavailable,
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "no stored calibration"),
            Self::Corrupt { len } => write!(f, "calibration blob corrupt ({len} bytes)"),
            Self::StorageUnavailable => write!(f, "calibration storage unavailable"),
        }
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// Controller or Bluedroid bring-up failed.
    StackInitFailed,
    /// SPP server registration failed.
    ServerStartFailed,
    /// A write was attempted with no client attached.
    NotConnected,
    /// The stack rejected an outgoing write.
    SendFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StackInitFailed => write!(f, "Bluetooth stack init failed"),
            Self::ServerStartFailed => write!(f, "SPP server start failed"),
            Self::NotConnected => write!(f, "no SPP client connected"),
            Self::SendFailed => write!(f, "SPP write failed"),
        }
    }
}
