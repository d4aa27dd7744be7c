//! Outbound application events.
//!
//! [`PanelService`](super::service::PanelService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  The firmware logs them;
//! tests record them.

use crate::sensors::SensorReadings;

use super::commands::TouchAction;
use super::ports::ReceivedLine;

/// How the touch calibration was obtained at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationSource {
    Restored,
    Acquired,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Boot sequence complete, control loop about to start.
    Started,

    /// Touch calibration installed.
    Calibration(CalibrationSource),

    /// A touch resolved to an action.
    Touch(TouchAction),

    /// Display entered or left sleep mode.
    PowerChanged { awake: bool, cpu_mhz: u32 },

    /// Wireless channel started or stopped.
    WirelessChanged { enabled: bool },

    /// User output flag flipped.
    OutputToggled { enabled: bool },

    /// Sensor task ran.
    SensorsPolled(SensorReadings),

    /// Relay task ran.
    RelaysToggled { phase: bool },

    /// A line arrived over the wireless channel.
    LineReceived(ReceivedLine),

    /// A status report was written; `wireless` when it also went to a client.
    ReportEmitted { wireless: bool },
}
