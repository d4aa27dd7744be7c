//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to the UART console in production).

use log::info;

use crate::app::events::{AppEvent, CalibrationSource};
use crate::app::ports::EventSink;
use crate::sensors::SensorReading;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

fn reading(r: SensorReading) -> String {
    match r {
        SensorReading::Celsius(c) => format!("{:.1}\u{00b0}C", c),
        SensorReading::Disconnected => "disconnected".into(),
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => info!("START | control loop running"),
            AppEvent::Calibration(CalibrationSource::Restored) => {
                info!("CALIB | restored from storage");
            }
            AppEvent::Calibration(CalibrationSource::Acquired) => {
                info!("CALIB | acquired interactively");
            }
            AppEvent::Touch(action) => info!("TOUCH | {:?}", action),
            AppEvent::PowerChanged { awake, cpu_mhz } => {
                info!(
                    "POWER | display={} cpu={}MHz",
                    if *awake { "awake" } else { "asleep" },
                    cpu_mhz
                );
            }
            AppEvent::WirelessChanged { enabled } => {
                info!("WIRELESS | {}", if *enabled { "on" } else { "off" });
            }
            AppEvent::OutputToggled { enabled } => {
                info!("OUTPUT | {}", if *enabled { "on" } else { "off" });
            }
            AppEvent::SensorsPolled(r) => {
                info!(
                    "SENSORS | S1={} S2={}",
                    reading(r.channels[0]),
                    reading(r.channels[1])
                );
            }
            AppEvent::RelaysToggled { phase } => {
                info!("RELAYS | K1={} K2={}", u8::from(*phase), u8::from(!*phase));
            }
            AppEvent::LineReceived(line) => info!("RX | {}", line),
            AppEvent::ReportEmitted { wireless } => {
                info!("REPORT | console{}", if *wireless { "+wireless" } else { "" });
            }
        }
    }
}
