//! Temperature channels.
//!
//! Two DS18B20 probes on one 1-Wire bus.  Each poll produces a fresh
//! [`SensorReadings`]; the service keeps only the latest one for redraws
//! and reports.

pub mod ds18b20;

use crate::app::ports::SensorBusPort;

/// Number of temperature channels on the panel.
pub const CHANNEL_COUNT: usize = 2;

/// One channel's value, or the disconnected sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorReading {
    Celsius(f32),
    Disconnected,
}

impl SensorReading {
    pub fn from_option(value: Option<f32>) -> Self {
        value.map_or(Self::Disconnected, Self::Celsius)
    }

    pub fn celsius(self) -> Option<f32> {
        match self {
            Self::Celsius(c) => Some(c),
            Self::Disconnected => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReadings {
    pub channels: [SensorReading; CHANNEL_COUNT],
}

impl Default for SensorReadings {
    fn default() -> Self {
        Self {
            channels: [SensorReading::Disconnected; CHANNEL_COUNT],
        }
    }
}

impl SensorReadings {
    pub fn new(channels: [SensorReading; CHANNEL_COUNT]) -> Self {
        Self { channels }
    }

    /// Read every channel from the bus.
    pub fn read_from(bus: &mut impl SensorBusPort) -> Self {
        let mut channels = [SensorReading::Disconnected; CHANNEL_COUNT];
        for (i, ch) in channels.iter_mut().enumerate() {
            *ch = SensorReading::from_option(bus.read_channel(i));
        }
        Self { channels }
    }
}
