//! Panel configuration parameters.
//!
//! Every timing constant and hardware polarity the control loop depends on.
//! Defaults reproduce the shipped board; overrides are persisted in NVS
//! through [`ConfigPort`](crate::app::ports::ConfigPort).

use serde::{Deserialize, Serialize};

/// Advertised Bluetooth name, fixed capacity so the config stays `Clone`
/// without touching the heap.
pub type DeviceName = heapless::String<24>;

/// CPU frequency tiers used by the power controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuClockPolicy {
    /// Display awake, or radio bring-up in progress.
    pub active_mhz: u32,
    /// Display asleep while the wireless channel is on.
    pub sleep_wireless_mhz: u32,
    /// Display asleep with the radio off.
    pub sleep_idle_mhz: u32,
}

impl CpuClockPolicy {
    /// Frequency to run at while the display sleeps.
    pub fn sleep_tier(&self, wireless_enabled: bool) -> u32 {
        if wireless_enabled {
            self.sleep_wireless_mhz
        } else {
            self.sleep_idle_mhz
        }
    }
}

impl Default for CpuClockPolicy {
    fn default() -> Self {
        Self {
            active_mhz: 240,
            sleep_wireless_mhz: 160,
            sleep_idle_mhz: 80,
        }
    }
}

/// Core panel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    // --- Periodic tasks ---
    /// Temperature poll interval (milliseconds)
    pub sensor_poll_interval_ms: u32,
    /// Relay phase flip interval (milliseconds)
    pub relay_toggle_interval_ms: u32,

    // --- Touch ---
    /// Upper bound on one touch sampling attempt (milliseconds)
    pub touch_sample_timeout_ms: u32,
    /// Quiet window after a contact before the next gesture is accepted
    pub touch_settle_ms: u32,
    /// Quiet window after an output toggle (longer, the button repaints)
    pub output_settle_ms: u32,
    /// Minimum XPT2046 pressure reading that counts as contact
    pub touch_pressure_threshold: u16,

    // --- Display / power ---
    /// Wait after the panel wake command before lighting the backlight
    pub display_settle_ms: u32,
    pub cpu: CpuClockPolicy,
    /// Backlight lights on a HIGH level (the shipped board lights on LOW)
    pub backlight_active_high: bool,

    // --- Relays ---
    /// Phase driven at boot: relay 1 follows it, relay 2 is its complement
    pub relay_initial_phase: bool,
    /// Relay module energises on a LOW input
    pub relay_active_low: bool,

    // --- Wireless ---
    pub wireless_name: DeviceName,
    /// Delay between a client connecting and the automatic report
    pub client_report_delay_ms: u32,
}

impl Default for PanelConfig {
    fn default() -> Self {
        let mut wireless_name = DeviceName::new();
        let _ = wireless_name.push_str("ESP32_TFT_PANEL");

        Self {
            sensor_poll_interval_ms: 2000,
            relay_toggle_interval_ms: 3000,

            touch_sample_timeout_ms: 250,
            touch_settle_ms: 300,
            output_settle_ms: 350,
            touch_pressure_threshold: 600,

            display_settle_ms: 120,
            cpu: CpuClockPolicy::default(),
            backlight_active_high: false,

            relay_initial_phase: false,
            relay_active_low: false,

            wireless_name,
            client_report_delay_ms: 200,
        }
    }
}
