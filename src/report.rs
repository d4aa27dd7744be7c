//! Status reporter.
//!
//! [`format_report`] is a pure function of the state and the latest
//! readings.  [`emit_report`] writes the text to the console every time and
//! to the wireless channel only while a client is attached.
//!
//! ```text
//! --- REPORT ---
//! S1: 23.5 C
//! S2: ERR
//! Relays: K1=ON K2=OFF
//! Output: OFF
//! Display: ON
//! --------------
//! ```

use core::fmt::Write;

use log::warn;

use crate::app::ports::{ConsolePort, WirelessPort};
use crate::app::state::SystemState;
use crate::sensors::{SensorReading, SensorReadings};

const HEADER: &str = "--- REPORT ---";
const FOOTER: &str = "--------------";

/// Report placeholder for a disconnected channel.
pub const ERROR_MARKER: &str = "ERR";

fn on_off(v: bool) -> &'static str {
    if v { "ON" } else { "OFF" }
}

/// Render the report.  Every line, including the last, ends in `\n`.
pub fn format_report(state: &SystemState, readings: &SensorReadings) -> String {
    let mut out = String::with_capacity(128);
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{HEADER}");
    for (i, reading) in readings.channels.iter().enumerate() {
        match reading {
            SensorReading::Celsius(c) => {
                let _ = writeln!(out, "S{}: {:.1} C", i + 1, c);
            }
            SensorReading::Disconnected => {
                let _ = writeln!(out, "S{}: {}", i + 1, ERROR_MARKER);
            }
        }
    }
    let relays = state.relay_outputs();
    let _ = writeln!(
        out,
        "Relays: K1={} K2={}",
        on_off(relays.relay1),
        on_off(relays.relay2)
    );
    let _ = writeln!(out, "Output: {}", on_off(state.touch_output_enabled));
    let _ = writeln!(
        out,
        "Display: {}",
        if state.display_awake { "ON" } else { "SLEEP" }
    );
    let _ = writeln!(out, "{FOOTER}");
    out
}

/// Write the report to the console, and to the radio if a client is
/// connected.  Returns `true` when the wireless send went through.
pub fn emit_report(
    state: &SystemState,
    readings: &SensorReadings,
    console: &mut impl ConsolePort,
    radio: &mut impl WirelessPort,
) -> bool {
    let text = format_report(state, readings);
    console.write_text(&text);

    if !radio.is_client_connected() {
        return false;
    }
    match radio.send(&text) {
        Ok(()) => true,
        Err(e) => {
            warn!("Report: wireless send failed: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings(a: Option<f32>, b: Option<f32>) -> SensorReadings {
        SensorReadings::new([SensorReading::from_option(a), SensorReading::from_option(b)])
    }

    #[test]
    fn layout_is_fixed() {
        let mut s = SystemState::new(true);
        s.display_awake = true;
        let text = format_report(&s, &readings(Some(23.46), Some(-4.0)));
        assert_eq!(
            text,
            "--- REPORT ---\n\
             S1: 23.5 C\n\
             S2: -4.0 C\n\
             Relays: K1=ON K2=OFF\n\
             Output: OFF\n\
             Display: ON\n\
             --------------\n"
        );
    }

    #[test]
    fn disconnected_channel_uses_marker() {
        let s = SystemState::new(false);
        let text = format_report(&s, &readings(None, Some(21.0)));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "S1: ERR");
        assert_eq!(lines[2], "S2: 21.0 C");
        assert_eq!(lines[3], "Relays: K1=OFF K2=ON");
        assert_eq!(lines[5], "Display: SLEEP");
    }

    #[test]
    fn deterministic() {
        let mut s = SystemState::new(false);
        s.touch_output_enabled = true;
        let r = readings(Some(19.99), None);
        assert_eq!(format_report(&s, &r), format_report(&s, &r));
    }
}
