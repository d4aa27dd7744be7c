//! The single owned system state.
//!
//! One instance lives inside [`PanelService`](super::service::PanelService)
//! for the whole runtime.  Nothing else holds it; callbacks from other
//! tasks never see it.

/// Logical state of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemState {
    /// User-facing ON/OFF toggle, independent of relay cycling.
    pub touch_output_enabled: bool,
    /// Display and backlight powered, touch active.
    pub display_awake: bool,
    /// Wireless report channel started.
    pub wireless_enabled: bool,
    relay_phase: bool,
}

/// Levels of the two relay channels.  Only constructible from a phase, so
/// the channels can never agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayOutputs {
    pub relay1: bool,
    pub relay2: bool,
}

impl RelayOutputs {
    pub fn from_phase(phase: bool) -> Self {
        Self {
            relay1: phase,
            relay2: !phase,
        }
    }
}

impl SystemState {
    /// Power-on state: display not yet lit, radio off, output off.
    pub fn new(relay_phase: bool) -> Self {
        Self {
            touch_output_enabled: false,
            display_awake: false,
            wireless_enabled: false,
            relay_phase,
        }
    }

    pub fn relay_phase(&self) -> bool {
        self.relay_phase
    }

    pub fn relay_outputs(&self) -> RelayOutputs {
        RelayOutputs::from_phase(self.relay_phase)
    }

    /// Invert the relay phase and return the new value.
    pub(crate) fn toggle_relay_phase(&mut self) -> bool {
        self.relay_phase = !self.relay_phase;
        self.relay_phase
    }
}
