//! Two-channel relay driver.
//!
//! Both channels are always written together from a single phase:
//! K1 follows the phase, K2 its complement.  There is no API for
//! driving one channel alone.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the relay GPIOs via hw_init.
//! On host/test: hw_init records the levels in memory.

use log::debug;

use crate::app::ports::RelayPort;
use crate::app::state::RelayOutputs;
use crate::drivers::hw_init;
use crate::pins;

pub struct RelayDriver {
    /// Relay module energises on a LOW input.
    active_low: bool,
    outputs: Option<RelayOutputs>,
}

impl RelayDriver {
    pub fn new(active_low: bool) -> Self {
        Self {
            active_low,
            outputs: None,
        }
    }

    /// Electrical level for a logical channel state.
    pub fn level(&self, energised: bool) -> bool {
        energised != self.active_low
    }

    /// Logical outputs last written, `None` before the first write.
    pub fn outputs(&self) -> Option<RelayOutputs> {
        self.outputs
    }
}

impl RelayPort for RelayDriver {
    fn set_outputs(&mut self, phase: bool) {
        let out = RelayOutputs::from_phase(phase);
        hw_init::gpio_write(pins::RELAY1_GPIO, self.level(out.relay1));
        hw_init::gpio_write(pins::RELAY2_GPIO, self.level(out.relay2));
        debug!("relay: K1={} K2={}", out.relay1, out.relay2);
        self.outputs = Some(out);
    }
}
