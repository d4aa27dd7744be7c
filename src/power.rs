//! Power mode controller.
//!
//! Owns the display power state and the CPU clock target.  `wake` and
//! `sleep` are the only transitions; both are no-ops when the panel is
//! already in the requested mode.
//!
//! | Mode                | CPU tier              |
//! |---------------------|-----------------------|
//! | Awake               | `active_mhz`          |
//! | Asleep, radio on    | `sleep_wireless_mhz`  |
//! | Asleep, radio off   | `sleep_idle_mhz`      |
//!
//! The radio stack needs the active tier while it comes up, so enabling
//! wireless always passes through `active_mhz` first.

use log::info;

use crate::app::ports::{DisplayPort, PlatformPort};
use crate::app::state::SystemState;
use crate::config::{CpuClockPolicy, PanelConfig};

pub struct PowerController {
    policy: CpuClockPolicy,
    display_settle_ms: u32,
    cpu_mhz: u32,
}

impl PowerController {
    pub fn new(config: &PanelConfig) -> Self {
        Self {
            policy: config.cpu,
            display_settle_ms: config.display_settle_ms,
            cpu_mhz: config.cpu.active_mhz,
        }
    }

    /// Last frequency requested from the platform.
    pub fn cpu_mhz(&self) -> u32 {
        self.cpu_mhz
    }

    pub fn policy(&self) -> &CpuClockPolicy {
        &self.policy
    }

    fn set_cpu(&mut self, hw: &mut impl PlatformPort, mhz: u32) {
        if mhz != self.cpu_mhz {
            info!("Power: CPU {} -> {} MHz", self.cpu_mhz, mhz);
        }
        self.cpu_mhz = mhz;
        hw.set_cpu_mhz(mhz);
    }

    /// Boot-time clock: always the active tier.
    pub fn boot<H: PlatformPort>(&mut self, hw: &mut H) {
        let mhz = self.policy.active_mhz;
        self.set_cpu(hw, mhz);
    }

    /// Power the display back up.  Returns `true` on an actual transition;
    /// the caller then redraws the whole UI.
    pub fn wake<H: DisplayPort + PlatformPort>(&mut self, hw: &mut H, state: &mut SystemState) -> bool {
        if state.display_awake {
            return false;
        }
        let mhz = self.policy.active_mhz;
        self.set_cpu(hw, mhz);
        hw.set_power_state(true);
        hw.delay_ms(self.display_settle_ms);
        hw.set_backlight(true);
        state.display_awake = true;
        true
    }

    /// Blank the display and drop to the sleep tier matching the radio.
    pub fn sleep<H: DisplayPort + PlatformPort>(&mut self, hw: &mut H, state: &mut SystemState) -> bool {
        if !state.display_awake {
            return false;
        }
        hw.set_backlight(false);
        hw.set_power_state(false);
        let mhz = self.policy.sleep_tier(state.wireless_enabled);
        self.set_cpu(hw, mhz);
        state.display_awake = false;
        true
    }

    /// Call before starting the radio.
    pub fn prepare_radio<H: PlatformPort>(&mut self, hw: &mut H) {
        let mhz = self.policy.active_mhz;
        self.set_cpu(hw, mhz);
    }

    /// Call after `wireless_enabled` changed.  While asleep the tier
    /// follows the new radio state; while awake the active tier stays.
    pub fn wireless_changed<H: PlatformPort>(&mut self, hw: &mut H, state: &SystemState) {
        if !state.display_awake {
            let mhz = self.policy.sleep_tier(state.wireless_enabled);
            self.set_cpu(hw, mhz);
        }
    }
}
