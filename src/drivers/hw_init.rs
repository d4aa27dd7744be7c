//! One-shot GPIO initialization and raw pin helpers.
//!
//! Configures the relay and backlight outputs using raw ESP-IDF sys calls.
//! Called once from `main()` before the control loop starts.  The SPI bus,
//! the panel and the 1-Wire pin are owned by their drivers and set up
//! there.
//!
//! Each output level is latched before the pin switches to output mode,
//! so the relays come up complementary.  The backlight comes up lit so a
//! boot-time touch calibration is visible.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::app::state::RelayOutputs;
use crate::config::PanelConfig;
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    /// The ILI9341 rejected its init sequence.
    DisplayInitFailed,
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::DisplayInitFailed => write!(f, "display init failed"),
        }
    }
}

/// Power-on level of every push-pull output, in configuration order.
pub fn initial_levels(config: &PanelConfig) -> [(i32, bool); 3] {
    let relays = RelayOutputs::from_phase(config.relay_initial_phase);
    [
        (pins::RELAY1_GPIO, relays.relay1 != config.relay_active_low),
        (pins::RELAY2_GPIO, relays.relay2 != config.relay_active_low),
        (pins::TFT_BACKLIGHT_GPIO, config.backlight_active_high),
    ]
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals(config: &PanelConfig) -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the loop; single-threaded.
    unsafe { init_gpio_outputs(&initial_levels(config)) }
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals(config: &PanelConfig) -> Result<(), HwInitError> {
    for (pin, high) in initial_levels(config) {
        gpio_write(pin, high);
    }
    log::info!("hw_init(sim): output levels latched");
    Ok(())
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs(levels: &[(i32, bool)]) -> Result<(), HwInitError> {
    for &(pin, high) in levels {
        unsafe { gpio_set_level(pin as gpio_num_t, u32::from(high)) };
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }

    info!("hw_init: GPIO outputs configured (relays, backlight)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // pin was validated during init_gpio_outputs(). Main-loop only.
    unsafe {
        gpio_set_level(pin as gpio_num_t, u32::from(high));
    }
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
static SIM_LEVELS: [core::sync::atomic::AtomicBool; 40] =
    [const { core::sync::atomic::AtomicBool::new(false) }; 40];

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) {
    if let Some(level) = usize::try_from(pin).ok().and_then(|p| SIM_LEVELS.get(p)) {
        level.store(high, core::sync::atomic::Ordering::Relaxed);
    }
}

/// Last level written to `pin` (host builds only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_gpio_level(pin: i32) -> bool {
    usize::try_from(pin)
        .ok()
        .and_then(|p| SIM_LEVELS.get(p))
        .is_some_and(|l| l.load(core::sync::atomic::Ordering::Relaxed))
}

/// Serialises host tests that read back the shared pin levels.
#[cfg(all(test, not(target_os = "espidf")))]
pub(crate) static SIM_GPIO_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
