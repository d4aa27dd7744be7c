//! ESP32 platform adapter: monotonic clock, settle delays, CPU frequency.
//!
//! - **`target_os = "espidf"`**: `esp_timer_get_time()` for time,
//!   `FreeRtos::delay_ms` for waits (yields to the idle task and the
//!   Bluetooth stack), `esp_pm_configure` for the clock tier.
//! - **`not(target_os = "espidf")`**: `std::time::Instant` and
//!   `thread::sleep`; the requested frequency is only recorded.

use log::warn;

use crate::app::ports::PlatformPort;

pub struct Esp32Platform {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
    cpu_mhz: u32,
}

impl Default for Esp32Platform {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32Platform {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
            cpu_mhz: 0,
        }
    }

    /// Last frequency successfully requested, `0` before the first.
    pub fn cpu_mhz(&self) -> u32 {
        self.cpu_mhz
    }

    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        // SAFETY: read of the free-running high-resolution timer.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl PlatformPort for Esp32Platform {
    fn now_ms(&self) -> u64 {
        self.uptime_us() / 1_000
    }

    #[cfg(target_os = "espidf")]
    fn delay_ms(&mut self, ms: u32) {
        esp_idf_svc::hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }

    #[cfg(target_os = "espidf")]
    fn set_cpu_mhz(&mut self, mhz: u32) {
        use esp_idf_svc::sys::{esp_pm_config_esp32_t, esp_pm_configure, ESP_OK};

        let cfg = esp_pm_config_esp32_t {
            max_freq_mhz: mhz as i32,
            min_freq_mhz: mhz as i32,
            light_sleep_enable: false,
        };
        // SAFETY: esp_pm_configure copies the config struct before returning.
        let ret = unsafe { esp_pm_configure((&raw const cfg).cast()) };
        if ret == ESP_OK as i32 {
            self.cpu_mhz = mhz;
        } else {
            warn!("platform: esp_pm_configure({} MHz) failed (rc={})", mhz, ret);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn set_cpu_mhz(&mut self, mhz: u32) {
        if ![80, 160, 240].contains(&mhz) {
            warn!("platform(sim): {} MHz is not an ESP32 tier", mhz);
        }
        self.cpu_mhz = mhz;
    }
}
