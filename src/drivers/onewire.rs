//! Bit-banged 1-Wire master on a single open-drain GPIO.
//!
//! Standard-speed slot timings (µs):
//!
//! | Slot    | Drive low | Sample at | Slot total |
//! |---------|-----------|-----------|------------|
//! | Reset   | 480       | 70        | 960        |
//! | Write 1 | 6         | -         | 70         |
//! | Write 0 | 60        | -         | 70         |
//! | Read    | 6         | 15        | 70         |
//!
//! Each slot runs with interrupts masked; a slot is short enough that the
//! Bluetooth controller tolerates it.

/// Byte-level 1-Wire operations built on three bit primitives.
pub trait OneWireBus {
    /// Issue a reset pulse.  `true` if at least one device answered.
    fn reset(&mut self) -> bool;

    fn write_bit(&mut self, bit: bool);

    fn read_bit(&mut self) -> bool;

    /// LSB first.
    fn write_byte(&mut self, byte: u8) {
        for i in 0..8 {
            self.write_bit((byte >> i) & 1 == 1);
        }
    }

    /// LSB first.
    fn read_byte(&mut self) -> u8 {
        let mut byte = 0u8;
        for i in 0..8 {
            if self.read_bit() {
                byte |= 1 << i;
            }
        }
        byte
    }
}

pub struct GpioOneWire {
    gpio: i32,
}

impl GpioOneWire {
    #[cfg(target_os = "espidf")]
    pub fn new(gpio: i32) -> Self {
        use esp_idf_svc::sys::*;
        // SAFETY: one-time pin setup from the main task before any bus use.
        unsafe {
            gpio_reset_pin(gpio);
            gpio_set_direction(gpio, gpio_mode_t_GPIO_MODE_INPUT_OUTPUT_OD);
            gpio_set_pull_mode(gpio, gpio_pull_mode_t_GPIO_PULLUP_ONLY);
            gpio_set_level(gpio, 1);
        }
        log::info!("onewire: bus on GPIO{}", gpio);
        Self { gpio }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(gpio: i32) -> Self {
        log::info!("onewire(sim): bus on GPIO{} (no devices)", gpio);
        Self { gpio }
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }
}

#[cfg(target_os = "espidf")]
impl GpioOneWire {
    fn drive_low(&self) {
        // SAFETY: pin configured as open-drain output in `new`.
        unsafe { esp_idf_svc::sys::gpio_set_level(self.gpio, 0) };
    }

    fn release(&self) {
        // SAFETY: as above; level 1 releases the open-drain line.
        unsafe { esp_idf_svc::sys::gpio_set_level(self.gpio, 1) };
    }

    fn sample(&self) -> bool {
        // SAFETY: read-only register access on a configured pin.
        (unsafe { esp_idf_svc::sys::gpio_get_level(self.gpio) }) != 0
    }

    fn delay_us(us: u32) {
        // SAFETY: ROM busy-wait, callable from any context.
        unsafe { esp_idf_svc::sys::esp_rom_delay_us(us) };
    }
}

#[cfg(target_os = "espidf")]
impl OneWireBus for GpioOneWire {
    fn reset(&mut self) -> bool {
        let presence = esp_idf_svc::hal::interrupt::free(|| {
            self.drive_low();
            Self::delay_us(480);
            self.release();
            Self::delay_us(70);
            !self.sample()
        });
        Self::delay_us(410);
        presence
    }

    fn write_bit(&mut self, bit: bool) {
        esp_idf_svc::hal::interrupt::free(|| {
            self.drive_low();
            if bit {
                Self::delay_us(6);
                self.release();
                Self::delay_us(64);
            } else {
                Self::delay_us(60);
                self.release();
                Self::delay_us(10);
            }
        });
    }

    fn read_bit(&mut self) -> bool {
        esp_idf_svc::hal::interrupt::free(|| {
            self.drive_low();
            Self::delay_us(6);
            self.release();
            Self::delay_us(9);
            let bit = self.sample();
            Self::delay_us(55);
            bit
        })
    }
}

/// Host build: an empty bus.  Nothing ever answers a reset.
#[cfg(not(target_os = "espidf"))]
impl OneWireBus for GpioOneWire {
    fn reset(&mut self) -> bool {
        false
    }

    fn write_bit(&mut self, _bit: bool) {}

    fn read_bit(&mut self) -> bool {
        true
    }
}
