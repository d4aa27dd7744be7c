//! GPIO / peripheral pin assignments for the ESP32 panel board.
//!
//! Single source of truth.  Raw-GPIO drivers (relays, backlight, 1-Wire)
//! take their numbers from here.  The SPI bus, TFT and touch pins are
//! claimed as typed HAL fields in `main`, which asserts them against the
//! constants below at compile time.

// ---------------------------------------------------------------------------
// Relays (two-channel opto-isolated module)
// ---------------------------------------------------------------------------

/// Relay K1, driven with the relay phase.
pub const RELAY1_GPIO: i32 = 33;
/// Relay K2, driven with the complement of the relay phase.
pub const RELAY2_GPIO: i32 = 26;

// ---------------------------------------------------------------------------
// Temperature bus
// ---------------------------------------------------------------------------

/// DS18B20 1-Wire data line (4.7 kΩ external pull-up).
pub const ONEWIRE_GPIO: i32 = 27;

// ---------------------------------------------------------------------------
// ILI9341 display + XPT2046 touch (shared VSPI bus)
// ---------------------------------------------------------------------------

pub const SPI_SCLK_GPIO: i32 = 18;
pub const SPI_MOSI_GPIO: i32 = 23;
pub const SPI_MISO_GPIO: i32 = 19;

pub const TFT_CS_GPIO: i32 = 15;
pub const TFT_DC_GPIO: i32 = 2;
pub const TFT_RST_GPIO: i32 = 4;
/// Backlight transistor base.
pub const TFT_BACKLIGHT_GPIO: i32 = 32;

pub const TOUCH_CS_GPIO: i32 = 5;

/// Display SPI clock.
pub const TFT_SPI_HZ: u32 = 40_000_000;
/// XPT2046 tops out at 2.5 MHz.
pub const TOUCH_SPI_HZ: u32 = 2_000_000;
