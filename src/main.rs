//! RelayPanel firmware entry point.
//!
//! Hexagonal architecture driven by one cooperative polling loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        BtSerial        StdoutConsole          │
//! │  (panel, DS18B20,       (WirelessPort)  (ConsolePort)          │
//! │   relays, platform)                                            │
//! │  NvsAdapter             NvsCalibrationStore    LogEventSink    │
//! │  (Config+Storage)       (CalibrationPort)      (EventSink)     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              PanelService (pure logic)                 │    │
//! │  │  Scheduler · PowerController · TouchRouter · Report    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{info, warn};

use esp_idf_svc::hal::delay::{Ets, FreeRtos};
use esp_idf_svc::hal::gpio::PinDriver;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::spi::{SpiDeviceDriver, SpiDriver, SpiDriverConfig, config::Config as SpiConfig};
use esp_idf_svc::hal::units::Hertz;
use mipidsi::interface::SpiInterface;
use mipidsi::models::ILI9341Rgb565;
use mipidsi::options::{ColorOrder, Orientation};

use relaypanel::adapters::bt_serial::BtSerial;
use relaypanel::adapters::calibration_store::NvsCalibrationStore;
use relaypanel::adapters::console::StdoutConsole;
use relaypanel::adapters::display::GraphicsPanel;
use relaypanel::adapters::hardware::HardwareAdapter;
use relaypanel::adapters::log_sink::LogEventSink;
use relaypanel::adapters::nvs::NvsAdapter;
use relaypanel::adapters::platform::Esp32Platform;
use relaypanel::app::ports::ConfigPort;
use relaypanel::app::service::PanelService;
use relaypanel::config::PanelConfig;
use relaypanel::error::Error;
use relaypanel::drivers::hw_init::{self, HwInitError};
use relaypanel::drivers::onewire::GpioOneWire;
use relaypanel::drivers::relay::RelayDriver;
use relaypanel::drivers::xpt2046::Xpt2046;
use relaypanel::pins;
use relaypanel::sensors::ds18b20::Ds18b20Bus;

/// Pixel staging buffer for the display interface.
const DISPLAY_BUFFER_LEN: usize = 512;

/// Yield between passes so the idle task and the Bluetooth stack run.
const LOOP_YIELD_MS: u32 = 5;

// The HAL hands out pins as typed fields, so the bus wiring below names
// them directly.  Keep it in step with the pin map.
const _: () = {
    assert!(pins::SPI_SCLK_GPIO == 18);
    assert!(pins::SPI_MOSI_GPIO == 23);
    assert!(pins::SPI_MISO_GPIO == 19);
    assert!(pins::TFT_CS_GPIO == 15);
    assert!(pins::TFT_DC_GPIO == 2);
    assert!(pins::TFT_RST_GPIO == 4);
    assert!(pins::TOUCH_CS_GPIO == 5);
};

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  RelayPanel v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config from NVS (or defaults) ──────────────────────
    let nvs = match NvsAdapter::new() {
        Ok(n) => Some(n),
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults and no persistence", Error::from(e));
            None
        }
    };
    let config = match nvs.as_ref().map(ConfigPort::load) {
        Some(Ok(cfg)) => {
            info!("Config loaded from NVS");
            cfg
        }
        Some(Err(e)) => {
            warn!("NVS config load failed ({}), using defaults", Error::from(e));
            PanelConfig::default()
        }
        None => PanelConfig::default(),
    };

    // ── 3. GPIO outputs: relays complementary, backlight lit ──
    hw_init::init_peripherals(&config).map_err(Error::from)?;

    let mut calibration_store = match nvs {
        Some(n) => NvsCalibrationStore::new(n),
        None => NvsCalibrationStore::unavailable(),
    };

    // ── 4. Display + touch on the shared VSPI bus ─────────────
    let p = Peripherals::take()?;
    let spi = SpiDriver::new(
        p.spi3,
        p.pins.gpio18,
        p.pins.gpio23,
        Some(p.pins.gpio19),
        &SpiDriverConfig::new(),
    )?;
    let tft_spi = SpiDeviceDriver::new(
        &spi,
        Some(p.pins.gpio15),
        &SpiConfig::new().baudrate(Hertz(pins::TFT_SPI_HZ)),
    )?;
    let touch_spi = SpiDeviceDriver::new(
        &spi,
        Some(p.pins.gpio5),
        &SpiConfig::new().baudrate(Hertz(pins::TOUCH_SPI_HZ)),
    )?;

    let dc = PinDriver::output(p.pins.gpio2)?;
    let rst = PinDriver::output(p.pins.gpio4)?;
    let buffer: &'static mut [u8] = Box::leak(vec![0u8; DISPLAY_BUFFER_LEN].into_boxed_slice());
    let display = mipidsi::Builder::new(ILI9341Rgb565, SpiInterface::new(tft_spi, dc, buffer))
        .reset_pin(rst)
        .display_size(240, 320)
        .orientation(Orientation::new())
        .color_order(ColorOrder::Bgr)
        .init(&mut Ets)
        .map_err(|_| Error::Init(HwInitError::DisplayInitFailed))?;

    let touch = Xpt2046::new(touch_spi, config.touch_pressure_threshold);
    let panel = GraphicsPanel::new(display, touch, config.backlight_active_high);

    // ── 5. Sensors, relays, platform ──────────────────────────
    let sensors = Ds18b20Bus::new(GpioOneWire::new(pins::ONEWIRE_GPIO));
    info!("DS18B20: {} device(s) on the bus", sensors.device_count());

    let mut hw = HardwareAdapter::new(
        panel,
        sensors,
        RelayDriver::new(config.relay_active_low),
        Esp32Platform::new(),
    );

    // ── 6. Wireless, console, event sink ──────────────────────
    let mut radio = BtSerial::new();
    let mut console = StdoutConsole::new();
    let mut sink = LogEventSink::new();

    // ── 7. Boot the service ───────────────────────────────────
    let mut app = PanelService::new(config);
    app.attach_wireless(&mut radio);
    app.check_recalibration_request(&mut console);
    app.boot(&mut hw, &mut calibration_store, &mut sink);

    info!("System ready. Entering control loop.");

    // ── 8. Control loop ───────────────────────────────────────
    loop {
        app.poll(&mut hw, &mut radio, &mut console, &mut sink);
        FreeRtos::delay_ms(LOOP_YIELD_MS);
    }
}
