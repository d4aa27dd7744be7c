//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter             | Implements                 | Connects to                 |
//! |---------------------|----------------------------|-----------------------------|
//! | `bt_serial`         | WirelessPort               | Bluedroid Classic SPP       |
//! | `calibration_store` | CalibrationPort            | any StoragePort (NVS)       |
//! | `console`           | ConsolePort                | UART0 via stdout            |
//! | `display`           | DisplayPort                | embedded-graphics target    |
//! |                     | TouchCalibrationPort       | XPT2046                     |
//! | `hardware`          | Board (all hardware ports) | panel, 1-Wire, relays, SoC  |
//! | `log_sink`          | EventSink                  | Serial log output           |
//! | `nvs`               | ConfigPort                 | NVS / in-memory store       |
//! |                     | StoragePort                |                             |
//! | `platform`          | PlatformPort               | esp_timer, FreeRTOS, esp_pm |

pub mod bt_serial;
pub mod calibration_store;
pub mod console;
pub mod display;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod platform;
pub(super) mod utils;
