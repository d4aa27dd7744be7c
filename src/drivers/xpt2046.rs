//! XPT2046 resistive touch controller on a shared SPI bus.
//!
//! Each conversion is one 3-byte transfer: the control byte, then a
//! 12-bit result left-aligned in the next 16 bits.
//!
//! | Control | Channel             |
//! |---------|---------------------|
//! | `0xD0`  | X position          |
//! | `0x90`  | Y position          |
//! | `0xB0`  | Z1 (pressure)       |
//! | `0xC0`  | Z2 (pressure)       |
//!
//! Pressure is `z1 + 4095 - z2`; anything at or below the threshold is
//! pen-up.

use embedded_hal::spi::SpiDevice;

use crate::touch::calibration::RawPoint;

const CMD_X: u8 = 0xD0;
const CMD_Y: u8 = 0x90;
const CMD_Z1: u8 = 0xB0;
const CMD_Z2: u8 = 0xC0;

/// Consecutive samples closer than this (per axis) count as stable.
pub const STABLE_DELTA: u16 = 10;

/// Minimum number of sample pairs tried per read, whatever the timeout.
const MIN_ATTEMPTS: u32 = 2;

/// Raw touch source used by the display adapter.
pub trait TouchController {
    /// A stable raw sample, or `None` on pen-up or when no two samples
    /// agreed within `timeout_ms` worth of attempts.
    fn read_raw(&mut self, timeout_ms: u32) -> Option<RawPoint>;
}

/// 12-bit result from the two bytes following the control byte.
pub fn decode_sample(hi: u8, lo: u8) -> u16 {
    ((u16::from(hi) << 8 | u16::from(lo)) >> 3) & 0x0FFF
}

pub fn pressure(z1: u16, z2: u16) -> u16 {
    (z1 + 4095).saturating_sub(z2)
}

pub struct Xpt2046<SPI> {
    spi: SPI,
    threshold: u16,
}

impl<SPI: SpiDevice> Xpt2046<SPI> {
    pub fn new(spi: SPI, threshold: u16) -> Self {
        Self { spi, threshold }
    }

    fn convert(&mut self, cmd: u8) -> Option<u16> {
        let mut buf = [cmd, 0, 0];
        match self.spi.transfer_in_place(&mut buf) {
            Ok(()) => Some(decode_sample(buf[1], buf[2])),
            Err(e) => {
                log::warn!("xpt2046: SPI transfer failed: {:?}", e);
                None
            }
        }
    }

    pub fn is_pressed(&mut self) -> bool {
        let (Some(z1), Some(z2)) = (self.convert(CMD_Z1), self.convert(CMD_Z2)) else {
            return false;
        };
        pressure(z1, z2) > self.threshold
    }

    fn sample(&mut self) -> Option<RawPoint> {
        Some(RawPoint {
            x: self.convert(CMD_X)?,
            y: self.convert(CMD_Y)?,
        })
    }
}

impl<SPI: SpiDevice> TouchController for Xpt2046<SPI> {
    fn read_raw(&mut self, timeout_ms: u32) -> Option<RawPoint> {
        let mut prev: Option<RawPoint> = None;
        for _ in 0..timeout_ms.max(MIN_ATTEMPTS) {
            if !self.is_pressed() {
                return None;
            }
            let p = self.sample()?;
            if let Some(q) = prev
                .filter(|q| p.x.abs_diff(q.x) <= STABLE_DELTA && p.y.abs_diff(q.y) <= STABLE_DELTA)
            {
                return Some(RawPoint {
                    x: (p.x + q.x) / 2,
                    y: (p.y + q.y) / 2,
                });
            }
            prev = Some(p);
        }
        None
    }
}
