//! DS18B20 probes on a shared 1-Wire bus.
//!
//! Conversions are pipelined: [`SensorBusPort::request_conversion`] first
//! collects the scratchpads of the conversion started on the previous call,
//! then broadcasts a fresh *Convert T*.  [`SensorBusPort::read_channel`]
//! only returns cached values, so neither call waits the 750 ms a 12-bit
//! conversion takes.

use crate::app::ports::SensorBusPort;
use crate::drivers::onewire::OneWireBus;
use crate::error::SensorError;

use super::CHANNEL_COUNT;

const CMD_SEARCH_ROM: u8 = 0xF0;
const CMD_MATCH_ROM: u8 = 0x55;
const CMD_SKIP_ROM: u8 = 0xCC;
const CMD_CONVERT_T: u8 = 0x44;
const CMD_READ_SCRATCHPAD: u8 = 0xBE;

/// Value the probe library of the board reports for a lost device.
pub const DISCONNECTED_C: f32 = -127.0;

/// Family code of the DS18B20.
pub const FAMILY_DS18B20: u8 = 0x28;

pub type RomCode = [u8; 8];

/// Dallas/Maxim CRC-8 (polynomial x⁸+x⁵+x⁴+1, reflected).
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &b in data {
        let mut byte = b;
        for _ in 0..8 {
            let mix = (crc ^ byte) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= 0x8C;
            }
            byte >>= 1;
        }
    }
    crc
}

/// Temperature from a CRC-checked scratchpad.
///
/// Undefined low bits are masked according to the configured resolution
/// (byte 4, bits 5..6).
pub fn decode_temperature(scratchpad: &[u8; 9]) -> f32 {
    let raw = i16::from_le_bytes([scratchpad[0], scratchpad[1]]);
    let mask: i16 = match (scratchpad[4] >> 5) & 0x03 {
        0 => !0x07,
        1 => !0x03,
        2 => !0x01,
        _ => !0x00,
    };
    f32::from(raw & mask) * 0.0625
}

/// Enumerate every ROM on the bus (Maxim AN187 search).
///
/// Codes with a bad CRC are skipped.  Stops after `N` devices.
pub fn search_roms<B: OneWireBus, const N: usize>(bus: &mut B) -> heapless::Vec<RomCode, N> {
    let mut found = heapless::Vec::new();
    let mut rom: RomCode = [0; 8];
    let mut last_discrepancy = 0usize;

    loop {
        if !bus.reset() {
            break;
        }
        bus.write_byte(CMD_SEARCH_ROM);

        let mut last_zero = 0usize;
        for bit in 1..=64usize {
            let id_bit = bus.read_bit();
            let cmp_bit = bus.read_bit();
            if id_bit && cmp_bit {
                return found;
            }

            let (byte, mask) = ((bit - 1) / 8, 1u8 << ((bit - 1) % 8));
            let direction = if id_bit != cmp_bit {
                id_bit
            } else if bit < last_discrepancy {
                rom[byte] & mask != 0
            } else {
                bit == last_discrepancy
            };
            if id_bit == cmp_bit && !direction {
                last_zero = bit;
            }

            if direction {
                rom[byte] |= mask;
            } else {
                rom[byte] &= !mask;
            }
            bus.write_bit(direction);
        }

        if crc8(&rom) == 0 {
            if found.push(rom).is_err() {
                break;
            }
        } else {
            log::warn!("ds18b20: ROM {:02X?} failed CRC", rom);
        }

        last_discrepancy = last_zero;
        if last_discrepancy == 0 {
            break;
        }
    }
    found
}

pub struct Ds18b20Bus<B: OneWireBus> {
    bus: B,
    devices: heapless::Vec<RomCode, CHANNEL_COUNT>,
    cached: [Option<f32>; CHANNEL_COUNT],
    conversion_pending: bool,
}

impl<B: OneWireBus> Ds18b20Bus<B> {
    /// Wrap the bus and enumerate the probes on it.
    pub fn new(bus: B) -> Self {
        let mut this = Self {
            bus,
            devices: heapless::Vec::new(),
            cached: [None; CHANNEL_COUNT],
            conversion_pending: false,
        };
        this.discover();
        this
    }

    /// Re-run the ROM search.  Channel order follows search order.
    ///
    /// Cached readings follow their probe to its new channel; a channel
    /// that now holds a different probe reads as missing until its next
    /// conversion.
    pub fn discover(&mut self) -> usize {
        let roms: heapless::Vec<RomCode, 8> = search_roms(&mut self.bus);
        let previous = core::mem::take(&mut self.devices);
        for rom in roms.iter().filter(|r| r[0] == FAMILY_DS18B20) {
            if self.devices.push(*rom).is_err() {
                break;
            }
        }

        if self.devices != previous {
            let old = self.cached;
            for (slot, rom) in self.cached.iter_mut().zip(
                self.devices
                    .iter()
                    .map(Some)
                    .chain(core::iter::repeat(None)),
            ) {
                *slot = rom
                    .and_then(|rom| previous.iter().position(|p| p == rom))
                    .and_then(|j| old[j]);
            }
            log::info!("ds18b20: {} probe(s) found", self.devices.len());
        }
        self.devices.len()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    fn read_scratchpad(&mut self, rom: &RomCode) -> Result<[u8; 9], SensorError> {
        if !self.bus.reset() {
            return Err(SensorError::NoPresence);
        }
        self.bus.write_byte(CMD_MATCH_ROM);
        for &b in rom {
            self.bus.write_byte(b);
        }
        self.bus.write_byte(CMD_READ_SCRATCHPAD);

        let mut pad = [0u8; 9];
        for b in pad.iter_mut() {
            *b = self.bus.read_byte();
        }
        if pad.iter().all(|&b| b == 0xFF) {
            return Err(SensorError::Disconnected);
        }
        if crc8(&pad[..8]) != pad[8] {
            return Err(SensorError::CrcMismatch);
        }
        Ok(pad)
    }

    fn collect_results(&mut self) {
        for i in 0..CHANNEL_COUNT {
            let Some(rom) = self.devices.get(i).copied() else {
                self.cached[i] = None;
                continue;
            };
            self.cached[i] = match self.read_scratchpad(&rom) {
                Ok(pad) => Some(decode_temperature(&pad)).filter(|t| *t > DISCONNECTED_C),
                Err(e) => {
                    log::warn!("ds18b20: channel {}: {}", i + 1, e);
                    None
                }
            };
        }
    }
}

impl<B: OneWireBus> SensorBusPort for Ds18b20Bus<B> {
    fn request_conversion(&mut self) {
        if self.conversion_pending {
            self.collect_results();
        }

        if self.devices.len() < CHANNEL_COUNT {
            self.discover();
        }

        if self.bus.reset() {
            self.bus.write_byte(CMD_SKIP_ROM);
            self.bus.write_byte(CMD_CONVERT_T);
            self.conversion_pending = true;
        } else {
            self.conversion_pending = false;
            self.cached = [None; CHANNEL_COUNT];
        }
    }

    fn read_channel(&mut self, index: usize) -> Option<f32> {
        self.cached.get(index).copied().flatten()
    }
}
