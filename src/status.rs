//! Read-back parsing for the MCP4725.
//!
//! The chip has no addressable read registers. A read transaction returns up
//! to five bytes in a fixed layout (see section 6.2 of the datasheet): the
//! settings byte, the DAC register contents (two bytes), then the EEPROM
//! contents (two bytes). The requested read length alone selects how much of
//! that layout is seen.

use bit_field::BitField;

/// Raw power-down bit pair (PD0, PD1).
///
/// Both bits clear means normal operation; the other combinations select
/// increasing output-impedance power-down states. The exact impedance
/// mapping is chip-defined, so the driver surfaces the raw bits without
/// interpreting them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerDown {
    /// PD0 bit.
    pub pd0: bool,
    /// PD1 bit.
    pub pd1: bool,
}

impl PowerDown {
    /// Extract the DAC-register power-down bits from the settings byte
    /// (byte 0 of a read; PD0 is bit 1, PD1 is bit 2).
    pub(crate) fn from_settings_byte(byte: u8) -> Self {
        Self {
            pd0: byte.get_bit(1),
            pd1: byte.get_bit(2),
        }
    }

    /// Extract the EEPROM power-down bits from the first EEPROM byte
    /// (byte 3 of a read; PD0 is bit 5, PD1 is bit 6).
    pub(crate) fn from_eeprom_byte(byte: u8) -> Self {
        Self {
            pd0: byte.get_bit(5),
            pd1: byte.get_bit(6),
        }
    }

    /// True when both bits are clear (normal operation).
    pub fn is_normal(&self) -> bool {
        !self.pd0 && !self.pd1
    }
}

/// 12-bit code held in the volatile DAC register.
///
/// The register is split across bytes 1 and 2 of a read, with the low nibble
/// of the code in the top of byte 2.
pub(crate) fn dac_code(buf: &[u8; 3]) -> u16 {
    ((buf[1] as u16) << 4) | ((buf[2] as u16) >> 4)
}

/// 12-bit code held in the EEPROM (bytes 3 and 4 of a read).
pub(crate) fn eeprom_code(buf: &[u8; 5]) -> u16 {
    (((buf[3] & 0x0F) as u16) << 8) | buf[4] as u16
}

/// Ready/busy flag: bit 7 of the settings byte.
///
/// Set means the last EEPROM write has completed; clear means it is still in
/// progress.
pub(crate) fn is_ready(settings_byte: u8) -> bool {
    settings_byte.get_bit(7)
}

/// Scale a 12-bit code back to volts against the reference voltage.
pub(crate) fn code_to_voltage(code: u16, reference_voltage: f32) -> f32 {
    reference_voltage * code as f32 / 4095.0
}
