//! Command bytes and outgoing frame layout.
//!
//! The MCP4725 has no register pointer; the command is carried in the top
//! bits of the first byte written. Section references are to the MCP4725
//! datasheet.

/// Default bus address of Adafruit-supplied MCP4725 boards (`0x62`).
pub const ADDRESS_ADAFRUIT: u8 = 0x62;

/// Default bus address of SparkFun-supplied MCP4725 boards (`0x60`).
pub const ADDRESS_SPARKFUN: u8 = 0x60;

/// Reserved broadcast address recognised by every device on the bus.
pub(crate) const GENERAL_CALL_ADDRESS: u8 = 0x00;

/// General-call reset command byte. See section 7.3.
pub(crate) const GENERAL_CALL_RESET: u8 = 0x06;

/// General-call wake-up command byte. See section 7.4.
pub(crate) const GENERAL_CALL_WAKE_UP: u8 = 0x09;

/// Write-command opcodes.
///
/// C2/C1/C0 occupy the top three bits; the PD1/PD0 bits (bits 2 and 1) are
/// left at zero, selecting normal operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteCommand {
    /// Write the DAC register only. See section 6.1.2.
    DacRegister = 0x40,
    /// Write the DAC register and the EEPROM. See section 6.1.2.
    DacRegisterAndEeprom = 0x60,
}

/// Convert a requested voltage to the chip's 12-bit code.
///
/// Truncates toward zero and silently clamps to `0..=4095`; out-of-range
/// requests saturate rather than fail.
pub(crate) fn voltage_to_code(voltage: f32, reference_voltage: f32) -> u16 {
    let code = (voltage / reference_voltage * 4095.0) as i32;
    code.clamp(0, 4095) as u16
}

/// Two-byte fast-mode frame: `0000 D11..D8`, `D7..D0`. See section 6.1.1.
pub(crate) fn fast_write_frame(code: u16) -> [u8; 2] {
    [((code >> 8) & 0x0F) as u8, (code & 0xFF) as u8]
}

/// Three-byte register-write frame: command byte, `D11..D4`, then `D3..D0`
/// left-aligned over four don't-care bits. See section 6.1.2.
pub(crate) fn register_write_frame(command: WriteCommand, code: u16) -> [u8; 3] {
    [
        command as u8,
        ((code >> 4) & 0xFF) as u8,
        ((code & 0x0F) << 4) as u8,
    ]
}
