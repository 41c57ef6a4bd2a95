//! Tests against a mock I2C bus.
//!
//! The mock enforces the exact transaction sequence, so these tests pin down
//! the wire encoding byte for byte, including the EEPROM write issued during
//! construction.

use embedded_hal::i2c::ErrorKind;
use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

use mcp4725_hal::{ADDRESS_ADAFRUIT, ADDRESS_SPARKFUN, EepromWaitPolicy, Error, MCP4725};

const VREF: f32 = 5.0;
const READY: u8 = 0x80;
const BUSY: u8 = 0x00;

/// Construction writes 0 V to the DAC register and EEPROM, then checks the
/// ready flag once (the mock chip reports ready immediately).
fn construction(address: u8) -> Vec<I2cTransaction> {
    vec![
        I2cTransaction::write(address, vec![0x60, 0x00, 0x00]),
        I2cTransaction::read(address, vec![READY]),
    ]
}

/// Build a driver over a mock bus expecting the construction transactions
/// followed by `expectations`.
fn new_dac(expectations: &[I2cTransaction]) -> MCP4725<I2cMock, NoopDelay> {
    let mut all = construction(ADDRESS_ADAFRUIT);
    all.extend_from_slice(expectations);
    MCP4725::new(I2cMock::new(&all), NoopDelay, VREF, ADDRESS_ADAFRUIT).unwrap()
}

/// Tear down the driver and assert every expected transaction was consumed.
fn finish(dac: MCP4725<I2cMock, NoopDelay>) {
    let (mut i2c, _delay) = dac.destroy();
    i2c.done();
}

#[test]
fn construction_zeroes_the_eeprom_before_anything_else() {
    // new_dac's expectations are exactly the construction transactions, so
    // the mock verifies the EEPROM write of 0 V is the first thing sent.
    let dac = new_dac(&[]);
    assert_eq!(dac.last_written_voltage(), 0.0);
    assert_eq!(dac.reference_voltage(), VREF);
    assert_eq!(dac.address(), ADDRESS_ADAFRUIT);
    finish(dac);
}

#[test]
fn construction_uses_the_configured_address() {
    let expectations = construction(ADDRESS_SPARKFUN);
    let dac = MCP4725::new(
        I2cMock::new(&expectations),
        NoopDelay,
        VREF,
        ADDRESS_SPARKFUN,
    )
    .unwrap();
    assert_eq!(dac.address(), ADDRESS_SPARKFUN);
    finish(dac);
}

#[test]
fn fast_write_sends_the_two_byte_frame() {
    // 2.5 V at Vref 5.0 is code 0x7FF.
    let mut dac = new_dac(&[I2cTransaction::write(ADDRESS_ADAFRUIT, vec![0x07, 0xFF])]);
    dac.fast_write(2.5).unwrap();
    assert_eq!(dac.last_written_voltage(), 2.5);
    finish(dac);
}

#[test]
fn set_voltage_sends_the_three_byte_frame() {
    let mut dac = new_dac(&[I2cTransaction::write(
        ADDRESS_ADAFRUIT,
        vec![0x40, 0x7F, 0xF0],
    )]);
    dac.set_voltage(2.5).unwrap();
    assert_eq!(dac.last_written_voltage(), 2.5);
    finish(dac);
}

#[test]
fn out_of_range_requests_saturate_on_the_wire() {
    let mut dac = new_dac(&[
        I2cTransaction::write(ADDRESS_ADAFRUIT, vec![0x40, 0xFF, 0xF0]),
        I2cTransaction::write(ADDRESS_ADAFRUIT, vec![0x40, 0x00, 0x00]),
    ]);
    dac.set_voltage(7.2).unwrap();
    dac.set_voltage(-1.0).unwrap();
    finish(dac);
}

#[test]
fn set_voltage_eeprom_polls_until_the_chip_reports_ready() {
    // Busy for three polls, then ready: exactly four ready checks.
    let mut dac = new_dac(&[
        I2cTransaction::write(ADDRESS_ADAFRUIT, vec![0x60, 0x7F, 0xF0]),
        I2cTransaction::read(ADDRESS_ADAFRUIT, vec![BUSY]),
        I2cTransaction::read(ADDRESS_ADAFRUIT, vec![BUSY]),
        I2cTransaction::read(ADDRESS_ADAFRUIT, vec![BUSY]),
        I2cTransaction::read(ADDRESS_ADAFRUIT, vec![READY]),
    ]);
    dac.set_voltage_eeprom(2.5).unwrap();
    assert_eq!(dac.last_written_voltage(), 2.5);
    finish(dac);
}

#[test]
fn bounded_wait_policy_times_out_on_a_stuck_chip() {
    let policy = EepromWaitPolicy {
        interval_ms: 1,
        max_attempts: Some(2),
    };
    let mut expectations = construction(ADDRESS_ADAFRUIT);
    expectations.extend([
        I2cTransaction::write(ADDRESS_ADAFRUIT, vec![0x60, 0x7F, 0xF0]),
        I2cTransaction::read(ADDRESS_ADAFRUIT, vec![BUSY]),
        I2cTransaction::read(ADDRESS_ADAFRUIT, vec![BUSY]),
    ]);
    let mut dac = MCP4725::new_with_wait_policy(
        I2cMock::new(&expectations),
        NoopDelay,
        VREF,
        ADDRESS_ADAFRUIT,
        policy,
    )
    .unwrap();

    let result = dac.set_voltage_eeprom(2.5);
    assert_eq!(result, Err(Error::EepromWriteTimeout));
    finish(dac);
}

#[test]
fn dac_voltage_reads_three_bytes_and_rescales() {
    let mut dac = new_dac(&[I2cTransaction::read(
        ADDRESS_ADAFRUIT,
        vec![0x00, 0x7F, 0xF0],
    )]);
    let volts = dac.dac_voltage().unwrap();
    let expected = VREF * 2047.0 / 4095.0;
    assert!((volts - expected).abs() < 1e-6);
    finish(dac);
}

#[test]
fn eeprom_voltage_reads_five_bytes_and_rescales() {
    let mut dac = new_dac(&[I2cTransaction::read(
        ADDRESS_ADAFRUIT,
        vec![READY, 0x00, 0x00, 0x07, 0xFF],
    )]);
    let volts = dac.eeprom_voltage().unwrap();
    let expected = VREF * 2047.0 / 4095.0;
    assert!((volts - expected).abs() < 1e-6);
    finish(dac);
}

#[test]
fn power_down_bits_come_from_the_right_bytes() {
    let mut dac = new_dac(&[
        // DAC power-down bits are bits 1 and 2 of the settings byte.
        I2cTransaction::read(ADDRESS_ADAFRUIT, vec![0b0000_0110, 0x00, 0x00]),
        // EEPROM power-down bits are bits 5 and 6 of byte 3.
        I2cTransaction::read(ADDRESS_ADAFRUIT, vec![READY, 0x00, 0x00, 0b0110_0000, 0x00]),
    ]);

    let pd = dac.dac_power_down().unwrap();
    assert!(pd.pd0);
    assert!(pd.pd1);

    let pd = dac.eeprom_power_down().unwrap();
    assert!(pd.pd0);
    assert!(pd.pd1);

    finish(dac);
}

#[test]
fn eeprom_ready_reads_a_single_byte() {
    let mut dac = new_dac(&[
        I2cTransaction::read(ADDRESS_ADAFRUIT, vec![BUSY]),
        I2cTransaction::read(ADDRESS_ADAFRUIT, vec![READY]),
    ]);
    assert!(!dac.eeprom_ready().unwrap());
    assert!(dac.eeprom_ready().unwrap());
    finish(dac);
}

#[test]
fn general_calls_broadcast_to_address_zero() {
    let mut dac = new_dac(&[
        I2cTransaction::write(0x00, vec![0x06]),
        I2cTransaction::write(0x00, vec![0x09]),
    ]);
    dac.general_call_reset().unwrap();
    dac.general_call_wake_up().unwrap();
    finish(dac);
}

#[test]
fn transport_errors_are_surfaced_unchanged() {
    let mut dac = new_dac(&[
        I2cTransaction::write(ADDRESS_ADAFRUIT, vec![0x07, 0xFF]).with_error(ErrorKind::Other),
    ]);
    let result = dac.fast_write(2.5);
    assert_eq!(result, Err(Error::Transport(ErrorKind::Other)));
    // A failed write must not update the introspection cache.
    assert_eq!(dac.last_written_voltage(), 0.0);
    finish(dac);
}

#[test]
fn reads_do_not_touch_the_write_cache() {
    let mut dac = new_dac(&[
        I2cTransaction::write(ADDRESS_ADAFRUIT, vec![0x07, 0xFF]),
        I2cTransaction::read(ADDRESS_ADAFRUIT, vec![0x00, 0x00, 0x00]),
    ]);
    dac.fast_write(2.5).unwrap();
    dac.dac_voltage().unwrap();
    assert_eq!(dac.last_written_voltage(), 2.5);
    finish(dac);
}
