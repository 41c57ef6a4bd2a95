//! Driver struct and public operations.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::commands::{
    self, GENERAL_CALL_ADDRESS, GENERAL_CALL_RESET, GENERAL_CALL_WAKE_UP, WriteCommand,
};
use crate::error::Error;
use crate::status::{self, PowerDown};

/// How the driver waits for the chip to finish an EEPROM write.
///
/// [`MCP4725::set_voltage_eeprom`] (and construction, which performs one such
/// write) polls the chip's ready/busy flag, sleeping between polls. The
/// default matches the chip's reference usage: a 50 ms interval with no upper
/// bound on attempts. Set [`max_attempts`] to bound the wait; an exhausted
/// bound fails with [`Error::EepromWriteTimeout`].
///
/// [`max_attempts`]: EepromWaitPolicy::max_attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EepromWaitPolicy {
    /// Milliseconds to sleep between ready checks.
    pub interval_ms: u32,
    /// Maximum number of ready checks before giving up, or `None` to poll
    /// indefinitely.
    ///
    /// Note that with `None` a non-responding chip that acknowledges reads
    /// but never reports ready will stall the caller forever.
    pub max_attempts: Option<u32>,
}

impl Default for EepromWaitPolicy {
    fn default() -> Self {
        Self {
            interval_ms: 50,
            max_attempts: None,
        }
    }
}

/// Driver for the MCP4725.
///
/// # Quick start
///
/// Create the driver with [`MCP4725::new`], giving it the I2C bus, a delay
/// source, the chip's supply voltage (its full-scale reference) and its bus
/// address ([`ADDRESS_ADAFRUIT`] and [`ADDRESS_SPARKFUN`] cover the common
/// vendor defaults). Construction writes 0 V to the EEPROM so the output is
/// in a known state before the driver is handed back.
///
/// Set the output with [`MCP4725::fast_write`] or [`MCP4725::set_voltage`],
/// or persist it across power cycles with [`MCP4725::set_voltage_eeprom`].
/// Read the live and persisted values back with [`MCP4725::dac_voltage`] and
/// [`MCP4725::eeprom_voltage`].
///
/// [`ADDRESS_ADAFRUIT`]: crate::ADDRESS_ADAFRUIT
/// [`ADDRESS_SPARKFUN`]: crate::ADDRESS_SPARKFUN
///
/// # Sharing the bus
///
/// The driver owns its bus handle and performs no locking. If other devices
/// (or other driver instances) share the physical bus, access must be
/// serialized externally, for example with the wrappers in
/// `embedded-hal-bus`.
#[derive(Debug)]
pub struct MCP4725<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    reference_voltage: f32,
    /// Most recent voltage requested through any write call. A local cache
    /// for introspection only, never read back from the chip.
    last_written_voltage: f32,
    eeprom_wait: EepromWaitPolicy,
}

impl<I2C, D> MCP4725<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    ////////////////////////////////////////////////////////////////////////////////
    // Constructors
    ////////////////////////////////////////////////////////////////////////////////

    /// Create a driver for the chip at `address` and zero its EEPROM.
    ///
    /// `reference_voltage` is the supply voltage of the chip, which defines
    /// its full-scale output (commonly 5.0 V). It must be positive.
    ///
    /// As a safety default the constructor writes 0 V to the DAC register and
    /// EEPROM, blocking until the EEPROM write completes, so a successful
    /// return means the output is verified at zero.
    ///
    /// # Errors
    ///
    /// An error is returned if the bus cannot be driven or the device does
    /// not acknowledge its address.
    pub fn new(
        i2c: I2C,
        delay: D,
        reference_voltage: f32,
        address: u8,
    ) -> Result<Self, Error<I2C::Error>> {
        Self::new_with_wait_policy(
            i2c,
            delay,
            reference_voltage,
            address,
            EepromWaitPolicy::default(),
        )
    }

    /// Create a driver with an explicit EEPROM wait policy.
    ///
    /// Use this constructor to bound the ready/busy polling that
    /// [`MCP4725::set_voltage_eeprom`] (and construction itself) performs.
    /// See [`MCP4725::new`] for the remaining parameters and behaviour.
    ///
    /// # Errors
    ///
    /// As [`MCP4725::new`], plus [`Error::EepromWriteTimeout`] if the policy
    /// is bounded and the construction-time EEPROM write does not complete
    /// in time.
    pub fn new_with_wait_policy(
        i2c: I2C,
        delay: D,
        reference_voltage: f32,
        address: u8,
        wait_policy: EepromWaitPolicy,
    ) -> Result<Self, Error<I2C::Error>> {
        debug_assert!(reference_voltage > 0.0, "Reference voltage must be positive.");
        let mut dac = Self {
            i2c,
            delay,
            address,
            reference_voltage,
            last_written_voltage: 0.0,
            eeprom_wait: wait_policy,
        };
        dac.set_voltage_eeprom(0.0)?;
        Ok(dac)
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Write commands
    ////////////////////////////////////////////////////////////////////////////////

    /// Set the output voltage with the two-byte fast-mode command.
    ///
    /// This is the smallest frame the chip accepts and only touches the
    /// volatile DAC register; the EEPROM is untouched and no ready wait is
    /// performed.
    ///
    /// The request is converted to a 12-bit code and silently clamped to
    /// `0 V..=Vref`; out-of-range requests saturate rather than fail.
    ///
    /// # Datasheet
    ///
    /// See section 6.1.1 for the fast-mode frame layout.
    pub fn fast_write(&mut self, voltage: f32) -> Result<(), Error<I2C::Error>> {
        let code = commands::voltage_to_code(voltage, self.reference_voltage);
        self.write_frame(&commands::fast_write_frame(code))?;
        self.last_written_voltage = voltage;
        Ok(())
    }

    /// Set the output voltage by writing the DAC register.
    ///
    /// Volatile only: the EEPROM is untouched and no ready wait is
    /// performed. Out-of-range requests are silently clamped, as with
    /// [`MCP4725::fast_write`].
    ///
    /// # Datasheet
    ///
    /// See section 6.1.2 for the write-DAC-register command.
    pub fn set_voltage(&mut self, voltage: f32) -> Result<(), Error<I2C::Error>> {
        self.register_write(WriteCommand::DacRegister, voltage)
    }

    /// Set the output voltage and persist it to the EEPROM.
    ///
    /// The persisted value is reloaded into the DAC register at power-up and
    /// by [`MCP4725::general_call_reset`].
    ///
    /// After issuing the write this call blocks, polling the chip's
    /// ready/busy flag per the driver's [`EepromWaitPolicy`], until the chip
    /// reports the EEPROM write complete.
    ///
    /// <div class="warning">
    ///
    /// EEPROM writes are far slower than the volatile-only commands and the
    /// cell has finite (if large, >1,000,000-cycle) write endurance. Use
    /// [`MCP4725::set_voltage`] or [`MCP4725::fast_write`] for routine
    /// updates and reserve this command for values that must survive power
    /// loss.
    ///
    /// </div>
    ///
    /// # Datasheet
    ///
    /// See section 6.1.2 for the write-DAC-and-EEPROM command.
    pub fn set_voltage_eeprom(&mut self, voltage: f32) -> Result<(), Error<I2C::Error>> {
        self.register_write(WriteCommand::DacRegisterAndEeprom, voltage)?;
        self.wait_for_eeprom()
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Read commands
    ////////////////////////////////////////////////////////////////////////////////

    /// Read the voltage currently held in the volatile DAC register.
    ///
    /// This reflects the live register, which can differ from the last value
    /// written by this driver if, for example, a general-call reset reloaded
    /// the register from EEPROM.
    ///
    /// # Datasheet
    ///
    /// See section 6.2 for the read layout.
    pub fn dac_voltage(&mut self) -> Result<f32, Error<I2C::Error>> {
        let mut buf = [0u8; 3];
        self.read_frame(&mut buf)?;
        Ok(status::code_to_voltage(
            status::dac_code(&buf),
            self.reference_voltage,
        ))
    }

    /// Read the power-down bits of the volatile DAC register.
    ///
    /// # Datasheet
    ///
    /// See section 6.2 for the read layout and section 5.3 for the
    /// power-down modes.
    pub fn dac_power_down(&mut self) -> Result<PowerDown, Error<I2C::Error>> {
        let mut buf = [0u8; 3];
        self.read_frame(&mut buf)?;
        Ok(PowerDown::from_settings_byte(buf[0]))
    }

    /// Read the voltage persisted in the EEPROM.
    ///
    /// # Datasheet
    ///
    /// See section 6.2 for the read layout.
    pub fn eeprom_voltage(&mut self) -> Result<f32, Error<I2C::Error>> {
        let mut buf = [0u8; 5];
        self.read_frame(&mut buf)?;
        Ok(status::code_to_voltage(
            status::eeprom_code(&buf),
            self.reference_voltage,
        ))
    }

    /// Read the power-down bits persisted in the EEPROM.
    ///
    /// # Datasheet
    ///
    /// See section 6.2 for the read layout and section 5.3 for the
    /// power-down modes.
    pub fn eeprom_power_down(&mut self) -> Result<PowerDown, Error<I2C::Error>> {
        let mut buf = [0u8; 5];
        self.read_frame(&mut buf)?;
        Ok(PowerDown::from_eeprom_byte(buf[3]))
    }

    /// Check the EEPROM ready/busy flag.
    ///
    /// Returns true when the chip is ready, false while an EEPROM write is
    /// still in progress. This is the polling primitive behind
    /// [`MCP4725::set_voltage_eeprom`].
    ///
    /// # Datasheet
    ///
    /// See section 6.2; the flag is bit 7 of the settings byte.
    pub fn eeprom_ready(&mut self) -> Result<bool, Error<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.read_frame(&mut buf)?;
        Ok(status::is_ready(buf[0]))
    }

    ////////////////////////////////////////////////////////////////////////////////
    // General-call commands
    ////////////////////////////////////////////////////////////////////////////////

    /// Send a general-call reset.
    ///
    /// Every listening chip aborts any in-progress conversion, performs an
    /// internal reset and reloads its DAC register from EEPROM.
    ///
    /// <div class="warning">
    ///
    /// This is sent to the bus's reserved broadcast address `0x00`, not to
    /// this device's address: it resets **every** compatible device sharing
    /// the bus.
    ///
    /// </div>
    ///
    /// # Datasheet
    ///
    /// See section 7.3.
    pub fn general_call_reset(&mut self) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write(GENERAL_CALL_ADDRESS, &[GENERAL_CALL_RESET])
            .map_err(Error::Transport)
    }

    /// Send a general-call wake-up.
    ///
    /// Resets the power-down bits of every listening chip to normal mode
    /// (0, 0).
    ///
    /// <div class="warning">
    ///
    /// Like [`MCP4725::general_call_reset`], this is a broadcast to address
    /// `0x00` and affects every compatible device on the bus.
    ///
    /// </div>
    ///
    /// # Datasheet
    ///
    /// See section 7.4.
    pub fn general_call_wake_up(&mut self) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write(GENERAL_CALL_ADDRESS, &[GENERAL_CALL_WAKE_UP])
            .map_err(Error::Transport)
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Introspection
    ////////////////////////////////////////////////////////////////////////////////

    /// The most recent voltage requested through any write call.
    ///
    /// This is a local cache, not a readback: it records the requested value
    /// (before clamping) of the last successful write, and is not updated by
    /// resets or by other bus participants. Use [`MCP4725::dac_voltage`] for
    /// the chip's actual state.
    pub fn last_written_voltage(&self) -> f32 {
        self.last_written_voltage
    }

    /// The reference (supply) voltage this driver scales against.
    pub fn reference_voltage(&self) -> f32 {
        self.reference_voltage
    }

    /// The 7-bit bus address this driver talks to.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Consume the driver and hand back the bus and delay handles.
    pub fn destroy(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    ////////////////////////////////////////////////////////////////////////////////
    // Transport helpers
    ////////////////////////////////////////////////////////////////////////////////

    /// Issue a three-byte register write and record the requested voltage.
    fn register_write(
        &mut self,
        command: WriteCommand,
        voltage: f32,
    ) -> Result<(), Error<I2C::Error>> {
        let code = commands::voltage_to_code(voltage, self.reference_voltage);
        self.write_frame(&commands::register_write_frame(command, code))?;
        self.last_written_voltage = voltage;
        Ok(())
    }

    /// Poll the ready/busy flag until the chip reports ready.
    ///
    /// Checks first and sleeps only between checks, so a chip that is already
    /// ready costs a single read.
    fn wait_for_eeprom(&mut self) -> Result<(), Error<I2C::Error>> {
        let mut attempts: u32 = 0;
        loop {
            if self.eeprom_ready()? {
                return Ok(());
            }
            attempts += 1;
            if let Some(max) = self.eeprom_wait.max_attempts {
                if attempts >= max {
                    return Err(Error::EepromWriteTimeout);
                }
            }
            self.delay.delay_ms(self.eeprom_wait.interval_ms);
        }
    }

    fn write_frame(&mut self, frame: &[u8]) -> Result<(), Error<I2C::Error>> {
        self.i2c.write(self.address, frame).map_err(Error::Transport)
    }

    fn read_frame(&mut self, buf: &mut [u8]) -> Result<(), Error<I2C::Error>> {
        self.i2c.read(self.address, buf).map_err(Error::Transport)
    }
}
