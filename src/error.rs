/// Wrapper for problems when communicating with the MCP4725.
///
/// The type is generic over the error of the underlying I2C implementation,
/// which is surfaced unchanged: the driver never retries or suppresses a
/// failed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// The bus transport failed (no acknowledgment from the device,
    /// arbitration loss, device absent, or an I/O fault on the channel).
    ///
    /// Each driver operation is a single bus transaction, so a transport
    /// failure leaves no partial state beyond what the chip itself
    /// guarantees.
    Transport(E),
    /// An EEPROM write did not report ready within the configured number of
    /// ready checks.
    ///
    /// Only returned when [`EepromWaitPolicy::max_attempts`] is set. The
    /// default policy polls indefinitely, matching the chip's own behaviour:
    /// there is no way to distinguish a slow EEPROM write from a failed one
    /// from the bus side.
    ///
    /// [`EepromWaitPolicy::max_attempts`]: crate::EepromWaitPolicy
    EepromWriteTimeout,
}
