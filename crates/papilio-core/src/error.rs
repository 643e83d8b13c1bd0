use std::time::Duration;

use thiserror::Error;

/// Recoverable driver-level failures.
///
/// Bus transactions themselves never fail at this layer; these variants cover
/// timing and usage conditions the caller can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DriverError {
    /// STATUS never reported ready within the configured budget.
    #[error("device not ready after {}ms", waited.as_millis())]
    Timeout {
        /// Elapsed time measured by the driver clock when polling stopped.
        waited: Duration,
    },
    /// A checked data transfer was attempted while CONTROL bit 0 was clear.
    #[error("device is not enabled")]
    NotEnabled,
    /// The register window would extend past the 16-bit address space.
    #[error("register window at base 0x{base:04X} exceeds the address space")]
    WindowOutOfRange {
        /// Requested base address.
        base: u16,
    },
}
