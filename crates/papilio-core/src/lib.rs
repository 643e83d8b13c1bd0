//! Register-level driver for the Papilio template peripheral.

/// Fixed register offsets, bit masks, and device address windows.
pub mod regs;
pub use regs::{
    DeviceWindow, StatusSnapshot, CONTROL_OFFSET, CTRL_ENABLE, CTRL_RESET, DATA_OFFSET,
    DEFAULT_BASE_ADDRESS, REGISTER_WINDOW_BYTES, STATUS_ERROR, STATUS_OFFSET, STATUS_READY,
    STATUS_RESERVED_MASK,
};

/// Bus transport contract consumed by the driver.
pub mod bus;
pub use bus::{BusTransport, RegisterStore};

/// Injectable time source for polling and pulse delays.
pub mod clock;
pub use clock::{Clock, ManualClock, SystemClock};

/// Driver error taxonomy.
pub mod error;
pub use error::DriverError;

/// Register driver and its object-safe control surface.
pub mod device;
pub use device::{
    DeviceControl, DriverTiming, RegisterDriver, MIN_POLL_INTERVAL, MIN_RESET_PULSE,
    MIN_RESET_SETTLE,
};

/// Host-side simulation of the peripheral.
pub mod sim;
pub use sim::{SimConfig, SimPeripheral, SimState};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
