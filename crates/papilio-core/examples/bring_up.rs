//! Bring-up sequence against simulated devices at two base addresses.
//!
//! ```sh
//! cargo run -p papilio-core --example bring_up
//! ```

use papilio_core::{
    DeviceWindow, DriverError, RegisterDriver, SimConfig, SimPeripheral, SystemClock,
};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;

fn bring_up(base: u16, config: SimConfig, clock: &SystemClock) -> Result<(), DriverError> {
    let window = DeviceWindow::new(base)?;
    let mut driver = RegisterDriver::with_window(window, SimPeripheral::new(window, config), clock);

    if !driver.initialize() {
        return driver.wait_ready();
    }

    driver.set_enable(true);
    driver.write_data_checked(0xDEAD_BEEF)?;
    let readback = driver.read_data();
    driver.reset();
    let after_reset = driver.read_data();
    driver.set_enable(false);

    println!(
        "0x{base:04X}: ready={} readback=0x{readback:08X} after_reset=0x{after_reset:08X} pulses={}",
        driver.is_ready(),
        driver.bus().state().reset_pulses()
    );
    Ok(())
}

fn main() {
    let clock = SystemClock::new();
    for (base, config) in [
        (0x1000, SimConfig::default()),
        (0x2000, SimConfig::ready_after(5)),
        (0xFFF8, SimConfig::default()),
    ] {
        if let Err(error) = bring_up(base, config, &clock) {
            println!("0x{base:04X}: {error}");
        }
    }
}
