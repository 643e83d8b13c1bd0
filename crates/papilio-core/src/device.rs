//! Register-level driver for the template peripheral.
//!
//! The driver holds only the device window plus its transport and clock; all
//! mutable device state lives in the peripheral's registers.

use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::bus::BusTransport;
use crate::clock::Clock;
use crate::error::DriverError;
use crate::regs::{
    DeviceWindow, StatusSnapshot, CONTROL_OFFSET, CTRL_ENABLE, CTRL_RESET, DATA_OFFSET,
    STATUS_OFFSET, STATUS_READY,
};

/// Shortest reset pulse the peripheral is guaranteed to latch.
pub const MIN_RESET_PULSE: Duration = Duration::from_micros(10);
/// Shortest settle period after deasserting reset.
pub const MIN_RESET_SETTLE: Duration = Duration::from_millis(10);
/// Shortest readiness poll interval; keeps the poll loop from spinning.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Timing parameters for readiness polling and the reset pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DriverTiming {
    /// Interval between STATUS polls while waiting for ready.
    pub poll_interval_ms: u64,
    /// Hard upper bound on the readiness wait, measured by the clock.
    pub ready_timeout_ms: u64,
    /// Width of the asserted reset pulse.
    pub reset_pulse_us: u64,
    /// Stabilization period after the pulse is released.
    pub reset_settle_ms: u64,
}

impl Default for DriverTiming {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10,
            ready_timeout_ms: 1000,
            reset_pulse_us: 10,
            reset_settle_ms: 10,
        }
    }
}

impl DriverTiming {
    /// Poll interval, never shorter than [`MIN_POLL_INTERVAL`].
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms).max(MIN_POLL_INTERVAL)
    }

    /// Readiness timeout budget.
    #[must_use]
    pub const fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    /// Reset pulse width, never shorter than [`MIN_RESET_PULSE`].
    #[must_use]
    pub fn reset_pulse(&self) -> Duration {
        Duration::from_micros(self.reset_pulse_us).max(MIN_RESET_PULSE)
    }

    /// Post-reset settle period, never shorter than [`MIN_RESET_SETTLE`].
    #[must_use]
    pub fn reset_settle(&self) -> Duration {
        Duration::from_millis(self.reset_settle_ms).max(MIN_RESET_SETTLE)
    }
}

/// Object-safe view of a driver, used by front ends that should not care
/// about the transport or clock a driver was built with.
pub trait DeviceControl {
    /// Base address of the device's register window.
    fn base_address(&self) -> u16;

    /// Resets the device and waits for readiness; `false` on timeout.
    fn initialize(&mut self) -> bool;

    /// Returns `true` when STATUS bit 0 is set.
    fn is_ready(&mut self) -> bool;

    /// Raw STATUS register value, reserved bits included.
    fn status(&mut self) -> u8;

    /// Sets or clears CONTROL bit 0, preserving every other CONTROL bit.
    fn set_enable(&mut self, enable: bool);

    /// Returns `true` when CONTROL bit 0 is set.
    fn is_enabled(&mut self) -> bool;

    /// Writes the DATA register unconditionally.
    fn write_data(&mut self, value: u32);

    /// Reads the DATA register.
    fn read_data(&mut self) -> u32;

    /// Pulses CONTROL bit 1 and waits for the device to settle.
    fn reset(&mut self);

    /// Decoded STATUS register.
    fn status_snapshot(&mut self) -> StatusSnapshot {
        StatusSnapshot::from_raw(self.status())
    }
}

/// Driver for one peripheral instance on a [`BusTransport`].
#[derive(Debug)]
pub struct RegisterDriver<B, C> {
    window: DeviceWindow,
    timing: DriverTiming,
    bus: B,
    clock: C,
}

impl<B: BusTransport, C: Clock> RegisterDriver<B, C> {
    /// Creates a driver for the device at `base`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::WindowOutOfRange`] when the register block does
    /// not fit below `0xFFFF`.
    pub fn new(base: u16, bus: B, clock: C) -> Result<Self, DriverError> {
        Ok(Self::with_window(DeviceWindow::new(base)?, bus, clock))
    }

    /// Creates a driver at [`crate::DEFAULT_BASE_ADDRESS`].
    pub fn with_default_base(bus: B, clock: C) -> Self {
        Self::with_window(DeviceWindow::default(), bus, clock)
    }

    /// Creates a driver for an already validated window.
    pub fn with_window(window: DeviceWindow, bus: B, clock: C) -> Self {
        Self {
            window,
            timing: DriverTiming::default(),
            bus,
            clock,
        }
    }

    /// Replaces the timing parameters.
    #[must_use]
    pub const fn with_timing(mut self, timing: DriverTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Base address of the device.
    #[must_use]
    pub const fn base_address(&self) -> u16 {
        self.window.base()
    }

    /// Address window occupied by the device.
    #[must_use]
    pub const fn window(&self) -> DeviceWindow {
        self.window
    }

    /// Active timing parameters.
    #[must_use]
    pub const fn timing(&self) -> &DriverTiming {
        &self.timing
    }

    /// Shared access to the transport.
    #[must_use]
    pub const fn bus(&self) -> &B {
        &self.bus
    }

    /// Exclusive access to the transport.
    #[allow(clippy::missing_const_for_fn)]
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Consumes the driver and returns its transport.
    pub fn into_bus(self) -> B {
        self.bus
    }

    /// Resets the device, then polls for readiness within the timeout.
    ///
    /// Returns `false` when the device did not report ready in time; the
    /// caller decides whether to retry.
    pub fn initialize(&mut self) -> bool {
        debug!(base = self.base_address(), "initializing device");
        if !self.bus.is_link_ready() {
            warn!(base = self.base_address(), "bus link not ready before init");
        }
        self.reset();
        self.wait_ready().is_ok()
    }

    /// Polls STATUS until ready or until the timeout budget is spent.
    ///
    /// The budget is measured as elapsed clock time, so a slow or jittery
    /// sleep never extends it past one poll interval.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Timeout`] when ready was not observed.
    pub fn wait_ready(&mut self) -> Result<(), DriverError> {
        let timeout = self.timing.ready_timeout();
        let interval = self.timing.poll_interval();
        let start = self.clock.now();

        loop {
            if self.is_ready() {
                return Ok(());
            }
            let elapsed = self.clock.now().saturating_sub(start);
            if elapsed >= timeout {
                break;
            }
            self.clock.sleep(interval.min(timeout - elapsed));
        }

        if self.is_ready() {
            return Ok(());
        }

        let waited = self.clock.now().saturating_sub(start);
        warn!(
            base = self.base_address(),
            waited_ms = u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
            "device did not become ready"
        );
        Err(DriverError::Timeout { waited })
    }

    /// Returns `true` when STATUS bit 0 is set.
    pub fn is_ready(&mut self) -> bool {
        self.status() & STATUS_READY != 0
    }

    /// Raw STATUS register value; reserved bits are passed through as read.
    pub fn status(&mut self) -> u8 {
        self.read_reg8(STATUS_OFFSET)
    }

    /// Decoded STATUS register.
    pub fn status_snapshot(&mut self) -> StatusSnapshot {
        StatusSnapshot::from_raw(self.status())
    }

    /// Returns `true` when the STATUS error latch is set.
    pub fn has_error(&mut self) -> bool {
        self.status_snapshot().error
    }

    /// Sets or clears the enable bit with a read-modify-write of CONTROL.
    pub fn set_enable(&mut self, enable: bool) {
        let mut ctrl = self.read_reg8(CONTROL_OFFSET);
        if enable {
            ctrl |= CTRL_ENABLE;
        } else {
            ctrl &= !CTRL_ENABLE;
        }
        self.write_reg8(CONTROL_OFFSET, ctrl);
    }

    /// Returns `true` when CONTROL bit 0 is set.
    pub fn is_enabled(&mut self) -> bool {
        self.read_reg8(CONTROL_OFFSET) & CTRL_ENABLE != 0
    }

    /// Writes DATA without checking the enable bit.
    pub fn write_data(&mut self, value: u32) {
        self.write_reg32(DATA_OFFSET, value);
    }

    /// Writes DATA only when the device is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::NotEnabled`] without touching DATA when CONTROL
    /// bit 0 is clear.
    pub fn write_data_checked(&mut self, value: u32) -> Result<(), DriverError> {
        if !self.is_enabled() {
            return Err(DriverError::NotEnabled);
        }
        self.write_data(value);
        Ok(())
    }

    /// Reads DATA.
    pub fn read_data(&mut self) -> u32 {
        self.read_reg32(DATA_OFFSET)
    }

    /// Asserts CONTROL bit 1 for the pulse width, releases it, then waits for
    /// the settle period. Other CONTROL bits are preserved throughout.
    pub fn reset(&mut self) {
        let pulse = self.timing.reset_pulse();
        let settle = self.timing.reset_settle();
        debug!(base = self.base_address(), ?pulse, ?settle, "pulsing reset");

        let mut ctrl = self.read_reg8(CONTROL_OFFSET);
        ctrl |= CTRL_RESET;
        self.write_reg8(CONTROL_OFFSET, ctrl);

        self.clock.sleep(pulse);

        ctrl &= !CTRL_RESET;
        self.write_reg8(CONTROL_OFFSET, ctrl);

        self.clock.sleep(settle);
    }

    fn write_reg8(&mut self, offset: u16, value: u8) {
        let addr = self.window.base() + offset;
        trace!(addr, value, "write8");
        self.bus.write8(addr, value);
    }

    fn read_reg8(&mut self, offset: u16) -> u8 {
        let addr = self.window.base() + offset;
        let value = self.bus.read8(addr);
        trace!(addr, value, "read8");
        value
    }

    fn write_reg32(&mut self, offset: u16, value: u32) {
        let addr = self.window.base() + offset;
        trace!(addr, value, "write32");
        self.bus.write32(addr, value);
    }

    fn read_reg32(&mut self, offset: u16) -> u32 {
        let addr = self.window.base() + offset;
        let value = self.bus.read32(addr);
        trace!(addr, value, "read32");
        value
    }
}

impl<B: BusTransport, C: Clock> DeviceControl for RegisterDriver<B, C> {
    fn base_address(&self) -> u16 {
        Self::base_address(self)
    }

    fn initialize(&mut self) -> bool {
        Self::initialize(self)
    }

    fn is_ready(&mut self) -> bool {
        Self::is_ready(self)
    }

    fn status(&mut self) -> u8 {
        Self::status(self)
    }

    fn set_enable(&mut self, enable: bool) {
        Self::set_enable(self, enable);
    }

    fn is_enabled(&mut self) -> bool {
        Self::is_enabled(self)
    }

    fn write_data(&mut self, value: u32) {
        Self::write_data(self, value);
    }

    fn read_data(&mut self) -> u32 {
        Self::read_data(self)
    }

    fn reset(&mut self) {
        Self::reset(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::RegisterStore;
    use crate::clock::ManualClock;
    use crate::regs::STATUS_ERROR;

    #[derive(Default)]
    struct RecordingBus {
        store: RegisterStore,
        writes8: Vec<(u16, u8)>,
    }

    impl BusTransport for RecordingBus {
        fn read8(&mut self, addr: u16) -> u8 {
            self.store.read8(addr)
        }

        fn write8(&mut self, addr: u16, value: u8) {
            self.writes8.push((addr, value));
            self.store.write8(addr, value);
        }

        fn read32(&mut self, addr: u16) -> u32 {
            self.store.read32(addr)
        }

        fn write32(&mut self, addr: u16, value: u32) {
            self.store.write32(addr, value);
        }
    }

    #[test]
    fn default_base_is_0x1000() {
        let clock = ManualClock::new();
        let driver = RegisterDriver::with_default_base(RegisterStore::new(), &clock);
        assert_eq!(driver.base_address(), 0x1000);
    }

    #[test]
    fn registers_are_addressed_relative_to_base() {
        let clock = ManualClock::new();
        let mut driver = RegisterDriver::new(0x2000, RegisterStore::new(), &clock).unwrap();
        driver.write_data(0xCAFE_F00D);
        driver.set_enable(true);

        assert_eq!(driver.bus().peek32(0x2008), Some(0xCAFE_F00D));
        assert_eq!(driver.bus().peek8(0x2000), Some(CTRL_ENABLE));
    }

    #[test]
    fn reset_pulses_bit_one_and_preserves_others() {
        let clock = ManualClock::new();
        let mut bus = RecordingBus::default();
        bus.store.preset8(0x1000, 0xA1);

        let mut driver = RegisterDriver::with_default_base(&mut bus, &clock);
        driver.reset();

        assert_eq!(bus.writes8, vec![(0x1000, 0xA3), (0x1000, 0xA1)]);
        assert_eq!(clock.sleep_count(), 2);
        assert_eq!(clock.total_slept(), MIN_RESET_PULSE + MIN_RESET_SETTLE);
    }

    #[test]
    fn set_enable_never_blind_writes_control() {
        let clock = ManualClock::new();
        let mut bus = RecordingBus::default();
        bus.store.preset8(0x1000, 0xF0);

        let mut driver = RegisterDriver::with_default_base(&mut bus, &clock);
        driver.set_enable(true);
        driver.set_enable(false);

        assert_eq!(bus.writes8, vec![(0x1000, 0xF1), (0x1000, 0xF0)]);
    }

    #[test]
    fn wait_ready_times_out_on_elapsed_time() {
        let clock = ManualClock::new();
        let mut driver = RegisterDriver::with_default_base(RegisterStore::new(), &clock);

        let result = driver.wait_ready();

        assert_eq!(
            result,
            Err(DriverError::Timeout {
                waited: Duration::from_millis(1000)
            })
        );
        assert_eq!(clock.sleep_count(), 100);
    }

    #[test]
    fn final_poll_slice_is_clipped_to_budget() {
        let clock = ManualClock::new();
        let timing = DriverTiming {
            poll_interval_ms: 30,
            ready_timeout_ms: 100,
            ..DriverTiming::default()
        };
        let mut driver =
            RegisterDriver::with_default_base(RegisterStore::new(), &clock).with_timing(timing);

        assert!(driver.wait_ready().is_err());
        assert_eq!(clock.now(), Duration::from_millis(100));
        assert_eq!(clock.sleep_count(), 4);
    }

    #[test]
    fn wait_ready_returns_immediately_when_ready() {
        let clock = ManualClock::new();
        let mut store = RegisterStore::new();
        store.preset8(0x1004, STATUS_READY);
        let mut driver = RegisterDriver::with_default_base(store, &clock);

        assert_eq!(driver.wait_ready(), Ok(()));
        assert_eq!(clock.sleep_count(), 0);
    }

    #[test]
    fn timing_clamps_below_minimums() {
        let timing = DriverTiming {
            poll_interval_ms: 0,
            ready_timeout_ms: 5,
            reset_pulse_us: 1,
            reset_settle_ms: 0,
        };
        assert_eq!(timing.poll_interval(), MIN_POLL_INTERVAL);
        assert_eq!(timing.ready_timeout(), Duration::from_millis(5));
        assert_eq!(timing.reset_pulse(), MIN_RESET_PULSE);
        assert_eq!(timing.reset_settle(), MIN_RESET_SETTLE);
    }

    #[test]
    fn checked_write_requires_enable() {
        let clock = ManualClock::new();
        let mut driver = RegisterDriver::with_default_base(RegisterStore::new(), &clock);

        assert_eq!(driver.write_data_checked(7), Err(DriverError::NotEnabled));
        assert_eq!(driver.bus().peek32(0x1008), None);

        driver.set_enable(true);
        assert_eq!(driver.write_data_checked(7), Ok(()));
        assert_eq!(driver.read_data(), 7);
    }

    #[test]
    fn error_bit_is_exposed() {
        let clock = ManualClock::new();
        let mut store = RegisterStore::new();
        store.preset8(0x1004, STATUS_READY | STATUS_ERROR);
        let mut driver = RegisterDriver::with_default_base(store, &clock);

        assert!(driver.has_error());
        assert!(driver.is_ready());
    }

    #[test]
    fn device_control_object_forwards() {
        let clock = ManualClock::new();
        let mut driver = RegisterDriver::new(0x3000, RegisterStore::new(), &clock).unwrap();
        let device: &mut dyn DeviceControl = &mut driver;

        device.write_data(0x55);
        device.set_enable(true);
        assert_eq!(device.base_address(), 0x3000);
        assert_eq!(device.read_data(), 0x55);
        assert!(device.is_enabled());
        assert!(!device.status_snapshot().ready);
    }
}
