//! Simulated template peripheral.
//!
//! Models the register behaviour the hardware test suite expects so the
//! driver and shell can run on a host without an FPGA attached.

use tracing::{debug, trace};

use crate::bus::BusTransport;
use crate::regs::{
    DeviceWindow, CONTROL_OFFSET, CTRL_ENABLE, CTRL_RESET, DATA_OFFSET, STATUS_ERROR,
    STATUS_OFFSET, STATUS_READY,
};

/// Behavioural knobs for the simulated peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// STATUS reads after a reset pulse before ready is reported.
    ///
    /// `None` models a device that never comes out of reset.
    pub ready_after_polls: Option<u32>,
    /// Whether ready is already set before the first reset.
    pub ready_at_power_on: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            ready_after_polls: Some(0),
            ready_at_power_on: false,
        }
    }
}

impl SimConfig {
    /// Configuration for a device that needs `polls` STATUS reads to settle.
    #[must_use]
    pub const fn ready_after(polls: u32) -> Self {
        Self {
            ready_after_polls: Some(polls),
            ready_at_power_on: false,
        }
    }

    /// Configuration for a device that never reports ready.
    #[must_use]
    pub const fn never_ready() -> Self {
        Self {
            ready_after_polls: None,
            ready_at_power_on: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Readiness {
    Ready,
    InReset,
    Settling { remaining: u32 },
    Stuck,
    Disabled,
}

/// Runtime register state of the simulated device.
#[derive(Debug, Clone)]
pub struct SimState {
    ctrl: u8,
    data: u32,
    error: bool,
    readiness: Readiness,
    reset_pulses: u32,
    status_reads: u32,
    control_writes: u32,
}

impl SimState {
    fn power_on(config: &SimConfig) -> Self {
        Self {
            ctrl: 0,
            data: 0,
            error: false,
            readiness: if config.ready_at_power_on {
                Readiness::Ready
            } else {
                Readiness::InReset
            },
            reset_pulses: 0,
            status_reads: 0,
            control_writes: 0,
        }
    }

    /// Current CONTROL register byte.
    #[must_use]
    pub const fn control(&self) -> u8 {
        self.ctrl
    }

    /// Current DATA register word.
    #[must_use]
    pub const fn data(&self) -> u32 {
        self.data
    }

    /// Returns `true` while the device reports ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.readiness == Readiness::Ready
    }

    /// Number of completed reset pulses (assert followed by release).
    #[must_use]
    pub const fn reset_pulses(&self) -> u32 {
        self.reset_pulses
    }

    /// Number of STATUS reads served.
    #[must_use]
    pub const fn status_reads(&self) -> u32 {
        self.status_reads
    }

    /// Number of CONTROL writes accepted.
    #[must_use]
    pub const fn control_writes(&self) -> u32 {
        self.control_writes
    }

    /// STATUS register bits as the hardware drives them; reserved bits stay 0.
    #[must_use]
    pub fn status_bits(&self) -> u8 {
        let mut status = 0;
        if self.is_ready() {
            status |= STATUS_READY;
        }
        if self.error {
            status |= STATUS_ERROR;
        }
        status
    }
}

/// Simulated peripheral occupying one register window.
#[derive(Debug, Clone)]
pub struct SimPeripheral {
    window: DeviceWindow,
    config: SimConfig,
    state: SimState,
}

impl Default for SimPeripheral {
    fn default() -> Self {
        Self::new(DeviceWindow::default(), SimConfig::default())
    }
}

impl SimPeripheral {
    /// Creates a powered-on device at `window`.
    #[must_use]
    pub fn new(window: DeviceWindow, config: SimConfig) -> Self {
        Self {
            window,
            config,
            state: SimState::power_on(&config),
        }
    }

    /// Window the device decodes.
    #[must_use]
    pub const fn window(&self) -> DeviceWindow {
        self.window
    }

    /// Current register state.
    #[must_use]
    pub const fn state(&self) -> &SimState {
        &self.state
    }

    /// Sets or clears the error latch, as a hardware fault would.
    pub fn inject_error(&mut self, error: bool) {
        self.state.error = error;
    }

    /// Returns the device to its power-on state.
    pub fn power_cycle(&mut self) {
        self.state = SimState::power_on(&self.config);
    }

    fn write_control(&mut self, value: u8) {
        let was_resetting = self.state.ctrl & CTRL_RESET != 0;
        let resetting = value & CTRL_RESET != 0;
        let was_enabled = self.state.ctrl & CTRL_ENABLE != 0;
        let enabled = value & CTRL_ENABLE != 0;
        self.state.ctrl = value;
        self.state.control_writes = self.state.control_writes.saturating_add(1);

        // Clearing enable parks a ready device; setting it again wakes it.
        match (was_enabled, enabled, self.state.readiness) {
            (true, false, Readiness::Ready) => self.state.readiness = Readiness::Disabled,
            (false, true, Readiness::Disabled) => self.state.readiness = Readiness::Ready,
            _ => {}
        }

        match (was_resetting, resetting) {
            (false, true) => {
                self.state.readiness = Readiness::InReset;
            }
            (true, false) => {
                self.state.reset_pulses = self.state.reset_pulses.saturating_add(1);
                self.state.data = 0;
                self.state.error = false;
                self.state.readiness = match self.config.ready_after_polls {
                    Some(0) => Readiness::Ready,
                    Some(remaining) => Readiness::Settling { remaining },
                    None => Readiness::Stuck,
                };
                debug!(
                    base = self.window.base(),
                    pulses = self.state.reset_pulses,
                    "sim reset released"
                );
            }
            _ => {}
        }
    }

    fn read_status(&mut self) -> u8 {
        self.state.status_reads = self.state.status_reads.saturating_add(1);
        if let Readiness::Settling { remaining } = self.state.readiness {
            self.state.readiness = if remaining <= 1 {
                Readiness::Ready
            } else {
                Readiness::Settling {
                    remaining: remaining - 1,
                }
            };
        }
        self.state.status_bits()
    }
}

impl BusTransport for SimPeripheral {
    fn read8(&mut self, addr: u16) -> u8 {
        let value = match self.window.offset_of(addr) {
            Some(CONTROL_OFFSET) => self.state.ctrl,
            Some(STATUS_OFFSET) => self.read_status(),
            _ => 0,
        };
        trace!(addr, value, "sim read8");
        value
    }

    fn write8(&mut self, addr: u16, value: u8) {
        trace!(addr, value, "sim write8");
        if self.window.offset_of(addr) == Some(CONTROL_OFFSET) {
            self.write_control(value);
        }
    }

    fn read32(&mut self, addr: u16) -> u32 {
        match self.window.offset_of(addr) {
            Some(DATA_OFFSET) => self.state.data,
            _ => 0,
        }
    }

    fn write32(&mut self, addr: u16, value: u32) {
        if self.window.offset_of(addr) == Some(DATA_OFFSET) {
            self.state.data = value;
        }
    }
}
