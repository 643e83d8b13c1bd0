//! Fixed register map and device address-window helpers.

use crate::error::DriverError;

/// Byte offset of the CONTROL register (8-bit, read/write).
pub const CONTROL_OFFSET: u16 = 0x00;
/// Byte offset of the STATUS register (8-bit, read-only).
pub const STATUS_OFFSET: u16 = 0x04;
/// Byte offset of the DATA register (32-bit, read/write).
pub const DATA_OFFSET: u16 = 0x08;

/// CONTROL bit 0: device enable.
pub const CTRL_ENABLE: u8 = 0x01;
/// CONTROL bit 1: reset pulse.
pub const CTRL_RESET: u8 = 0x02;

/// STATUS bit 0: device ready.
pub const STATUS_READY: u8 = 0x01;
/// STATUS bit 1: device error latch.
pub const STATUS_ERROR: u8 = 0x02;
/// STATUS bits 2-7: reserved, hardware must drive them to zero.
pub const STATUS_RESERVED_MASK: u8 = 0xFC;

/// Base address used when the caller does not supply one.
pub const DEFAULT_BASE_ADDRESS: u16 = 0x1000;

/// Number of bus bytes spanned by one device's register block.
pub const REGISTER_WINDOW_BYTES: u16 = 0x0C;

const _: () = assert_register_layout();

const fn assert_register_layout() {
    assert!(
        CONTROL_OFFSET < STATUS_OFFSET && STATUS_OFFSET < DATA_OFFSET,
        "register offsets must be distinct and ascending"
    );
    assert!(
        DATA_OFFSET.is_multiple_of(4),
        "32-bit DATA register must be word aligned"
    );
    assert!(
        DATA_OFFSET + 4 <= REGISTER_WINDOW_BYTES,
        "DATA register must fit inside the device window"
    );
    assert!(
        CTRL_ENABLE & CTRL_RESET == 0,
        "control bits must not overlap"
    );
    assert!(
        (STATUS_READY | STATUS_ERROR) & STATUS_RESERVED_MASK == 0,
        "defined status bits must not be reserved"
    );
}

/// Address range occupied by a single device on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceWindow {
    base: u16,
}

impl Default for DeviceWindow {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE_ADDRESS,
        }
    }
}

impl DeviceWindow {
    /// Creates the window for a device at `base`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::WindowOutOfRange`] when the register block would
    /// run past the end of the 16-bit address space.
    pub const fn new(base: u16) -> Result<Self, DriverError> {
        if base.checked_add(REGISTER_WINDOW_BYTES - 1).is_none() {
            return Err(DriverError::WindowOutOfRange { base });
        }
        Ok(Self { base })
    }

    /// Inclusive first address of the window.
    #[must_use]
    pub const fn base(self) -> u16 {
        self.base
    }

    /// Inclusive last address of the window.
    #[must_use]
    pub const fn end(self) -> u16 {
        self.base + (REGISTER_WINDOW_BYTES - 1)
    }

    /// Returns `true` when `addr` falls inside the window.
    #[must_use]
    pub const fn contains(self, addr: u16) -> bool {
        addr >= self.base && addr <= self.end()
    }

    /// Returns `true` when the two windows share at least one address.
    #[must_use]
    pub const fn overlaps(self, other: Self) -> bool {
        self.base <= other.end() && other.base <= self.end()
    }

    /// Returns the register offset of `addr`, or `None` outside the window.
    #[must_use]
    pub const fn offset_of(self, addr: u16) -> Option<u16> {
        if self.contains(addr) {
            Some(addr - self.base)
        } else {
            None
        }
    }
}

/// Decoded view of the STATUS register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct StatusSnapshot {
    /// Raw register byte, reserved bits included.
    pub raw: u8,
    /// Ready bit.
    pub ready: bool,
    /// Error bit.
    pub error: bool,
    /// Reserved bits 2-7 exactly as read.
    pub reserved: u8,
}

impl StatusSnapshot {
    /// Decodes a raw STATUS byte.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self {
            raw,
            ready: raw & STATUS_READY != 0,
            error: raw & STATUS_ERROR != 0,
            reserved: raw & STATUS_RESERVED_MASK,
        }
    }

    /// Returns `true` when the hardware left every reserved bit clear.
    #[must_use]
    pub const fn reserved_clear(self) -> bool {
        self.reserved == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_map_matches_published_layout() {
        assert_eq!(CONTROL_OFFSET, 0x00);
        assert_eq!(STATUS_OFFSET, 0x04);
        assert_eq!(DATA_OFFSET, 0x08);
        assert_eq!(CTRL_ENABLE, 0b01);
        assert_eq!(CTRL_RESET, 0b10);
        assert_eq!(STATUS_RESERVED_MASK, 0xFC);
    }

    #[test]
    fn window_bounds_cover_all_registers() {
        let window = DeviceWindow::new(0x2000).unwrap();
        assert_eq!(window.base(), 0x2000);
        assert_eq!(window.end(), 0x200B);
        assert!(window.contains(0x2000 + CONTROL_OFFSET));
        assert!(window.contains(0x2000 + STATUS_OFFSET));
        assert!(window.contains(0x2000 + DATA_OFFSET + 3));
        assert!(!window.contains(0x1FFF));
        assert!(!window.contains(0x200C));
        assert_eq!(window.offset_of(0x2008), Some(DATA_OFFSET));
        assert_eq!(window.offset_of(0x3000), None);
    }

    #[test]
    fn window_rejects_wrap_past_address_space() {
        assert!(DeviceWindow::new(0xFFF4).is_ok());
        assert_eq!(
            DeviceWindow::new(0xFFF5),
            Err(DriverError::WindowOutOfRange { base: 0xFFF5 })
        );
    }

    #[test]
    fn adjacent_windows_do_not_overlap() {
        let first = DeviceWindow::new(0x1000).unwrap();
        let second = DeviceWindow::new(0x100C).unwrap();
        let colliding = DeviceWindow::new(0x1008).unwrap();

        assert!(!first.overlaps(second));
        assert!(!second.overlaps(first));
        assert!(first.overlaps(colliding));
        assert!(colliding.overlaps(second));
        assert!(first.overlaps(first));
    }

    #[test]
    fn status_snapshot_decodes_bits() {
        let snapshot = StatusSnapshot::from_raw(0x83);
        assert!(snapshot.ready);
        assert!(snapshot.error);
        assert_eq!(snapshot.reserved, 0x80);
        assert!(!snapshot.reserved_clear());

        let clean = StatusSnapshot::from_raw(STATUS_READY);
        assert!(clean.ready);
        assert!(!clean.error);
        assert!(clean.reserved_clear());
    }
}
