//! Bus transport contract and an in-memory register store.

use std::collections::BTreeMap;

/// Register-oriented bus used by the driver to reach the peripheral.
///
/// Transactions are synchronous and assumed to succeed; transport-level
/// failure handling belongs to the implementation below this trait.
pub trait BusTransport {
    /// Reads one byte at `addr`.
    fn read8(&mut self, addr: u16) -> u8;

    /// Writes one byte at `addr`.
    fn write8(&mut self, addr: u16, value: u8);

    /// Reads a 32-bit word at `addr`.
    fn read32(&mut self, addr: u16) -> u32;

    /// Writes a 32-bit word at `addr`.
    fn write32(&mut self, addr: u16, value: u32);

    /// Reports whether the link to the peripheral is up.
    fn is_link_ready(&self) -> bool {
        true
    }
}

impl<T: BusTransport + ?Sized> BusTransport for &mut T {
    fn read8(&mut self, addr: u16) -> u8 {
        (**self).read8(addr)
    }

    fn write8(&mut self, addr: u16, value: u8) {
        (**self).write8(addr, value);
    }

    fn read32(&mut self, addr: u16) -> u32 {
        (**self).read32(addr)
    }

    fn write32(&mut self, addr: u16, value: u32) {
        (**self).write32(addr, value);
    }

    fn is_link_ready(&self) -> bool {
        (**self).is_link_ready()
    }
}

impl<T: BusTransport + ?Sized> BusTransport for Box<T> {
    fn read8(&mut self, addr: u16) -> u8 {
        (**self).read8(addr)
    }

    fn write8(&mut self, addr: u16, value: u8) {
        (**self).write8(addr, value);
    }

    fn read32(&mut self, addr: u16) -> u32 {
        (**self).read32(addr)
    }

    fn write32(&mut self, addr: u16, value: u32) {
        (**self).write32(addr, value);
    }

    fn is_link_ready(&self) -> bool {
        (**self).is_link_ready()
    }
}

/// Faithful register store: every write is read back unchanged.
///
/// Byte and word registers live in separate maps keyed by address, so an
/// 8-bit write never aliases a 32-bit register at a neighbouring address.
/// Unwritten addresses read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterStore {
    bytes: BTreeMap<u16, u8>,
    words: BTreeMap<u16, u32>,
}

impl RegisterStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a byte register without going through the bus interface.
    pub fn preset8(&mut self, addr: u16, value: u8) {
        self.bytes.insert(addr, value);
    }

    /// Seeds a word register without going through the bus interface.
    pub fn preset32(&mut self, addr: u16, value: u32) {
        self.words.insert(addr, value);
    }

    /// Returns the stored byte at `addr`, if any was written.
    #[must_use]
    pub fn peek8(&self, addr: u16) -> Option<u8> {
        self.bytes.get(&addr).copied()
    }

    /// Returns the stored word at `addr`, if any was written.
    #[must_use]
    pub fn peek32(&self, addr: u16) -> Option<u32> {
        self.words.get(&addr).copied()
    }
}

impl BusTransport for RegisterStore {
    fn read8(&mut self, addr: u16) -> u8 {
        self.bytes.get(&addr).copied().unwrap_or(0)
    }

    fn write8(&mut self, addr: u16, value: u8) {
        self.bytes.insert(addr, value);
    }

    fn read32(&mut self, addr: u16) -> u32 {
        self.words.get(&addr).copied().unwrap_or(0)
    }

    fn write32(&mut self, addr: u16, value: u32) {
        self.words.insert(addr, value);
    }
}

#[cfg(test)]
mod tests {
    use super::{BusTransport, RegisterStore};

    #[test]
    fn unwritten_registers_read_zero() {
        let mut store = RegisterStore::new();
        assert_eq!(store.read8(0x1000), 0);
        assert_eq!(store.read32(0x1008), 0);
        assert_eq!(store.peek8(0x1000), None);
    }

    #[test]
    fn byte_and_word_views_are_independent() {
        let mut store = RegisterStore::new();
        store.write32(0x1008, 0xDEAD_BEEF);
        store.write8(0x1008, 0x11);

        assert_eq!(store.read32(0x1008), 0xDEAD_BEEF);
        assert_eq!(store.read8(0x1008), 0x11);
    }

    #[test]
    fn borrowed_transport_forwards_to_owner() {
        let mut store = RegisterStore::new();
        {
            let mut borrowed = &mut store;
            borrowed.write8(0x0004, 0x01);
            assert!(borrowed.is_link_ready());
        }
        assert_eq!(store.peek8(0x0004), Some(0x01));
    }
}
