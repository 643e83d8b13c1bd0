//! Driver behaviour against the in-memory store and the simulated device.

#![allow(clippy::pedantic, clippy::nursery)]

use std::cell::Cell;
use std::time::Duration;

use papilio_core::{
    BusTransport, Clock, DeviceWindow, DriverError, DriverTiming, ManualClock, RegisterDriver,
    RegisterStore, SimConfig, SimPeripheral, CTRL_ENABLE, STATUS_READY, STATUS_RESERVED_MASK,
};
use proptest::prelude::*;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;

/// Clock whose sleeps overshoot by a fixed amount, like a loaded scheduler.
struct JitteryClock {
    now: Cell<Duration>,
    overshoot: Duration,
    sleeps: Cell<u32>,
}

impl JitteryClock {
    fn new(overshoot: Duration) -> Self {
        Self {
            now: Cell::new(Duration::ZERO),
            overshoot,
            sleeps: Cell::new(0),
        }
    }
}

impl Clock for JitteryClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.set(self.sleeps.get() + 1);
        self.now.set(self.now.get() + duration + self.overshoot);
    }
}

fn sim_at(base: u16, config: SimConfig) -> SimPeripheral {
    SimPeripheral::new(DeviceWindow::new(base).unwrap(), config)
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Enable,
    Disable,
    Reset,
    Write(u32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Enable),
        Just(Op::Disable),
        Just(Op::Reset),
        any::<u32>().prop_map(Op::Write),
    ]
}

#[rstest]
#[case(SimConfig::default())]
#[case(SimConfig::ready_after(1))]
#[case(SimConfig::ready_after(40))]
fn initialize_reaches_ready_within_budget(#[case] config: SimConfig) {
    let clock = ManualClock::new();
    let mut driver = RegisterDriver::with_default_base(sim_at(0x1000, config), &clock);

    assert!(driver.initialize());
    assert!(driver.is_ready());
    assert_eq!(driver.bus().state().reset_pulses(), 1);
}

#[test]
fn initialize_times_out_when_device_never_ready() {
    let clock = ManualClock::new();
    let mut driver =
        RegisterDriver::with_default_base(sim_at(0x1000, SimConfig::never_ready()), &clock);

    let start = clock.now();
    assert!(!driver.initialize());
    let elapsed = clock.now() - start;

    let reset_cost = Duration::from_micros(10) + Duration::from_millis(10);
    assert_eq!(elapsed, Duration::from_millis(1000) + reset_cost);
}

#[test]
fn timeout_bound_holds_under_sleep_jitter() {
    let clock = JitteryClock::new(Duration::from_millis(7));
    let mut driver =
        RegisterDriver::with_default_base(sim_at(0x1000, SimConfig::never_ready()), &clock);

    let result = driver.wait_ready();

    let Err(DriverError::Timeout { waited }) = result else {
        panic!("expected timeout, got {result:?}");
    };
    assert!(waited >= Duration::from_millis(1000));
    assert!(waited <= Duration::from_millis(1017));
    assert!(clock.sleeps.get() < 100, "bound must follow elapsed time");
}

#[test]
fn timeout_is_configurable() {
    let clock = ManualClock::new();
    let timing = DriverTiming {
        ready_timeout_ms: 50,
        ..DriverTiming::default()
    };
    let mut driver =
        RegisterDriver::with_default_base(sim_at(0x1000, SimConfig::never_ready()), &clock)
            .with_timing(timing);

    assert_eq!(
        driver.wait_ready(),
        Err(DriverError::Timeout {
            waited: Duration::from_millis(50)
        })
    );
}

#[test]
fn reset_twice_matches_reset_once() {
    let clock = ManualClock::new();
    let mut once = RegisterDriver::with_default_base(SimPeripheral::default(), &clock);
    let mut twice = RegisterDriver::with_default_base(SimPeripheral::default(), &clock);

    once.reset();
    twice.reset();
    twice.reset();

    let once_status = once.status();
    let twice_status = twice.status();
    assert_eq!(once_status, twice_status);
    assert_eq!(twice_status & STATUS_READY, STATUS_READY);
    assert_eq!(twice_status & STATUS_RESERVED_MASK, 0);
    assert_eq!(twice.bus().state().reset_pulses(), 2);
}

#[test]
fn reset_waits_pulse_then_settle() {
    let clock = ManualClock::new();
    let mut driver = RegisterDriver::with_default_base(SimPeripheral::default(), &clock);

    driver.reset();

    assert_eq!(clock.sleep_count(), 2);
    assert!(clock.total_slept() >= Duration::from_millis(10) + Duration::from_micros(10));
}

#[rstest]
#[case(0x0000)]
#[case(0x1000)]
#[case(0x2000)]
#[case(0xFFF4)]
fn base_address_is_reported_exactly(#[case] base: u16) {
    let clock = ManualClock::new();
    let driver = RegisterDriver::new(base, RegisterStore::new(), &clock).unwrap();
    assert_eq!(driver.base_address(), base);
}

#[test]
fn drivers_at_distinct_bases_use_disjoint_registers() {
    let clock = ManualClock::new();
    let mut store = RegisterStore::new();
    {
        let mut first = RegisterDriver::new(0x1000, &mut store, &clock).unwrap();
        first.write_data(0x1111_1111);
        first.set_enable(true);
    }
    {
        let mut second = RegisterDriver::new(0x2000, &mut store, &clock).unwrap();
        second.write_data(0x2222_2222);
        assert!(!second.window().overlaps(DeviceWindow::new(0x1000).unwrap()));
        assert!(!second.is_enabled());
    }

    assert_eq!(store.read32(0x1008), 0x1111_1111);
    assert_eq!(store.read32(0x2008), 0x2222_2222);
}

#[test]
fn sequential_transfers_on_enabled_device() {
    let clock = ManualClock::new();
    let mut driver = RegisterDriver::with_default_base(SimPeripheral::default(), &clock);
    assert!(driver.initialize());
    driver.set_enable(true);

    for value in 0..10_u32 {
        driver.write_data(value);
        assert_eq!(driver.read_data(), value);
    }
}

#[test]
fn ready_follows_enable_on_simulated_device() {
    let clock = ManualClock::new();
    let mut driver = RegisterDriver::with_default_base(SimPeripheral::default(), &clock);
    assert!(driver.initialize());

    driver.set_enable(true);
    clock.advance(Duration::from_millis(10));
    assert_eq!(driver.status() & STATUS_READY, STATUS_READY);

    driver.set_enable(false);
    clock.advance(Duration::from_millis(10));
    assert_eq!(driver.status() & STATUS_READY, 0);

    driver.reset();
    assert!(driver.is_ready());
}

#[test]
fn reset_restores_data_register_on_simulated_device() {
    let clock = ManualClock::new();
    let mut driver = RegisterDriver::with_default_base(SimPeripheral::default(), &clock);
    driver.write_data(0x1234_5678);
    driver.reset();

    assert!(driver.is_ready());
    assert_eq!(driver.read_data(), 0);
}

proptest! {
    #[test]
    fn enable_round_trip_preserves_other_control_bits(initial in any::<u8>()) {
        let clock = ManualClock::new();
        let mut store = RegisterStore::new();
        store.preset8(0x1000, initial);
        let mut driver = RegisterDriver::with_default_base(store, &clock);

        driver.set_enable(true);
        prop_assert_eq!(driver.bus().peek8(0x1000), Some(initial | CTRL_ENABLE));

        driver.set_enable(false);
        prop_assert_eq!(driver.bus().peek8(0x1000), Some(initial & !CTRL_ENABLE));
    }

    #[test]
    fn data_register_round_trips(value in any::<u32>(), base in 0_u16..=0xFFF4) {
        let clock = ManualClock::new();
        let mut driver = RegisterDriver::new(base, RegisterStore::new(), &clock).unwrap();

        driver.write_data(value);
        prop_assert_eq!(driver.read_data(), value);
    }

    #[test]
    fn status_reserved_bits_stay_clear(ops in proptest::collection::vec(op_strategy(), 0..24)) {
        let clock = ManualClock::new();
        let mut driver = RegisterDriver::with_default_base(SimPeripheral::default(), &clock);

        prop_assert_eq!(driver.status() & STATUS_RESERVED_MASK, 0);
        for op in ops {
            match op {
                Op::Enable => driver.set_enable(true),
                Op::Disable => driver.set_enable(false),
                Op::Reset => driver.reset(),
                Op::Write(value) => driver.write_data(value),
            }
            prop_assert_eq!(driver.status() & STATUS_RESERVED_MASK, 0);
        }
    }
}
