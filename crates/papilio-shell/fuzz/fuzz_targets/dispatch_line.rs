#![no_main]

use libfuzzer_sys::fuzz_target;
use papilio_core::{DeviceWindow, ManualClock, RegisterDriver, SimConfig, SimPeripheral};
use papilio_shell::{parse_value, parse_value_strict, BufferedChannel, CommandShell, ShellOptions};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let _ = parse_value(text);
    let _ = parse_value_strict(text);

    let clock = ManualClock::new();
    let window = DeviceWindow::default();
    let sim = SimPeripheral::new(window, SimConfig::default());
    let mut driver = RegisterDriver::with_window(window, sim, &clock);
    driver.initialize();

    let mut channel = BufferedChannel::with_lines(text.lines().skip(1));
    let Ok(shell) = CommandShell::new(&mut channel, &clock, ShellOptions::default()) else {
        return;
    };
    let mut shell = shell.with_device(&mut driver);
    for line in text.lines().take(4) {
        shell.execute_line(line);
    }
});
