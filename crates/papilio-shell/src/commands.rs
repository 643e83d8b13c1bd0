//! Built-in verbs of the device module.

use papilio_core::StatusSnapshot;

use crate::parse::{parse_value, parse_value_strict};
use crate::registry::CommandDescriptor;
use crate::shell::CommandShell;
use crate::tutorial::TutorialRunner;

/// Descriptors for every built-in verb, registered under `module`.
#[must_use]
pub fn builtin_commands(module: &str) -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor::new(
            module,
            "tutorial",
            "Interactive step-by-step tutorial",
            handle_tutorial,
        ),
        CommandDescriptor::new(module, "help", "Show all available commands", handle_help),
        CommandDescriptor::new(module, "status", "Display device status", handle_status),
        CommandDescriptor::new(module, "enable", "Enable the device", handle_enable),
        CommandDescriptor::new(module, "disable", "Disable the device", handle_disable),
        CommandDescriptor::new(
            module,
            "write",
            "Write data to device (hex or decimal)",
            handle_write,
        )
        .with_usage("write <value>"),
        CommandDescriptor::new(module, "read", "Read data from device", handle_read),
        CommandDescriptor::new(module, "reset", "Reset the device", handle_reset),
    ]
}

fn handle_tutorial(shell: &mut CommandShell<'_>, _args: &[&str]) {
    TutorialRunner::new().run(shell);
}

fn handle_help(shell: &mut CommandShell<'_>, _args: &[&str]) {
    let module = shell.options().module.clone();
    let title = shell.options().title.clone();

    let lines: Vec<String> = shell
        .registry()
        .commands_for(&module)
        .filter(|cmd| cmd.verb != "help")
        .map(|cmd| {
            let synopsis = format!("{module} {}", cmd.usage);
            format!("  {synopsis:<24}- {}", cmd.help)
        })
        .collect();

    shell.print("");
    shell.print(&format!("{title} Commands:"));
    for line in &lines {
        shell.print(line);
    }
    shell.print("");
    shell.print(&format!("For detailed guidance, run: {module} tutorial"));
}

fn handle_status(shell: &mut CommandShell<'_>, _args: &[&str]) {
    shell.with_attached(|device, out| {
        let status = StatusSnapshot::from_raw(device.status());
        out.write_line("");
        out.write_line("Device Status:");
        out.write_line(&format!("  Status Register: 0x{:02X}", status.raw));
        out.write_line(&format!("  Ready: {}", yes_no(status.ready)));
        out.write_line(&format!("  Error: {}", yes_no(status.error)));
        out.write_line(&format!("  Base Address: 0x{:04X}", device.base_address()));
    });
}

fn handle_enable(shell: &mut CommandShell<'_>, _args: &[&str]) {
    shell.with_attached(|device, out| {
        device.set_enable(true);
        out.write_line("Device enabled");
    });
}

fn handle_disable(shell: &mut CommandShell<'_>, _args: &[&str]) {
    shell.with_attached(|device, out| {
        device.set_enable(false);
        out.write_line("Device disabled");
    });
}

fn handle_write(shell: &mut CommandShell<'_>, args: &[&str]) {
    let module = shell.options().module.clone();
    let strict = shell.options().strict_numbers;
    let token = args.get(1).copied();

    shell.with_attached(|device, out| {
        let Some(token) = token else {
            out.write_line(&format!("Usage: {module} write <value>"));
            out.write_line("  value: decimal or hex (0x prefix)");
            return;
        };

        let value = if strict {
            match parse_value_strict(token) {
                Ok(value) => value,
                Err(error) => {
                    out.write_line(&format!("Error: {error}"));
                    return;
                }
            }
        } else {
            parse_value(token)
        };

        device.write_data(value);
        out.write_line(&format!("Wrote 0x{value:08X} to device"));
    });
}

fn handle_read(shell: &mut CommandShell<'_>, _args: &[&str]) {
    shell.with_attached(|device, out| {
        let value = device.read_data();
        out.write_line(&format!("Read: 0x{value:08X} ({value})"));
    });
}

fn handle_reset(shell: &mut CommandShell<'_>, _args: &[&str]) {
    shell.with_attached(|device, out| {
        device.reset();
        out.write_line("Device reset");
    });
}

const fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}
