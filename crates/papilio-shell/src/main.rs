//! CLI entry point for the Papilio diagnostic shell.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use papilio_core::{RegisterDriver, SimConfig, SimPeripheral, SystemClock};
use papilio_shell::{
    is_exit_word, parse_value_strict, CommandShell, ShellConfig, StdioChannel, TextChannel,
};
#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
use serde as _;
use serde_json as _;
#[cfg(test)]
use tempfile as _;
use thiserror as _;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const USAGE_TEXT: &str = "\
Usage: papilio-shell [options] [<module> <verb> [args...]]

Options:
  -c, --config <file>  Load shell configuration from a JSON file
  -b, --base <addr>    Device base address (decimal or 0x-prefixed hex)
  -s, --script <file>  Execute commands from a file, one per line
      --never-ready    Simulate a device that never leaves reset
      --strict         Reject malformed numeric arguments
  -h, --help           Show this help message

Without a command or script, commands are read interactively from stdin.

Examples:
  papilio-shell template status
  papilio-shell --base 0x2000 template write 0x1234
  papilio-shell --script bring-up.txt
";

#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    config: Option<PathBuf>,
    base: Option<u16>,
    script: Option<PathBuf>,
    never_ready: bool,
    strict: bool,
    command: Vec<String>,
}

#[derive(Debug)]
enum ParseResult {
    Run(CliArgs),
    Help,
}

fn parse_base(value: &str) -> Result<u16, String> {
    let parsed = parse_value_strict(value).map_err(|e| format!("invalid base address: {e}"))?;
    u16::try_from(parsed).map_err(|_| format!("base address out of range: {value}"))
}

#[allow(clippy::while_let_on_iterator)]
fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut parsed = CliArgs::default();

    while let Some(arg) = args.next() {
        let arg = arg.to_string_lossy().to_string();
        match arg.as_str() {
            "-h" | "--help" => return Ok(ParseResult::Help),
            "-c" | "--config" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --config".to_string())?;
                parsed.config = Some(PathBuf::from(value));
            }
            "-b" | "--base" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --base".to_string())?;
                parsed.base = Some(parse_base(&value.to_string_lossy())?);
            }
            "-s" | "--script" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --script".to_string())?;
                parsed.script = Some(PathBuf::from(value));
            }
            "--never-ready" => parsed.never_ready = true,
            "--strict" => parsed.strict = true,
            other if other.starts_with('-') => {
                return Err(format!("unknown option: {other}"));
            }
            _ => {
                parsed.command.push(arg);
                parsed
                    .command
                    .extend(args.by_ref().map(|a| a.to_string_lossy().to_string()));
            }
        }
    }

    if parsed.script.is_some() && !parsed.command.is_empty() {
        return Err("--script cannot be combined with a command".to_string());
    }

    Ok(ParseResult::Run(parsed))
}

fn resolve_config(args: &CliArgs) -> Result<ShellConfig, String> {
    let mut config = match &args.config {
        Some(path) => ShellConfig::load(path).map_err(|e| e.to_string())?,
        None => ShellConfig::default(),
    };
    if let Some(base) = args.base {
        config.base_address = base;
    }
    if args.never_ready {
        config.sim = SimConfig::never_ready();
    }
    if args.strict {
        config.strict_numbers = true;
    }
    Ok(config)
}

fn script_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

fn run(args: &CliArgs) -> Result<(), String> {
    let config = resolve_config(args)?;
    let window = config.window().map_err(|e| e.to_string())?;
    let script = match &args.script {
        Some(path) => Some(
            fs::read_to_string(path)
                .map_err(|e| format!("failed to read script {}: {e}", path.display()))?,
        ),
        None => None,
    };

    let clock = SystemClock::new();
    let sim = SimPeripheral::new(window, config.sim);
    let mut driver = RegisterDriver::with_window(window, sim, &clock).with_timing(config.timing);

    if driver.initialize() {
        info!(base = driver.base_address(), "device ready");
    } else {
        warn!(base = driver.base_address(), "device did not become ready");
        eprintln!(
            "warning: device at 0x{:04X} not ready after {}ms",
            driver.base_address(),
            config.timing.ready_timeout_ms
        );
    }

    let mut channel = StdioChannel::new();
    let mut shell = CommandShell::new(&mut channel, &clock, config.shell_options())
        .map_err(|e| e.to_string())?
        .with_device(&mut driver);

    if !args.command.is_empty() {
        let tokens: Vec<&str> = args.command.iter().map(String::as_str).collect();
        shell.dispatch(&tokens);
    } else if let Some(script) = &script {
        for line in script_lines(script) {
            if is_exit_word(line) {
                break;
            }
            shell.channel().write_line(&format!("> {line}"));
            shell.execute_line(line);
        }
    } else {
        let executed = shell.run_interactive();
        info!(executed, "interactive session ended");
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Run(args)) => match run(&args) {
            Ok(()) => 0,
            Err(error) => {
                eprintln!("error: {error}");
                1
            }
        },
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            1
        }
    };

    std::process::exit(exit_code);
}
