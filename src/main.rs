use std::{
    io::{self, Write},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ulctl::{
    brightness::{self, Mode},
    Error,
    Formatter,
    Light,
    Stdout,
    Sysfs,
    EX_FAILURE,
    EX_USAGE,
};

const LOG_ENV: &str = "ULCTL_LOG";

const USAGE: &str = "\
Usage: ulctl [<options>...] <command> [<command_args>...]

Commands:
    info        Show device information (default).
    list        List all available devices.
    set VALUE   Set device brightness.
    inc VALUE   Increase brightness.
    dec VALUE   Decrease brightness.

Options:
    -d DEVICE   Set device (eg. \"intel_backlight\").
    -h          Show usage information and exit.
    -m          Enable machine readable output.
    -s          Use specific values instead of percentage.
    -v          Show version information and exit.
    -q          Suppress output of set, inc, dec commands.
";

#[derive(Parser, Debug)]
#[clap(name = "ulctl", disable_help_flag = true)]
struct Args {
    #[clap(short = 'd', value_parser, value_name = "DEVICE")]
    device: Option<String>,

    #[clap(short = 'h', action = ArgAction::SetTrue)]
    show_help: bool,

    #[clap(short = 'm', action = ArgAction::SetTrue)]
    machine: bool,

    #[clap(short = 's', action = ArgAction::SetTrue)]
    specific: bool,

    #[clap(short = 'v', action = ArgAction::SetTrue)]
    show_version: bool,

    #[clap(short = 'q', action = ArgAction::SetTrue)]
    quiet: bool,

    #[clap(value_enum)]
    command: Option<Command>,

    #[clap(value_parser)]
    values: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Command {
    Info,
    List,
    Set,
    Inc,
    Dec,
}

/// A command with its argument checked.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Action {
    Info,
    List,
    Set(f64),
    Inc(f64),
    Dec(f64),
}

impl Args {
    fn mode(&self) -> Mode {
        if self.specific {
            Mode::Absolute
        } else {
            Mode::Percentage
        }
    }

    fn action(&self) -> Result<Action, Error> {
        Ok(match self.command.unwrap_or(Command::Info) {
            Command::Info => Action::Info,
            Command::List => Action::List,
            Command::Set => Action::Set(self.value()?),
            Command::Inc => Action::Inc(self.value()?),
            Command::Dec => Action::Dec(self.value()?),
        })
    }

    /// The numeric argument exactly as typed.
    fn raw_value(&self) -> &str {
        self.values.first().map_or("", String::as_str)
    }

    /// The numeric argument of `set`, `inc` and `dec`.
    fn value(&self) -> Result<f64, Error> {
        let raw = self
            .values
            .first()
            .ok_or_else(|| Error::Usage("No value provided".to_string()))?;

        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(Error::Usage(format!("Invalid value: \"{raw}\""))),
        }
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(EX_USAGE);
        }
    };

    if args.show_help || args.show_version {
        let text = if args.show_help {
            USAGE.to_string()
        } else {
            format!("ulctl v{}\n", env!("CARGO_PKG_VERSION"))
        };
        return match emit(&mut io::stdout().lock(), &text) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("{err}");
                ExitCode::from(EX_FAILURE)
            }
        };
    }

    init_logging();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(false)
        .init();
}

/// Writes `text` to `out`. A reader that went away (`ulctl list | head -c0`)
/// is not an error.
fn emit<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    match out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        res => res,
    }
}

fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<Error>())
        .map_or(EX_FAILURE, Error::exit_code)
}

fn run(args: &Args) -> Result<()> {
    // bad input is reported before touching any device
    let action = args.action()?;
    let mode = args.mode();
    debug!(?action, ?mode, device = ?args.device, "dispatching");

    let sysfs = Sysfs::open_default().context("Failed to open device registry")?;
    let formatter = Formatter::new(args.machine, &Stdout);
    let mut stdout = io::stdout().lock();

    match action {
        Action::Info => {
            let light = resolve(&sysfs, args)?;
            emit(&mut stdout, &formatter.render(&light))?;
        }
        Action::List => {
            let lights = Light::enumerate_all(&sysfs).context("Failed to list lights")?;
            if lights.is_empty() {
                return Err(Error::NoDeviceFound).context("Failed to list lights");
            }
            emit(&mut stdout, &formatter.render_all(&lights))?;
        }
        Action::Set(value) | Action::Inc(value) | Action::Dec(value) => {
            let mut light = resolve(&sysfs, args)?;
            let (current, max) = (light.brightness(), light.max_brightness());

            let target = match action {
                Action::Set(_) => brightness::set(max, value, mode),
                Action::Inc(_) => brightness::inc(current, max, value, mode),
                _ => brightness::dec(current, max, value, mode),
            }
            .map_err(|err| err.with_input(args.raw_value()))?;

            light.write(target)?;
            if !args.quiet {
                emit(&mut stdout, &formatter.render(&light))?;
            }
        }
    }

    Ok(())
}

fn resolve(sysfs: &Sysfs, args: &Args) -> Result<Light> {
    match args.device.as_deref() {
        Some(name) => Light::resolve_by_name(sysfs, name)
            .with_context(|| format!("Failed to get light \"{name}\"")),
        None => Light::resolve_default(sysfs).context("Failed to get light"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn info_is_the_default() {
        let args = parse(&["ulctl"]);
        assert_eq!(args.action().unwrap(), Action::Info);
        assert_eq!(args.mode(), Mode::Percentage);
    }

    #[test]
    fn flags_may_follow_the_command() {
        let args = parse(&["ulctl", "inc", "10", "-s", "-q", "-d", "intel_backlight"]);
        assert_eq!(args.action().unwrap(), Action::Inc(10.0));
        assert_eq!(args.mode(), Mode::Absolute);
        assert!(args.quiet);
        assert_eq!(args.device.as_deref(), Some("intel_backlight"));
    }

    #[test]
    fn mutating_commands_need_a_number() {
        let err = parse(&["ulctl", "set"]).action().unwrap_err();
        assert_eq!(err.to_string(), "No value provided");

        let err = parse(&["ulctl", "dec", "lots"]).action().unwrap_err();
        assert_eq!(err.to_string(), "Invalid value: \"lots\"");

        let err = parse(&["ulctl", "set", "inf"]).action().unwrap_err();
        assert_eq!(err.exit_code(), EX_USAGE);

        assert_eq!(parse(&["ulctl", "set", "12.5"]).action().unwrap(), Action::Set(12.5));
    }

    #[test]
    fn unknown_commands_and_flags_are_rejected() {
        assert!(Args::try_parse_from(["ulctl", "brighter"]).is_err());
        assert!(Args::try_parse_from(["ulctl", "-x"]).is_err());
        assert!(Args::try_parse_from(["ulctl", "-d"]).is_err());
    }

    #[test]
    fn exit_code_looks_through_context() {
        let err = anyhow::Error::new(Error::NoDeviceFound).context("Failed to get light");
        assert_eq!(exit_code(&err), EX_FAILURE);

        let err = anyhow::Error::new(Error::ValueOutOfRange {
            value: "101".into(),
            max: 100,
        });
        assert_eq!(exit_code(&err), EX_USAGE);

        assert_eq!(exit_code(&anyhow::anyhow!("something else")), EX_FAILURE);
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "no space left"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn closed_stdout_is_not_an_error() {
        assert!(emit(&mut ClosedPipe, "intel_backlight,backlight,50.20%,128,255\n").is_ok());
        assert!(emit(&mut FullDisk, "x").is_err());

        let mut buf = Vec::new();
        emit(&mut buf, "ok\n").unwrap();
        assert_eq!(buf, b"ok\n");
    }

    #[test]
    fn raw_value_is_kept_for_messages() {
        let args = parse(&["ulctl", "set", "1e3"]);
        assert_eq!(args.action().unwrap(), Action::Set(1000.0));
        assert_eq!(args.raw_value(), "1e3");
    }
}
