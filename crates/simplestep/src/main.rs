mod cmd;
mod exit;
mod logging;
mod output;

use std::time::Duration;

use clap::Parser;
use simplestep_device::DeviceConfig;
use simplestep_session::SessionConfig;

use crate::cmd::{parse_duration, Command, Context};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "simplestep", version, about = "simple_step stepper controller CLI")]
struct Cli {
    /// Serial number of the controller to use. Default: first one found.
    #[arg(long, env = "SIMPLESTEP_SERIAL", global = true)]
    serial: Option<String>,

    /// Read timeout for each attempt (e.g. 200ms, 1s).
    #[arg(long, value_name = "DURATION", default_value = "200ms", value_parser = parse_duration, global = true)]
    read_timeout: Duration,

    /// Attempts per request before giving up.
    #[arg(long, value_name = "N", default_value_t = 25, global = true)]
    max_attempts: u32,

    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        env = "SIMPLESTEP_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn context(&self) -> Context {
        Context {
            serial: self.serial.clone(),
            config: DeviceConfig {
                session: SessionConfig {
                    read_timeout: self.read_timeout,
                    max_attempts: self.max_attempts,
                    ..SessionConfig::default()
                },
                ..DeviceConfig::default()
            },
            format: self.format.unwrap_or_else(OutputFormat::default_for_stdout),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let ctx = cli.context();
    let result = cmd::run(cli.command, &ctx);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_n_prefixed_position() {
        let cli = Cli::try_parse_from(["simplestep", "move-to-pos", "n500", "--vel", "1000"])
            .expect("move-to-pos args should parse");
        match cli.command {
            Command::MoveToPos(args) => {
                assert_eq!(args.pos, -500);
                assert_eq!(args.vel, Some(1000));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_hyphen_negative_velocity() {
        let cli = Cli::try_parse_from(["simplestep", "set-vel", "-200"])
            .expect("set-vel args should parse");
        assert!(matches!(cli.command, Command::SetVel(args) if args.vel == -200));
    }

    #[test]
    fn ramp_to_vel_defaults() {
        let cli = Cli::try_parse_from(["simplestep", "ramp-to-vel", "n300"])
            .expect("ramp-to-vel args should parse");
        match cli.command {
            Command::RampToVel(args) => {
                assert_eq!(args.vel, -300);
                assert_eq!(args.accel, cmd::DEFAULT_ACCEL);
                assert_eq!(args.step, Duration::from_millis(100));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "simplestep",
            "values",
            "--serial",
            "0042",
            "--read-timeout",
            "500ms",
            "--max-attempts",
            "3",
            "--format",
            "json",
        ])
        .expect("global flags should parse");
        let ctx = cli.context();
        assert_eq!(ctx.serial.as_deref(), Some("0042"));
        assert_eq!(ctx.config.session.read_timeout, Duration::from_millis(500));
        assert_eq!(ctx.config.session.max_attempts, 3);
        assert_eq!(ctx.format, OutputFormat::Json);
    }

    #[test]
    fn print_vals_alias() {
        let cli = Cli::try_parse_from(["simplestep", "print-vals"]).expect("alias should parse");
        assert!(matches!(cli.command, Command::Values));
    }

    #[test]
    fn zero_position_is_optional() {
        let cli = Cli::try_parse_from(["simplestep", "zero"]).expect("zero should parse");
        assert!(matches!(cli.command, Command::Zero(args) if args.pos.is_none()));
    }

    #[test]
    fn rejects_unknown_ext_int_value() {
        let err = Cli::try_parse_from(["simplestep", "set-ext-int", "sometimes"])
            .expect_err("bad value should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn rejects_zero_step() {
        let err = Cli::try_parse_from(["simplestep", "ramp-to-pos", "100", "--step", "0ms"])
            .expect_err("zero step should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
