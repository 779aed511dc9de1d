use std::time::Duration;

use clap::{Args, Subcommand};
use simplestep_device::{Device, DeviceConfig, Enable};
use simplestep_transport::UsbTransport;
use tracing::debug;

use crate::exit::{device_error, CliResult};
use crate::output::OutputFormat;

pub mod control;
pub mod list;
pub mod motion;
pub mod values;
pub mod version;

/// Acceleration for ramps when `--accel` is not given, in indices/s².
pub const DEFAULT_ACCEL: f64 = 15_000.0;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every device value.
    #[command(alias = "print-vals")]
    Values,
    /// List attached controllers.
    List,
    /// Set the controller running.
    Start,
    /// Stop the controller.
    Stop,
    /// Enable the motor drive.
    Enable,
    /// Disable the motor drive.
    Disable,
    /// Move to an absolute position.
    MoveToPos(MoveToPosArgs),
    /// Move by a relative amount.
    MoveBy(MoveByArgs),
    /// Move to an absolute position with a trapezoidal velocity ramp.
    RampToPos(RampToPosArgs),
    /// Run at a signed velocity.
    SetVel(SetVelArgs),
    /// Ramp to a signed velocity.
    RampToVel(RampToVelArgs),
    /// Make a position the new zero (current position when omitted).
    Zero(ZeroArgs),
    /// Drive a digital output high.
    DioHi(PinArgs),
    /// Drive a digital output low.
    DioLo(PinArgs),
    /// Enable or disable external interrupts.
    SetExtInt(SetExtIntArgs),
    /// Show whether external interrupts are enabled.
    GetExtInt,
    /// Put the controller into firmware update mode.
    DfuMode,
    /// Show version information.
    Version(VersionArgs),
}

/// Settings shared by every subcommand that talks to a device.
#[derive(Debug, Clone)]
pub struct Context {
    pub serial: Option<String>,
    pub config: DeviceConfig,
    pub format: OutputFormat,
}

impl Context {
    pub fn open(&self) -> CliResult<Device<UsbTransport>> {
        debug!(serial = ?self.serial, "opening device");
        Device::open(self.serial.as_deref(), self.config)
            .map_err(|err| device_error("open failed", err))
    }
}

pub fn run(command: Command, ctx: &Context) -> CliResult<i32> {
    match command {
        Command::Values => values::run(ctx),
        Command::List => list::run(ctx),
        Command::Start => control::start(ctx),
        Command::Stop => control::stop(ctx),
        Command::Enable => control::enable(ctx),
        Command::Disable => control::disable(ctx),
        Command::MoveToPos(args) => motion::move_to_pos(args, ctx),
        Command::MoveBy(args) => motion::move_by(args, ctx),
        Command::RampToPos(args) => motion::ramp_to_pos(args, ctx),
        Command::SetVel(args) => motion::set_vel(args, ctx),
        Command::RampToVel(args) => motion::ramp_to_vel(args, ctx),
        Command::Zero(args) => control::zero(args, ctx),
        Command::DioHi(args) => control::dio_hi(args, ctx),
        Command::DioLo(args) => control::dio_lo(args, ctx),
        Command::SetExtInt(args) => control::set_ext_int(args, ctx),
        Command::GetExtInt => control::get_ext_int(ctx),
        Command::DfuMode => control::dfu_mode(ctx),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct MoveToPosArgs {
    /// Target position in indices (n500 or -500 for negative).
    #[arg(allow_negative_numbers = true, value_parser = parse_position)]
    pub pos: i32,
    /// Positioning velocity in indices/s. Default: half the maximum.
    #[arg(long)]
    pub vel: Option<i64>,
}

#[derive(Args, Debug)]
pub struct MoveByArgs {
    /// Change in position in indices (n500 or -500 for negative).
    #[arg(allow_negative_numbers = true, value_parser = parse_position)]
    pub dpos: i32,
    /// Positioning velocity in indices/s. Default: half the maximum.
    #[arg(long)]
    pub vel: Option<i64>,
}

#[derive(Args, Debug)]
pub struct RampToPosArgs {
    /// Target position in indices (n500 or -500 for negative).
    #[arg(allow_negative_numbers = true, value_parser = parse_position)]
    pub pos: i32,
    /// Ramp acceleration in indices/s².
    #[arg(long, default_value_t = DEFAULT_ACCEL)]
    pub accel: f64,
    /// Peak velocity in indices/s. Default: half the maximum.
    #[arg(long)]
    pub vel: Option<i64>,
    /// Time between velocity updates (e.g. 100ms).
    #[arg(long, default_value = "100ms", value_parser = parse_duration)]
    pub step: Duration,
}

#[derive(Args, Debug)]
pub struct SetVelArgs {
    /// Signed velocity in indices/s (n200 or -200 for negative).
    #[arg(allow_negative_numbers = true, value_parser = parse_signed)]
    pub vel: i64,
}

#[derive(Args, Debug)]
pub struct RampToVelArgs {
    /// Signed velocity in indices/s (n200 or -200 for negative).
    #[arg(allow_negative_numbers = true, value_parser = parse_signed)]
    pub vel: i64,
    /// Ramp acceleration in indices/s².
    #[arg(long, default_value_t = DEFAULT_ACCEL)]
    pub accel: f64,
    /// Time between velocity updates (e.g. 100ms).
    #[arg(long, default_value = "100ms", value_parser = parse_duration)]
    pub step: Duration,
}

#[derive(Args, Debug)]
pub struct ZeroArgs {
    /// Position that becomes zero (n500 or -500 for negative).
    #[arg(allow_negative_numbers = true, value_parser = parse_position)]
    pub pos: Option<i32>,
}

#[derive(Args, Debug)]
pub struct PinArgs {
    /// Digital output pin, 0-7.
    pub pin: u8,
}

#[derive(Args, Debug)]
pub struct SetExtIntArgs {
    /// enabled or disabled.
    #[arg(value_parser = parse_enable)]
    pub value: Enable,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse a signed integer, accepting a leading `n` as the minus sign.
pub fn parse_signed(input: &str) -> Result<i64, String> {
    let trimmed = input.trim();
    let normalized = match trimmed.strip_prefix('n') {
        Some(rest) => format!("-{rest}"),
        None => trimmed.to_string(),
    };
    normalized
        .parse()
        .map_err(|_| format!("invalid number '{input}' (write negatives as n500 or -500)"))
}

pub fn parse_position(input: &str) -> Result<i32, String> {
    let value = parse_signed(input)?;
    i32::try_from(value).map_err(|_| format!("position {value} does not fit in 32 bits"))
}

pub fn parse_enable(input: &str) -> Result<Enable, String> {
    input.parse().map_err(|err: simplestep_device::DeviceError| err.to_string())
}

/// Parse `150ms`, `2s` or a bare number of seconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("duration must not be empty".to_string());
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| format!("invalid duration value: {input}"))?;
    if value == 0 {
        return Err("duration must be greater than zero".to_string());
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
