use simplestep_device::Direction;
use tracing::info;

use crate::cmd::{Context, MoveByArgs, MoveToPosArgs, RampToPosArgs, RampToVelArgs, SetVelArgs};
use crate::exit::{device_error, CliResult, SUCCESS};

pub fn move_to_pos(args: MoveToPosArgs, ctx: &Context) -> CliResult<i32> {
    let mut dev = ctx.open()?;
    dev.move_to_pos(args.pos, args.vel)
        .map_err(|err| device_error("move-to-pos failed", err))?;
    info!(pos = args.pos, "move complete");
    Ok(SUCCESS)
}

pub fn move_by(args: MoveByArgs, ctx: &Context) -> CliResult<i32> {
    let mut dev = ctx.open()?;
    dev.move_by(args.dpos, args.vel)
        .map_err(|err| device_error("move-by failed", err))?;
    info!(dpos = args.dpos, "move complete");
    Ok(SUCCESS)
}

pub fn ramp_to_pos(args: RampToPosArgs, ctx: &Context) -> CliResult<i32> {
    let mut dev = ctx.open()?;
    dev.soft_ramp_to_pos(args.pos, args.accel, args.vel, args.step)
        .map_err(|err| device_error("ramp-to-pos failed", err))?;
    info!(pos = args.pos, "ramp complete");
    Ok(SUCCESS)
}

pub fn set_vel(args: SetVelArgs, ctx: &Context) -> CliResult<i32> {
    let (vel, dir) = split_signed(args.vel);
    let mut dev = ctx.open()?;
    dev.set_vel_and_dir(vel, dir)
        .map_err(|err| device_error("set-vel failed", err))?;
    Ok(SUCCESS)
}

pub fn ramp_to_vel(args: RampToVelArgs, ctx: &Context) -> CliResult<i32> {
    let (vel, dir) = split_signed(args.vel);
    let mut dev = ctx.open()?;
    dev.soft_ramp_to_vel(vel, dir, args.accel, args.step)
        .map_err(|err| device_error("ramp-to-vel failed", err))?;
    info!(vel, %dir, "ramp complete");
    Ok(SUCCESS)
}

/// Magnitude and direction of a signed velocity. Zero runs positive.
fn split_signed(vel: i64) -> (i64, Direction) {
    (vel.saturating_abs(), Direction::of(vel))
}
