use simplestep_device::Enable;

use crate::cmd::{Context, PinArgs, SetExtIntArgs, ZeroArgs};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::print_field;

pub fn start(ctx: &Context) -> CliResult<i32> {
    ctx.open()?
        .start()
        .map_err(|err| device_error("start failed", err))?;
    Ok(SUCCESS)
}

pub fn stop(ctx: &Context) -> CliResult<i32> {
    ctx.open()?
        .stop()
        .map_err(|err| device_error("stop failed", err))?;
    Ok(SUCCESS)
}

pub fn enable(ctx: &Context) -> CliResult<i32> {
    ctx.open()?
        .enable()
        .map_err(|err| device_error("enable failed", err))?;
    Ok(SUCCESS)
}

pub fn disable(ctx: &Context) -> CliResult<i32> {
    ctx.open()?
        .disable()
        .map_err(|err| device_error("disable failed", err))?;
    Ok(SUCCESS)
}

pub fn zero(args: ZeroArgs, ctx: &Context) -> CliResult<i32> {
    let mut dev = ctx.open()?;
    let pos = match args.pos {
        Some(pos) => pos,
        None => dev
            .get_pos()
            .map_err(|err| device_error("read position failed", err))?,
    };
    dev.set_zero_pos(pos)
        .map_err(|err| device_error("zero failed", err))?;
    Ok(SUCCESS)
}

pub fn dio_hi(args: PinArgs, ctx: &Context) -> CliResult<i32> {
    ctx.open()?
        .set_dio_hi(args.pin)
        .map_err(|err| device_error("dio-hi failed", err))?;
    Ok(SUCCESS)
}

pub fn dio_lo(args: PinArgs, ctx: &Context) -> CliResult<i32> {
    ctx.open()?
        .set_dio_lo(args.pin)
        .map_err(|err| device_error("dio-lo failed", err))?;
    Ok(SUCCESS)
}

pub fn set_ext_int(args: SetExtIntArgs, ctx: &Context) -> CliResult<i32> {
    let applied = ctx
        .open()?
        .set_ext_int(args.value)
        .map_err(|err| device_error("set-ext-int failed", err))?;
    if applied != args.value {
        // The firmware refuses to enable while the interrupt line is active.
        tracing::warn!(requested = %args.value, %applied, "external interrupts unchanged");
    }
    print_field("external_interrupts", applied, ctx.format);
    Ok(SUCCESS)
}

pub fn get_ext_int(ctx: &Context) -> CliResult<i32> {
    let value: Enable = ctx
        .open()?
        .get_ext_int()
        .map_err(|err| device_error("get-ext-int failed", err))?;
    print_field("external_interrupts", value, ctx.format);
    Ok(SUCCESS)
}

pub fn dfu_mode(ctx: &Context) -> CliResult<i32> {
    ctx.open()?
        .enter_dfu_mode()
        .map_err(|err| device_error("dfu-mode failed", err))?;
    println!("device is now in DFU mode; re-attach after flashing");
    Ok(SUCCESS)
}
