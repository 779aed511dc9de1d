use crate::cmd::Context;
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::print_snapshot;

pub fn run(ctx: &Context) -> CliResult<i32> {
    let mut dev = ctx.open()?;
    let snapshot = dev
        .snapshot()
        .map_err(|err| device_error("read values failed", err))?;
    print_snapshot(&snapshot, ctx.format);
    Ok(SUCCESS)
}
