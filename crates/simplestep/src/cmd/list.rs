use simplestep_transport::{UsbTransport, PRODUCT_ID, VENDOR_ID};

use crate::cmd::Context;
use crate::exit::{transport_error, CliResult, SUCCESS};
use crate::output::print_devices;

pub fn run(ctx: &Context) -> CliResult<i32> {
    let devices = UsbTransport::list(VENDOR_ID, PRODUCT_ID)
        .map_err(|err| transport_error("list failed", err))?;
    print_devices(&devices, ctx.format);
    Ok(SUCCESS)
}
