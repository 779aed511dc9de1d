//! Host-side control of the simple_step USB stepper motor controller.
//!
//! The controller is an at90usb board that accepts 8-byte bulk frames and
//! applies setpoints instantly. simplestep speaks its protocol and synthesizes
//! constant-acceleration ramps on the host.
//!
//! # Crate Structure
//!
//! - [`transport`]: raw 8-byte bulk transport (libusb behind the `usb` feature)
//! - [`frame`]: type-tagged frame codec and command registry
//! - [`session`]: request/response exchange with echo check and bounded retry
//! - [`device`]: typed accessors, composite moves and soft ramps
//!
//! The most used device types are re-exported at the crate root.

/// Re-export transport types.
pub mod transport {
    pub use simplestep_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use simplestep_frame::*;
}

/// Re-export session types.
pub mod session {
    pub use simplestep_session::*;
}

/// Re-export device types.
pub mod device {
    pub use simplestep_device::*;
}

pub use simplestep_device::{
    Device, DeviceConfig, DeviceError, DeviceSnapshot, Direction, Enable, Mode, Status, Update,
    DEFAULT_RAMP_STEP,
};
