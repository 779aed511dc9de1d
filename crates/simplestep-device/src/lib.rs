//! Typed device access and host-side motion for the simple_step controller.
//!
//! [`Device`] exposes one method per protocol field, each a single round trip
//! through a [`Session`](simplestep_session::Session). Enumerated fields use
//! closed enums ([`Mode`], [`Direction`], [`Status`], [`Enable`]).
//!
//! On top of the accessors sit the composite moves:
//! - [`Device::move_to_pos`] and [`Device::move_by`] for point-to-point moves
//! - [`Device::set_vel_and_dir`] for running at constant velocity
//! - [`Device::soft_ramp_to_vel`] and [`Device::soft_ramp_to_pos`] for
//!   constant-acceleration ramps the firmware cannot generate itself
//!
//! The ramp math lives in [`ramp`] and performs no I/O. Pauses go through the
//! [`Clock`] trait.
//!
//! ```no_run
//! # #[cfg(feature = "usb")]
//! # fn main() -> simplestep_device::Result<()> {
//! use std::time::Duration;
//! use simplestep_device::{Device, DeviceConfig, Direction};
//!
//! let mut dev = Device::open(None, DeviceConfig::default())?;
//! dev.enable()?;
//! dev.soft_ramp_to_vel(2000, Direction::Positive, 1500.0, Duration::from_millis(100))?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "usb"))]
//! # fn main() {}
//! ```

pub mod clock;
pub mod config;
pub mod device;
pub mod error;
mod motion;
pub mod ramp;
pub mod snapshot;
pub mod state;

pub use clock::{Clock, SystemClock};
pub use config::{DeviceConfig, DEFAULT_RAMP_STEP};
pub use device::{Device, MAX_DIO_PIN};
pub use error::{DeviceError, Result};
pub use ramp::{PositionProfile, RampStep, VelocityRamp};
pub use snapshot::{DeviceSnapshot, InfoStrings};
pub use state::{Direction, Enable, Mode, Status};

pub use simplestep_frame::Update;
