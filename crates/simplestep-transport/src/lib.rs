//! Raw bulk transport for the simple_step stepper controller.
//!
//! The controller speaks in fixed 8-byte packets: one bulk-OUT write followed
//! by one bulk-IN read. This crate defines the [`RawTransport`] seam every
//! higher layer is written against, plus a libusb-backed implementation behind
//! the `usb` feature.
//!
//! This is the lowest layer of simplestep. Everything else builds on top of it.

pub mod error;
pub mod traits;

#[cfg(feature = "usb")]
pub mod usb;

pub use error::{Result, TransportError};
pub use traits::{DeviceInfo, Packet, RawTransport, PACKET_SIZE};

#[cfg(feature = "usb")]
pub use rusb::Error as UsbError;
#[cfg(feature = "usb")]
pub use usb::{UsbTransport, PRODUCT_ID, VENDOR_ID};
