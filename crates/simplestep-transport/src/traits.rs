use std::time::Duration;

use crate::error::Result;

/// Size of every bulk packet exchanged with the controller, in both directions.
pub const PACKET_SIZE: usize = 8;

/// One raw bulk packet.
pub type Packet = [u8; PACKET_SIZE];

/// Descriptive strings reported by an attached controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
}

/// Raw bulk-transfer primitives for a single opened controller.
///
/// Implementations own the underlying handle; dropping the transport closes it.
/// Higher layers never hold more than one request in flight, so implementations
/// need no internal synchronization.
pub trait RawTransport {
    /// Write one packet to the bulk-OUT endpoint. Returns the number of bytes accepted.
    fn write(&mut self, packet: &Packet, timeout: Duration) -> Result<usize>;

    /// Read one packet from the bulk-IN endpoint.
    ///
    /// Returns `Ok(None)` when the device produced no data within `timeout`.
    fn read(&mut self, timeout: Duration) -> Result<Option<Packet>>;

    /// Manufacturer, product and serial strings, where the transport knows them.
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo::default()
    }
}

impl<T: RawTransport + ?Sized> RawTransport for Box<T> {
    fn write(&mut self, packet: &Packet, timeout: Duration) -> Result<usize> {
        (**self).write(packet, timeout)
    }

    fn read(&mut self, timeout: Duration) -> Result<Option<Packet>> {
        (**self).read(timeout)
    }

    fn device_info(&self) -> DeviceInfo {
        (**self).device_info()
    }
}

impl<T: RawTransport + ?Sized> RawTransport for &mut T {
    fn write(&mut self, packet: &Packet, timeout: Duration) -> Result<usize> {
        (**self).write(packet, timeout)
    }

    fn read(&mut self, timeout: Duration) -> Result<Option<Packet>> {
        (**self).read(timeout)
    }

    fn device_info(&self) -> DeviceInfo {
        (**self).device_info()
    }
}
