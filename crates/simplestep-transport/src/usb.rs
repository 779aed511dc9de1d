use std::time::Duration;

use rusb::{Device, DeviceDescriptor, DeviceHandle, GlobalContext};
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::{DeviceInfo, Packet, RawTransport, PACKET_SIZE};

/// USB vendor id of the at90usb stepper controller.
pub const VENDOR_ID: u16 = 0x1781;
/// USB product id of the at90usb stepper controller.
pub const PRODUCT_ID: u16 = 0x0BB0;

const BULK_OUT_ENDPOINT: u8 = 0x01;
const BULK_IN_ENDPOINT: u8 = 0x82;
const INTERFACE: u8 = 0;
const DESCRIPTOR_TIMEOUT: Duration = Duration::from_millis(500);

/// Bulk transport over libusb.
///
/// Owns the device handle and the claimed interface. The interface is
/// released when the transport is dropped.
pub struct UsbTransport {
    handle: DeviceHandle<GlobalContext>,
    info: DeviceInfo,
}

impl UsbTransport {
    /// Open the first attached controller with the default vendor/product ids,
    /// or the one whose serial number matches `serial`.
    pub fn open_default(serial: Option<&str>) -> Result<Self> {
        Self::open(VENDOR_ID, PRODUCT_ID, serial)
    }

    /// Open a controller by vendor/product id and optional serial number.
    pub fn open(vendor_id: u16, product_id: u16, serial: Option<&str>) -> Result<Self> {
        let candidates = matching_devices(vendor_id, product_id)?;
        let not_found = || TransportError::NotFound {
            vendor_id,
            product_id,
            serial: serial.map(str::to_string),
        };

        for (device, descriptor) in candidates {
            let handle = match device.open() {
                Ok(handle) => handle,
                Err(err) => {
                    debug!(%err, "skipping device that cannot be opened");
                    continue;
                }
            };
            let info = read_info(&handle, &descriptor);

            if let Some(wanted) = serial {
                if info.serial_number.as_deref() != Some(wanted) {
                    debug!(serial = ?info.serial_number, "serial number mismatch");
                    continue;
                }
            }

            let transport = Self::claim(device, descriptor, handle, info)?;
            return Ok(transport);
        }

        Err(not_found())
    }

    /// List descriptive strings of every attached controller with the given ids.
    pub fn list(vendor_id: u16, product_id: u16) -> Result<Vec<DeviceInfo>> {
        let mut found = Vec::new();
        for (device, descriptor) in matching_devices(vendor_id, product_id)? {
            match device.open() {
                Ok(handle) => found.push(read_info(&handle, &descriptor)),
                Err(err) => debug!(%err, "unable to open device for listing"),
            }
        }
        Ok(found)
    }

    fn claim(
        device: Device<GlobalContext>,
        descriptor: DeviceDescriptor,
        mut handle: DeviceHandle<GlobalContext>,
        info: DeviceInfo,
    ) -> Result<Self> {
        match handle.set_auto_detach_kernel_driver(true) {
            Ok(()) | Err(rusb::Error::NotSupported) => {}
            Err(source) => {
                return Err(TransportError::Usb {
                    context: "detach kernel driver",
                    source,
                })
            }
        }

        if descriptor.num_configurations() > 1 {
            debug!("more than one configuration, choosing first");
        }
        let config = device
            .config_descriptor(0)
            .map_err(|source| TransportError::Usb {
                context: "read config descriptor",
                source,
            })?;
        if handle.active_configuration().ok() != Some(config.number()) {
            handle
                .set_active_configuration(config.number())
                .map_err(|source| TransportError::Usb {
                    context: "set configuration",
                    source,
                })?;
        }

        handle
            .claim_interface(INTERFACE)
            .map_err(|source| TransportError::Usb {
                context: "claim interface",
                source,
            })?;

        info!(serial = ?info.serial_number, "opened stepper controller");
        Ok(Self { handle, info })
    }
}

impl RawTransport for UsbTransport {
    fn write(&mut self, packet: &Packet, timeout: Duration) -> Result<usize> {
        self.handle
            .write_bulk(BULK_OUT_ENDPOINT, packet, timeout)
            .map_err(|source| TransportError::Usb {
                context: "bulk write",
                source,
            })
    }

    fn read(&mut self, timeout: Duration) -> Result<Option<Packet>> {
        let mut packet = [0u8; PACKET_SIZE];
        match self.handle.read_bulk(BULK_IN_ENDPOINT, &mut packet, timeout) {
            Ok(0) | Err(rusb::Error::Timeout) => Ok(None),
            Ok(_) => Ok(Some(packet)),
            Err(rusb::Error::NoDevice) => Err(TransportError::Closed),
            Err(source) => Err(TransportError::Usb {
                context: "bulk read",
                source,
            }),
        }
    }

    fn device_info(&self) -> DeviceInfo {
        self.info.clone()
    }
}

impl Drop for UsbTransport {
    fn drop(&mut self) {
        if let Err(err) = self.handle.release_interface(INTERFACE) {
            debug!(%err, "release interface failed");
        }
    }
}

impl std::fmt::Debug for UsbTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsbTransport")
            .field("serial_number", &self.info.serial_number)
            .finish()
    }
}

fn matching_devices(
    vendor_id: u16,
    product_id: u16,
) -> Result<Vec<(Device<GlobalContext>, DeviceDescriptor)>> {
    let devices = rusb::devices().map_err(|source| TransportError::Usb {
        context: "enumerate devices",
        source,
    })?;

    let mut matching = Vec::new();
    for device in devices.iter() {
        let Ok(descriptor) = device.device_descriptor() else {
            continue;
        };
        if descriptor.vendor_id() == vendor_id && descriptor.product_id() == product_id {
            matching.push((device, descriptor));
        }
    }
    Ok(matching)
}

fn read_info(handle: &DeviceHandle<GlobalContext>, descriptor: &DeviceDescriptor) -> DeviceInfo {
    let language = handle
        .read_languages(DESCRIPTOR_TIMEOUT)
        .ok()
        .and_then(|languages| languages.first().copied());

    let Some(language) = language else {
        return DeviceInfo {
            manufacturer: handle.read_manufacturer_string_ascii(descriptor).ok(),
            product: handle.read_product_string_ascii(descriptor).ok(),
            serial_number: handle.read_serial_number_string_ascii(descriptor).ok(),
        };
    };

    DeviceInfo {
        manufacturer: handle
            .read_manufacturer_string(language, descriptor, DESCRIPTOR_TIMEOUT)
            .ok(),
        product: handle
            .read_product_string(language, descriptor, DESCRIPTOR_TIMEOUT)
            .ok(),
        serial_number: handle
            .read_serial_number_string(language, descriptor, DESCRIPTOR_TIMEOUT)
            .ok(),
    }
}
