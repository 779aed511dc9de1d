/// Errors that can occur in raw transport operations.
///
/// A read that returns no data is not an error: [`RawTransport::read`]
/// reports it as `Ok(None)` and the session layer decides whether to retry.
///
/// [`RawTransport::read`]: crate::RawTransport::read
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No attached device matched the requested ids / serial number.
    #[error("no device found (vendor {vendor_id:#06x}, product {product_id:#06x}{})", serial_suffix(.serial))]
    NotFound {
        vendor_id: u16,
        product_id: u16,
        serial: Option<String>,
    },

    /// The device accepted fewer bytes than a full packet.
    #[error("short write ({written} of {expected} bytes)")]
    ShortWrite { written: usize, expected: usize },

    /// An I/O error occurred on the transport.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A libusb call failed.
    #[cfg(feature = "usb")]
    #[error("usb error during {context}: {source}")]
    Usb {
        context: &'static str,
        source: rusb::Error,
    },

    /// The transport has been closed.
    #[error("transport closed")]
    Closed,
}

fn serial_suffix(serial: &Option<String>) -> String {
    match serial {
        Some(serial) => format!(", serial {serial}"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
