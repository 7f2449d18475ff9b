use std::time::Duration;

/// Errors that can occur in USB transport operations.
///
/// Every variant is connection-fatal from the engine's point of view: a
/// failed bulk transfer leaves the device-side protocol state unknown, so
/// the connection has to be torn down and re-established.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The transport has not been opened, or was closed.
    #[error("device not open")]
    NotOpen,

    /// A bulk transfer did not complete within its timeout.
    #[error("bulk transfer timed out after {0:?}")]
    Timeout(Duration),

    /// The endpoint reported a stall condition.
    #[error("endpoint stalled")]
    Stall,

    /// The device was unplugged or otherwise went away.
    #[error("device disconnected")]
    Disconnected,

    /// A bulk write moved fewer bytes than requested.
    #[error("short bulk write ({written} of {expected} bytes)")]
    ShortWrite { written: usize, expected: usize },

    /// An I/O error occurred on the underlying device handle.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error reported by libusb that has no dedicated variant.
    #[cfg(feature = "rusb")]
    #[error("libusb error: {0}")]
    Libusb(rusb::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
