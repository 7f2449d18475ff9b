use std::time::Duration;

use crate::error::Result;

/// Direction of a bulk endpoint, from the host's point of view.
///
/// An MTP interface exposes exactly one bulk endpoint per direction (plus
/// an interrupt endpoint for events, which this layer does not cover).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Host to device.
    Out,
    /// Device to host.
    In,
}

/// A claimed MTP device interface, reduced to the operations the
/// transaction engine needs.
///
/// All transfers are blocking with a caller-supplied timeout. A timeout is
/// surfaced as [`TransportError::Timeout`](crate::TransportError::Timeout)
/// like any other transfer failure; there is no cancellation.
///
/// Implementations are not required to be thread-safe. The engine issues
/// exactly one outstanding transfer at a time; concurrent callers must
/// serialize at a higher level.
pub trait UsbTransport {
    /// Open the device handle and claim the MTP interface.
    fn open(&mut self) -> Result<()>;

    /// Release the interface and close the device handle.
    ///
    /// Closing an already-closed transport is a no-op.
    fn close(&mut self) -> Result<()>;

    /// Write `data` to the bulk OUT endpoint. Returns bytes written.
    ///
    /// An empty `data` is a valid zero-length transfer, used to signal
    /// end-of-data when a payload ends on a packet boundary.
    fn bulk_send(&mut self, data: &[u8], timeout: Duration) -> Result<usize>;

    /// Read from the bulk IN endpoint into `buf`. Returns bytes read.
    ///
    /// A return of zero is a zero-length packet, not end-of-stream.
    fn bulk_receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Maximum packet size of the given bulk endpoint, in bytes.
    fn max_packet_size(&self, endpoint: Endpoint) -> usize;

    /// Issue a USB port reset to the device.
    fn reset_device(&mut self) -> Result<()>;
}
