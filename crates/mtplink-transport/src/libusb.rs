//! `UsbTransport` backend over libusb via the `rusb` crate.
//!
//! Enumeration, device selection, and endpoint discovery are the caller's
//! job: construct a [`RusbTransport`] from an already-opened device handle
//! and the bulk endpoint addresses read from its interface descriptor.

use std::time::Duration;

use rusb::{DeviceHandle, UsbContext};
use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::{Endpoint, UsbTransport};

/// Bulk endpoint addresses and packet sizes of an MTP interface.
#[derive(Debug, Clone, Copy)]
pub struct EndpointInfo {
    /// Address of the bulk OUT endpoint.
    pub out_address: u8,
    /// Address of the bulk IN endpoint.
    pub in_address: u8,
    /// Max packet size of the bulk OUT endpoint.
    pub out_max_packet: usize,
    /// Max packet size of the bulk IN endpoint.
    pub in_max_packet: usize,
    /// Interface number to claim.
    pub interface: u8,
}

/// A [`UsbTransport`] backed by a libusb device handle.
pub struct RusbTransport<C: UsbContext> {
    handle: DeviceHandle<C>,
    endpoints: EndpointInfo,
    claimed: bool,
}

impl<C: UsbContext> RusbTransport<C> {
    pub fn new(handle: DeviceHandle<C>, endpoints: EndpointInfo) -> Self {
        Self {
            handle,
            endpoints,
            claimed: false,
        }
    }

    /// Consume the transport and return the underlying handle.
    pub fn into_inner(self) -> DeviceHandle<C> {
        self.handle
    }
}

fn map_usb_err(err: rusb::Error) -> TransportError {
    match err {
        rusb::Error::Timeout => TransportError::Timeout(Duration::ZERO),
        rusb::Error::NoDevice => TransportError::Disconnected,
        rusb::Error::Pipe => TransportError::Stall,
        other => TransportError::Libusb(other),
    }
}

impl<C: UsbContext> UsbTransport for RusbTransport<C> {
    fn open(&mut self) -> Result<()> {
        if self.claimed {
            return Ok(());
        }
        self.handle
            .claim_interface(self.endpoints.interface)
            .map_err(map_usb_err)?;
        debug!(interface = self.endpoints.interface, "claimed MTP interface");
        self.claimed = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.claimed {
            return Ok(());
        }
        self.claimed = false;
        self.handle
            .release_interface(self.endpoints.interface)
            .map_err(map_usb_err)
    }

    fn bulk_send(&mut self, data: &[u8], timeout: Duration) -> Result<usize> {
        if !self.claimed {
            return Err(TransportError::NotOpen);
        }
        match self
            .handle
            .write_bulk(self.endpoints.out_address, data, timeout)
        {
            Ok(n) => Ok(n),
            Err(rusb::Error::Timeout) => Err(TransportError::Timeout(timeout)),
            Err(err) => Err(map_usb_err(err)),
        }
    }

    fn bulk_receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        if !self.claimed {
            return Err(TransportError::NotOpen);
        }
        match self
            .handle
            .read_bulk(self.endpoints.in_address, buf, timeout)
        {
            Ok(n) => Ok(n),
            Err(rusb::Error::Timeout) => Err(TransportError::Timeout(timeout)),
            Err(err) => Err(map_usb_err(err)),
        }
    }

    fn max_packet_size(&self, endpoint: Endpoint) -> usize {
        match endpoint {
            Endpoint::Out => self.endpoints.out_max_packet,
            Endpoint::In => self.endpoints.in_max_packet,
        }
    }

    fn reset_device(&mut self) -> Result<()> {
        debug!("resetting USB device");
        self.handle.reset().map_err(map_usb_err)
    }
}
