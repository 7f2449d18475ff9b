//! USB bulk transport abstraction for MTP/PTP devices.
//!
//! The MTP engine never talks to a USB stack directly. It consumes the
//! [`UsbTransport`] trait defined here: a pair of bulk endpoints with
//! blocking send/receive, a known max packet size per endpoint, and a
//! device reset. Device enumeration, interface claiming, and endpoint
//! discovery stay with whoever constructs the transport.
//!
//! This is the lowest layer of mtplink. Everything else builds on top of
//! the [`UsbTransport`] trait.

pub mod error;
pub mod mock;
pub mod traits;

#[cfg(feature = "rusb")]
pub mod libusb;

pub use error::{Result, TransportError};
pub use mock::MockTransport;
pub use traits::{Endpoint, UsbTransport};

#[cfg(feature = "rusb")]
pub use libusb::RusbTransport;
