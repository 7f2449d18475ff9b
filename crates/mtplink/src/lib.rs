//! Talk MTP/PTP to cameras and phones over USB bulk endpoints.
//!
//! mtplink implements the MTP transaction protocol: the self-describing
//! record codec, USB bulk packetization with its framing quirks, and the
//! session/transaction state machine, over a narrow transport trait.
//!
//! # Crate Structure
//!
//! - [`transport`] — The `UsbTransport` trait, a scriptable mock, and a
//!   libusb adapter (behind the `rusb` feature)
//! - [`wire`] — Wire records, the generic field codec, protocol constants
//! - [`engine`] — Sessions, transactions, typed operations, bootstrap

/// Re-export transport types.
pub mod transport {
    pub use mtplink_transport::*;
}

/// Re-export wire types and codecs.
pub mod wire {
    pub use mtplink_wire::*;
}

/// Re-export the transaction engine.
pub mod engine {
    pub use mtplink_engine::*;
}

#[cfg(feature = "logging")]
pub mod logging;
