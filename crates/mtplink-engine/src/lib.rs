//! MTP/PTP session and transaction engine.
//!
//! An [`Engine`] owns one [`UsbTransport`](mtplink_transport::UsbTransport)
//! and at most one open session, and drives complete request/response
//! exchanges over it: command packet, optional data phase in either
//! direction, response decode, and error classification.
//!
//! The error split that matters is [`EngineError::is_fatal`]: fatal errors
//! (framing desync, transport failure) tear the connection down and require
//! [`Engine::configure`] before further use; device return codes and codec
//! failures leave the session intact.

pub mod engine;
pub mod error;
pub mod ops;
pub mod session;

pub use engine::{Engine, EngineConfig, TraceConfig};
pub use error::{EngineError, Result};
pub use ops::{PARENT_ROOT, STORAGE_ALL};
pub use session::Session;
