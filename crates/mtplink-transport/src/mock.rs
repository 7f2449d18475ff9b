//! Scriptable in-memory transport for tests.
//!
//! Device-side behavior is scripted as a queue of bulk IN results; every
//! bulk OUT transfer is recorded. This is how the engine's framing,
//! quirk handling, and bootstrap logic are exercised without hardware.

use std::collections::VecDeque;
use std::time::Duration;

use crate::error::{Result, TransportError};
use crate::traits::{Endpoint, UsbTransport};

/// Default bulk max packet size (USB 2.0 high speed).
pub const DEFAULT_MAX_PACKET: usize = 512;

/// A scripted [`UsbTransport`] backed by in-memory queues.
pub struct MockTransport {
    max_packet: usize,
    open: bool,
    reads: VecDeque<Result<Vec<u8>>>,
    /// Every bulk OUT transfer, in order, including zero-length writes.
    pub sent: Vec<Vec<u8>>,
    /// Number of successful `open` calls.
    pub opens: usize,
    /// Number of `close` calls on an open transport.
    pub closes: usize,
    /// Number of `reset_device` calls.
    pub resets: usize,
    fail_next_send: Option<TransportError>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::with_max_packet(DEFAULT_MAX_PACKET)
    }

    pub fn with_max_packet(max_packet: usize) -> Self {
        Self {
            max_packet,
            open: false,
            reads: VecDeque::new(),
            sent: Vec::new(),
            opens: 0,
            closes: 0,
            resets: 0,
            fail_next_send: None,
        }
    }

    /// Queue the result of the next bulk IN transfer.
    ///
    /// Each queued entry is consumed by exactly one `bulk_receive` call,
    /// mirroring USB packet semantics: a short or empty entry terminates a
    /// device-to-host transfer.
    pub fn push_read(&mut self, packet: impl Into<Vec<u8>>) {
        self.reads.push_back(Ok(packet.into()));
    }

    /// Queue an error for the next bulk IN transfer.
    pub fn push_read_error(&mut self, err: TransportError) {
        self.reads.push_back(Err(err));
    }

    /// Make the next bulk OUT transfer fail with `err`.
    pub fn fail_next_send(&mut self, err: TransportError) {
        self.fail_next_send = Some(err);
    }

    /// Remaining scripted reads (useful to assert a script was consumed).
    pub fn pending_reads(&self) -> usize {
        self.reads.len()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UsbTransport for MockTransport {
    fn open(&mut self) -> Result<()> {
        self.open = true;
        self.opens += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.open {
            self.closes += 1;
        }
        self.open = false;
        Ok(())
    }

    fn bulk_send(&mut self, data: &[u8], _timeout: Duration) -> Result<usize> {
        if !self.open {
            return Err(TransportError::NotOpen);
        }
        if let Some(err) = self.fail_next_send.take() {
            return Err(err);
        }
        self.sent.push(data.to_vec());
        Ok(data.len())
    }

    fn bulk_receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        if !self.open {
            return Err(TransportError::NotOpen);
        }
        match self.reads.pop_front() {
            Some(Ok(packet)) => {
                let n = packet.len().min(buf.len());
                buf[..n].copy_from_slice(&packet[..n]);
                Ok(n)
            }
            Some(Err(err)) => Err(err),
            // An unscripted read behaves like a device that stopped talking.
            None => Err(TransportError::Timeout(timeout)),
        }
    }

    fn max_packet_size(&self, _endpoint: Endpoint) -> usize {
        self.max_packet
    }

    fn reset_device(&mut self) -> Result<()> {
        self.resets += 1;
        Ok(())
    }
}
