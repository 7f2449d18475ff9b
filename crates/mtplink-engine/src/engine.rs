//! The transaction engine: session stamping, packetization, and response
//! classification over a [`UsbTransport`].
//!
//! One engine drives one device connection. Transactions are strictly
//! sequential; the engine never overlaps transfers and provides no internal
//! locking, so concurrent callers must serialize around whole transactions.

use std::io::{self, Read, Write};
use std::thread;
use std::time::Duration;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::{debug, trace, warn};

use mtplink_transport::{Endpoint, TransportError, UsbTransport};
use mtplink_wire::consts::{
    container_type_name, operation_label, CONTAINER_COMMAND, CONTAINER_DATA, CONTAINER_RESPONSE,
    RC_SESSION_ALREADY_OPENED,
};
use mtplink_wire::{
    decode_record, encode_record, BulkHeader, Container, ResponseCode, WireDecode, WireEncode,
    WireError, BULK_HEADER_LEN, MAX_COMMAND_PARAMS,
};

use crate::error::{EngineError, Result};
use crate::session::Session;

/// Chunk size for streaming data phases.
pub(crate) const RW_BUF_SIZE: usize = 0x4000;

/// Settle time after a device reset during bootstrap.
const RESET_SETTLE: Duration = Duration::from_secs(1);

/// What to log at debug/trace level. Logging only, never correctness.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceConfig {
    /// Log each operation with its transaction id and parameters.
    pub operations: bool,
    /// Log individual bulk transfers.
    pub usb: bool,
    /// Dump raw payload bytes (very verbose).
    pub payloads: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Timeout applied to every bulk transfer.
    pub timeout: Duration,
    /// Send data-phase headers in their own packet instead of packing
    /// payload after them. Some devices ignore the offset parameter of a
    /// partial write when payload shares the first packet.
    pub separate_header: bool,
    pub trace: TraceConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(2),
            separate_header: false,
            trace: TraceConfig::default(),
        }
    }
}

/// An MTP device connection: a transport plus at most one open session.
pub struct Engine<T: UsbTransport> {
    pub(crate) transport: T,
    pub(crate) config: EngineConfig,
    pub(crate) session: Option<Session>,
    pub(crate) open: bool,
}

impl<T: UsbTransport> Engine<T> {
    pub fn new(transport: T, config: EngineConfig) -> Self {
        Self {
            transport,
            config,
            session: None,
            open: false,
        }
    }

    /// Whether the transport is currently open and trusted. A fatal
    /// transaction error flips this to false until reconfigured.
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn session_id(&self) -> Option<u32> {
        self.session.as_ref().map(Session::id)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Adjust trace output at runtime. Logging only, never correctness.
    pub fn set_trace(&mut self, trace: TraceConfig) {
        self.config.trace = trace;
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn open(&mut self) -> Result<()> {
        if !self.open {
            self.transport.open()?;
            self.open = true;
        }
        Ok(())
    }

    /// Close the session (best effort) and the transport.
    pub fn close(&mut self) -> Result<()> {
        if self.open && self.session.is_some() {
            if let Err(err) = self.close_session() {
                debug!(%err, "close session failed during shutdown");
                if self.open {
                    if let Err(err) = self.transport.reset_device() {
                        debug!(%err, "device reset failed during shutdown");
                    }
                }
            }
        }
        self.session = None;
        if self.open {
            self.open = false;
            self.transport.close()?;
        }
        Ok(())
    }

    /// Drop the session and the transport after a fatal error. The bulk
    /// pipe can no longer be trusted, so nothing further is sent.
    fn teardown(&mut self) {
        self.session = None;
        if self.open {
            self.open = false;
            if let Err(err) = self.transport.close() {
                debug!(%err, "transport close failed during teardown");
            }
        }
    }

    /// Establish a session, recovering from stale device state.
    ///
    /// A device that reports the session as already opened gets one
    /// close-and-reopen attempt. Any other failure gets one reset, reopen,
    /// and retry. After that, the error is final.
    pub fn configure(&mut self) -> Result<()> {
        self.open()?;

        let mut result = self.open_session();
        if let Err(EngineError::Rc(rc)) = &result {
            if rc.0 == RC_SESSION_ALREADY_OPENED {
                debug!("device reports session already open, closing it");
                if let Err(err) = self.close_session() {
                    debug!(%err, "close of stale session failed");
                }
                result = self.open_session();
            }
        }

        if let Err(err) = result {
            warn!(%err, "open session failed, resetting device");
            if let Err(err) = self.transport.reset_device() {
                debug!(%err, "device reset failed");
            }
            self.teardown();
            thread::sleep(RESET_SETTLE);
            self.open()?;
            self.open_session()?;
        }
        Ok(())
    }

    /// Run one full request/response exchange.
    ///
    /// `dest` receives an incoming data phase, `src` supplies an outgoing
    /// one of exactly `write_size` bytes. The engine stamps the session and
    /// transaction ids onto `req`; the transaction counter advances even
    /// when the exchange fails, since the device has consumed the id.
    ///
    /// A fatal error (Sync or Transport) tears the connection down before
    /// returning; the caller must reconfigure before further use.
    pub fn run_transaction(
        &mut self,
        req: &mut Container,
        dest: Option<&mut dyn Write>,
        src: Option<&mut dyn Read>,
        write_size: u64,
    ) -> Result<Container> {
        if !self.open {
            return Err(TransportError::NotOpen.into());
        }
        match &mut self.session {
            Some(session) => {
                req.session_id = session.id();
                req.transaction_id = session.next_transaction_id();
            }
            None => {
                req.session_id = 0;
                req.transaction_id = 0;
            }
        }
        if self.config.trace.operations {
            debug!(
                op = %operation_label(req.code),
                tid = req.transaction_id,
                params = ?req.params,
                "request"
            );
        }
        match self.transaction_inner(req, dest, src, write_size) {
            Ok(rep) => Ok(rep),
            Err(err) => {
                if err.is_fatal() {
                    warn!(%err, op = %operation_label(req.code), "fatal transaction error");
                    self.teardown();
                }
                Err(err)
            }
        }
    }

    /// [`Self::run_transaction`] for operations with no parameters and no
    /// data phase.
    pub fn run_transaction_no_params(&mut self, code: u16) -> Result<Container> {
        let mut req = Container::new(code);
        self.run_transaction(&mut req, None, None, 0)
    }

    /// Run a transaction expecting a data phase and decode it as `V`.
    pub fn get_data<V: WireDecode>(&mut self, req: &mut Container) -> Result<V> {
        let mut payload = Vec::new();
        self.run_transaction(req, Some(&mut payload), None, 0)?;
        if self.config.trace.payloads {
            let dump = format!("{payload:02x?}");
            trace!(payload = %dump, "data-in");
        }
        Ok(decode_record(Bytes::from(payload))?)
    }

    /// Encode `value` and run a transaction with it as the outgoing data.
    pub fn send_data<V: WireEncode>(&mut self, req: &mut Container, value: &V) -> Result<Container> {
        let wire = encode_record(value)?;
        if self.config.trace.payloads {
            let dump = format!("{:02x?}", wire.as_ref());
            trace!(payload = %dump, "data-out");
        }
        let size = wire.len() as u64;
        let mut src: &[u8] = &wire;
        self.run_transaction(req, None, Some(&mut src), size)
    }

    fn transaction_inner(
        &mut self,
        req: &Container,
        mut dest: Option<&mut dyn Write>,
        src: Option<&mut dyn Read>,
        write_size: u64,
    ) -> Result<Container> {
        self.send_command(req)?;
        if let Some(src) = src {
            self.send_data_phase(req, src, write_size)?;
        }

        let packet = self.fetch_packet()?;
        let mut rest = packet.clone();
        let hdr = BulkHeader::decode(&mut rest)
            .map_err(|_| EngineError::Sync("packet shorter than a bulk header".into()))?;

        let mut unexpected_data = false;
        let response_packet = if hdr.kind == CONTAINER_DATA {
            let mut discard = io::sink();
            let sink: &mut dyn Write = match dest {
                Some(ref mut w) => &mut **w,
                None => {
                    // The device committed to a data phase; drain it so the
                    // response can still be received in order, then report
                    // the desync.
                    unexpected_data = true;
                    &mut discard
                }
            };
            match self.receive_data_phase(&hdr, &rest, sink)? {
                Some(reused) => reused,
                None => self.fetch_packet()?,
            }
        } else {
            packet
        };

        let mut rep = self.decode_response(response_packet)?;
        if unexpected_data {
            return Err(EngineError::Sync(format!(
                "unexpected data phase in {}",
                operation_label(req.code)
            )));
        }
        let rc = ResponseCode(rep.code);
        if !rc.is_ok() {
            return Err(EngineError::Rc(rc));
        }
        if self.session.is_some() && rep.transaction_id != req.transaction_id {
            return Err(EngineError::Sync(format!(
                "transaction id mismatch: sent {}, received {}",
                req.transaction_id, rep.transaction_id
            )));
        }
        rep.session_id = req.session_id;
        Ok(rep)
    }

    fn send_command(&mut self, req: &Container) -> Result<()> {
        if req.params.len() > MAX_COMMAND_PARAMS {
            return Err(WireError::TooManyParams(req.params.len()).into());
        }
        let len = BULK_HEADER_LEN + 4 * req.params.len();
        let mut out = BytesMut::with_capacity(len);
        BulkHeader {
            length: len as u32,
            kind: CONTAINER_COMMAND,
            code: req.code,
            transaction_id: req.transaction_id,
        }
        .encode(&mut out);
        for p in &req.params {
            out.put_u32_le(*p);
        }
        self.write_all(&out)
    }

    /// Outgoing data phase: a DATA header, the payload in max-packet-sized
    /// chunks, and a zero-length terminator when the last write lands
    /// exactly on a packet boundary.
    fn send_data_phase(&mut self, req: &Container, src: &mut dyn Read, write_size: u64) -> Result<()> {
        let max_out = self.transport.max_packet_size(Endpoint::Out);
        let total = write_size
            .saturating_add(BULK_HEADER_LEN as u64)
            .min(u64::from(u32::MAX)) as u32;

        let mut first = BytesMut::with_capacity(max_out);
        BulkHeader {
            length: total,
            kind: CONTAINER_DATA,
            code: req.code,
            transaction_id: req.transaction_id,
        }
        .encode(&mut first);

        let mut remaining = write_size;
        if !self.config.separate_header {
            let fill = remaining.min((max_out - BULK_HEADER_LEN) as u64) as usize;
            let start = first.len();
            first.resize(start + fill, 0);
            read_full(src, &mut first[start..])?;
            remaining -= fill as u64;
        }
        self.write_all(&first)?;
        let mut last_write = first.len();

        let mut buf = vec![0u8; RW_BUF_SIZE];
        while remaining > 0 {
            let chunk = remaining.min(RW_BUF_SIZE as u64) as usize;
            read_full(src, &mut buf[..chunk])?;
            self.write_all(&buf[..chunk])?;
            last_write = chunk;
            remaining -= chunk as u64;
        }

        if last_write > 0 && last_write % max_out == 0 {
            self.write_all(&[])?;
        }
        Ok(())
    }

    /// Incoming data phase, after a DATA header has been read.
    ///
    /// `rest` is what followed the header in its packet. Returns the reused
    /// terminator packet when the host controller handed the next RESPONSE
    /// back in place of a zero-length terminator, which some XHCI stacks do.
    fn receive_data_phase(
        &mut self,
        hdr: &BulkHeader,
        rest: &[u8],
        dest: &mut dyn Write,
    ) -> Result<Option<Bytes>> {
        let max_in = self.transport.max_packet_size(Endpoint::In);
        // Devices report 0xFFFFFFFF when the payload exceeds 32 bits; the
        // stream is then delimited purely by a short packet.
        let unknown_len = hdr.length == u32::MAX;
        let expected = u64::from(hdr.length).saturating_sub(BULK_HEADER_LEN as u64);

        let take = if unknown_len {
            rest.len()
        } else {
            rest.len().min(expected.min(usize::MAX as u64) as usize)
        };
        dest.write_all(&rest[..take]).map_err(EngineError::Payload)?;
        let mut received = take as u64;

        if BULK_HEADER_LEN + rest.len() < max_in {
            // Short first packet, the phase is already over.
            return Ok(None);
        }

        let mut buf = vec![0u8; RW_BUF_SIZE];
        loop {
            if !unknown_len && received >= expected {
                // The payload ended on a packet boundary; one more read
                // yields the terminator, or the response itself.
                let n = self.read_some(&mut buf)?;
                if n >= BULK_HEADER_LEN {
                    let tail = Bytes::copy_from_slice(&buf[..n]);
                    let mut peek = tail.clone();
                    if let Ok(h) = BulkHeader::decode(&mut peek) {
                        if h.kind == CONTAINER_RESPONSE {
                            trace!(tid = h.transaction_id, "terminator reused as response");
                            return Ok(Some(tail));
                        }
                    }
                }
                return Ok(None);
            }

            let n = self.read_some(&mut buf)?;
            if n == 0 {
                return Ok(None);
            }
            let take = if unknown_len {
                n
            } else {
                n.min((expected - received).min(usize::MAX as u64) as usize)
            };
            dest.write_all(&buf[..take]).map_err(EngineError::Payload)?;
            received += take as u64;
            if n % max_in != 0 {
                // Short packet ends the stream.
                return Ok(None);
            }
        }
    }

    /// Read one packet from the bulk IN endpoint.
    fn fetch_packet(&mut self) -> Result<Bytes> {
        let max_in = self.transport.max_packet_size(Endpoint::In);
        let mut buf = vec![0u8; max_in.max(BULK_HEADER_LEN + 4 * MAX_COMMAND_PARAMS)];
        let n = self.read_some(&mut buf)?;
        buf.truncate(n);
        Ok(Bytes::from(buf))
    }

    fn decode_response(&self, packet: Bytes) -> Result<Container> {
        let mut buf = packet;
        let hdr = BulkHeader::decode(&mut buf)
            .map_err(|_| EngineError::Sync("response packet shorter than a header".into()))?;
        if hdr.kind != CONTAINER_RESPONSE {
            return Err(EngineError::Sync(format!(
                "expected a RESPONSE container, got {}",
                container_label(hdr.kind)
            )));
        }
        let length = hdr.length as usize;
        if length < BULK_HEADER_LEN || length > BULK_HEADER_LEN + 4 * MAX_COMMAND_PARAMS {
            return Err(EngineError::Sync(format!(
                "implausible response length {length}"
            )));
        }
        let nparams = (length - BULK_HEADER_LEN) / 4;
        if buf.remaining() < 4 * nparams {
            return Err(EngineError::Sync(format!(
                "response claims {nparams} parameters but carries {} bytes",
                buf.remaining()
            )));
        }
        let mut params = Vec::with_capacity(nparams);
        for _ in 0..nparams {
            params.push(buf.get_u32_le());
        }
        if self.config.trace.operations {
            debug!(rc = %ResponseCode(hdr.code), tid = hdr.transaction_id, params = ?params, "response");
        }
        Ok(Container {
            code: hdr.code,
            session_id: 0,
            transaction_id: hdr.transaction_id,
            params,
        })
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let n = self.transport.bulk_send(data, self.config.timeout)?;
        if self.config.trace.usb {
            trace!(len = data.len(), "bulk out");
        }
        if n != data.len() {
            return Err(TransportError::ShortWrite {
                written: n,
                expected: data.len(),
            }
            .into());
        }
        Ok(())
    }

    fn read_some(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = self.transport.bulk_receive(buf, self.config.timeout)?;
        if self.config.trace.usb {
            trace!(len = n, "bulk in");
        }
        Ok(n)
    }
}

fn read_full(src: &mut dyn Read, buf: &mut [u8]) -> Result<()> {
    src.read_exact(buf).map_err(EngineError::Payload)
}

fn container_label(kind: u16) -> String {
    match container_type_name(kind) {
        Some(name) => name.to_string(),
        None => format!("type 0x{kind:04x}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtplink_transport::MockTransport;
    use mtplink_wire::consts::{CONTAINER_EVENT, RC_OK};

    fn engine() -> Engine<MockTransport> {
        Engine::new(MockTransport::new(), EngineConfig::default())
    }

    fn response_packet(code: u16, tid: u32, params: &[u32]) -> Vec<u8> {
        let mut out = BytesMut::new();
        BulkHeader {
            length: (BULK_HEADER_LEN + 4 * params.len()) as u32,
            kind: CONTAINER_RESPONSE,
            code,
            transaction_id: tid,
        }
        .encode(&mut out);
        for p in params {
            out.put_u32_le(*p);
        }
        out.to_vec()
    }

    #[test]
    fn decode_response_extracts_params() {
        let rep = engine()
            .decode_response(Bytes::from(response_packet(RC_OK, 9, &[3, 4])))
            .unwrap();
        assert_eq!(rep.code, RC_OK);
        assert_eq!(rep.transaction_id, 9);
        assert_eq!(rep.params, vec![3, 4]);
    }

    #[test]
    fn decode_response_rejects_wrong_container() {
        let mut packet = response_packet(RC_OK, 1, &[]);
        packet[4] = CONTAINER_EVENT as u8;
        let err = engine().decode_response(Bytes::from(packet)).unwrap_err();
        assert!(matches!(err, EngineError::Sync(_)));
        assert!(err.to_string().contains("EVENT"));
    }

    #[test]
    fn decode_response_rejects_implausible_length() {
        let mut packet = response_packet(RC_OK, 1, &[]);
        packet[0] = 0xFF;
        packet[1] = 0xFF;
        assert!(matches!(
            engine().decode_response(Bytes::from(packet)),
            Err(EngineError::Sync(_))
        ));
    }

    #[test]
    fn decode_response_rejects_truncated_params() {
        let mut packet = response_packet(RC_OK, 1, &[7]);
        packet.truncate(14);
        assert!(matches!(
            engine().decode_response(Bytes::from(packet)),
            Err(EngineError::Sync(_))
        ));
    }
}
