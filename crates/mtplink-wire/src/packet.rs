//! The fixed 12-byte USB bulk packet header.
//!
//! Every bulk transfer in an MTP exchange starts with this header:
//! 4-byte total length, 2-byte container type, 2-byte code, 4-byte
//! transaction id, all little-endian.

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::{get_u16, get_u32};
use crate::error::Result;

/// Wire size of the bulk packet header.
pub const BULK_HEADER_LEN: usize = 12;

/// Maximum number of 32-bit parameters in a command or response packet.
pub const MAX_COMMAND_PARAMS: usize = 5;

/// Header of one USB bulk packet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkHeader {
    /// Total transfer length including this header.
    pub length: u32,
    /// Container type (`CONTAINER_COMMAND` etc.).
    pub kind: u16,
    /// Operation or response code.
    pub code: u16,
    pub transaction_id: u32,
}

impl BulkHeader {
    pub fn encode(&self, out: &mut BytesMut) {
        out.put_u32_le(self.length);
        out.put_u16_le(self.kind);
        out.put_u16_le(self.code);
        out.put_u32_le(self.transaction_id);
    }

    /// Split a header off the front of a received packet.
    pub fn decode(buf: &mut Bytes) -> Result<Self> {
        Ok(Self {
            length: get_u32(buf)?,
            kind: get_u16(buf)?,
            code: get_u16(buf)?,
            transaction_id: get_u32(buf)?,
        })
    }
}
