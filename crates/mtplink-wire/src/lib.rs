//! Wire codec for MTP/PTP: dataset records, variant values, protocol
//! constants, and the 12-byte bulk packet header.
//!
//! Everything here is pure byte manipulation with no I/O. The companion
//! engine crate drives these codecs over a USB transport.

pub mod codec;
pub mod consts;
pub mod container;
pub mod error;
pub mod packet;
pub mod propdesc;
pub mod records;
pub mod value;

pub use codec::{decode_record, encode_record, WireDecode, WireEncode};
pub use consts::ResponseCode;
pub use container::Container;
pub use error::{Result, WireError};
pub use packet::{BulkHeader, BULK_HEADER_LEN, MAX_COMMAND_PARAMS};
pub use propdesc::{DevicePropDesc, ObjectPropDesc, PropDescForm};
pub use records::{
    DeviceInfo, ObjectInfo, StorageInfo, StringValue, Uint16Array, Uint32Array, Uint64Value,
};
pub use value::{DataType, Value};
