//! Runtime-selected variant values.
//!
//! Property descriptors carry values whose primitive kind is not fixed by
//! the record schema: a `DataType` selector transmitted earlier in the same
//! record picks the kind. The dependency is made explicit in the type
//! signatures — [`Value::decode`] takes the already-resolved selector as an
//! argument, so a variant field cannot be decoded before its selector.

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec;
use crate::consts::{
    DTC_INT128, DTC_INT16, DTC_INT32, DTC_INT64, DTC_INT8, DTC_STR, DTC_UINT128, DTC_UINT16,
    DTC_UINT32, DTC_UINT64, DTC_UINT8,
};
use crate::error::{Result, WireError};

/// The closed set of primitive kinds a variant value can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Int128,
    Uint128,
    Str,
}

impl DataType {
    /// Resolve a wire type code. Unknown codes (including array-masked
    /// ones) are unsupported and must fail the decode that needed them.
    pub fn from_code(code: u16) -> Result<Self> {
        Ok(match code {
            DTC_INT8 => DataType::Int8,
            DTC_UINT8 => DataType::Uint8,
            DTC_INT16 => DataType::Int16,
            DTC_UINT16 => DataType::Uint16,
            DTC_INT32 => DataType::Int32,
            DTC_UINT32 => DataType::Uint32,
            DTC_INT64 => DataType::Int64,
            DTC_UINT64 => DataType::Uint64,
            DTC_INT128 => DataType::Int128,
            DTC_UINT128 => DataType::Uint128,
            DTC_STR => DataType::Str,
            other => return Err(WireError::UnsupportedType(other)),
        })
    }

    pub fn code(self) -> u16 {
        match self {
            DataType::Int8 => DTC_INT8,
            DataType::Uint8 => DTC_UINT8,
            DataType::Int16 => DTC_INT16,
            DataType::Uint16 => DTC_UINT16,
            DataType::Int32 => DTC_INT32,
            DataType::Uint32 => DTC_UINT32,
            DataType::Int64 => DTC_INT64,
            DataType::Uint64 => DTC_UINT64,
            DataType::Int128 => DTC_INT128,
            DataType::Uint128 => DTC_UINT128,
            DataType::Str => DTC_STR,
        }
    }
}

/// A decoded variant value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int8(i8),
    Uint8(u8),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    Int128(i128),
    Uint128(u128),
    Str(String),
}

impl Value {
    /// The kind this value would declare as its selector.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int8(_) => DataType::Int8,
            Value::Uint8(_) => DataType::Uint8,
            Value::Int16(_) => DataType::Int16,
            Value::Uint16(_) => DataType::Uint16,
            Value::Int32(_) => DataType::Int32,
            Value::Uint32(_) => DataType::Uint32,
            Value::Int64(_) => DataType::Int64,
            Value::Uint64(_) => DataType::Uint64,
            Value::Int128(_) => DataType::Int128,
            Value::Uint128(_) => DataType::Uint128,
            Value::Str(_) => DataType::Str,
        }
    }

    /// Decode a value of the kind named by `selector`.
    pub fn decode(buf: &mut Bytes, selector: DataType) -> Result<Self> {
        Ok(match selector {
            DataType::Int8 => Value::Int8(codec::get_i8(buf)?),
            DataType::Uint8 => Value::Uint8(codec::get_u8(buf)?),
            DataType::Int16 => Value::Int16(codec::get_i16(buf)?),
            DataType::Uint16 => Value::Uint16(codec::get_u16(buf)?),
            DataType::Int32 => Value::Int32(codec::get_i32(buf)?),
            DataType::Uint32 => Value::Uint32(codec::get_u32(buf)?),
            DataType::Int64 => Value::Int64(codec::get_i64(buf)?),
            DataType::Uint64 => Value::Uint64(codec::get_u64(buf)?),
            DataType::Int128 => Value::Int128(codec::get_i128(buf)?),
            DataType::Uint128 => Value::Uint128(codec::get_u128(buf)?),
            DataType::Str => Value::Str(codec::decode_string(buf)?),
        })
    }

    pub fn encode(&self, out: &mut BytesMut) -> Result<()> {
        match self {
            Value::Int8(v) => out.put_i8(*v),
            Value::Uint8(v) => out.put_u8(*v),
            Value::Int16(v) => out.put_i16_le(*v),
            Value::Uint16(v) => out.put_u16_le(*v),
            Value::Int32(v) => out.put_i32_le(*v),
            Value::Uint32(v) => out.put_u32_le(*v),
            Value::Int64(v) => out.put_i64_le(*v),
            Value::Uint64(v) => out.put_u64_le(*v),
            Value::Int128(v) => out.put_i128_le(*v),
            Value::Uint128(v) => out.put_u128_le(*v),
            Value::Str(s) => codec::encode_string(s, out)?,
        }
        Ok(())
    }
}
